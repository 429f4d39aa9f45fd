use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the support-chat backend API (e.g., http://localhost:8000)
    #[arg(long, env = "API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Transport timeout for each API request, in milliseconds.
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,

    // --- Session Token Args ---
    /// Where the bearer token is kept between runs (file, memory)
    #[arg(long, env = "TOKEN_STORE", default_value = "file")]
    pub token_store: String,

    /// Directory holding the stored bearer token when TOKEN_STORE=file.
    #[arg(long, env = "TOKEN_DIR", default_value = ".support-chat")]
    pub token_dir: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long, env = "CHAT_EMAIL")]
        email: String,
        #[arg(long, env = "CHAT_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the signed in user.
    Whoami,
    /// List past conversations, most recent first.
    History,
    /// Print one conversation.
    Show {
        id: String,
    },
    /// Delete one conversation.
    Delete {
        id: String,
    },
    /// Send a single prompt and print the answer.
    Ask {
        prompt: String,
        /// Continue an existing conversation instead of starting a new one.
        #[arg(long)]
        chat_id: Option<String>,
    },
    /// Interactive chat on stdin.
    Chat,
}

pub mod render;

use log::{ error, info };
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use crate::api::HttpApiClient;
use crate::auth::{ AuthSession, Session };
use crate::cli::Command;
use crate::config::ClientConfig;
use crate::models::route::Route;
use crate::models::user::{ LoginData, RegisterData };
use crate::session::ChatSession;
use crate::storage::create_token_store;
use self::render::{ format_chat, format_history, format_message };

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Command line front end. Drives the auth and chat state machines and
/// prints their state; errors surface here and nowhere else.
pub struct App {
    client: HttpApiClient,
    auth: AuthSession,
}

impl App {
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let client = HttpApiClient::from_config(config)?;
        let store = create_token_store(config);
        let auth = AuthSession::new(Arc::new(client.clone()), store);
        Ok(Self { client, auth })
    }

    pub async fn execute(&mut self, command: Command) -> AppResult<()> {
        match command {
            Command::Login { email, password } => {
                let (session, route) = self.auth.login(&LoginData { email, password }).await?;
                println!("Signed in as {} <{}>", session.user.name, session.user.email);
                navigate(&route);
            }
            Command::Register { name, email, password } => {
                let profile = RegisterData { name, email, password };
                let (session, route) = self.auth.register(&profile).await?;
                println!("Welcome, {}!", session.user.name);
                navigate(&route);
            }
            Command::Logout => {
                let route = self.auth.logout().await?;
                println!("Signed out.");
                navigate(&route);
            }
            Command::Whoami => {
                match self.auth.restore().await? {
                    Some(session) => println!("{} <{}>", session.user.name, session.user.email),
                    None => println!("Not signed in."),
                }
            }
            Command::History => {
                let Some((mut chat, _)) = self.chat_session().await? else {
                    return Ok(());
                };
                chat.fetch_history_list().await?;
                println!("{}", format_history(chat.chats()));
            }
            Command::Show { id } => {
                let Some((mut chat, _)) = self.chat_session().await? else {
                    return Ok(());
                };
                chat.open_conversation(&id).await?;
                println!("{}", format_chat(chat.current()));
            }
            Command::Delete { id } => {
                let Some((mut chat, _)) = self.chat_session().await? else {
                    return Ok(());
                };
                chat.delete_conversation(&id).await?;
                println!("Deleted conversation {}.", id);
            }
            Command::Ask { prompt, chat_id } => {
                let prompt = prompt.trim().to_string();
                if prompt.is_empty() {
                    return Err("Prompt must not be empty".into());
                }
                let Some((mut chat, session)) = self.chat_session().await? else {
                    return Ok(());
                };
                if let Some(id) = chat_id {
                    chat.open_conversation(&id).await?;
                } else {
                    chat.start_new_chat();
                }
                let answer = chat.send_prompt(&prompt, Some(&session.user)).await?;
                println!("{}", format_message(&answer));
                if let Some(id) = chat.current().id() {
                    println!("(conversation {})", id);
                }
            }
            Command::Chat => {
                let Some((chat, session)) = self.chat_session().await? else {
                    return Ok(());
                };
                self.interactive(chat, session).await?;
            }
        }
        Ok(())
    }

    /// Restores the stored session and builds a chat session bound to its
    /// token. Prints login guidance and returns `None` when signed out.
    async fn chat_session(&mut self) -> AppResult<Option<(ChatSession, Session)>> {
        match self.auth.restore().await? {
            Some(session) => {
                let api = self.client.authorized(session.token.clone());
                Ok(Some((ChatSession::new(Arc::new(api)), session)))
            }
            None => {
                navigate(&Route::Login);
                Ok(None)
            }
        }
    }

    async fn interactive(&mut self, mut chat: ChatSession, session: Session) -> AppResult<()> {
        info!("Interactive chat for {}", session.user.email);
        if let Err(e) = chat.fetch_history_list().await {
            notify(&e);
        }
        chat.start_new_chat();
        println!("Type a message, or /new, /history, /open <id>, /delete <id>, /quit.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (cmd, arg) = match line.split_once(' ') {
                Some((cmd, arg)) => (cmd, arg.trim()),
                None => (line, ""),
            };

            match cmd {
                "/quit" | "/exit" => break,
                "/new" => {
                    chat.start_new_chat();
                    println!("{}", format_chat(chat.current()));
                }
                "/history" => {
                    match chat.fetch_history_list().await {
                        Ok(()) => println!("{}", format_history(chat.chats())),
                        Err(e) => notify(&e),
                    }
                }
                "/open" if !arg.is_empty() => {
                    match chat.open_conversation(arg).await {
                        Ok(_) => println!("{}", format_chat(chat.current())),
                        Err(e) => notify(&e),
                    }
                }
                "/delete" if !arg.is_empty() => {
                    match chat.delete_conversation(arg).await {
                        Ok(route) => {
                            println!("Deleted conversation {}.", arg);
                            if let Some(route) = route {
                                navigate(&route);
                            }
                        }
                        Err(e) => notify(&e),
                    }
                }
                _ if cmd.starts_with('/') => println!("Unknown command: {}", line),
                _ => {
                    match chat.send_prompt(line, Some(&session.user)).await {
                        Ok(answer) => println!("{}", format_message(&answer)),
                        Err(e) => notify(&e),
                    }
                }
            }
        }
        Ok(())
    }
}

fn navigate(route: &Route) {
    match route {
        Route::Login => println!("Not signed in. Run `support-chat login` first."),
        other => info!("Navigating to {}", other),
    }
}

/// Reports a failed operation to the user without stopping the loop.
pub fn notify(err: &dyn Error) {
    error!("{}", err);
    eprintln!("error: {}", err);
}

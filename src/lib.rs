pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;
pub mod utils;

use app::App;
use cli::Args;
use config::ClientConfig;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ClientConfig::from_args(&args)?;

    info!("--- Client Configuration ---");
    info!("API URL: {}", config.api_url);
    info!("Request Timeout: {:?}", config.request_timeout);
    info!("Token Store: {}", config.token_store);
    info!("Token Directory: {}", config.token_dir.display());
    info!("----------------------------");

    let mut app = App::new(&config)?;
    app.execute(args.command).await
}

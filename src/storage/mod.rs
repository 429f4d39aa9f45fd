mod file;
mod memory;

pub use self::file::FileTokenStore;
pub use self::memory::MemoryTokenStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;
use crate::config::{ ClientConfig, TokenStoreType };

/// Fixed key the bearer token is stored under.
pub const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable holder for exactly one value, the bearer token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, StorageError>;

    async fn save(&self, token: &str) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

pub fn create_token_store(config: &ClientConfig) -> Arc<dyn TokenStore> {
    match config.token_store {
        TokenStoreType::File => {
            info!("Session token will be stored in: {}", config.token_dir.display());
            Arc::new(FileTokenStore::new(&config.token_dir))
        }
        TokenStoreType::Memory => {
            info!("Session token will be kept in memory only");
            Arc::new(MemoryTokenStore::default())
        }
    }
}

use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;
use super::{ StorageError, TokenStore, TOKEN_KEY };

pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(TOKEN_KEY) }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                Ok(if token.is_empty() { None } else { Some(token.to_string()) })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, token).await?;
        debug!("Stored session token at {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

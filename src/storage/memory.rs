use async_trait::async_trait;
use std::sync::Mutex;
use super::{ StorageError, TokenStore };

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot().clone())
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.slot() = None;
        Ok(())
    }
}

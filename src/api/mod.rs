mod http;

pub use self::http::HttpApiClient;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;
use crate::models::chat::{ Conversation, SendPromptRequest, SendPromptResponse };
use crate::models::user::{ AccessToken, LoginData, RegisterData };

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{detail} (HTTP {status})")]
    Rejected {
        status: u16,
        detail: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid conversation id: '{0}'")]
    InvalidId(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn authenticate(&self, credentials: &LoginData) -> Result<AccessToken, ApiError>;

    async fn register(&self, profile: &RegisterData) -> Result<AccessToken, ApiError>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn answer_prompt(
        &self,
        request: &SendPromptRequest
    ) -> Result<SendPromptResponse, ApiError>;

    /// Conversation summaries, most recent first. Entries carry no messages.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError>;

    async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), ApiError>;
}

/// Reduces a backend error body to one human readable message.
///
/// The backend answers either `{"detail": "text"}` or a validation list
/// `{"detail": [{"msg": "text", ...}]}`.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let root: JsonValue = serde_json::from_str(body).ok()?;
    let detail = root.get("detail")?;

    let first = match detail {
        JsonValue::Array(items) => items.first()?,
        other => other,
    };

    match first {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(map) => ["msg", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(|s| s.to_string()),
        _ => None,
    }
}

mod state;

pub use self::state::ChatState;

use log::{ debug, info, warn };
use std::sync::Arc;
use crate::api::{ ApiError, ChatApi };
use crate::models::chat::{ Conversation, Message, SendPromptRequest };
use crate::models::route::Route;
use crate::models::user::User;

/// Client side chat state: the open conversation plus the history list.
///
/// Operations take `&mut self`, so sends on one session never overlap. The
/// backend owns ids and titles; this type only mirrors what it returns.
pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    loading: bool,
    current: ChatState,
    chats: Vec<Conversation>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            loading: false,
            current: ChatState::Absent,
            chats: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current(&self) -> &ChatState {
        &self.current
    }

    pub fn messages(&self) -> &[Message] {
        self.current.messages()
    }

    pub fn chats(&self) -> &[Conversation] {
        &self.chats
    }

    /// Sends one prompt and records the exchange.
    ///
    /// The user message is appended before the request goes out and stays
    /// there if the request fails. `text` is expected to be non-empty.
    pub async fn send_prompt(&mut self, text: &str, user: Option<&User>) -> Result<Message, ApiError> {
        self.loading = true;

        self.current.push(Message::user(text));

        let request = SendPromptRequest {
            prompt: text.to_string(),
            user_id: user.map(|u| u.id.clone()),
            chat_id: self.current.id().map(str::to_string),
        };
        debug!(
            "Sending prompt (user_id={:?}, chat_id={:?})",
            request.user_id,
            request.chat_id
        );

        let api = self.api.clone();
        let reply = match api.answer_prompt(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Prompt failed: {}", e);
                self.loading = false;
                return Err(e);
            }
        };

        let answer = Message::system(reply.response);
        self.current.push(answer.clone());

        if let Some(title) = &reply.title {
            self.current.set_title(title.clone());
        }

        match reply.chat_id {
            Some(chat_id) if request.chat_id.is_none() => {
                self.current.assign_id(chat_id);
                let id = self.current.id().map(str::to_string);
                info!("Conversation persisted as {:?}", id);

                // A stale entry under the same id gives way to the new one.
                self.chats.retain(|c| c.id.is_none() || c.id != id);
                self.chats.insert(0, Conversation {
                    id,
                    title: reply.title.clone(),
                    messages: self.current.messages().to_vec(),
                });
            }
            _ => self.sync_history_entry(reply.title.as_deref()),
        }

        self.loading = false;
        Ok(answer)
    }

    /// Replaces the history list with the server's. `current` is untouched.
    pub async fn fetch_history_list(&mut self) -> Result<(), ApiError> {
        let chats = self.api.list_conversations().await?;
        debug!("Fetched {} conversations", chats.len());
        self.chats = chats;
        Ok(())
    }

    /// Loads a conversation and makes it current. On failure `current`
    /// becomes `Absent`.
    pub async fn open_conversation(&mut self, id: &str) -> Result<Route, ApiError> {
        self.loading = true;
        let result = self.api.get_conversation(id).await;
        self.loading = false;

        match result {
            Ok(mut chat) => {
                chat.id.get_or_insert_with(|| id.to_string());
                self.current = ChatState::from(chat);
                Ok(Route::Chat(id.to_string()))
            }
            Err(e) => {
                warn!("Failed to open conversation {}: {}", id, e);
                self.current = ChatState::Absent;
                Err(e)
            }
        }
    }

    /// Deletes a conversation on the backend, then locally. Returns
    /// `Some(Route::Home)` when the open conversation was the one deleted.
    pub async fn delete_conversation(&mut self, id: &str) -> Result<Option<Route>, ApiError> {
        self.loading = true;
        let result = self.api.delete_conversation(id).await;
        self.loading = false;

        if let Err(e) = result {
            warn!("Failed to delete conversation {}: {}", id, e);
            return Err(e);
        }

        self.chats.retain(|c| c.id.as_deref() != Some(id));
        info!("Deleted conversation {}", id);

        if self.current.id() == Some(id) {
            self.current = ChatState::Empty;
            return Ok(Some(Route::Home));
        }
        Ok(None)
    }

    pub fn start_new_chat(&mut self) {
        self.current = ChatState::Empty;
    }

    // Keeps the history entry of a persisted conversation in step with the
    // open copy after follow-up turns.
    fn sync_history_entry(&mut self, title: Option<&str>) {
        let Some(id) = self.current.id() else {
            return;
        };
        if let Some(entry) = self.chats.iter_mut().find(|c| c.id.as_deref() == Some(id)) {
            entry.messages = self.current.messages().to_vec();
            if let Some(title) = title {
                entry.title = Some(title.to_string());
            }
        }
    }
}

use log::warn;
use crate::models::chat::{ Conversation, Message };

/// The conversation on screen.
///
/// `Absent` is the state before anything was shown or after a failed open,
/// `Empty` a fresh chat, `Draft` a chat the backend has not named yet and
/// `Persisted` one with a server assigned id. Every transition is total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChatState {
    #[default]
    Absent,
    Empty,
    Draft {
        title: Option<String>,
        messages: Vec<Message>,
    },
    Persisted {
        id: String,
        title: Option<String>,
        messages: Vec<Message>,
    },
}

impl ChatState {
    pub fn id(&self) -> Option<&str> {
        match self {
            ChatState::Persisted { id, .. } => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ChatState::Draft { title, .. } | ChatState::Persisted { title, .. } => title.as_deref(),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        match self {
            ChatState::Draft { messages, .. } | ChatState::Persisted { messages, .. } => messages.as_slice(),
            _ => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ChatState::Absent)
    }

    pub fn push(&mut self, message: Message) {
        match self {
            ChatState::Draft { messages, .. } | ChatState::Persisted { messages, .. } => {
                messages.push(message);
            }
            ChatState::Absent | ChatState::Empty => {
                *self = ChatState::Draft { title: None, messages: vec![message] };
            }
        }
    }

    pub fn set_title(&mut self, new_title: impl Into<String>) {
        let new_title = new_title.into();
        match self {
            ChatState::Draft { title, .. } | ChatState::Persisted { title, .. } => {
                *title = Some(new_title);
            }
            ChatState::Absent | ChatState::Empty => {
                *self = ChatState::Draft { title: Some(new_title), messages: Vec::new() };
            }
        }
    }

    /// Promotes a draft to a persisted conversation. An id that is already
    /// set is never replaced.
    pub fn assign_id(&mut self, new_id: impl Into<String>) {
        let new_id = new_id.into();
        match std::mem::take(self) {
            ChatState::Persisted { id, title, messages } => {
                if id != new_id {
                    warn!("Ignoring id {} for conversation already persisted as {}", new_id, id);
                }
                *self = ChatState::Persisted { id, title, messages };
            }
            ChatState::Draft { title, messages } => {
                *self = ChatState::Persisted { id: new_id, title, messages };
            }
            ChatState::Absent | ChatState::Empty => {
                *self = ChatState::Persisted { id: new_id, title: None, messages: Vec::new() };
            }
        }
    }

    pub fn to_conversation(&self) -> Option<Conversation> {
        match self {
            ChatState::Absent => None,
            ChatState::Empty => Some(Conversation::default()),
            _ => Some(Conversation {
                id: self.id().map(str::to_string),
                title: self.title().map(str::to_string),
                messages: self.messages().to_vec(),
            }),
        }
    }
}

impl From<Conversation> for ChatState {
    fn from(chat: Conversation) -> Self {
        match chat.id {
            Some(id) => ChatState::Persisted { id, title: chat.title, messages: chat.messages },
            None if chat.title.is_none() && chat.messages.is_empty() => ChatState::Empty,
            None => ChatState::Draft { title: chat.title, messages: chat.messages },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_push_creates_draft() {
        let mut state = ChatState::Absent;
        state.push(Message::user("hello"));
        assert_eq!(state, ChatState::Draft { title: None, messages: vec![Message::user("hello")] });

        let mut state = ChatState::Empty;
        state.push(Message::user("hello"));
        assert!(matches!(state, ChatState::Draft { .. }));
    }

    #[test]
    fn assign_id_keeps_messages_and_title() {
        let mut state = ChatState::Empty;
        state.push(Message::user("hello"));
        state.set_title("Greeting");
        state.assign_id("c1");

        assert_eq!(state.id(), Some("c1"));
        assert_eq!(state.title(), Some("Greeting"));
        assert_eq!(state.messages(), &[Message::user("hello")]);
    }

    #[test]
    fn persisted_id_is_never_replaced() {
        let mut state = ChatState::Persisted { id: "c1".into(), title: None, messages: vec![] };
        state.assign_id("c2");
        assert_eq!(state.id(), Some("c1"));
    }

    #[test]
    fn title_on_absent_is_defensive_draft() {
        let mut state = ChatState::Absent;
        state.set_title("Orphan");
        assert_eq!(state.title(), Some("Orphan"));
        assert!(state.messages().is_empty());
        assert_eq!(state.id(), None);
    }

    #[test]
    fn from_conversation() {
        assert_eq!(ChatState::from(Conversation::default()), ChatState::Empty);

        let fetched = Conversation {
            id: Some("c9".into()),
            title: Some("Billing".into()),
            messages: vec![Message::user("q"), Message::system("a")],
        };
        let state = ChatState::from(fetched.clone());
        assert_eq!(state.id(), Some("c9"));
        assert_eq!(state.to_conversation(), Some(fetched));
    }

    #[test]
    fn absent_has_no_conversation() {
        assert_eq!(ChatState::Absent.to_conversation(), None);
        assert_eq!(ChatState::Empty.to_conversation(), Some(Conversation::default()));
    }
}

use crate::models::chat::{ Conversation, Message, Role };
use crate::session::ChatState;
use crate::utils::truncate;

const TITLE_WIDTH: usize = 40;

pub fn format_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::System => "Assistant",
    };
    format!("{}: {}", speaker, message.text)
}

pub fn format_history(chats: &[Conversation]) -> String {
    if chats.is_empty() {
        return "No conversations yet.".to_string();
    }
    chats
        .iter()
        .map(|chat| {
            format!(
                "{}  {}",
                chat.id.as_deref().unwrap_or("-"),
                truncate(chat.title.as_deref().unwrap_or("Untitled"), TITLE_WIDTH)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_chat(state: &ChatState) -> String {
    let mut out = String::new();
    match state {
        ChatState::Absent => return "Conversation not available.".to_string(),
        ChatState::Empty => return "New chat.".to_string(),
        _ => {}
    }
    if let Some(title) = state.title() {
        out.push_str(&format!("# {}\n", title));
    }
    for message in state.messages() {
        out.push_str(&format_message(message));
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_lines_are_truncated() {
        let chats = vec![
            Conversation {
                id: Some("c1".into()),
                title: Some("a".repeat(50)),
                messages: vec![],
            },
            Conversation { id: Some("c2".into()), title: None, messages: vec![] },
        ];
        let out = format_history(&chats);
        assert_eq!(out, format!("c1  {}...\nc2  Untitled", "a".repeat(40)));
    }

    #[test]
    fn chat_transcript() {
        let state = ChatState::Persisted {
            id: "c1".into(),
            title: Some("Greeting".into()),
            messages: vec![Message::user("hello"), Message::system("hi")],
        };
        assert_eq!(format_chat(&state), "# Greeting\nYou: hello\nAssistant: hi");
        assert_eq!(format_chat(&ChatState::Empty), "New chat.");
    }
}

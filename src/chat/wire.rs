//! Chat Wire Format
//!
//! The socket and REST endpoints describe the same message three different
//! ways (author as object, author as username plus `author_id`, or
//! `sender_id`/`sender_name`). Everything is normalized into `ChatMessage`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ChatError;
use crate::models::{Author, ChatMessage};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireAuthor {
    Full { id: u32, username: String },
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    author: Option<WireAuthor>,
    #[serde(default)]
    author_id: Option<u32>,
    #[serde(default)]
    sender_id: Option<u32>,
    #[serde(default)]
    sender_name: Option<String>,
    /// Private dialogs only
    #[serde(default)]
    pub chat_id: Option<u32>,
    pub created: DateTime<Utc>,
}

impl WireMessage {
    pub fn into_message(self) -> ChatMessage {
        let author = match self.author {
            Some(WireAuthor::Full { id, username }) => Author { id, username },
            Some(WireAuthor::Name(username)) => Author {
                id: self.author_id.unwrap_or_default(),
                username,
            },
            None => Author {
                id: self.sender_id.unwrap_or_default(),
                username: self.sender_name.unwrap_or_default(),
            },
        };
        ChatMessage {
            id: self.id,
            author,
            text: self.text,
            created: self.created,
        }
    }
}

/// Body of `GET chat/boards/{id}/history/`, newest first
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total: u32,
}

impl HistoryPage {
    /// Messages oldest first
    pub fn into_chronological(self) -> Vec<ChatMessage> {
        self.messages.into_iter().rev().map(WireMessage::into_message).collect()
    }
}

/// One decoded server frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Replaces the whole list
    History(Vec<ChatMessage>),
    Message(ChatMessage),
    /// Frame for another dialog, or a kind this client does not render
    Ignored,
}

fn parse_value(text: &str) -> Result<Value, ChatError> {
    serde_json::from_str(text).map_err(|e| ChatError::Frame(e.to_string()))
}

fn message_from(value: Value) -> Result<WireMessage, ChatError> {
    serde_json::from_value(value).map_err(|e| ChatError::Frame(e.to_string()))
}

pub fn parse_board_frame(text: &str) -> Result<Inbound, ChatError> {
    let mut value = parse_value(text)?;
    let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    match kind.as_deref() {
        Some("history") => {
            let messages: Vec<WireMessage> = serde_json::from_value(value["messages"].take())
                .map_err(|e| ChatError::Frame(e.to_string()))?;
            Ok(Inbound::History(messages.into_iter().map(WireMessage::into_message).collect()))
        }
        Some("message") | None if value.get("id").is_some() => Ok(Inbound::Message(message_from(value)?.into_message())),
        _ => Ok(Inbound::Ignored),
    }
}

/// Private frames arrive for every dialog of the user; keep only `chat_id`
pub fn parse_private_frame(text: &str, chat_id: u32) -> Result<Inbound, ChatError> {
    let mut value = parse_value(text)?;
    if value.get("type").and_then(Value::as_str) != Some("new_message") {
        return Ok(Inbound::Ignored);
    }
    let message = message_from(value["message"].take())?;
    if message.chat_id != Some(chat_id) {
        return Ok(Inbound::Ignored);
    }
    Ok(Inbound::Message(message.into_message()))
}

pub fn board_outbound(text: &str) -> String {
    json!({ "type": "message", "text": text }).to_string()
}

pub fn private_outbound(recipient_id: u32, text: &str) -> String {
    json!({ "type": "private_message", "recipient_id": recipient_id, "text": text }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_frame_replaces_list() {
        let frame = r#"{"type": "history", "messages": [
            {"id": 1, "text": "hi", "author": "alice", "author_id": 1, "created": "2024-03-01T09:00:00.000001+00:00"},
            {"id": 2, "text": "yo", "author": "bob", "author_id": 2, "created": "2024-03-01T09:01:00+00:00"}
        ]}"#;
        let Inbound::History(messages) = parse_board_frame(frame).unwrap() else {
            panic!("expected history");
        };
        assert_eq!(messages.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(messages[1].author, Author { id: 2, username: "bob".to_string() });
    }

    #[test]
    fn test_bare_message_frame() {
        let frame = r#"{"id": 5, "text": "ping", "author": "carol", "author_id": 3, "created": "2024-03-01T10:00:00Z"}"#;
        let Inbound::Message(message) = parse_board_frame(frame).unwrap() else {
            panic!("expected message");
        };
        assert_eq!(message.author.id, 3);
        assert_eq!(message.text, "ping");
    }

    #[test]
    fn test_unknown_frames_are_ignored_and_garbage_fails() {
        assert_eq!(parse_board_frame(r#"{"type": "error", "detail": "x"}"#).unwrap(), Inbound::Ignored);
        assert!(matches!(parse_board_frame("{not json"), Err(ChatError::Frame(_))));
    }

    #[test]
    fn test_private_frame_filters_other_dialogs() {
        let frame = |chat_id: u32| {
            format!(
                r#"{{"type": "new_message", "message": {{"id": 9, "text": "psst", "chat_id": {},
                    "sender_id": 2, "sender_name": "bob", "created": "2024-03-01T11:00:00Z"}}}}"#,
                chat_id
            )
        };
        let Inbound::Message(message) = parse_private_frame(&frame(4), 4).unwrap() else {
            panic!("expected message");
        };
        assert_eq!(message.author, Author { id: 2, username: "bob".to_string() });
        assert_eq!(parse_private_frame(&frame(5), 4).unwrap(), Inbound::Ignored);
    }

    #[test]
    fn test_rest_history_is_reversed_to_oldest_first() {
        let body = r#"{"messages": [
            {"id": 8, "text": "b", "author": {"id": 2, "username": "bob", "avatar": "/a.png"}, "created": "2024-03-01T09:02:00Z"},
            {"id": 7, "text": "a", "author": {"id": 1, "username": "alice"}, "created": "2024-03-01T09:01:00Z"}
        ], "has_more": false, "total": 2, "room_id": 1}"#;
        let page: HistoryPage = serde_json::from_str(body).unwrap();
        let ids: Vec<u32> = page.into_chronological().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_outbound_frames() {
        let board: Value = serde_json::from_str(&board_outbound("hello")).unwrap();
        assert_eq!(board, json!({ "type": "message", "text": "hello" }));
        let private: Value = serde_json::from_str(&private_outbound(3, "hey")).unwrap();
        assert_eq!(private, json!({ "type": "private_message", "recipient_id": 3, "text": "hey" }));
    }
}

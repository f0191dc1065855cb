//! Chat Channel
//!
//! Message list and connection state for one chat room. Inbound messages are
//! appended in arrival order; a history frame replaces the list. Outbound
//! messages are never echoed locally: they show up once the transport or the
//! REST reply returns them.

pub mod polling;
pub mod socket;
pub mod transport;
pub mod wire;

use crate::api::ApiClient;
use crate::config::{ClientConfig, TransportKind};
use crate::error::ChatError;
use crate::models::ChatMessage;

pub use polling::PollingTransport;
pub use socket::SocketTransport;
pub use transport::{ChatEvent, ChatTransport, ConnectionStatus, EventSink, ReconnectPolicy};
pub use wire::Inbound;

pub const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRoom {
    Board(u32),
    Private { chat_id: u32, recipient_id: u32 },
}

impl ChatRoom {
    pub fn socket_path(&self) -> String {
        match self {
            ChatRoom::Board(board_id) => format!("ws/chat/{}/", board_id),
            ChatRoom::Private { .. } => "ws/private/".to_string(),
        }
    }

    pub fn parse_frame(&self, text: &str) -> Result<Inbound, ChatError> {
        match self {
            ChatRoom::Board(_) => wire::parse_board_frame(text),
            ChatRoom::Private { chat_id, .. } => wire::parse_private_frame(text, *chat_id),
        }
    }

    pub fn outbound_frame(&self, text: &str) -> String {
        match self {
            ChatRoom::Board(_) => wire::board_outbound(text),
            ChatRoom::Private { recipient_id, .. } => wire::private_outbound(*recipient_id, text),
        }
    }

    /// Full history over REST, oldest first
    pub async fn fetch_history(&self, api: &ApiClient) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = match self {
            ChatRoom::Board(board_id) => api.fetch_board_history(*board_id).await?,
            ChatRoom::Private { chat_id, .. } => api.fetch_dialog_messages(*chat_id).await?,
        };
        Ok(messages)
    }

    pub async fn send_rest(&self, api: &ApiClient, text: &str) -> Result<ChatMessage, ChatError> {
        let message = match self {
            ChatRoom::Board(board_id) => api.send_board_message(*board_id, text).await?,
            ChatRoom::Private { chat_id, .. } => api.send_dialog_message(*chat_id, text).await?,
        };
        Ok(message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatChannel {
    pub room: ChatRoom,
    pub messages: Vec<ChatMessage>,
    pub status: ConnectionStatus,
}

impl ChatChannel {
    pub fn new(room: ChatRoom) -> Self {
        Self {
            room,
            messages: Vec::new(),
            status: ConnectionStatus::Connecting,
        }
    }

    pub fn handle(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Status(status) => self.status = status,
            ChatEvent::Inbound(Inbound::History(messages)) => self.messages = messages,
            ChatEvent::Inbound(Inbound::Message(message)) => self.messages.push(message),
            ChatEvent::Inbound(Inbound::Ignored) => {}
        }
    }
}

/// Where a validated outbound message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRoute {
    Transport(String),
    Rest(String),
}

pub fn route_outbound(text: &str, transport_open: bool) -> Result<SendRoute, ChatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::Empty);
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ChatError::TooLong(len));
    }
    Ok(if transport_open {
        SendRoute::Transport(text.to_string())
    } else {
        SendRoute::Rest(text.to_string())
    })
}

/// Start the transport selected by configuration
pub fn open_transport(config: &ClientConfig, api: &ApiClient, room: ChatRoom, sink: EventSink) -> Box<dyn ChatTransport> {
    match config.chat_transport {
        TransportKind::Socket => {
            let url = format!("{}{}", config.ws_base, room.socket_path());
            Box::new(SocketTransport::connect(url, room, config.reconnect, sink))
        }
        TransportKind::Polling => Box::new(PollingTransport::start(api.clone(), room, config.poll_interval_ms, sink)),
    }
}

/// Validate and deliver one message. Returns the created message when it
/// went over REST; socket sends come back as an inbound frame instead.
pub async fn send_message(
    transport: Option<&dyn ChatTransport>,
    api: &ApiClient,
    room: ChatRoom,
    text: &str,
) -> Result<Option<ChatMessage>, ChatError> {
    let open = transport.map(|t| t.is_open()).unwrap_or(false);
    match route_outbound(text, open)? {
        SendRoute::Transport(text) => {
            if let Some(transport) = transport {
                transport.send(&room.outbound_frame(&text))?;
            }
            Ok(None)
        }
        SendRoute::Rest(text) => room.send_rest(api, &text).await.map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::at;
    use crate::models::Author;

    fn message(id: u32, text: &str) -> ChatMessage {
        ChatMessage {
            id,
            author: Author {
                id: 1,
                username: "alice".to_string(),
            },
            text: text.to_string(),
            created: at(12),
        }
    }

    #[test]
    fn test_messages_keep_arrival_order() {
        let mut channel = ChatChannel::new(ChatRoom::Board(7));
        // Arrival order differs from id and timestamp order
        for id in [3, 1, 2] {
            channel.handle(ChatEvent::Inbound(Inbound::Message(message(id, "m"))));
        }
        channel.handle(ChatEvent::Inbound(Inbound::Message(message(1, "dup"))));
        let ids: Vec<u32> = channel.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2, 1]);
    }

    #[test]
    fn test_history_replaces_list() {
        let mut channel = ChatChannel::new(ChatRoom::Board(7));
        channel.handle(ChatEvent::Inbound(Inbound::Message(message(9, "stale"))));
        channel.handle(ChatEvent::Inbound(Inbound::History(vec![message(1, "a"), message(2, "b")])));
        channel.handle(ChatEvent::Status(ConnectionStatus::Open));
        assert_eq!(channel.messages.len(), 2);
        assert_eq!(channel.status, ConnectionStatus::Open);
    }

    #[test]
    fn test_route_validates_and_picks_path() {
        assert_eq!(route_outbound("   ", true), Err(ChatError::Empty));
        assert_eq!(route_outbound(" hi ", true), Ok(SendRoute::Transport("hi".to_string())));
        assert_eq!(route_outbound("hi", false), Ok(SendRoute::Rest("hi".to_string())));

        let long = "я".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(route_outbound(&long, true), Err(ChatError::TooLong(MAX_MESSAGE_CHARS + 1)));
        assert!(route_outbound(&"x".repeat(MAX_MESSAGE_CHARS), false).is_ok());
    }

    #[test]
    fn test_room_paths_and_frames() {
        assert_eq!(ChatRoom::Board(7).socket_path(), "ws/chat/7/");
        let private = ChatRoom::Private { chat_id: 4, recipient_id: 2 };
        assert_eq!(private.socket_path(), "ws/private/");
        assert!(private.outbound_frame("hey").contains("\"recipient_id\":2"));
    }
}

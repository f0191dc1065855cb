//! Polling Transport
//!
//! For deployments without sockets: refetch the REST history on a fixed
//! interval and emit only messages with an id above the highest one seen.
//! Sending always goes over REST.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::task::spawn_local;

use super::transport::{ChatEvent, ChatTransport, ConnectionStatus, EventSink};
use super::wire::Inbound;
use super::ChatRoom;
use crate::api::ApiClient;
use crate::error::ChatError;
use crate::models::ChatMessage;

/// Highest message id already delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCursor {
    highest: Option<u32>,
}

impl PollCursor {
    /// Keep messages newer than the cursor, in the order given
    pub fn take_new(&mut self, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let fresh: Vec<ChatMessage> = messages
            .into_iter()
            .filter(|m| self.highest.map_or(true, |h| m.id > h))
            .collect();
        if let Some(max) = fresh.iter().map(|m| m.id).max() {
            self.highest = Some(max);
        }
        fresh
    }
}

pub struct PollingTransport {
    stopped: Rc<Cell<bool>>,
}

impl PollingTransport {
    pub fn start(api: ApiClient, room: ChatRoom, interval_ms: u32, sink: EventSink) -> Self {
        let stopped = Rc::new(Cell::new(false));
        let flag = stopped.clone();
        sink(ChatEvent::Status(ConnectionStatus::Connecting));

        spawn_local(async move {
            let mut cursor = PollCursor::default();
            let mut primed = false;
            while !flag.get() {
                match room.fetch_history(&api).await {
                    Ok(_) if flag.get() => break,
                    Ok(messages) if !primed => {
                        primed = true;
                        let history = cursor.take_new(messages);
                        sink(ChatEvent::Inbound(Inbound::History(history)));
                        sink(ChatEvent::Status(ConnectionStatus::Open));
                    }
                    Ok(messages) => {
                        for message in cursor.take_new(messages) {
                            sink(ChatEvent::Inbound(Inbound::Message(message)));
                        }
                    }
                    Err(e) => log::warn!("chat poll failed: {}", e),
                }
                TimeoutFuture::new(interval_ms).await;
            }
            log::debug!("chat polling stopped");
        });

        Self { stopped }
    }
}

impl ChatTransport for PollingTransport {
    fn is_open(&self) -> bool {
        false
    }

    fn send(&self, _text: &str) -> Result<(), ChatError> {
        Err(ChatError::Send("polling transport is receive-only".to_string()))
    }

    fn close(&self) {
        self.stopped.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::at;
    use crate::models::Author;

    fn message(id: u32) -> ChatMessage {
        ChatMessage {
            id,
            author: Author {
                id: 1,
                username: "alice".to_string(),
            },
            text: format!("m{}", id),
            created: at(12),
        }
    }

    fn ids(messages: &[ChatMessage]) -> Vec<u32> {
        messages.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_cursor_emits_only_newer_ids() {
        let mut cursor = PollCursor::default();
        assert_eq!(ids(&cursor.take_new(vec![message(1), message(2)])), vec![1, 2]);
        assert!(cursor.take_new(vec![message(1), message(2)]).is_empty());
        assert_eq!(ids(&cursor.take_new(vec![message(1), message(2), message(3)])), vec![3]);
    }

    #[test]
    fn test_cursor_keeps_given_order() {
        let mut cursor = PollCursor::default();
        cursor.take_new(vec![message(1)]);
        assert_eq!(ids(&cursor.take_new(vec![message(5), message(4)])), vec![5, 4]);
        assert!(cursor.take_new(vec![message(4)]).is_empty());
    }
}

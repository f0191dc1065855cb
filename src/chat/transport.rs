//! Chat Transport Abstraction
//!
//! A transport delivers `ChatEvent`s for one room to an event sink and may
//! accept outbound frames. Socket and polling strategies implement it.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::wire::Inbound;
use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    /// Waiting before reconnect attempt `n` (1-based)
    Reconnecting(u32),
    Closed,
}

impl ConnectionStatus {
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Connecting => "connecting".to_string(),
            ConnectionStatus::Open => "live".to_string(),
            ConnectionStatus::Reconnecting(n) => format!("reconnecting ({})", n),
            ConnectionStatus::Closed => "offline".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Status(ConnectionStatus),
    Inbound(Inbound),
}

pub type EventSink = Rc<dyn Fn(ChatEvent)>;

pub trait ChatTransport {
    /// True when `send` would reach the server right now
    fn is_open(&self) -> bool;
    fn send(&self, text: &str) -> Result<(), ChatError>;
    /// Stop for good; no reconnect follows
    fn close(&self);
}

/// Exponential backoff for unexpected socket closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub base_ms: u32,
    pub max_ms: u32,
    /// 0 disables reconnecting
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_ms: 1000,
            max_ms: 30_000,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (0-based), or None to give up
    pub fn delay_ms(&self, attempt: u32) -> Option<u32> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt);
        Some(self.base_ms.saturating_mul(factor).min(self.max_ms))
    }
}

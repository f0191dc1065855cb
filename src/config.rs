//! Client Configuration
//!
//! Defaults are derived from the page location. A deployment can override
//! any field with a JSON block:
//!
//! ```html
//! <script id="kanban-config" type="application/json">
//!   {"chat_transport": "polling", "poll_interval_ms": 5000}
//! </script>
//! ```

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::ReconnectPolicy;

pub const CONFIG_ELEMENT_ID: &str = "kanban-config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Socket,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST prefix, e.g. `/api/`
    pub api_base: String,
    /// Socket prefix, e.g. `wss://host/`
    pub ws_base: String,
    pub chat_transport: TransportKind,
    pub poll_interval_ms: u32,
    pub reconnect: ReconnectPolicy,
    pub log_capacity: usize,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "/api/".to_string(),
            ws_base: "ws://localhost/".to_string(),
            chat_transport: TransportKind::Socket,
            poll_interval_ms: 3000,
            reconnect: ReconnectPolicy::default(),
            log_capacity: rolling_logger::DEFAULT_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults for a page served from `protocol//host`
    pub fn for_location(protocol: &str, host: &str) -> Self {
        let scheme = if protocol == "https:" { "wss:" } else { "ws:" };
        Self {
            ws_base: format!("{}//{}/", scheme, host),
            ..Default::default()
        }
    }

    /// Overlay a JSON object; nested objects merge field by field
    pub fn with_overrides(self, json: &str) -> Result<Self, serde_json::Error> {
        let overlay: Value = serde_json::from_str(json)?;
        let mut base = serde_json::to_value(&self)?;
        merge(&mut base, overlay);
        serde_json::from_value(base)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Read location and the optional config element of the current page
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let location = window.location();
        let config = match (location.protocol(), location.host()) {
            (Ok(protocol), Ok(host)) => Self::for_location(&protocol, &host),
            _ => Self::default(),
        };

        let overrides = window
            .document()
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        match overrides {
            Some(json) if !json.trim().is_empty() => match config.clone().with_overrides(&json) {
                Ok(merged) => merged,
                Err(e) => {
                    // Logger is not up yet
                    web_sys::console::warn_1(&format!("ignoring invalid #{}: {}", CONFIG_ELEMENT_ID, e).into());
                    config
                }
            },
            _ => config,
        }
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Board id from `/boards/{id}/` or a `board=` query parameter
pub fn board_id_from_url(path: &str, search: &str) -> Option<u32> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "boards" {
            if let Some(id) = segments.next().and_then(|s| s.parse().ok()) {
                return Some(id);
            }
        }
    }

    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "board")
        .and_then(|(_, value)| value.parse().ok())
}

pub fn current_board_id() -> Option<u32> {
    let location = web_sys::window()?.location();
    let path = location.pathname().ok()?;
    let search = location.search().unwrap_or_default();
    board_id_from_url(&path, &search)
}

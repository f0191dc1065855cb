//! WebSocket Transport
//!
//! Keeps one socket per room open and reconnects with backoff after an
//! unexpected close. `close()` is final.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::transport::{ChatEvent, ChatTransport, ConnectionStatus, EventSink, ReconnectPolicy};
use super::wire::Inbound;
use super::ChatRoom;
use crate::error::ChatError;

#[derive(Default)]
struct SocketState {
    socket: Option<WebSocket>,
    /// Failed reconnects since the last successful open
    attempt: u32,
    closed: bool,
}

/// Everything a (re)connect needs
#[derive(Clone)]
struct Session {
    url: Rc<str>,
    room: ChatRoom,
    policy: ReconnectPolicy,
    sink: EventSink,
    state: Rc<RefCell<SocketState>>,
}

pub struct SocketTransport {
    state: Rc<RefCell<SocketState>>,
}

impl SocketTransport {
    pub fn connect(url: String, room: ChatRoom, policy: ReconnectPolicy, sink: EventSink) -> Self {
        let state = Rc::new(RefCell::new(SocketState::default()));
        let session = Session {
            url: url.into(),
            room,
            policy,
            sink,
            state: state.clone(),
        };
        (session.sink)(ChatEvent::Status(ConnectionStatus::Connecting));
        open_socket(session);
        Self { state }
    }
}

impl ChatTransport for SocketTransport {
    fn is_open(&self) -> bool {
        let state = self.state.borrow();
        state
            .socket
            .as_ref()
            .map(|ws| ws.ready_state() == WebSocket::OPEN)
            .unwrap_or(false)
    }

    fn send(&self, text: &str) -> Result<(), ChatError> {
        let state = self.state.borrow();
        let ws = state
            .socket
            .as_ref()
            .ok_or_else(|| ChatError::Send("socket not connected".to_string()))?;
        ws.send_with_str(text).map_err(|e| ChatError::Send(format!("{:?}", e)))
    }

    fn close(&self) {
        let socket = {
            let mut state = self.state.borrow_mut();
            state.closed = true;
            state.socket.take()
        };
        if let Some(ws) = socket {
            let _ = ws.close();
        }
        log::info!("chat socket closed by client");
    }
}

fn open_socket(session: Session) {
    log::info!("Connecting to chat socket: {}", session.url);

    let ws = match WebSocket::new(&session.url) {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("Failed to create WebSocket: {:?}", e);
            schedule_reconnect(session);
            return;
        }
    };

    // On open
    let on_open_session = session.clone();
    let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log::info!("Chat socket connected");
        on_open_session.state.borrow_mut().attempt = 0;
        (on_open_session.sink)(ChatEvent::Status(ConnectionStatus::Open));
    }) as Box<dyn FnMut(_)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    // On message
    let on_message_session = session.clone();
    let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
        let Some(text) = e.data().as_string() else {
            log::warn!("ignoring non-text chat frame");
            return;
        };
        match on_message_session.room.parse_frame(&text) {
            Ok(Inbound::Ignored) => {}
            Ok(inbound) => (on_message_session.sink)(ChatEvent::Inbound(inbound)),
            Err(e) => log::warn!("{}", e),
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    // On close
    let on_close_session = session.clone();
    let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
        log::info!("Chat socket closed: code={}, reason={}", e.code(), e.reason());
        if on_close_session.state.borrow().closed {
            (on_close_session.sink)(ChatEvent::Status(ConnectionStatus::Closed));
            return;
        }
        schedule_reconnect(on_close_session.clone());
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    // On error
    let onerror = Closure::wrap(Box::new(move |e: web_sys::Event| {
        log::error!("Chat socket error: {}", e.type_());
    }) as Box<dyn FnMut(_)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    session.state.borrow_mut().socket = Some(ws);
}

fn schedule_reconnect(session: Session) {
    let attempt = {
        let mut state = session.state.borrow_mut();
        state.socket = None;
        state.attempt
    };

    let Some(delay_ms) = session.policy.delay_ms(attempt) else {
        log::warn!("Chat socket gave up after {} reconnect attempts", attempt);
        (session.sink)(ChatEvent::Status(ConnectionStatus::Closed));
        return;
    };

    session.state.borrow_mut().attempt = attempt + 1;
    (session.sink)(ChatEvent::Status(ConnectionStatus::Reconnecting(attempt + 1)));
    log::info!("Reconnecting chat in {}ms...", delay_ms);

    spawn_local(async move {
        TimeoutFuture::new(delay_ms).await;
        if session.state.borrow().closed {
            return;
        }
        open_socket(session);
    });
}

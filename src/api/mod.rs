//! REST Client
//!
//! Thin wrapper over `gloo-net` that sends the session cookie and the CSRF
//! token, and maps every failure into `ApiError`. Requests are organized by
//! domain in the submodules.

pub mod endpoints;
mod board;
mod chat;
mod session;

use std::sync::{Arc, Mutex};

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_sys::RequestCredentials;

use crate::error::ApiError;
use crate::models::{Column, Comment, Task};
use endpoints::{ApiCall, Method, ReplyKind};

pub use board::*;
pub use chat::*;
pub use session::*;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Decoded body of a mutation response
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Empty,
    /// Board replies only carry what changed on the board itself
    Board { title: String },
    Column(Column),
    Task(Task),
    Comment(Comment),
}

#[derive(Deserialize)]
struct TitleOnly {
    title: String,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    csrf: Arc<Mutex<Option<String>>>,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            csrf: Arc::new(Mutex::new(None)),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn set_csrf_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.csrf.lock() {
            *slot = token;
        }
    }

    /// Token fetched from `csrf/`, or the cookie when none was fetched yet
    pub fn csrf_token(&self) -> Option<String> {
        let cached = self.csrf.lock().ok().and_then(|slot| slot.clone());
        cached.or_else(csrf_from_document)
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        let builder = match method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Patch => Request::patch(&url),
            Method::Delete => Request::delete(&url),
        }
        .credentials(RequestCredentials::Include);

        match (method.is_mutating(), self.csrf_token()) {
            (true, Some(token)) => builder.header(CSRF_HEADER, &token),
            (true, None) => {
                log::warn!("no CSRF token for {:?} {}", method, path);
                builder
            }
            (false, _) => builder,
        }
    }

    async fn fetch(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response, ApiError> {
        let builder = self.builder(method, path);
        let request = match body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Request(e.to_string()))?;

        request.send().await.map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Send one request and return the raw body of a 2xx response
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String, ApiError> {
        let response = self.fetch(method, path, body).await?;
        read_body(&response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send(Method::Get, path, None).await?;
        decode(&text)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Request(e.to_string()))?;
        let text = self.send(Method::Post, path, Some(&body)).await?;
        decode(&text)
    }

    /// Perform a board mutation
    pub async fn execute(&self, call: &ApiCall) -> Result<Reply, ApiError> {
        let endpoint = call.endpoint();
        log::debug!("{:?} {}", endpoint.method, endpoint.path);
        let text = self.send(endpoint.method, &endpoint.path, endpoint.body.as_ref()).await?;
        decode_reply(call.reply_kind(), &text)
    }
}

async fn read_body(response: &Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
    if response.ok() {
        Ok(text)
    } else {
        Err(ApiError::Status {
            status,
            message: error_message(&text, &response.status_text()),
        })
    }
}

pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

pub fn decode_reply(kind: ReplyKind, text: &str) -> Result<Reply, ApiError> {
    Ok(match kind {
        ReplyKind::Empty => Reply::Empty,
        ReplyKind::Board => Reply::Board {
            title: decode::<TitleOnly>(text)?.title,
        },
        ReplyKind::Column => Reply::Column(decode(text)?),
        ReplyKind::Task => Reply::Task(decode(text)?),
        ReplyKind::Comment => Reply::Comment(decode(text)?),
    })
}

/// Human-readable message for a failed response: the `error` or `detail`
/// field when the body is JSON, otherwise the status text.
pub fn error_message(body: &str, status_text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["error", "detail", "message"] {
            if let Some(text) = value.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    if status_text.is_empty() {
        "request failed".to_string()
    } else {
        status_text.to_string()
    }
}

/// Extract the CSRF token from a `document.cookie` string
pub fn csrf_from_cookie(cookie: &str) -> Option<String> {
    cookie.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name != CSRF_COOKIE || value.is_empty() {
            return None;
        }
        percent_encoding::percent_decode_str(value)
            .decode_utf8()
            .ok()
            .map(|v| v.into_owned())
    })
}

fn csrf_from_document() -> Option<String> {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()?.document()?;
    let cookie = document.dyn_into::<web_sys::HtmlDocument>().ok()?.cookie().ok()?;
    csrf_from_cookie(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = ApiClient::new("/api");
        assert_eq!(client.url("boards/7/"), "/api/boards/7/");
        assert_eq!(client.url("/session/"), "/api/session/");
    }

    #[test]
    fn test_csrf_cookie_is_found_and_decoded() {
        let cookie = "sessionid=abc; csrftoken=a%2Bb%3Dc; theme=dark";
        assert_eq!(csrf_from_cookie(cookie), Some("a+b=c".to_string()));
        assert_eq!(csrf_from_cookie("sessionid=abc"), None);
        assert_eq!(csrf_from_cookie("csrftoken="), None);
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"error": "Title is required"}"#, "Bad Request"), "Title is required");
        assert_eq!(error_message(r#"{"detail": "Not found."}"#, "Not Found"), "Not found.");
        assert_eq!(error_message("<html>oops</html>", "Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message("", ""), "request failed");
    }

    #[test]
    fn test_decode_reply_by_kind() {
        assert_eq!(decode_reply(ReplyKind::Empty, "").unwrap(), Reply::Empty);
        assert_eq!(
            decode_reply(ReplyKind::Board, r#"{"id": 7, "title": "Renamed"}"#).unwrap(),
            Reply::Board { title: "Renamed".to_string() }
        );
        let task = decode_reply(ReplyKind::Task, r#"{"id": 3, "title": "New", "priority": "low"}"#).unwrap();
        assert!(matches!(task, Reply::Task(t) if t.id == 3 && t.comments.is_empty()));
        assert!(matches!(
            decode_reply(ReplyKind::Column, "not json"),
            Err(ApiError::Decode(_))
        ));
    }
}

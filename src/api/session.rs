//! Session Requests
//!
//! CSRF bootstrap, session lookup, login and logout.

use serde::Serialize;
use serde_json::Value;

use super::endpoints::{Method, CSRF_PATH, LOGIN_PATH, LOGOUT_PATH, SESSION_PATH};
use super::{read_body, ApiClient, CSRF_HEADER};
use crate::error::ApiError;
use crate::models::Session;

#[derive(Serialize)]
struct LoginArgs<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Ask the server for a CSRF token and remember it. The response header
    /// wins; the `csrftoken` cookie set by the same response is the fallback.
    pub async fn fetch_csrf(&self) -> Result<Option<String>, ApiError> {
        let response = self.fetch(Method::Get, CSRF_PATH, None).await?;
        let header = response.headers().get(CSRF_HEADER);
        read_body(&response).await?;

        if header.is_some() {
            self.set_csrf_token(header);
        }
        Ok(self.csrf_token())
    }

    pub async fn fetch_session(&self) -> Result<Session, ApiError> {
        self.get(SESSION_PATH).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let _: Value = self.post(LOGIN_PATH, &LoginArgs { username, password }).await?;
        log::info!("signed in as {}", username);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(Method::Get, LOGOUT_PATH, None).await?;
        self.set_csrf_token(None);
        log::info!("signed out");
        Ok(())
    }
}

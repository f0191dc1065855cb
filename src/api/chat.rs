//! Chat Requests
//!
//! REST side of the board chat and private dialogs. Used directly by the
//! polling transport and as the send fallback when no socket is open.

use serde::Serialize;

use super::endpoints::{
    board_chat_history_path, board_chat_send_path, dialog_messages_path, dialog_send_path, DIALOGS_PATH,
};
use super::ApiClient;
use crate::chat::wire::{HistoryPage, WireMessage};
use crate::error::ApiError;
use crate::models::{ChatMessage, Dialog};

#[derive(Serialize)]
struct TextArgs<'a> {
    text: &'a str,
}

impl ApiClient {
    /// Board chat history, oldest first
    pub async fn fetch_board_history(&self, board_id: u32) -> Result<Vec<ChatMessage>, ApiError> {
        let page: HistoryPage = self.get(&board_chat_history_path(board_id)).await?;
        Ok(page.into_chronological())
    }

    pub async fn send_board_message(&self, board_id: u32, text: &str) -> Result<ChatMessage, ApiError> {
        let created: WireMessage = self.post(&board_chat_send_path(board_id), &TextArgs { text }).await?;
        Ok(created.into_message())
    }

    pub async fn fetch_dialogs(&self) -> Result<Vec<Dialog>, ApiError> {
        self.get(DIALOGS_PATH).await
    }

    /// Dialog messages, oldest first
    pub async fn fetch_dialog_messages(&self, chat_id: u32) -> Result<Vec<ChatMessage>, ApiError> {
        let messages: Vec<WireMessage> = self.get(&dialog_messages_path(chat_id)).await?;
        Ok(messages.into_iter().map(WireMessage::into_message).collect())
    }

    pub async fn send_dialog_message(&self, chat_id: u32, text: &str) -> Result<ChatMessage, ApiError> {
        let created: WireMessage = self.post(&dialog_send_path(chat_id), &TextArgs { text }).await?;
        Ok(created.into_message())
    }
}

//! Board Requests
//!
//! Read-side queries; mutations go through `ApiClient::execute`.

use super::endpoints::{board_path, members_path, task_files_path};
use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Board, Member, TaskFile};

impl ApiClient {
    pub async fn fetch_board(&self, board_id: u32) -> Result<Board, ApiError> {
        self.get(&board_path(board_id)).await
    }

    pub async fn fetch_members(&self, board_id: u32) -> Result<Vec<Member>, ApiError> {
        self.get(&members_path(board_id)).await
    }

    pub async fn fetch_task_files(&self, task_id: u32) -> Result<Vec<TaskFile>, ApiError> {
        self.get(&task_files_path(task_id)).await
    }
}

//! Mutation Endpoints
//!
//! Every board mutation maps to exactly one `ApiCall`. The mapping to method,
//! path and JSON body is pure so it can be checked without a browser.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::models::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

/// What the server sends back for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Empty,
    Board,
    Column,
    Task,
    Comment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: Method,
    /// Relative to the API base
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    RenameBoard { board_id: u32, title: String },
    RemoveMember { board_id: u32, user_id: u32 },

    CreateColumn { board_id: u32, title: String },
    DeleteColumn { column_id: u32 },
    RenameColumn { column_id: u32, title: String },
    MoveColumn { column_id: u32, position: usize },

    CreateTask { column_id: u32, title: String },
    DeleteTask { task_id: u32 },
    /// `position` is the 0-based index in the destination column
    MoveTask { task_id: u32, column_id: u32, position: usize },
    RenameTask { task_id: u32, title: String },
    SetPriority { task_id: u32, priority: Priority },
    SetDeadline { task_id: u32, deadline: Option<DateTime<Utc>> },
    SetDescription { task_id: u32, description: String },

    AddComment { task_id: u32, text: String },
    DeleteComment { comment_id: u32 },

    DeleteFile { file_id: u32 },
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        use ApiCall::*;

        let (method, path, body) = match self {
            RenameBoard { board_id, title } => {
                (Method::Patch, format!("boards/{}/rename/", board_id), Some(json!({ "title": title })))
            }
            RemoveMember { board_id, user_id } => (
                Method::Post,
                format!("boards/{}/remove-member/", board_id),
                Some(json!({ "user_id": user_id })),
            ),
            CreateColumn { board_id, title } => {
                (Method::Post, format!("boards/{}/columns/", board_id), Some(json!({ "title": title })))
            }
            DeleteColumn { column_id } => (Method::Delete, format!("columns/{}/", column_id), None),
            RenameColumn { column_id, title } => {
                (Method::Patch, format!("columns/{}/rename/", column_id), Some(json!({ "title": title })))
            }
            MoveColumn { column_id, position } => (
                Method::Patch,
                format!("columns/{}/move/", column_id),
                Some(json!({ "position": position })),
            ),
            CreateTask { column_id, title } => {
                (Method::Post, format!("columns/{}/tasks/", column_id), Some(json!({ "title": title })))
            }
            DeleteTask { task_id } => (Method::Delete, format!("tasks/{}/", task_id), None),
            MoveTask { task_id, column_id, position } => (
                Method::Patch,
                format!("tasks/{}/move/", task_id),
                Some(json!({ "column": column_id, "position": position })),
            ),
            RenameTask { task_id, title } => {
                (Method::Patch, format!("tasks/{}/rename/", task_id), Some(json!({ "title": title })))
            }
            SetPriority { task_id, priority } => (
                Method::Patch,
                format!("tasks/{}/priority/", task_id),
                Some(json!({ "priority": priority.as_str() })),
            ),
            SetDeadline { task_id, deadline } => (
                Method::Patch,
                format!("tasks/{}/deadline/", task_id),
                Some(json!({
                    "deadline": deadline.map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
                })),
            ),
            SetDescription { task_id, description } => (
                Method::Patch,
                format!("tasks/{}/description/", task_id),
                Some(json!({ "description": description })),
            ),
            AddComment { task_id, text } => {
                (Method::Post, format!("tasks/{}/comments/", task_id), Some(json!({ "text": text })))
            }
            DeleteComment { comment_id } => (Method::Delete, format!("comments/{}/delete/", comment_id), None),
            DeleteFile { file_id } => (Method::Delete, format!("files/{}/", file_id), None),
        };

        Endpoint { method, path, body }
    }

    pub fn reply_kind(&self) -> ReplyKind {
        use ApiCall::*;

        match self {
            RenameBoard { .. } => ReplyKind::Board,
            CreateColumn { .. } | RenameColumn { .. } => ReplyKind::Column,
            CreateTask { .. }
            | MoveTask { .. }
            | RenameTask { .. }
            | SetPriority { .. }
            | SetDeadline { .. }
            | SetDescription { .. } => ReplyKind::Task,
            AddComment { .. } => ReplyKind::Comment,
            RemoveMember { .. }
            | DeleteColumn { .. }
            | MoveColumn { .. }
            | DeleteTask { .. }
            | DeleteComment { .. }
            | DeleteFile { .. } => ReplyKind::Empty,
        }
    }
}

// ========================
// Query Paths
// ========================

pub fn board_path(board_id: u32) -> String {
    format!("boards/{}/", board_id)
}

pub fn members_path(board_id: u32) -> String {
    format!("boards/{}/members/", board_id)
}

pub fn task_files_path(task_id: u32) -> String {
    format!("tasks/{}/files/", task_id)
}

pub fn board_chat_history_path(board_id: u32) -> String {
    format!("chat/boards/{}/history/", board_id)
}

pub fn board_chat_send_path(board_id: u32) -> String {
    format!("chat/boards/{}/send/", board_id)
}

pub fn dialog_messages_path(chat_id: u32) -> String {
    format!("chat/dialog/{}/messages/", chat_id)
}

pub fn dialog_send_path(chat_id: u32) -> String {
    format!("chat/dialog/{}/send/", chat_id)
}

pub const DIALOGS_PATH: &str = "chat/my-dialogs/";
pub const SESSION_PATH: &str = "session/";
pub const CSRF_PATH: &str = "csrf/";
pub const LOGIN_PATH: &str = "login/";
pub const LOGOUT_PATH: &str = "logout/";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::at;

    #[test]
    fn test_task_move_body_is_zero_based() {
        let endpoint = ApiCall::MoveTask { task_id: 1, column_id: 20, position: 0 }.endpoint();
        assert_eq!(endpoint.method, Method::Patch);
        assert_eq!(endpoint.path, "tasks/1/move/");
        assert_eq!(endpoint.body, Some(json!({ "column": 20, "position": 0 })));
    }

    #[test]
    fn test_column_move_and_rename() {
        let moved = ApiCall::MoveColumn { column_id: 3, position: 2 }.endpoint();
        assert_eq!(moved.path, "columns/3/move/");
        assert_eq!(moved.body, Some(json!({ "position": 2 })));

        let renamed = ApiCall::RenameColumn { column_id: 3, title: "Doing".to_string() }.endpoint();
        assert_eq!(renamed.path, "columns/3/rename/");
        assert_eq!(renamed.body, Some(json!({ "title": "Doing" })));
    }

    #[test]
    fn test_deletes_have_no_body() {
        for call in [
            ApiCall::DeleteColumn { column_id: 1 },
            ApiCall::DeleteTask { task_id: 1 },
            ApiCall::DeleteComment { comment_id: 1 },
            ApiCall::DeleteFile { file_id: 1 },
        ] {
            let endpoint = call.endpoint();
            assert_eq!(endpoint.method, Method::Delete);
            assert!(endpoint.body.is_none());
            assert_eq!(call.reply_kind(), ReplyKind::Empty);
        }
        assert_eq!(ApiCall::DeleteComment { comment_id: 9 }.endpoint().path, "comments/9/delete/");
    }

    #[test]
    fn test_deadline_serializes_iso_or_null() {
        let set = ApiCall::SetDeadline { task_id: 4, deadline: Some(at(18)) }.endpoint();
        assert_eq!(set.body, Some(json!({ "deadline": "2024-03-01T18:00:00.000Z" })));

        let cleared = ApiCall::SetDeadline { task_id: 4, deadline: None }.endpoint();
        assert_eq!(cleared.body, Some(json!({ "deadline": null })));
    }

    #[test]
    fn test_priority_and_member_bodies() {
        let priority = ApiCall::SetPriority { task_id: 2, priority: Priority::Maximal }.endpoint();
        assert_eq!(priority.body, Some(json!({ "priority": "maximal" })));

        let removal = ApiCall::RemoveMember { board_id: 7, user_id: 3 }.endpoint();
        assert_eq!(removal.method, Method::Post);
        assert_eq!(removal.path, "boards/7/remove-member/");
        assert_eq!(removal.body, Some(json!({ "user_id": 3 })));
    }
}

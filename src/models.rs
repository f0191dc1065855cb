//! Frontend Models
//!
//! Data structures matching backend REST resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User reference as embedded in boards and member lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Board with its nested columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u32,
    pub title: String,
    pub created: DateTime<Utc>,
    pub owner: User,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Board {
    pub fn column(&self, column_id: u32) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: u32) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: u32) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Column currently holding the task
    pub fn column_of_task(&self, task_id: u32) -> Option<u32> {
        self.columns
            .iter()
            .find(|c| c.tasks.iter().any(|t| t.id == task_id))
            .map(|c| c.id)
    }

    pub fn task(&self, task_id: u32) -> Option<&Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter()).find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: u32) -> Option<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }
}

/// Ordered bucket of tasks; position is the index in `Board::columns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn task_index(&self, task_id: u32) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Average,
    High,
    Maximal,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Average, Priority::High, Priority::Maximal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Average => "average",
            Priority::High => "high",
            Priority::Maximal => "maximal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Average => "Average",
            Priority::High => "High",
            Priority::Maximal => "Maximal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    /// Rich text, stored as HTML
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Creator user id
    #[serde(default)]
    pub creator: Option<u32>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Responsible user ids
    #[serde(default)]
    pub responsible: Vec<u32>,
    #[serde(default)]
    pub files: Vec<TaskFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u32,
    pub text: String,
    /// Author user id
    pub user: u32,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    pub id: u32,
    #[serde(alias = "file_name")]
    pub name: String,
    #[serde(alias = "file_url")]
    pub url: String,
    #[serde(default)]
    pub uploaded_by: Option<User>,
    pub uploaded_at: DateTime<Utc>,
}

/// Board-scoped role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    #[serde(alias = "member")]
    Editor,
    Viewer,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

/// A user plus their role on one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "id")]
    pub user_id: u32,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Chat author as delivered by the socket and REST variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u32,
    pub author: Author,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// One private dialog as listed by `chat/my-dialogs/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialog {
    pub id: u32,
    pub other_user: Author,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub unread_count: u32,
}

/// Response of `GET session/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
}

impl Session {
    /// The signed-in user, if any
    pub fn user(&self) -> Option<User> {
        match (self.is_authenticated, self.user_id, &self.username) {
            (true, Some(id), Some(name)) => Some(User {
                id,
                username: name.clone(),
                avatar: None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    pub fn user(id: u32, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            avatar: None,
        }
    }

    pub fn task(id: u32, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Low,
            deadline: None,
            creator: Some(1),
            comments: Vec::new(),
            responsible: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn column(id: u32, title: &str, tasks: Vec<Task>) -> Column {
        Column {
            id,
            title: title.to_string(),
            tasks,
        }
    }

    /// Board 7 owned by user 1: Todo(10) = [T1, T2], Done(20) = []
    pub fn todo_done_board() -> Board {
        Board {
            id: 7,
            title: "Sprint".to_string(),
            created: at(8),
            owner: user(1, "alice"),
            columns: vec![
                column(10, "Todo", vec![task(1, "T1"), task(2, "T2")]),
                column(20, "Done", Vec::new()),
            ],
        }
    }

    pub fn comment(id: u32, text: &str, author: u32) -> Comment {
        Comment {
            id,
            text: text.to_string(),
            user: author,
            created: at(9),
        }
    }

    pub fn member(user_id: u32, name: &str, role: Role) -> Member {
        Member {
            user_id,
            username: name.to_string(),
            role,
            avatar: None,
        }
    }
}

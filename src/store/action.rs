//! Board Actions
//!
//! Typed state transitions for the board reducer.

use chrono::{DateTime, Utc};

use crate::models::{Board, Column, Comment, Member, Priority, Task, TaskFile};

/// Single-field task edits
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPatch {
    Priority(Priority),
    Deadline(Option<DateTime<Utc>>),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    /// Replace the cached board (navigation or refresh)
    LoadBoard(Board),
    SetMembers(Vec<Member>),
    RenameBoard { title: String },

    AddColumn(Column),
    InsertColumn { column: Column, index: usize },
    RemoveColumn { column_id: u32 },
    RenameColumn { column_id: u32, title: String },
    MoveColumn { column_id: u32, index: usize },

    AddTask { column_id: u32, task: Task },
    InsertTask { column_id: u32, task: Task, index: usize },
    RemoveTask { column_id: u32, task_id: u32 },
    ReplaceTask { column_id: u32, task: Task },
    RenameTask { task_id: u32, title: String },
    UpdateTask { task_id: u32, patch: TaskPatch },
    MoveTask { task_id: u32, from: u32, to: u32, index: usize },

    AddComment { task_id: u32, comment: Comment },
    InsertComment { task_id: u32, comment: Comment, index: usize },
    RemoveComment { task_id: u32, comment_id: u32 },

    SetFiles { task_id: u32, files: Vec<TaskFile> },
    InsertFile { task_id: u32, file: TaskFile, index: usize },
    RemoveFile { task_id: u32, file_id: u32 },

    InsertMember { member: Member, index: usize },
    RemoveMember { user_id: u32 },
}

/// Why a transition left the state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoChange {
    NoBoard,
    UnknownColumn,
    UnknownTask,
    UnknownComment,
    UnknownFile,
    UnknownMember,
    AlreadyPresent,
    BlankTitle,
    SameValue,
    SameIndex,
}

/// Result of `reduce`
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed; `inverse` undoes it when the transition is reversible
    Changed { inverse: Option<BoardAction> },
    Unchanged(NoChange),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Changed { .. })
    }

    pub fn inverse(self) -> Option<BoardAction> {
        match self {
            Outcome::Changed { inverse } => inverse,
            Outcome::Unchanged(_) => None,
        }
    }
}

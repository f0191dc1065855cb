//! Board Reducer
//!
//! Pure transition function over the cached board subtree. Used for both
//! optimistic edits and server-confirmed updates; never touches the network.

use super::action::{BoardAction, NoChange, Outcome, TaskPatch};
use crate::models::{Board, Member, Task};

/// Everything cached for the board currently on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub board: Option<Board>,
    pub members: Vec<Member>,
}

impl BoardState {
    pub fn board_id(&self) -> Option<u32> {
        self.board.as_ref().map(|b| b.id)
    }

    /// Display name for a user id, from the member list or the board owner
    pub fn display_name(&self, user_id: u32) -> String {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.username.clone())
            .or_else(|| {
                self.board
                    .as_ref()
                    .filter(|b| b.owner.id == user_id)
                    .map(|b| b.owner.username.clone())
            })
            .unwrap_or_else(|| format!("user #{}", user_id))
    }
}

pub fn reduce(state: &mut BoardState, action: &BoardAction) -> Outcome {
    match apply(state, action) {
        Ok(inverse) => Outcome::Changed { inverse },
        Err(reason) => Outcome::Unchanged(reason),
    }
}

fn board_mut(state: &mut BoardState) -> Result<&mut Board, NoChange> {
    state.board.as_mut().ok_or(NoChange::NoBoard)
}

fn clean_title(title: &str) -> Result<String, NoChange> {
    let title = title.trim();
    if title.is_empty() {
        Err(NoChange::BlankTitle)
    } else {
        Ok(title.to_string())
    }
}

fn task_mut(state: &mut BoardState, task_id: u32) -> Result<&mut Task, NoChange> {
    board_mut(state)?.task_mut(task_id).ok_or(NoChange::UnknownTask)
}

fn apply(state: &mut BoardState, action: &BoardAction) -> Result<Option<BoardAction>, NoChange> {
    use BoardAction::*;

    let inverse = match action {
        LoadBoard(board) => {
            if state.board_id() != Some(board.id) {
                state.members.clear();
            }
            state.board = Some(board.clone());
            return Ok(None);
        }
        SetMembers(members) => {
            if state.members == *members {
                return Err(NoChange::SameValue);
            }
            SetMembers(std::mem::replace(&mut state.members, members.clone()))
        }
        InsertMember { member, index } => {
            if state.members.iter().any(|m| m.user_id == member.user_id) {
                return Err(NoChange::AlreadyPresent);
            }
            let index = (*index).min(state.members.len());
            state.members.insert(index, member.clone());
            RemoveMember { user_id: member.user_id }
        }
        RemoveMember { user_id } => {
            let index = state
                .members
                .iter()
                .position(|m| m.user_id == *user_id)
                .ok_or(NoChange::UnknownMember)?;
            let member = state.members.remove(index);
            InsertMember { member, index }
        }

        RenameBoard { title } => {
            let title = clean_title(title)?;
            let board = board_mut(state)?;
            if board.title == title {
                return Err(NoChange::SameValue);
            }
            RenameBoard { title: std::mem::replace(&mut board.title, title) }
        }

        AddColumn(column) => {
            let board = board_mut(state)?;
            if board.column(column.id).is_some() {
                return Err(NoChange::AlreadyPresent);
            }
            board.columns.push(column.clone());
            RemoveColumn { column_id: column.id }
        }
        InsertColumn { column, index } => {
            let board = board_mut(state)?;
            if board.column(column.id).is_some() {
                return Err(NoChange::AlreadyPresent);
            }
            let index = (*index).min(board.columns.len());
            board.columns.insert(index, column.clone());
            RemoveColumn { column_id: column.id }
        }
        RemoveColumn { column_id } => {
            let board = board_mut(state)?;
            let index = board.column_index(*column_id).ok_or(NoChange::UnknownColumn)?;
            let column = board.columns.remove(index);
            InsertColumn { column, index }
        }
        RenameColumn { column_id, title } => {
            let title = clean_title(title)?;
            let column = board_mut(state)?.column_mut(*column_id).ok_or(NoChange::UnknownColumn)?;
            if column.title == title {
                return Err(NoChange::SameValue);
            }
            RenameColumn {
                column_id: *column_id,
                title: std::mem::replace(&mut column.title, title),
            }
        }
        MoveColumn { column_id, index } => {
            let board = board_mut(state)?;
            let old = board.column_index(*column_id).ok_or(NoChange::UnknownColumn)?;
            let new = (*index).min(board.columns.len() - 1);
            if old == new {
                return Err(NoChange::SameIndex);
            }
            let column = board.columns.remove(old);
            board.columns.insert(new, column);
            MoveColumn { column_id: *column_id, index: old }
        }

        AddTask { column_id, task } => {
            let board = board_mut(state)?;
            if board.task(task.id).is_some() {
                return Err(NoChange::AlreadyPresent);
            }
            let column = board.column_mut(*column_id).ok_or(NoChange::UnknownColumn)?;
            column.tasks.push(task.clone());
            RemoveTask { column_id: *column_id, task_id: task.id }
        }
        InsertTask { column_id, task, index } => {
            let board = board_mut(state)?;
            if board.task(task.id).is_some() {
                return Err(NoChange::AlreadyPresent);
            }
            let column = board.column_mut(*column_id).ok_or(NoChange::UnknownColumn)?;
            let index = (*index).min(column.tasks.len());
            column.tasks.insert(index, task.clone());
            RemoveTask { column_id: *column_id, task_id: task.id }
        }
        RemoveTask { column_id, task_id } => {
            let column = board_mut(state)?.column_mut(*column_id).ok_or(NoChange::UnknownColumn)?;
            let index = column.task_index(*task_id).ok_or(NoChange::UnknownTask)?;
            let task = column.tasks.remove(index);
            InsertTask { column_id: *column_id, task, index }
        }
        ReplaceTask { column_id, task } => {
            let column = board_mut(state)?.column_mut(*column_id).ok_or(NoChange::UnknownColumn)?;
            let slot = column
                .tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .ok_or(NoChange::UnknownTask)?;
            if *slot == *task {
                return Err(NoChange::SameValue);
            }
            ReplaceTask {
                column_id: *column_id,
                task: std::mem::replace(slot, task.clone()),
            }
        }
        RenameTask { task_id, title } => {
            let title = clean_title(title)?;
            let task = task_mut(state, *task_id)?;
            if task.title == title {
                return Err(NoChange::SameValue);
            }
            RenameTask {
                task_id: *task_id,
                title: std::mem::replace(&mut task.title, title),
            }
        }
        UpdateTask { task_id, patch } => {
            let task = task_mut(state, *task_id)?;
            UpdateTask {
                task_id: *task_id,
                patch: apply_patch(task, patch)?,
            }
        }
        MoveTask { task_id, from, to, index } => {
            let board = board_mut(state)?;
            let from_idx = board.column_index(*from).ok_or(NoChange::UnknownColumn)?;
            let to_idx = board.column_index(*to).ok_or(NoChange::UnknownColumn)?;
            let old = board.columns[from_idx].task_index(*task_id).ok_or(NoChange::UnknownTask)?;

            if from_idx == to_idx {
                let tasks = &mut board.columns[from_idx].tasks;
                let new = (*index).min(tasks.len() - 1);
                if new == old {
                    return Err(NoChange::SameIndex);
                }
                let task = tasks.remove(old);
                tasks.insert(new, task);
            } else {
                let task = board.columns[from_idx].tasks.remove(old);
                let dest = &mut board.columns[to_idx].tasks;
                let new = (*index).min(dest.len());
                dest.insert(new, task);
            }
            MoveTask { task_id: *task_id, from: *to, to: *from, index: old }
        }

        AddComment { task_id, comment } => {
            let task = task_mut(state, *task_id)?;
            if task.comments.iter().any(|c| c.id == comment.id) {
                return Err(NoChange::AlreadyPresent);
            }
            task.comments.push(comment.clone());
            RemoveComment { task_id: *task_id, comment_id: comment.id }
        }
        InsertComment { task_id, comment, index } => {
            let task = task_mut(state, *task_id)?;
            if task.comments.iter().any(|c| c.id == comment.id) {
                return Err(NoChange::AlreadyPresent);
            }
            let index = (*index).min(task.comments.len());
            task.comments.insert(index, comment.clone());
            RemoveComment { task_id: *task_id, comment_id: comment.id }
        }
        RemoveComment { task_id, comment_id } => {
            let task = task_mut(state, *task_id)?;
            let index = task
                .comments
                .iter()
                .position(|c| c.id == *comment_id)
                .ok_or(NoChange::UnknownComment)?;
            let comment = task.comments.remove(index);
            InsertComment { task_id: *task_id, comment, index }
        }

        SetFiles { task_id, files } => {
            let task = task_mut(state, *task_id)?;
            if task.files == *files {
                return Err(NoChange::SameValue);
            }
            SetFiles {
                task_id: *task_id,
                files: std::mem::replace(&mut task.files, files.clone()),
            }
        }
        InsertFile { task_id, file, index } => {
            let task = task_mut(state, *task_id)?;
            if task.files.iter().any(|f| f.id == file.id) {
                return Err(NoChange::AlreadyPresent);
            }
            let index = (*index).min(task.files.len());
            task.files.insert(index, file.clone());
            RemoveFile { task_id: *task_id, file_id: file.id }
        }
        RemoveFile { task_id, file_id } => {
            let task = task_mut(state, *task_id)?;
            let index = task
                .files
                .iter()
                .position(|f| f.id == *file_id)
                .ok_or(NoChange::UnknownFile)?;
            let file = task.files.remove(index);
            InsertFile { task_id: *task_id, file, index }
        }
    };
    Ok(Some(inverse))
}

/// Apply a single-field edit, returning the patch that restores the old value
fn apply_patch(task: &mut Task, patch: &TaskPatch) -> Result<TaskPatch, NoChange> {
    let old = match patch {
        TaskPatch::Priority(priority) => {
            if task.priority == *priority {
                return Err(NoChange::SameValue);
            }
            TaskPatch::Priority(std::mem::replace(&mut task.priority, *priority))
        }
        TaskPatch::Deadline(deadline) => {
            if task.deadline == *deadline {
                return Err(NoChange::SameValue);
            }
            TaskPatch::Deadline(std::mem::replace(&mut task.deadline, *deadline))
        }
        TaskPatch::Description(html) => {
            if task.description == *html {
                return Err(NoChange::SameValue);
            }
            TaskPatch::Description(std::mem::replace(&mut task.description, html.clone()))
        }
    };
    Ok(old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::{Priority, Role};

    fn loaded() -> BoardState {
        BoardState {
            board: Some(todo_done_board()),
            members: vec![member(2, "bob", Role::Editor)],
        }
    }

    fn task_ids(state: &BoardState, column_id: u32) -> Vec<u32> {
        state
            .board
            .as_ref()
            .and_then(|b| b.column(column_id))
            .map(|c| c.tasks.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_display_name_falls_back_to_owner_then_id() {
        let state = loaded();
        let owner = state.board.as_ref().unwrap().owner.clone();
        assert_eq!(state.display_name(2), "bob");
        assert_eq!(state.display_name(owner.id), owner.username);
        assert_eq!(state.display_name(42), "user #42");
    }

    #[test]
    fn test_move_task_across_columns() {
        let mut state = loaded();
        let outcome = reduce(&mut state, &BoardAction::MoveTask { task_id: 1, from: 10, to: 20, index: 0 });
        assert!(outcome.changed());
        assert_eq!(task_ids(&state, 10), vec![2]);
        assert_eq!(task_ids(&state, 20), vec![1]);
    }

    #[test]
    fn test_add_remove_keeps_survivor_order() {
        let mut state = loaded();
        for id in [3, 4, 5] {
            reduce(&mut state, &BoardAction::AddTask { column_id: 10, task: task(id, "x") });
        }
        reduce(&mut state, &BoardAction::RemoveTask { column_id: 10, task_id: 2 });
        reduce(&mut state, &BoardAction::RemoveTask { column_id: 10, task_id: 4 });
        assert_eq!(task_ids(&state, 10), vec![1, 3, 5]);
    }

    #[test]
    fn test_move_round_trip_restores_membership() {
        let mut state = loaded();
        reduce(&mut state, &BoardAction::MoveTask { task_id: 2, from: 10, to: 20, index: 0 });
        reduce(&mut state, &BoardAction::MoveTask { task_id: 2, from: 20, to: 10, index: 0 });
        assert_eq!(task_ids(&state, 10), vec![2, 1]);
        assert!(task_ids(&state, 20).is_empty());
    }

    #[test]
    fn test_move_to_unknown_column_keeps_task() {
        let mut state = loaded();
        let outcome = reduce(&mut state, &BoardAction::MoveTask { task_id: 1, from: 10, to: 99, index: 0 });
        assert_eq!(outcome, Outcome::Unchanged(NoChange::UnknownColumn));
        assert_eq!(task_ids(&state, 10), vec![1, 2]);
    }

    #[test]
    fn test_same_index_reorder_is_noop() {
        let mut state = loaded();
        let before = state.clone();
        let outcome = reduce(&mut state, &BoardAction::MoveTask { task_id: 2, from: 10, to: 10, index: 1 });
        assert_eq!(outcome, Outcome::Unchanged(NoChange::SameIndex));
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_index_is_clamped() {
        let mut state = loaded();
        reduce(&mut state, &BoardAction::MoveTask { task_id: 1, from: 10, to: 10, index: 42 });
        assert_eq!(task_ids(&state, 10), vec![2, 1]);
    }

    #[test]
    fn test_blank_rename_is_noop() {
        let mut state = loaded();
        for action in [
            BoardAction::RenameTask { task_id: 1, title: "   ".to_string() },
            BoardAction::RenameColumn { column_id: 10, title: String::new() },
            BoardAction::RenameBoard { title: "\t".to_string() },
        ] {
            assert_eq!(reduce(&mut state, &action), Outcome::Unchanged(NoChange::BlankTitle));
        }
        assert_eq!(state, loaded());
    }

    #[test]
    fn test_add_column_without_board_is_silent() {
        let mut state = BoardState::default();
        let outcome = reduce(&mut state, &BoardAction::AddColumn(column(30, "Later", Vec::new())));
        assert_eq!(outcome, Outcome::Unchanged(NoChange::NoBoard));
        assert!(state.board.is_none());
    }

    #[test]
    fn test_remove_column_drops_its_tasks() {
        let mut state = loaded();
        reduce(&mut state, &BoardAction::RemoveColumn { column_id: 10 });
        let board = state.board.as_ref().unwrap();
        assert_eq!(board.columns.len(), 1);
        assert!(board.task(1).is_none());
    }

    #[test]
    fn test_add_comment_appends_once() {
        let mut state = loaded();
        let before = state.board.as_ref().unwrap().task(1).unwrap().comments.len();
        let comment = comment(5, "ok", 2);
        reduce(&mut state, &BoardAction::AddComment { task_id: 1, comment: comment.clone() });
        let again = reduce(&mut state, &BoardAction::AddComment { task_id: 1, comment });
        assert_eq!(again, Outcome::Unchanged(NoChange::AlreadyPresent));
        let comments = &state.board.as_ref().unwrap().task(1).unwrap().comments;
        assert_eq!(comments.len(), before + 1);
        assert_eq!(comments.last().map(|c| c.user), Some(2));
    }

    #[test]
    fn test_inverse_restores_previous_state() {
        let actions = vec![
            BoardAction::RenameBoard { title: "Renamed".to_string() },
            BoardAction::RemoveColumn { column_id: 10 },
            BoardAction::RenameColumn { column_id: 20, title: "Shipped".to_string() },
            BoardAction::MoveColumn { column_id: 20, index: 0 },
            BoardAction::RemoveTask { column_id: 10, task_id: 1 },
            BoardAction::RenameTask { task_id: 2, title: "Second".to_string() },
            BoardAction::UpdateTask { task_id: 1, patch: TaskPatch::Priority(Priority::High) },
            BoardAction::UpdateTask { task_id: 1, patch: TaskPatch::Deadline(Some(at(18))) },
            BoardAction::MoveTask { task_id: 2, from: 10, to: 20, index: 0 },
            BoardAction::MoveTask { task_id: 2, from: 10, to: 10, index: 0 },
            BoardAction::RemoveMember { user_id: 2 },
        ];
        for action in actions {
            let mut state = loaded();
            let inverse = reduce(&mut state, &action).inverse();
            let inverse = inverse.unwrap_or_else(|| panic!("no inverse for {:?}", action));
            assert_ne!(state, loaded(), "{:?} changed nothing", action);
            reduce(&mut state, &inverse);
            assert_eq!(state, loaded(), "inverse of {:?} did not restore", action);
        }
    }

    #[test]
    fn test_replace_task_overwrites() {
        let mut state = loaded();
        let mut updated = task(1, "T1 (server)");
        updated.priority = Priority::Maximal;
        reduce(&mut state, &BoardAction::ReplaceTask { column_id: 10, task: updated.clone() });
        assert_eq!(state.board.as_ref().unwrap().task(1), Some(&updated));
    }

    #[test]
    fn test_load_other_board_clears_members() {
        let mut state = loaded();
        let mut other = todo_done_board();
        other.id = 8;
        reduce(&mut state, &BoardAction::LoadBoard(other));
        assert!(state.members.is_empty());
        assert_eq!(state.board_id(), Some(8));
    }
}

//! Intent Planner
//!
//! A user intent is validated against the cached board, checked by
//! `authorize`, and turned into a `Plan`: the optimistic action to apply now
//! (if any) and the API call that persists it. Creations have no optimistic
//! part because only the server assigns ids.

use chrono::{DateTime, Utc};

use crate::api::endpoints::ApiCall;
use crate::api::Reply;
use crate::authz::{authorize, AccessContext, DenyReason, Permission};
use crate::error::{ApiError, Rejection};
use crate::models::{Board, Priority, Task, User};
use crate::store::{reduce, BoardAction, BoardState, EntityKey, PendingLedger, TaskPatch, Ticket};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardIntent {
    RenameBoard { title: String },
    RemoveMember { user_id: u32 },

    CreateColumn { title: String },
    DeleteColumn { column_id: u32 },
    RenameColumn { column_id: u32, title: String },
    MoveColumn { column_id: u32, index: usize },

    CreateTask { column_id: u32, title: String },
    DeleteTask { task_id: u32 },
    MoveTask { task_id: u32, to: u32, index: usize },
    RenameTask { task_id: u32, title: String },
    SetPriority { task_id: u32, priority: Priority },
    SetDeadline { task_id: u32, deadline: Option<DateTime<Utc>> },
    SetDescription { task_id: u32, description: String },

    AddComment { task_id: u32, text: String },
    DeleteComment { task_id: u32, comment_id: u32 },

    DeleteFile { task_id: u32, file_id: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub optimistic: Option<(EntityKey, BoardAction)>,
    pub call: ApiCall,
}

impl Plan {
    fn optimistic(key: EntityKey, action: BoardAction, call: ApiCall) -> Self {
        Self {
            optimistic: Some((key, action)),
            call,
        }
    }

    fn server_only(call: ApiCall) -> Self {
        Self { optimistic: None, call }
    }
}

fn clean(title: &str) -> Result<String, Rejection> {
    let title = title.trim();
    if title.is_empty() {
        Err(Rejection::EmptyTitle)
    } else {
        Ok(title.to_string())
    }
}

fn find_task(board: &Board, task_id: u32) -> Result<(u32, &Task), Rejection> {
    let column_id = board.column_of_task(task_id).ok_or(Rejection::NotFound("task"))?;
    let task = board.task(task_id).ok_or(Rejection::NotFound("task"))?;
    Ok((column_id, task))
}

fn unchanged_if(same: bool) -> Result<(), Rejection> {
    if same {
        Err(Rejection::NoChange)
    } else {
        Ok(())
    }
}

pub fn plan(state: &BoardState, user: Option<&User>, intent: &BoardIntent) -> Result<Plan, Rejection> {
    use BoardIntent::*;

    let board = state.board.as_ref().ok_or(Rejection::NoBoard)?;
    let ctx = AccessContext {
        user,
        owner_id: board.owner.id,
        members: &state.members,
    };
    let check = |permission: Permission| {
        authorize(&ctx, permission).into_result().map_err(|reason| match reason {
            DenyReason::Anonymous => Rejection::Anonymous,
            other => Rejection::Denied(other),
        })
    };

    let plan = match intent {
        RenameBoard { title } => {
            let title = clean(title)?;
            unchanged_if(board.title == title)?;
            check(Permission::RenameBoard)?;
            Plan::optimistic(
                EntityKey::Board,
                BoardAction::RenameBoard { title: title.clone() },
                ApiCall::RenameBoard { board_id: board.id, title },
            )
        }
        RemoveMember { user_id } => {
            if !state.members.iter().any(|m| m.user_id == *user_id) {
                return Err(Rejection::NotFound("member"));
            }
            check(Permission::RemoveMember { user_id: *user_id })?;
            Plan::optimistic(
                EntityKey::Member(*user_id),
                BoardAction::RemoveMember { user_id: *user_id },
                ApiCall::RemoveMember { board_id: board.id, user_id: *user_id },
            )
        }

        CreateColumn { title } => {
            let title = clean(title)?;
            check(Permission::EditColumns)?;
            Plan::server_only(ApiCall::CreateColumn { board_id: board.id, title })
        }
        DeleteColumn { column_id } => {
            board.column(*column_id).ok_or(Rejection::NotFound("column"))?;
            check(Permission::DeleteColumn)?;
            Plan::optimistic(
                EntityKey::Column(*column_id),
                BoardAction::RemoveColumn { column_id: *column_id },
                ApiCall::DeleteColumn { column_id: *column_id },
            )
        }
        RenameColumn { column_id, title } => {
            let title = clean(title)?;
            let column = board.column(*column_id).ok_or(Rejection::NotFound("column"))?;
            unchanged_if(column.title == title)?;
            check(Permission::EditColumns)?;
            Plan::optimistic(
                EntityKey::Column(*column_id),
                BoardAction::RenameColumn { column_id: *column_id, title: title.clone() },
                ApiCall::RenameColumn { column_id: *column_id, title },
            )
        }
        MoveColumn { column_id, index } => {
            let old = board.column_index(*column_id).ok_or(Rejection::NotFound("column"))?;
            let index = (*index).min(board.columns.len() - 1);
            unchanged_if(old == index)?;
            check(Permission::EditColumns)?;
            Plan::optimistic(
                EntityKey::Column(*column_id),
                BoardAction::MoveColumn { column_id: *column_id, index },
                ApiCall::MoveColumn { column_id: *column_id, position: index },
            )
        }

        CreateTask { column_id, title } => {
            let title = clean(title)?;
            board.column(*column_id).ok_or(Rejection::NotFound("column"))?;
            check(Permission::CreateTask)?;
            Plan::server_only(ApiCall::CreateTask { column_id: *column_id, title })
        }
        DeleteTask { task_id } => {
            let (column_id, task) = find_task(board, *task_id)?;
            check(Permission::DeleteTask { creator: task.creator })?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::RemoveTask { column_id, task_id: *task_id },
                ApiCall::DeleteTask { task_id: *task_id },
            )
        }
        MoveTask { task_id, to, index } => {
            let (from, _) = find_task(board, *task_id)?;
            let dest = board.column(*to).ok_or(Rejection::NotFound("column"))?;
            let index = if from == *to {
                let old = dest.task_index(*task_id).ok_or(Rejection::NotFound("task"))?;
                let index = (*index).min(dest.tasks.len() - 1);
                unchanged_if(old == index)?;
                index
            } else {
                (*index).min(dest.tasks.len())
            };
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::MoveTask { task_id: *task_id, from, to: *to, index },
                ApiCall::MoveTask { task_id: *task_id, column_id: *to, position: index },
            )
        }
        RenameTask { task_id, title } => {
            let title = clean(title)?;
            let (_, task) = find_task(board, *task_id)?;
            unchanged_if(task.title == title)?;
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::RenameTask { task_id: *task_id, title: title.clone() },
                ApiCall::RenameTask { task_id: *task_id, title },
            )
        }
        SetPriority { task_id, priority } => {
            let (_, task) = find_task(board, *task_id)?;
            unchanged_if(task.priority == *priority)?;
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::UpdateTask { task_id: *task_id, patch: TaskPatch::Priority(*priority) },
                ApiCall::SetPriority { task_id: *task_id, priority: *priority },
            )
        }
        SetDeadline { task_id, deadline } => {
            let (_, task) = find_task(board, *task_id)?;
            unchanged_if(task.deadline == *deadline)?;
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::UpdateTask { task_id: *task_id, patch: TaskPatch::Deadline(*deadline) },
                ApiCall::SetDeadline { task_id: *task_id, deadline: *deadline },
            )
        }
        SetDescription { task_id, description } => {
            let (_, task) = find_task(board, *task_id)?;
            unchanged_if(task.description == *description)?;
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::Task(*task_id),
                BoardAction::UpdateTask {
                    task_id: *task_id,
                    patch: TaskPatch::Description(description.clone()),
                },
                ApiCall::SetDescription { task_id: *task_id, description: description.clone() },
            )
        }

        AddComment { task_id, text } => {
            let text = text.trim();
            if text.is_empty() {
                return Err(Rejection::EmptyText);
            }
            find_task(board, *task_id)?;
            check(Permission::Comment)?;
            Plan::server_only(ApiCall::AddComment { task_id: *task_id, text: text.to_string() })
        }
        DeleteComment { task_id, comment_id } => {
            let (_, task) = find_task(board, *task_id)?;
            let comment = task
                .comments
                .iter()
                .find(|c| c.id == *comment_id)
                .ok_or(Rejection::NotFound("comment"))?;
            check(Permission::DeleteComment { author: comment.user })?;
            Plan::optimistic(
                EntityKey::Comment(*comment_id),
                BoardAction::RemoveComment { task_id: *task_id, comment_id: *comment_id },
                ApiCall::DeleteComment { comment_id: *comment_id },
            )
        }

        DeleteFile { task_id, file_id } => {
            let (_, task) = find_task(board, *task_id)?;
            if !task.files.iter().any(|f| f.id == *file_id) {
                return Err(Rejection::NotFound("file"));
            }
            check(Permission::EditTask)?;
            Plan::optimistic(
                EntityKey::File(*file_id),
                BoardAction::RemoveFile { task_id: *task_id, file_id: *file_id },
                ApiCall::DeleteFile { file_id: *file_id },
            )
        }
    };
    Ok(plan)
}

/// Server task replies omit attachments; keep the ones already loaded
pub fn merge_server_task(local: Option<&Task>, mut server: Task) -> Task {
    if let Some(local) = local {
        if server.files.is_empty() {
            server.files = local.files.clone();
        }
    }
    server
}

/// Action that folds a successful reply into the store, if it carries
/// anything the optimistic step did not already apply
pub fn confirm_action(state: &BoardState, call: &ApiCall, reply: Reply) -> Option<BoardAction> {
    let board = state.board.as_ref()?;
    match (call, reply) {
        (ApiCall::RenameBoard { .. }, Reply::Board { title }) => Some(BoardAction::RenameBoard { title }),
        (ApiCall::CreateColumn { .. }, Reply::Column(column)) => Some(BoardAction::AddColumn(column)),
        (ApiCall::RenameColumn { column_id, .. }, Reply::Column(column)) => Some(BoardAction::RenameColumn {
            column_id: *column_id,
            title: column.title,
        }),
        (ApiCall::CreateTask { column_id, .. }, Reply::Task(task)) => Some(BoardAction::AddTask {
            column_id: *column_id,
            task,
        }),
        // Local placement already matches; the server may number positions differently
        (ApiCall::MoveTask { .. }, _) => None,
        (
            ApiCall::RenameTask { .. }
            | ApiCall::SetPriority { .. }
            | ApiCall::SetDeadline { .. }
            | ApiCall::SetDescription { .. },
            Reply::Task(task),
        ) => {
            let column_id = board.column_of_task(task.id)?;
            let task = merge_server_task(board.task(task.id), task);
            Some(BoardAction::ReplaceTask { column_id, task })
        }
        (ApiCall::AddComment { task_id, .. }, Reply::Comment(comment)) => Some(BoardAction::AddComment {
            task_id: *task_id,
            comment,
        }),
        _ => None,
    }
}

/// Fold a server answer into the board.
///
/// Optimistic calls carry their ticket. A reply is applied only when the
/// ticket is the newest for its entity; a failure runs whatever inverses the
/// ledger releases. The error is handed back for the banner.
pub fn reconcile(
    state: &mut BoardState,
    ledger: &mut PendingLedger,
    call: &ApiCall,
    ticket: Option<&Ticket>,
    result: Result<Reply, ApiError>,
) -> Result<(), ApiError> {
    match result {
        Ok(reply) => {
            let newest = match ticket {
                Some(ticket) => ledger.settle(ticket, true).newest,
                None => true,
            };
            if !newest {
                log::debug!("dropping stale reply for {:?}", call);
                return Ok(());
            }
            if let Some(action) = confirm_action(state, call, reply) {
                if !reduce(state, &action).changed() {
                    log::debug!("server reply matches local state");
                }
            }
            Ok(())
        }
        Err(e) => {
            if let Some(ticket) = ticket {
                let settlement = ledger.settle(ticket, false);
                if settlement.reverts.is_empty() {
                    log::debug!("newer edit of {:?} in flight, revert deferred", ticket.key);
                }
                for inverse in &settlement.reverts {
                    reduce(state, inverse);
                }
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::Role;
    use crate::store::{NoChange, Outcome};

    fn state() -> BoardState {
        BoardState {
            board: Some(todo_done_board()),
            members: vec![member(2, "bob", Role::Editor), member(3, "carol", Role::Viewer)],
        }
    }

    #[test]
    fn test_todo_done_scenario() {
        let mut state = state();
        let alice = user(1, "alice");
        let plan = plan(&state, Some(&alice), &BoardIntent::MoveTask { task_id: 1, to: 20, index: 0 }).unwrap();
        assert_eq!(plan.call, ApiCall::MoveTask { task_id: 1, column_id: 20, position: 0 });

        let (key, action) = plan.optimistic.unwrap();
        assert_eq!(key, EntityKey::Task(1));
        reduce(&mut state, &action);
        let board = state.board.unwrap();
        assert_eq!(board.column(10).unwrap().tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(board.column(20).unwrap().tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_blank_rename_issues_no_call() {
        let alice = user(1, "alice");
        for intent in [
            BoardIntent::RenameTask { task_id: 1, title: "  ".to_string() },
            BoardIntent::RenameColumn { column_id: 10, title: String::new() },
            BoardIntent::RenameBoard { title: "\n".to_string() },
        ] {
            assert_eq!(plan(&state(), Some(&alice), &intent), Err(Rejection::EmptyTitle));
        }
    }

    #[test]
    fn test_same_index_reorder_issues_no_call() {
        let alice = user(1, "alice");
        let intent = BoardIntent::MoveTask { task_id: 2, to: 10, index: 1 };
        assert_eq!(plan(&state(), Some(&alice), &intent), Err(Rejection::NoChange));
        let column = BoardIntent::MoveColumn { column_id: 20, index: 5 };
        assert_eq!(plan(&state(), Some(&alice), &column), Err(Rejection::NoChange));
    }

    #[test]
    fn test_viewer_cannot_edit_but_can_comment() {
        let carol = user(3, "carol");
        let edit = BoardIntent::SetPriority { task_id: 1, priority: Priority::High };
        assert_eq!(
            plan(&state(), Some(&carol), &edit),
            Err(Rejection::Denied(DenyReason::RequiresRole(Role::Editor)))
        );
        let comment = BoardIntent::AddComment { task_id: 1, text: " ok ".to_string() };
        let planned = plan(&state(), Some(&carol), &comment).unwrap();
        assert!(planned.optimistic.is_none());
        assert_eq!(planned.call, ApiCall::AddComment { task_id: 1, text: "ok".to_string() });
    }

    #[test]
    fn test_anonymous_and_missing_board() {
        let intent = BoardIntent::CreateColumn { title: "Later".to_string() };
        assert_eq!(plan(&state(), None, &intent), Err(Rejection::Anonymous));
        assert_eq!(
            plan(&BoardState::default(), Some(&user(1, "alice")), &intent),
            Err(Rejection::NoBoard)
        );
    }

    #[test]
    fn test_comment_confirmation_appends_with_author() {
        let mut state = state();
        let bob = user(2, "bob");
        let planned = plan(&state, Some(&bob), &BoardIntent::AddComment { task_id: 1, text: "ok".to_string() }).unwrap();

        let reply = Reply::Comment(comment(11, "ok", bob.id));
        let action = confirm_action(&state, &planned.call, reply).unwrap();
        let before = state.board.as_ref().unwrap().task(1).unwrap().comments.len();
        assert!(reduce(&mut state, &action).changed());

        let comments = &state.board.as_ref().unwrap().task(1).unwrap().comments;
        assert_eq!(comments.len(), before + 1);
        let added = comments.last().unwrap();
        assert_eq!((added.text.as_str(), added.user), ("ok", bob.id));
    }

    #[test]
    fn test_task_reply_keeps_loaded_files() {
        let mut state = state();
        let file = crate::models::TaskFile {
            id: 5,
            name: "brief.pdf".to_string(),
            url: "/media/brief.pdf".to_string(),
            uploaded_by: None,
            uploaded_at: at(10),
        };
        state.board.as_mut().unwrap().task_mut(1).unwrap().files.push(file);

        let mut server = task(1, "T1");
        server.priority = Priority::High;
        let call = ApiCall::SetPriority { task_id: 1, priority: Priority::High };
        let Some(BoardAction::ReplaceTask { column_id, task }) = confirm_action(&state, &call, Reply::Task(server)) else {
            panic!("expected ReplaceTask");
        };
        assert_eq!(column_id, 10);
        assert_eq!(task.files.len(), 1);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_delete_task_needs_creator_or_admin() {
        let bob = user(2, "bob");
        // Fixture tasks are created by user 1
        assert_eq!(
            plan(&state(), Some(&bob), &BoardIntent::DeleteTask { task_id: 1 }),
            Err(Rejection::Denied(DenyReason::NotCreator))
        );
        let alice = user(1, "alice");
        let planned = plan(&state(), Some(&alice), &BoardIntent::DeleteTask { task_id: 1 }).unwrap();
        let (_, action) = planned.optimistic.unwrap();
        let mut state = state();
        assert!(reduce(&mut state, &action).changed());
        assert_eq!(reduce(&mut state, &action), Outcome::Unchanged(NoChange::UnknownTask));
    }

    fn task_title(state: &BoardState, task_id: u32) -> String {
        state.board.as_ref().unwrap().task(task_id).unwrap().title.clone()
    }

    /// Plan a rename as a signed-in owner, apply it locally and take a ticket
    fn rename_locally(state: &mut BoardState, ledger: &mut PendingLedger, title: &str) -> (ApiCall, Ticket) {
        let alice = user(1, "alice");
        let intent = BoardIntent::RenameTask { task_id: 1, title: title.to_string() };
        let planned = plan(state, Some(&alice), &intent).unwrap();
        let (key, action) = planned.optimistic.unwrap();
        let inverse = reduce(state, &action).inverse().unwrap();
        (planned.call, ledger.issue(key, inverse))
    }

    fn offline() -> ApiError {
        ApiError::Network("offline".to_string())
    }

    #[test]
    fn test_reconcile_applies_newest_reply() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let (call, ticket) = rename_locally(&mut state, &mut ledger, "X");

        let mut server = task(1, "X (server)");
        server.description = "from server".to_string();
        assert!(reconcile(&mut state, &mut ledger, &call, Some(&ticket), Ok(Reply::Task(server))).is_ok());
        assert_eq!(task_title(&state, 1), "X (server)");
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_reconcile_drops_stale_reply() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let (call_x, first) = rename_locally(&mut state, &mut ledger, "X");
        let (_, _second) = rename_locally(&mut state, &mut ledger, "Y");

        let reply = Reply::Task(task(1, "X"));
        assert!(reconcile(&mut state, &mut ledger, &call_x, Some(&first), Ok(reply)).is_ok());
        assert_eq!(task_title(&state, 1), "Y");
        assert!(ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_reconcile_reverts_failed_edit() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let (call, ticket) = rename_locally(&mut state, &mut ledger, "X");

        assert_eq!(reconcile(&mut state, &mut ledger, &call, Some(&ticket), Err(offline())), Err(offline()));
        assert_eq!(task_title(&state, 1), "T1");
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_two_failed_renames_restore_original_title() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let (call_x, first) = rename_locally(&mut state, &mut ledger, "X");
        let (call_y, second) = rename_locally(&mut state, &mut ledger, "Y");

        // The older failure lands first and must not be lost
        assert!(reconcile(&mut state, &mut ledger, &call_x, Some(&first), Err(offline())).is_err());
        assert_eq!(task_title(&state, 1), "Y");
        assert!(reconcile(&mut state, &mut ledger, &call_y, Some(&second), Err(offline())).is_err());

        assert_eq!(task_title(&state, 1), "T1");
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_failure_after_stale_success_reverts_to_saved_title() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let (call_x, first) = rename_locally(&mut state, &mut ledger, "X");
        let (call_y, second) = rename_locally(&mut state, &mut ledger, "Y");

        let saved = Reply::Task(task(1, "X"));
        assert!(reconcile(&mut state, &mut ledger, &call_x, Some(&first), Ok(saved)).is_ok());
        assert!(reconcile(&mut state, &mut ledger, &call_y, Some(&second), Err(offline())).is_err());

        assert_eq!(task_title(&state, 1), "X");
        assert!(!ledger.is_pending(EntityKey::Task(1)));
    }

    #[test]
    fn test_reconcile_without_ticket_confirms_creation() {
        let mut state = state();
        let mut ledger = PendingLedger::default();
        let call = ApiCall::CreateTask { column_id: 20, title: "T3".to_string() };

        assert!(reconcile(&mut state, &mut ledger, &call, None, Ok(Reply::Task(task(3, "T3")))).is_ok());
        let done = state.board.as_ref().unwrap().column(20).unwrap();
        assert_eq!(done.tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);

        assert!(reconcile(&mut state, &mut ledger, &call, None, Err(offline())).is_err());
        assert_eq!(ledger.pending_count(), 0);
    }
}

//! Board Mutation Port
//!
//! The only writer of the board store. Views get the port from context and
//! express what the user wants; the port plans, applies the optimistic
//! change, persists it and reconciles or reverts when the server answers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use chrono::{DateTime, Utc};

use crate::api::endpoints::ApiCall;
use crate::api::ApiClient;
use crate::authz::{authorize, AccessContext, Permission};
use crate::drag::{resolve_drop, DragSource, DropTarget};
use crate::error::Rejection;
use crate::intent::{plan, reconcile, BoardIntent};
use crate::models::Priority;
use crate::store::{
    store_dismiss_error, store_dispatch, store_issue_ticket, store_push_error, AppStateStoreFields,
    AppStore, BoardAction, Ticket,
};

/// Capability handed to every board view
pub trait BoardMutationPort {
    fn submit(&self, intent: BoardIntent);

    /// Finish a drag gesture
    fn drop_dragged(&self, source: DragSource, target: Option<DropTarget>);

    /// Reactive permission check for showing or hiding controls
    fn can(&self, permission: Permission) -> bool;

    fn dismiss_error(&self, index: usize);

    /// Refetch the task's attachments
    fn load_files(&self, task_id: u32);

    fn rename_board(&self, title: String) {
        self.submit(BoardIntent::RenameBoard { title });
    }

    fn remove_member(&self, user_id: u32) {
        self.submit(BoardIntent::RemoveMember { user_id });
    }

    fn create_column(&self, title: String) {
        self.submit(BoardIntent::CreateColumn { title });
    }

    fn delete_column(&self, column_id: u32) {
        self.submit(BoardIntent::DeleteColumn { column_id });
    }

    fn rename_column(&self, column_id: u32, title: String) {
        self.submit(BoardIntent::RenameColumn { column_id, title });
    }

    fn create_task(&self, column_id: u32, title: String) {
        self.submit(BoardIntent::CreateTask { column_id, title });
    }

    fn delete_task(&self, task_id: u32) {
        self.submit(BoardIntent::DeleteTask { task_id });
    }

    fn rename_task(&self, task_id: u32, title: String) {
        self.submit(BoardIntent::RenameTask { task_id, title });
    }

    fn set_priority(&self, task_id: u32, priority: Priority) {
        self.submit(BoardIntent::SetPriority { task_id, priority });
    }

    fn set_deadline(&self, task_id: u32, deadline: Option<DateTime<Utc>>) {
        self.submit(BoardIntent::SetDeadline { task_id, deadline });
    }

    fn set_description(&self, task_id: u32, description: String) {
        self.submit(BoardIntent::SetDescription { task_id, description });
    }

    fn add_comment(&self, task_id: u32, text: String) {
        self.submit(BoardIntent::AddComment { task_id, text });
    }

    fn delete_comment(&self, task_id: u32, comment_id: u32) {
        self.submit(BoardIntent::DeleteComment { task_id, comment_id });
    }

    fn delete_file(&self, task_id: u32, file_id: u32) {
        self.submit(BoardIntent::DeleteFile { task_id, file_id });
    }
}

pub type Port = Arc<dyn BoardMutationPort + Send + Sync>;

/// Get the mutation port from context
pub fn use_port() -> Port {
    use_context::<Port>().expect("BoardMutationPort should be provided")
}

#[derive(Clone)]
pub struct BoardPort {
    store: AppStore,
    api: ApiClient,
}

impl BoardPort {
    pub fn new(store: AppStore, api: ApiClient) -> Self {
        Self { store, api }
    }

    /// CSRF token and signed-in user
    pub async fn load_session(&self) {
        match self.api.fetch_csrf().await {
            Ok(Some(_)) => {}
            Ok(None) => log::warn!("server sent no CSRF token"),
            Err(e) => log::warn!("CSRF bootstrap failed: {}", e),
        }

        match self.api.fetch_session().await {
            Ok(session) => {
                let user = session.user();
                log::info!("session user: {:?}", user.as_ref().map(|u| &u.username));
                *self.store.current_user().write() = user;
            }
            Err(e) => log::error!("session lookup failed: {}", e),
        }
    }

    /// Session, board and members for the page
    pub async fn load(&self, board_id: u32) {
        self.load_session().await;

        match self.api.fetch_board(board_id).await {
            Ok(board) => {
                log::info!("loaded board {} with {} columns", board.id, board.columns.len());
                store_dispatch(&self.store, &BoardAction::LoadBoard(board));
            }
            Err(e) => {
                log::error!("failed to load board {}: {}", board_id, e);
                store_push_error(&self.store, format!("Could not load board: {}", e));
                return;
            }
        }

        match self.api.fetch_members(board_id).await {
            Ok(members) => {
                store_dispatch(&self.store, &BoardAction::SetMembers(members));
            }
            Err(e) => log::error!("failed to load members of board {}: {}", board_id, e),
        }
    }

    async fn persist(self, call: ApiCall, ticket: Option<Ticket>) {
        let result = self.api.execute(&call).await;
        let settled = self.store.try_update(|app| {
            reconcile(&mut app.board_state, &mut app.ledger, &call, ticket.as_ref(), result)
        });

        match settled {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                log::error!("{} {} failed: {}", call_label(&call), call.endpoint().path, e);
                store_push_error(&self.store, format!("Could not save change: {}", e));
            }
            None => log::debug!("store gone before {:?} settled", call),
        }
    }
}

fn call_label(call: &ApiCall) -> String {
    format!("{:?}", call.endpoint().method).to_uppercase()
}

impl BoardMutationPort for BoardPort {
    fn submit(&self, intent: BoardIntent) {
        let user = self.store.current_user().get_untracked();
        let planned = self
            .store
            .board_state()
            .with_untracked(|state| plan(state, user.as_ref(), &intent));

        let planned = match planned {
            Ok(planned) => planned,
            Err(Rejection::NoChange) => {
                log::debug!("{:?} changes nothing", intent);
                return;
            }
            Err(rejection) => {
                log::warn!("{:?} rejected: {}", intent, rejection);
                store_push_error(&self.store, rejection.to_string());
                return;
            }
        };

        let ticket = planned.optimistic.and_then(|(key, action)| {
            let inverse = store_dispatch(&self.store, &action).inverse()?;
            Some(store_issue_ticket(&self.store, key, inverse))
        });

        let port = self.clone();
        spawn_local(port.persist(planned.call, ticket));
    }

    fn drop_dragged(&self, source: DragSource, target: Option<DropTarget>) {
        let drag_plan = self.store.board_state().with_untracked(|state| {
            state
                .board
                .as_ref()
                .map(|board| resolve_drop(board, source, target))
        });
        log::debug!("drop {:?} on {:?}: {:?}", source, target, drag_plan);
        if let Some(intent) = drag_plan.and_then(|p| p.into_intent()) {
            self.submit(intent);
        }
    }

    fn can(&self, permission: Permission) -> bool {
        let user = self.store.current_user().get();
        self.store.board_state().with(|state| {
            let Some(board) = state.board.as_ref() else {
                return false;
            };
            let ctx = AccessContext {
                user: user.as_ref(),
                owner_id: board.owner.id,
                members: &state.members,
            };
            authorize(&ctx, permission).is_allowed()
        })
    }

    fn dismiss_error(&self, index: usize) {
        store_dismiss_error(&self.store, index);
    }

    fn load_files(&self, task_id: u32) {
        let port = self.clone();
        spawn_local(async move {
            match port.api.fetch_task_files(task_id).await {
                Ok(files) => {
                    store_dispatch(&port.store, &BoardAction::SetFiles { task_id, files });
                }
                Err(e) => log::warn!("failed to load files of task {}: {}", task_id, e),
            }
        });
    }
}

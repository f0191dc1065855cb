//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. Board data changes
//! only through `reduce`; the helpers below are the sole write paths.

pub mod action;
pub mod ledger;
pub mod reducer;

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::{Board, User};

pub use action::{BoardAction, NoChange, Outcome, TaskPatch};
pub use ledger::{EntityKey, PendingLedger, Ticket};
pub use reducer::{reduce, BoardState};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Board currently on screen plus its members
    pub board_state: BoardState,
    /// Outstanding optimistic mutations
    pub ledger: PendingLedger,
    /// Signed-in user (None until the session is known, or anonymous)
    pub current_user: Option<User>,
    /// Messages shown in the error banner, oldest first
    pub errors: Vec<String>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Read the loaded board, tracking changes
pub fn store_with_board<R>(store: &AppStore, f: impl FnOnce(&Board) -> R) -> Option<R> {
    store.board_state().with(|state| state.board.as_ref().map(f))
}

/// Run one action through the reducer
pub fn store_dispatch(store: &AppStore, action: &BoardAction) -> Outcome {
    let outcome = reduce(&mut store.board_state().write(), action);
    if let Outcome::Unchanged(reason) = &outcome {
        log::debug!("action left board unchanged ({:?})", reason);
    }
    outcome
}

/// Record an applied optimistic action by the inverse that undoes it
pub fn store_issue_ticket(store: &AppStore, key: EntityKey, inverse: BoardAction) -> Ticket {
    let ledger = store.ledger();
    let ticket = ledger.write().issue(key, inverse);
    ticket
}

pub fn store_is_pending(store: &AppStore, key: EntityKey) -> bool {
    store.ledger().read().is_pending(key)
}

/// Queue a message for the error banner
pub fn store_push_error(store: &AppStore, message: impl Into<String>) {
    store.errors().write().push(message.into());
}

pub fn store_dismiss_error(store: &AppStore, index: usize) {
    let errors = store.errors();
    let mut errors = errors.write();
    dismiss_at(&mut errors, index);
}

fn dismiss_at(errors: &mut Vec<String>, index: usize) -> Option<String> {
    (index < errors.len()).then(|| errors.remove(index))
}

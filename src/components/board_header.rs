//! Board Header Component
//!
//! Board title with inline rename for users allowed to rename it.

use leptos::prelude::*;

use crate::authz::Permission;
use crate::context::use_port;
use crate::components::SessionBar;
use crate::store::{store_with_board, use_app_store, AppStateStoreFields};

#[component]
pub fn BoardHeader() -> impl IntoView {
    let store = use_app_store();
    let port = use_port();

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let title = move || store_with_board(&store, |board| board.title.clone()).unwrap_or_default();
    let saving = move || store.ledger().with(|ledger| ledger.pending_count());
    let owner = move || store_with_board(&store, |board| board.owner.username.clone()).unwrap_or_default();

    let can_port = port.clone();
    let can_rename = Memo::new(move |_| can_port.can(Permission::RenameBoard));

    let start_edit = move |_| {
        if !can_rename.get_untracked() {
            return;
        }
        set_draft.set(title());
        set_editing.set(true);
    };

    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        port.rename_board(draft.get());
        set_editing.set(false);
    };

    view! {
        <header class="board-header">
            {move || if editing.get() {
                view! {
                    <form class="board-rename-form" on:submit=save.clone()>
                        <input
                            type="text"
                            prop:value=move || draft.get()
                            on:input=move |ev| set_draft.set(event_target_value(&ev))
                            on:blur=move |_| set_editing.set(false)
                        />
                    </form>
                }.into_any()
            } else {
                view! {
                    <h1 class="board-title" on:dblclick=start_edit>{title}</h1>
                }.into_any()
            }}
            <span class="board-owner">{move || format!("Owner: {}", owner())}</span>
            <Show when=move || saving() != 0>
                <span class="board-saving">{move || format!("Saving {}...", saving())}</span>
            </Show>
            <SessionBar />
        </header>
    }
}

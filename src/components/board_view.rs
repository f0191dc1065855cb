//! Board View Component
//!
//! Header, member list and the horizontal strip of columns. Owns the drag
//! state for the whole board and hands finished gestures to the port.

use leptos::prelude::*;
use leptos_dragdrop::{bind_global_mouseup, create_dnd_signals, make_on_mouseleave, DndSignals};

use crate::authz::Permission;
use crate::components::{BoardHeader, ColumnView, MemberList};
use crate::context::use_port;
use crate::drag::{DragSource, DropTarget};
use crate::store::{store_with_board, use_app_store};

/// Drag state shared by every column and card of the board
pub type BoardDnd = DndSignals<DragSource, DropTarget>;

pub fn use_board_dnd() -> BoardDnd {
    use_context::<BoardDnd>().expect("BoardDnd should be provided")
}

#[component]
pub fn BoardView() -> impl IntoView {
    let store = use_app_store();
    let port = use_port();

    let dnd: BoardDnd = create_dnd_signals();
    provide_context(dnd);

    let drop_port = port.clone();
    bind_global_mouseup(dnd, move |source, target| {
        drop_port.drop_dragged(source, Some(target));
    });

    let loaded = move || store_with_board(&store, |_| ()).is_some();
    let column_ids = move || {
        store_with_board(&store, |board| board.columns.iter().map(|c| c.id).collect::<Vec<_>>()).unwrap_or_default()
    };
    let board_class = move || {
        if dnd.is_dragging() {
            "board dragging"
        } else {
            "board"
        }
    };

    view! {
        <Show
            when=loaded
            fallback=|| view! { <div class="board-loading">"Loading board..."</div> }
        >
            <div class=board_class>
                <BoardHeader />
                <MemberList />
                <div class="column-strip" on:mouseleave=make_on_mouseleave(dnd)>
                    <For
                        each=column_ids
                        key=|id| *id
                        children=move |column_id| view! { <ColumnView column_id=column_id /> }
                    />
                    <NewColumnForm />
                </div>
            </div>
        </Show>
    }
}

/// Trailing "add column" form
#[component]
fn NewColumnForm() -> impl IntoView {
    let port = use_port();
    let (title, set_title) = signal(String::new());

    let can_port = port.clone();
    let can_edit = move || can_port.can(Permission::EditColumns);

    let create_column = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get();
        if text.trim().is_empty() {
            return;
        }
        port.create_column(text);
        set_title.set(String::new());
    };

    view! {
        <Show when=can_edit>
            <form class="new-column-form" on:submit=create_column.clone()>
                <input
                    type="text"
                    placeholder="Add column..."
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <button type="submit">"+"</button>
            </form>
        </Show>
    }
}

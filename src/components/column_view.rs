//! Column View Component
//!
//! One column: draggable header with rename and delete, its task cards, and
//! the form for adding a task. The whole column surface is a drop target;
//! cards inside it claim the pointer first.

use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_target_mouseover};

use crate::authz::Permission;
use crate::components::{use_board_dnd, ConfirmRemove, RemoveKind, TaskCard};
use crate::context::use_port;
use crate::drag::{DragSource, DropTarget};
use crate::store::{store_is_pending, store_with_board, use_app_store, EntityKey};

#[component]
pub fn ColumnView(column_id: u32) -> impl IntoView {
    let store = use_app_store();
    let port = use_port();
    let dnd = use_board_dnd();

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let title = move || {
        store_with_board(&store, |board| board.column(column_id).map(|c| c.title.clone()))
            .flatten()
            .unwrap_or_default()
    };
    let task_ids = move || {
        store_with_board(&store, |board| {
            board
                .column(column_id)
                .map(|c| c.tasks.iter().map(|t| t.id).collect::<Vec<_>>())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    };
    let task_count = move || task_ids().len();

    let perm_port = port.clone();
    let can_edit = Memo::new(move |_| perm_port.can(Permission::EditColumns));
    let perm_port = port.clone();
    let can_delete = Memo::new(move |_| perm_port.can(Permission::DeleteColumn));

    let source = DragSource::Column { column_id };
    let on_header_mousedown = make_on_mousedown(dnd, source);
    let on_mousedown = move |ev: web_sys::MouseEvent| {
        if can_edit.get_untracked() && !editing.get_untracked() {
            on_header_mousedown(ev);
        }
    };
    let on_mouseover = make_on_target_mouseover(dnd, DropTarget::Column { column_id });

    let column_class = move || {
        let mut c = String::from("column");
        if dnd.dragging_read.get() == Some(source) {
            c.push_str(" dragging");
        }
        if dnd.drop_target_read.get() == Some(DropTarget::Column { column_id }) {
            c.push_str(" drop-target");
        }
        if store_is_pending(&store, EntityKey::Column(column_id)) {
            c.push_str(" pending");
        }
        c
    };

    let start_edit = move |_| {
        if !can_edit.get_untracked() || dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        set_draft.set(title());
        set_editing.set(true);
    };

    let rename_port = port.clone();
    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        rename_port.rename_column(column_id, draft.get());
        set_editing.set(false);
    };

    let delete_port = port.clone();

    view! {
        <section class=column_class on:mouseover=on_mouseover>
            <header class="column-header" on:mousedown=on_mousedown>
                {move || if editing.get() {
                    view! {
                        <form class="column-rename-form" on:submit=save.clone()>
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
                        <h2 class="column-title" on:dblclick=start_edit>{title}</h2>
                        <span class="column-count">{task_count}</span>
                    }.into_any()
                }}
                <Show when=move || can_delete.get()>
                    <ConfirmRemove
                        kind=RemoveKind::Column
                        on_confirm={
                            let delete_port = delete_port.clone();
                            move |_| delete_port.delete_column(column_id)
                        }
                    />
                </Show>
            </header>

            <div class="task-list">
                <For
                    each=task_ids
                    key=|id| *id
                    children=move |task_id| view! { <TaskCard task_id=task_id column_id=column_id /> }
                />
            </div>

            <NewTaskForm column_id=column_id />
        </section>
    }
}

/// Task title input at the bottom of a column
#[component]
fn NewTaskForm(column_id: u32) -> impl IntoView {
    let port = use_port();
    let (title, set_title) = signal(String::new());

    let can_port = port.clone();
    let can_create = move || can_port.can(Permission::CreateTask);

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get();
        if text.trim().is_empty() {
            return;
        }
        port.create_task(column_id, text);
        set_title.set(String::new());
    };

    view! {
        <Show when=can_create>
            <form class="new-task-form" on:submit=create_task.clone()>
                <input
                    type="text"
                    placeholder="Add task..."
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <button type="submit">"Add"</button>
            </form>
        </Show>
    }
}

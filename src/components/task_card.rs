//! Task Card Component
//!
//! Compact card inside a column. Dragging it moves the task; a click (that
//! did not end a drag) opens the details: title, priority, deadline,
//! description, comments and attachments.

use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_target_mouseover};

use crate::authz::Permission;
use crate::components::{
    format_deadline, is_overdue, use_board_dnd, CommentList, ConfirmRemove, DeadlinePicker, FileList, PriorityPicker,
    RemoveKind,
};
use crate::context::use_port;
use crate::drag::{DragSource, DropTarget};
use crate::models::Task;
use crate::store::{store_is_pending, store_with_board, use_app_store, AppStateStoreFields, BoardState, EntityKey};

#[component]
pub fn TaskCard(task_id: u32, column_id: u32) -> impl IntoView {
    let store = use_app_store();
    let port = use_port();
    let dnd = use_board_dnd();

    let task = Memo::new(move |_| store_with_board(&store, |board| board.task(task_id).cloned()).flatten());
    let (expanded, set_expanded) = signal(false);

    let perm_port = port.clone();
    let can_move = Memo::new(move |_| perm_port.can(Permission::EditTask));

    let source = DragSource::Task { task_id, column_id };
    let target = DropTarget::Task { task_id, column_id };
    let on_card_mousedown = make_on_mousedown(dnd, source);
    let on_mousedown = move |ev: web_sys::MouseEvent| {
        if can_move.get_untracked() {
            on_card_mousedown(ev);
        }
    };
    let on_mouseover = make_on_target_mouseover(dnd, target);

    let card_class = move || {
        let mut c = String::from("task-card");
        if let Some(t) = task.get() {
            c.push_str(" priority-");
            c.push_str(t.priority.as_str());
        }
        if expanded.get() {
            c.push_str(" expanded");
        }
        if dnd.dragging_read.get() == Some(source) {
            c.push_str(" dragging");
        }
        if dnd.drop_target_read.get() == Some(target) {
            c.push_str(" drop-target");
        }
        if store_is_pending(&store, EntityKey::Task(task_id)) {
            c.push_str(" pending");
        }
        c
    };

    let toggle = move |_| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        set_expanded.update(|open| *open = !*open);
    };

    view! {
        <article class=card_class on:mousedown=on_mousedown on:mouseover=on_mouseover>
            <div class="task-summary" on:click=toggle>
                <span class="task-title">{move || task.get().map(|t| t.title).unwrap_or_default()}</span>
                <TaskBadges task=task />
            </div>
            <Show when=move || expanded.get()>
                <TaskDetails task_id=task_id task=task />
            </Show>
        </article>
    }
}

/// Priority, deadline and comment count under the title
#[component]
fn TaskBadges(task: Memo<Option<Task>>) -> impl IntoView {
    let deadline = move || {
        task.get().and_then(|t| t.deadline).map(|deadline| {
            let class = if is_overdue(deadline) { "task-deadline overdue" } else { "task-deadline" };
            view! { <span class=class>{format_deadline(deadline)}</span> }
        })
    };
    let comments = move || task.get().map(|t| t.comments.len()).filter(|n| *n > 0);

    view! {
        <div class="task-badges">
            <span class="task-priority">{move || task.get().map(|t| t.priority.label()).unwrap_or_default()}</span>
            {deadline}
            {move || comments().map(|n| view! { <span class="task-comment-count">{format!("💬 {}", n)}</span> })}
        </div>
    }
}

/// "Assigned: ..." for the responsible users, None when nobody is assigned
fn assignee_line(state: &BoardState, responsible: &[u32]) -> Option<String> {
    if responsible.is_empty() {
        return None;
    }
    let names: Vec<String> = responsible.iter().map(|id| state.display_name(*id)).collect();
    Some(format!("Assigned: {}", names.join(", ")))
}

#[component]
fn TaskDetails(task_id: u32, task: Memo<Option<Task>>) -> impl IntoView {
    let store = use_app_store();
    let port = use_port();

    // Attachments are not part of the board payload
    port.load_files(task_id);

    let (editing_title, set_editing_title) = signal(false);
    let (title_draft, set_title_draft) = signal(String::new());
    let (description_draft, set_description_draft) =
        signal(task.get_untracked().map(|t| t.description).unwrap_or_default());

    let perm_port = port.clone();
    let can_edit = Memo::new(move |_| perm_port.can(Permission::EditTask));
    let perm_port = port.clone();
    let can_delete = Memo::new(move |_| {
        let creator = task.with(|t| t.as_ref().and_then(|t| t.creator));
        perm_port.can(Permission::DeleteTask { creator })
    });

    let start_rename = move |_| {
        if !can_edit.get_untracked() {
            return;
        }
        set_title_draft.set(task.get_untracked().map(|t| t.title).unwrap_or_default());
        set_editing_title.set(true);
    };

    let rename_port = port.clone();
    let save_title = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        rename_port.rename_task(task_id, title_draft.get());
        set_editing_title.set(false);
    };

    let description_port = port.clone();
    let save_description = move |_| {
        description_port.set_description(task_id, description_draft.get());
    };
    let description_dirty = move || {
        task.with(|t| t.as_ref().map(|t| t.description != description_draft.get()).unwrap_or(false))
    };

    let delete_port = port.clone();

    let priority = Signal::derive(move || task.get().map(|t| t.priority).unwrap_or_default());
    let deadline = Signal::derive(move || task.get().and_then(|t| t.deadline));
    let comments = Signal::derive(move || task.get().map(|t| t.comments).unwrap_or_default());
    let files = Signal::derive(move || task.get().map(|t| t.files).unwrap_or_default());
    let assignees = move || {
        let responsible = task.with(|t| t.as_ref().map(|t| t.responsible.clone()).unwrap_or_default());
        store.board_state().with(|state| assignee_line(state, &responsible))
    };

    view! {
        <div class="task-details" on:mousedown=|ev| ev.stop_propagation()>
            <div class="task-details-header">
                {move || if editing_title.get() {
                    view! {
                        <form class="task-rename-form" on:submit=save_title.clone()>
                            <input
                                type="text"
                                prop:value=move || title_draft.get()
                                on:input=move |ev| set_title_draft.set(event_target_value(&ev))
                                on:blur=move |_| set_editing_title.set(false)
                            />
                        </form>
                    }.into_any()
                } else {
                    view! {
                        <h3 class="task-details-title" on:dblclick=start_rename>
                            {move || task.get().map(|t| t.title).unwrap_or_default()}
                        </h3>
                    }.into_any()
                }}
                <Show when=move || can_delete.get()>
                    <ConfirmRemove
                        kind=RemoveKind::Task
                        on_confirm={
                            let delete_port = delete_port.clone();
                            move |_| delete_port.delete_task(task_id)
                        }
                    />
                </Show>
            </div>

            <div class="task-fields">
                <PriorityPicker task_id=task_id priority=priority enabled=can_edit />
                <DeadlinePicker task_id=task_id deadline=deadline enabled=can_edit />
            </div>
            {move || assignees().map(|names| view! { <div class="task-assignees">{names}</div> })}

            <div class="task-description">
                <textarea
                    rows="4"
                    placeholder="Description"
                    prop:value=move || description_draft.get()
                    prop:disabled=move || !can_edit.get()
                    on:input=move |ev| set_description_draft.set(event_target_value(&ev))
                />
                <Show when=description_dirty>
                    <button class="description-save-btn" on:click=save_description.clone()>"Save"</button>
                </Show>
            </div>

            <CommentList task_id=task_id comments=comments />
            <FileList task_id=task_id files=files can_delete=can_edit />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::Role;

    #[test]
    fn test_assignee_line_names_members_and_owner() {
        let state = BoardState {
            board: Some(todo_done_board()),
            members: vec![member(2, "bob", Role::Editor)],
        };
        assert_eq!(assignee_line(&state, &[2, 1]).as_deref(), Some("Assigned: bob, alice"));
        assert_eq!(assignee_line(&state, &[9]).as_deref(), Some("Assigned: user #9"));
        assert_eq!(assignee_line(&state, &[]), None);
    }
}

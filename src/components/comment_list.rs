//! Comment List Component
//!
//! Task comments in the order the server returned them, plus the add form.

use leptos::prelude::*;

use crate::authz::Permission;
use crate::components::{format_deadline, ConfirmRemove, RemoveKind};
use crate::context::use_port;
use crate::models::Comment;
use crate::store::{use_app_store, AppStore, AppStateStoreFields};

fn author_name(store: &AppStore, user_id: u32) -> String {
    store.board_state().with(|state| state.display_name(user_id))
}

#[component]
pub fn CommentList(task_id: u32, comments: Signal<Vec<Comment>>) -> impl IntoView {
    let store = use_app_store();
    let port = use_port();
    let (text, set_text) = signal(String::new());

    let can_port = port.clone();
    let can_comment = move || can_port.can(Permission::Comment);

    let add_port = port.clone();
    let add_comment = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let body = text.get();
        if body.trim().is_empty() {
            return;
        }
        add_port.add_comment(task_id, body);
        set_text.set(String::new());
    };

    view! {
        <div class="comment-list">
            <h4>{move || format!("Comments ({})", comments.with(Vec::len))}</h4>
            <For
                each=move || comments.get()
                key=|comment| (comment.id, comment.text.clone())
                children=move |comment| {
                    let comment_id = comment.id;
                    let author = comment.user;
                    let can_port = port.clone();
                    let delete_port = port.clone();
                    let can_delete = move || can_port.can(Permission::DeleteComment { author });
                    view! {
                        <div class="comment">
                            <div class="comment-meta">
                                <span class="comment-author">{move || author_name(&store, author)}</span>
                                <span class="comment-date">{format_deadline(comment.created)}</span>
                                <Show when=can_delete.clone()>
                                    <ConfirmRemove
                                        kind=RemoveKind::Comment
                                        on_confirm={
                                            let delete_port = delete_port.clone();
                                            move |_| delete_port.delete_comment(task_id, comment_id)
                                        }
                                    />
                                </Show>
                            </div>
                            <p class="comment-text">{comment.text.clone()}</p>
                        </div>
                    }
                }
            />
            <Show when=can_comment>
                <form class="comment-form" on:submit=add_comment.clone()>
                    <input
                        type="text"
                        placeholder="Write a comment..."
                        prop:value=move || text.get()
                        on:input=move |ev| set_text.set(event_target_value(&ev))
                    />
                    <button type="submit">"Send"</button>
                </form>
            </Show>
        </div>
    }
}

//! Member List Component
//!
//! Board members with their roles; owners can remove other members.

use leptos::prelude::*;

use crate::authz::Permission;
use crate::components::{ConfirmRemove, RemoveKind};
use crate::context::use_port;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn MemberList() -> impl IntoView {
    let store = use_app_store();
    let port = use_port();

    let members = move || store.board_state().with(|state| state.members.clone());

    view! {
        <ul class="member-list">
            <For
                each=members
                key=|member| (member.user_id, member.role)
                children=move |member| {
                    let user_id = member.user_id;
                    let can_port = port.clone();
                    let remove_port = port.clone();
                    let can_remove = move || can_port.can(Permission::RemoveMember { user_id });
                    view! {
                        <li class="member">
                            <span class="member-name">{member.username.clone()}</span>
                            <span class=format!("member-role role-{}", member.role.label())>
                                {member.role.label()}
                            </span>
                            <Show when=can_remove.clone()>
                                <ConfirmRemove
                                    kind=RemoveKind::Member
                                    on_confirm={
                                        let remove_port = remove_port.clone();
                                        move |_| remove_port.remove_member(user_id)
                                    }
                                />
                            </Show>
                        </li>
                    }
                }
            />
        </ul>
    }
}

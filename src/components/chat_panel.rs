//! Chat Panel Component
//!
//! Live chat of one room. Opens the configured transport on mount and closes
//! it on unmount; messages appear only once the server has them. The dock
//! switches between the board room and the user's private dialogs.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::authz::Permission;
use crate::chat::{open_transport, send_message, ChatChannel, ChatEvent, ChatRoom, ChatTransport, EventSink, Inbound};
use crate::config::{ClientConfig, TransportKind};
use crate::context::use_port;
use crate::models::Dialog;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ChatDock(board_id: u32) -> impl IntoView {
    let store = use_app_store();
    let api = use_context::<ApiClient>().expect("ApiClient should be provided");

    let board_room = ChatRoom::Board(board_id);
    let (room, set_room) = signal(board_room);
    let (dialogs, set_dialogs) = signal(Vec::<Dialog>::new());

    // Dialogs need a session; rerun once it is known
    Effect::new(move |_| {
        if store.current_user().with(Option::is_none) {
            return;
        }
        let api = api.clone();
        spawn_local(async move {
            match api.fetch_dialogs().await {
                Ok(list) => {
                    log::debug!("{} private dialogs", list.len());
                    set_dialogs.set(list);
                }
                Err(e) => log::warn!("failed to load dialogs: {}", e),
            }
        });
    });

    let tab_class = move |tab: ChatRoom| if room.get() == tab { "chat-room-tab active" } else { "chat-room-tab" };

    view! {
        <div class="chat-dock">
            <nav class="chat-rooms">
                <button class=move || tab_class(board_room) on:click=move |_| set_room.set(board_room)>
                    "Board"
                </button>
                <For
                    each=move || dialogs.get()
                    key=|dialog| (dialog.id, dialog.unread_count)
                    children=move |dialog| {
                        let tab = ChatRoom::Private { chat_id: dialog.id, recipient_id: dialog.other_user.id };
                        let unread = (dialog.unread_count > 0).then(|| dialog.unread_count);
                        view! {
                            <button class=move || tab_class(tab) title=dialog.last_message.clone() on:click=move |_| set_room.set(tab)>
                                {dialog.other_user.username.clone()}
                                {unread.map(|n| view! { <span class="unread-badge">{n}</span> })}
                            </button>
                        }
                    }
                />
            </nav>
            {move || view! { <ChatPanel room=room.get() /> }}
        </div>
    }
}

#[component]
pub fn ChatPanel(room: ChatRoom) -> impl IntoView {
    let port = use_port();
    let config = use_context::<ClientConfig>().expect("ClientConfig should be provided");
    let api = use_context::<ApiClient>().expect("ApiClient should be provided");

    let channel = RwSignal::new(ChatChannel::new(room));
    let (draft, set_draft) = signal(String::new());
    let (send_error, set_send_error) = signal(None::<String>);
    let (sending, set_sending) = signal(false);

    // The sink outlives the component when a socket callback fires late
    let sink: EventSink = Rc::new(move |event: ChatEvent| {
        channel.try_update(|c| c.handle(event));
    });
    let transport: Rc<dyn ChatTransport> = open_transport(&config, &api, room, sink).into();
    let transport = StoredValue::new_local(transport);
    on_cleanup(move || {
        transport.try_with_value(|t| t.close());
    });

    // Polling picks up REST-sent messages on its next round
    let append_replies = config.chat_transport != TransportKind::Polling;

    let store = use_app_store();
    let can_chat = move || match room {
        ChatRoom::Board(_) => port.can(Permission::Chat),
        ChatRoom::Private { .. } => store.current_user().with(Option::is_some),
    };

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if sending.get_untracked() {
            return;
        }
        let text = draft.get_untracked();
        let api = api.clone();
        let Some(transport) = transport.try_get_value() else {
            return;
        };
        set_sending.set(true);
        spawn_local(async move {
            match send_message(Some(transport.as_ref()), &api, room, &text).await {
                Ok(reply) => {
                    set_draft.set(String::new());
                    set_send_error.set(None);
                    if let Some(message) = reply.filter(|_| append_replies) {
                        channel.try_update(|c| c.handle(ChatEvent::Inbound(Inbound::Message(message))));
                    }
                }
                Err(e) => {
                    log::warn!("chat send failed: {}", e);
                    set_send_error.set(Some(e.to_string()));
                }
            }
            set_sending.set(false);
        });
    };

    let messages = move || channel.with(|c| c.messages.clone()).into_iter().enumerate().collect::<Vec<_>>();
    let status_label = move || channel.with(|c| c.status.label());

    view! {
        <aside class="chat-panel">
            <header class="chat-header">
                <h3>"Chat"</h3>
                <span class="chat-status">{status_label}</span>
            </header>
            <div class="chat-messages">
                // Same id may arrive twice; position keeps rows distinct
                <For
                    each=messages
                    key=|(index, message)| (*index, message.id)
                    children=|(_, message)| {
                        view! {
                            <div class="chat-message">
                                <span class="chat-author">{message.author.username.clone()}</span>
                                <span class="chat-time">{message.created.format("%H:%M").to_string()}</span>
                                <p class="chat-text">{message.text.clone()}</p>
                            </div>
                        }
                    }
                />
            </div>
            <Show
                when=can_chat
                fallback=|| view! { <p class="chat-readonly">"Join the board to chat."</p> }
            >
                <form class="chat-form" on:submit=submit.clone()>
                    <input
                        type="text"
                        placeholder="Message..."
                        prop:value=move || draft.get()
                        prop:disabled=move || sending.get()
                        on:input=move |ev| set_draft.set(event_target_value(&ev))
                    />
                    <button type="submit">"Send"</button>
                </form>
            </Show>
            {move || send_error.get().map(|e| view! { <p class="chat-error">{e}</p> })}
        </aside>
    }
}

//! Kanban Board App
//!
//! Root component: builds the store, API client and mutation port, loads the
//! board named in the URL and lays out the board next to its chat.

use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::api::ApiClient;
use crate::components::{BoardView, ChatDock, ErrorBanner, SessionBar};
use crate::config::{current_board_id, ClientConfig};
use crate::context::{BoardPort, Port};
use crate::store::{AppState, AppStore};

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let api = ApiClient::new(&config.api_base);
    let store: AppStore = Store::new(AppState::default());
    let port = BoardPort::new(store, api.clone());

    provide_context(store);
    provide_context(config);
    provide_context(api);
    provide_context::<Port>(Arc::new(port.clone()));

    let board_id = current_board_id();
    match board_id {
        Some(id) => {
            log::info!("opening board {}", id);
            spawn_local(async move { port.load(id).await });
        }
        None => {
            log::warn!("no board id in the page URL");
            spawn_local(async move { port.load_session().await });
        }
    }

    view! {
        <div class="app-layout">
            <ErrorBanner />
            {match board_id {
                Some(id) => view! {
                    <main class="main-content">
                        <BoardView />
                    </main>
                    <ChatDock board_id=id />
                }.into_any(),
                None => view! {
                    <main class="main-content">
                        <SessionBar />
                        <p class="no-board">"Open a board from /boards/{id}/ to get started."</p>
                    </main>
                }.into_any(),
            }}
        </div>
    }
}

//! Error Banner Component
//!
//! Failed or rejected mutations, each dismissable, plus the recent log lines
//! for reporting problems.

use leptos::prelude::*;

use crate::context::use_port;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let store = use_app_store();
    let port = use_port();
    let (show_log, set_show_log) = signal(false);
    let (log_lines, set_log_lines) = signal(Vec::<String>::new());

    let errors = move || store.errors().get().into_iter().enumerate().collect::<Vec<_>>();

    let toggle_log = move |_| {
        if !show_log.get_untracked() {
            set_log_lines.set(rolling_logger::recent_lines());
        }
        set_show_log.update(|open| *open = !*open);
    };

    view! {
        <Show when=move || store.errors().with(|e| !e.is_empty())>
            <div class="error-banner" role="alert">
                <For
                    each=errors
                    key=|(index, message)| (*index, message.clone())
                    children={
                        let port = port.clone();
                        move |(index, message)| {
                            let port = port.clone();
                            view! {
                                <div class="error-item">
                                    <span class="error-text">{message}</span>
                                    <button class="error-dismiss-btn" on:click=move |_| port.dismiss_error(index)>
                                        "×"
                                    </button>
                                </div>
                            }
                        }
                    }
                />
                <button class="error-log-btn" on:click=toggle_log>
                    {move || if show_log.get() { "Hide log" } else { "Show log" }}
                </button>
                <Show when=move || show_log.get()>
                    <pre class="error-log">{move || log_lines.get().join("\n")}</pre>
                </Show>
            </div>
        </Show>
    }
}

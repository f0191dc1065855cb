//! Confirm Remove Component
//!
//! Two-step removal control. The first click arms it and names what will go;
//! a second click on the prompt commits. An armed control disarms itself
//! after a few seconds so a stray later click cannot delete anything.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const DISARM_AFTER_MS: u32 = 4_000;

/// What a removal control takes off the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveKind {
    Column,
    Task,
    Comment,
    File,
    Member,
}

impl RemoveKind {
    fn noun(self) -> &'static str {
        match self {
            RemoveKind::Column => "column",
            RemoveKind::Task => "task",
            RemoveKind::Comment => "comment",
            RemoveKind::File => "file",
            RemoveKind::Member => "member",
        }
    }

    /// Members leave the board; everything else is deleted
    fn verb(self) -> &'static str {
        match self {
            RemoveKind::Member => "Remove",
            _ => "Delete",
        }
    }

    fn tooltip(self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }

    fn prompt(self) -> String {
        format!("{} {}?", self.verb(), self.noun())
    }

    fn trigger_class(self) -> String {
        format!("remove-trigger {}-remove", self.noun())
    }
}

#[component]
pub fn ConfirmRemove(kind: RemoveKind, #[prop(into)] on_confirm: Callback<()>) -> impl IntoView {
    // Bumped on every arm so an old timer cannot disarm a newer prompt
    let armed = RwSignal::new(None::<u32>);
    let arm_count = StoredValue::new(0u32);

    let arm = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        arm_count.update_value(|n| *n += 1);
        let generation = arm_count.get_value();
        armed.set(Some(generation));
        spawn_local(async move {
            TimeoutFuture::new(DISARM_AFTER_MS).await;
            if armed.try_get_untracked().flatten() == Some(generation) {
                armed.try_set(None);
            }
        });
    };

    let commit = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        armed.set(None);
        on_confirm.run(());
    };

    let disarm = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        armed.set(None);
    };

    view! {
        {move || if armed.get().is_some() {
            view! {
                <span class="remove-prompt">
                    <button class="remove-commit" on:click=commit>{kind.prompt()}</button>
                    <button class="remove-cancel" title="Keep" on:click=disarm>"Keep"</button>
                </span>
            }.into_any()
        } else {
            view! {
                <button class=kind.trigger_class() title=kind.tooltip() on:click=arm>"×"</button>
            }.into_any()
        }}
    }
}

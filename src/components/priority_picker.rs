//! Priority Picker Component

use leptos::prelude::*;

use crate::context::use_port;
use crate::models::Priority;

#[component]
pub fn PriorityPicker(task_id: u32, priority: Signal<Priority>, enabled: Memo<bool>) -> impl IntoView {
    let port = use_port();

    let on_change = move |ev: web_sys::Event| match Priority::parse(&event_target_value(&ev)) {
        Some(selected) => port.set_priority(task_id, selected),
        None => log::warn!("unknown priority {:?}", event_target_value(&ev)),
    };

    view! {
        <label class="priority-picker">
            "Priority"
            <select
                prop:value=move || priority.get().as_str()
                prop:disabled=move || !enabled.get()
                on:change=on_change
            >
                {Priority::ALL.into_iter().map(|p| {
                    view! {
                        <option value=p.as_str() selected=move || priority.get() == p>
                            {p.label()}
                        </option>
                    }
                }).collect_view()}
            </select>
        </label>
    }
}

//! Deadline Picker Component
//!
//! `datetime-local` input bound to the task deadline. Values are entered and
//! shown in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use leptos::prelude::*;

use crate::context::use_port;

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Value for a `datetime-local` input
pub fn deadline_input_value(deadline: DateTime<Utc>) -> String {
    deadline.format(INPUT_FORMAT).to_string()
}

/// Parse a `datetime-local` value; an empty input clears the deadline
pub fn parse_deadline_input(value: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    // Some browsers include seconds
    let naive = NaiveDateTime::parse_from_str(value, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))?;
    Ok(Some(naive.and_utc()))
}

pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    deadline.format("%b %-d, %H:%M").to_string()
}

pub fn is_overdue(deadline: DateTime<Utc>) -> bool {
    deadline < Utc::now()
}

#[component]
pub fn DeadlinePicker(task_id: u32, deadline: Signal<Option<DateTime<Utc>>>, enabled: Memo<bool>) -> impl IntoView {
    let port = use_port();

    let change_port = port.clone();
    let on_change = move |ev: web_sys::Event| match parse_deadline_input(&event_target_value(&ev)) {
        Ok(value) => change_port.set_deadline(task_id, value),
        Err(e) => log::warn!("ignoring deadline input: {}", e),
    };

    view! {
        <label class="deadline-picker">
            "Deadline"
            <input
                type="datetime-local"
                prop:value=move || deadline.get().map(deadline_input_value).unwrap_or_default()
                prop:disabled=move || !enabled.get()
                on:change=on_change
            />
            <Show when=move || enabled.get() && deadline.get().is_some()>
                <button
                    class="deadline-clear-btn"
                    title="Clear deadline"
                    on:click={
                        let port = port.clone();
                        move |_| port.set_deadline(task_id, None)
                    }
                >
                    "✗"
                </button>
            </Show>
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_input_value_round_trips_to_the_minute() {
        let deadline = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        assert_eq!(deadline_input_value(deadline), "2024-03-01T14:30");
        assert_eq!(parse_deadline_input("2024-03-01T14:30"), Ok(Some(deadline)));
    }

    #[test]
    fn test_empty_input_clears() {
        assert_eq!(parse_deadline_input(""), Ok(None));
        assert_eq!(parse_deadline_input("  "), Ok(None));
    }

    #[test]
    fn test_seconds_and_garbage() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 15).unwrap();
        assert_eq!(parse_deadline_input("2024-03-01T14:30:15"), Ok(Some(expected)));
        assert!(parse_deadline_input("tomorrow").is_err());
    }

    #[test]
    fn test_past_deadline_is_overdue() {
        assert!(is_overdue(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(format_deadline(Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap()), "Mar 1, 09:05");
    }
}

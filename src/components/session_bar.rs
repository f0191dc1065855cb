//! Session Bar Component
//!
//! Current user with sign out, or a compact sign-in form. Either action
//! reloads the page so session, board and sockets start fresh.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::store::{use_app_store, AppStateStoreFields};

/// The login view answers bad credentials with 400
fn login_error_message(e: &ApiError) -> String {
    if e.is_auth() || matches!(e, ApiError::Status { status: 400, .. }) {
        "Wrong username or password".to_string()
    } else {
        e.to_string()
    }
}

fn reload_page() {
    if let Some(win) = web_sys::window() {
        if let Err(e) = win.location().reload() {
            log::error!("page reload failed: {:?}", e);
        }
    }
}

#[component]
pub fn SessionBar() -> impl IntoView {
    let store = use_app_store();
    let api = use_context::<ApiClient>().expect("ApiClient should be provided");

    let username = move || store.current_user().with(|user| user.as_ref().map(|u| u.username.clone()));

    let logout_api = api.clone();
    let sign_out = move |_| {
        let api = logout_api.clone();
        spawn_local(async move {
            match api.logout().await {
                Ok(()) => reload_page(),
                Err(e) => log::error!("sign out failed: {}", e),
            }
        });
    };

    view! {
        <div class="session-bar">
            {move || match username() {
                Some(name) => view! {
                    <span class="session-user">{name}</span>
                    <button class="sign-out-btn" on:click=sign_out.clone()>"Sign out"</button>
                }.into_any(),
                None => view! { <LoginForm api=api.clone() /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn LoginForm(api: ApiClient) -> impl IntoView {
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    let sign_in = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = username.get();
        let secret = password.get();
        if name.trim().is_empty() || secret.is_empty() {
            return;
        }
        let api = api.clone();
        spawn_local(async move {
            match api.login(name.trim(), &secret).await {
                Ok(()) => reload_page(),
                Err(e) => {
                    log::warn!("sign in failed: {}", e);
                    set_error.set(Some(login_error_message(&e)));
                }
            }
        });
    };

    view! {
        <form class="login-form" on:submit=sign_in>
            <input
                type="text"
                placeholder="Username"
                autocomplete="username"
                prop:value=move || username.get()
                on:input=move |ev| set_username.set(event_target_value(&ev))
            />
            <input
                type="password"
                placeholder="Password"
                autocomplete="current-password"
                prop:value=move || password.get()
                on:input=move |ev| set_password.set(event_target_value(&ev))
            />
            <button type="submit">"Sign in"</button>
            {move || error.get().map(|e| view! { <span class="login-error">{e}</span> })}
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ApiError {
        ApiError::Status {
            status,
            message: "Invalid credentials".to_string(),
        }
    }

    #[test]
    fn test_rejected_credentials_read_as_wrong_password() {
        for code in [400, 401, 403] {
            assert_eq!(login_error_message(&status(code)), "Wrong username or password");
        }
    }

    #[test]
    fn test_other_failures_keep_their_message() {
        assert_eq!(login_error_message(&status(500)), status(500).to_string());
        let offline = ApiError::Network("offline".to_string());
        assert_eq!(login_error_message(&offline), "network error: offline");
    }
}

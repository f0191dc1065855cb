//! Kanban Board Frontend Entry Point

mod api;
mod app;
mod authz;
mod chat;
mod components;
mod config;
mod context;
mod drag;
mod error;
mod intent;
mod models;
mod store;

use app::App;
use config::ClientConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let config = ClientConfig::load();
    if let Err(e) = rolling_logger::init_logger(config.log_capacity, config.level_filter()) {
        web_sys::console::warn_1(&format!("logger already set: {}", e).into());
    }
    log::info!("starting with {:?} chat transport", config.chat_transport);

    mount_to_body(move || view! { <App config=config.clone() /> });
}

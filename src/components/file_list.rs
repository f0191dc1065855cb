//! File List Component
//!
//! Attachments of one task. Uploading happens outside this client; here the
//! files are listed, opened and deleted.

use leptos::prelude::*;

use crate::components::{ConfirmRemove, RemoveKind};
use crate::context::use_port;
use crate::models::TaskFile;

/// File type icon from the extension
fn file_icon(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => "🖼️",
        "pdf" => "📕",
        "zip" | "rar" | "7z" | "gz" | "tar" => "🗜️",
        _ => "📄",
    }
}

#[component]
pub fn FileList(task_id: u32, files: Signal<Vec<TaskFile>>, can_delete: Memo<bool>) -> impl IntoView {
    let port = use_port();

    view! {
        <div class="file-list">
            <Show when=move || files.with(|f| !f.is_empty())>
                <h4>"Files"</h4>
            </Show>
            <For
                each=move || files.get()
                key=|file| file.id
                children=move |file| {
                    let file_id = file.id;
                    let uploader = file.uploaded_by.as_ref().map(|u| u.username.clone()).unwrap_or_default();
                    let delete_port = port.clone();
                    view! {
                        <div class="file-row">
                            <span class="file-icon">{file_icon(&file.name)}</span>
                            <a class="file-name" href=file.url.clone() target="_blank" rel="noopener">
                                {file.name.clone()}
                            </a>
                            <span class="file-meta">
                                {format!("{} {}", uploader, file.uploaded_at.format("%Y-%m-%d"))}
                            </span>
                            <Show when=move || can_delete.get()>
                                <ConfirmRemove
                                    kind=RemoveKind::File
                                    on_confirm={
                                        let delete_port = delete_port.clone();
                                        move |_| delete_port.delete_file(task_id, file_id)
                                    }
                                />
                            </Show>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_icon_by_extension() {
        assert_eq!(file_icon("Screenshot.PNG"), "🖼️");
        assert_eq!(file_icon("invoice.pdf"), "📕");
        assert_eq!(file_icon("README"), "📄");
    }
}

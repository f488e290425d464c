//! File upload component with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// Image extensions accepted by the picker and the drop zone, each with
/// the MIME type sent for it on upload.
///
/// This is a courtesy filter only -- the accepted bytes are forwarded to
/// the service without further type or size validation. The single table
/// keeps the filter and the MIME guess from drifting apart.
pub const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
];

/// Check whether a filename has an allowed image extension.
fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_TYPES
            .iter()
            .any(|(allowed, _)| allowed.eq_ignore_ascii_case(ext))
    })
}

/// The MIME type for a filename, from its extension. Unknown extensions
/// fall back to the generic binary type; the service decides what it
/// actually accepts.
#[must_use]
pub fn mime_for(filename: &str) -> &'static str {
    filename
        .rsplit_once('.')
        .and_then(|(_, ext)| {
            IMAGE_TYPES
                .iter()
                .find(|(allowed, _)| allowed.eq_ignore_ascii_case(ext))
                .map(|&(_, mime)| mime)
        })
        .unwrap_or("application/octet-stream")
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the raw file bytes and filename once a file is read.
    on_upload: EventHandler<(Vec<u8>, String)>,
}

/// A drop zone with a file picker button, sized for the action sidebar.
///
/// When a file is selected (picker or drag-and-drop), reads the bytes
/// and fires `on_upload` with `(bytes, filename)`.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut rejected = use_signal(|| Option::<String>::None);

    // Shared by the picker and drag-and-drop paths so the
    // filter/read/callback logic lives in one place.
    let process_files = move |files: Vec<FileData>| async move {
        if let Some(file) = files.first() {
            let name = file.name();
            if !has_allowed_extension(&name) {
                rejected.set(Some(name));
                return;
            }
            if let Ok(bytes) = file.read_bytes().await {
                rejected.set(None);
                props.on_upload.call((bytes.to_vec(), name));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "upload-zone dragging"
    } else {
        "upload-zone"
    };
    let accept = IMAGE_TYPES
        .iter()
        .map(|(ext, _)| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = rejected() {
                p { class: "upload-rejected", "Not an image file: {name}" }
            }

            label { class: "menu-item",
                input {
                    r#type: "file",
                    id: "input-upload-file",
                    accept: "{accept}",
                    class: "hidden-input",
                    onchange: handle_files,
                }
                "Upload Image"
            }
        }
    }
}

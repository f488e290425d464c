use std::rc::Rc;

use dioxus::prelude::*;
use visage_io::{
    CaptureDevice, FileUpload, HttpFaceService, ResultPanels, RotateForm, mime_for, trigger_export,
};
use visage_session::service::{FaceService, ImagePayload};
use visage_session::state::Rotation;
use visage_session::view::{View, render};
use visage_session::{Dispatcher, OpResponse};

fn main() {
    dioxus::launch(app);
}

fn log_error(message: &str) {
    web_sys::console::error_1(&message.into());
}

/// Root application component.
///
/// Owns the dispatcher and capture device, wires the sidebar actions to
/// dispatches, and projects the session state through the pure renderer
/// after every settled transition.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    let mut dispatcher = use_signal(Dispatcher::new);
    let capture = use_hook(|| Rc::new(CaptureDevice::new()));
    let mut sidebar_open = use_signal(|| false);
    let mut point_count = use_signal(String::new);
    let mut device_error = use_signal(|| Option::<String>::None);

    // --- Upload dispatch, shared by the file picker and the camera ---
    let mut run_upload = move |bytes: Vec<u8>, filename: String| {
        let ticket = dispatcher.write().upload_begin();
        spawn(async move {
            let payload = ImagePayload {
                mime_type: mime_for(&filename).to_owned(),
                filename,
                bytes,
            };
            let outcome = HttpFaceService::default()
                .upload(payload)
                .await
                .map(OpResponse::Upload);
            dispatcher.write().settle(ticket, outcome);
        });
    };

    // --- Session toggle: open the sidebar, or exit and tear down ---
    let capture_for_toggle = Rc::clone(&capture);
    let on_toggle = move |_| {
        if sidebar_open() {
            // Session exit: release the camera first, then clear the
            // session. Both are idempotent.
            capture_for_toggle.release();
            dispatcher.write().reset();
            device_error.set(None);
            point_count.set(String::new());
            sidebar_open.set(false);
        } else {
            sidebar_open.set(true);
        }
    };

    // --- Camera ---
    let capture_for_start = Rc::clone(&capture);
    let on_start_camera = move |_| {
        let device = Rc::clone(&capture_for_start);
        spawn(async move {
            match device.acquire().await {
                Ok(()) => device_error.set(None),
                Err(err) => device_error.set(Some(err.to_string())),
            }
        });
    };

    let capture_for_frame = Rc::clone(&capture);
    let on_capture_photo = move |_| {
        let device = Rc::clone(&capture_for_frame);
        spawn(async move {
            match device.capture_frame().await {
                Ok(payload) => {
                    device_error.set(None);
                    run_upload(payload.bytes, payload.filename);
                }
                Err(err) => device_error.set(Some(err.to_string())),
            }
        });
    };

    // --- Pipeline actions ---
    let on_detect = move |_| {
        // The count input defaults to 0 when absent or unparseable and
        // is forwarded to the service as-is.
        let count: u32 = point_count().trim().parse().unwrap_or(0);
        let Some(ticket) = dispatcher.write().detect_begin(count) else {
            return;
        };
        spawn(async move {
            let outcome = HttpFaceService::default()
                .detect(count)
                .await
                .map(OpResponse::Detect);
            dispatcher.write().settle(ticket, outcome);
        });
    };

    let on_triangulate = move |_| {
        let Some(ticket) = dispatcher.write().triangulate_begin() else {
            return;
        };
        spawn(async move {
            let outcome = HttpFaceService::default()
                .triangulate()
                .await
                .map(OpResponse::Triangulate);
            dispatcher.write().settle(ticket, outcome);
        });
    };

    let on_rotate_open = move |_| {
        dispatcher.write().rotate_open();
    };

    let on_rotate_submit = move |angles: Rotation| {
        let Some(ticket) = dispatcher.write().rotate_begin(angles) else {
            return;
        };
        spawn(async move {
            let outcome = HttpFaceService::default()
                .rotate(angles)
                .await
                .map(OpResponse::Rotate);
            dispatcher.write().settle(ticket, outcome);
        });
    };

    let on_rotate_close = move |()| {
        dispatcher.write().rotate_close();
    };

    let on_export = move |_| {
        if let Err(err) = trigger_export("") {
            log_error(&err.to_string());
        }
    };

    // --- Layout ---
    let view = render(dispatcher.read().state());
    let toggle_label = if sidebar_open() { "Exit" } else { "Start" };

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/style.css") }

        header { class: "topbar",
            h1 { "visage" }
            button { id: "btn-session-toggle", class: "menu-item", onclick: on_toggle,
                "{toggle_label}"
            }
        }

        div { class: "layout",
            if sidebar_open() {
                aside { id: "sidebar", class: "sidebar",
                    FileUpload { on_upload: move |(bytes, name)| run_upload(bytes, name) }

                    button { id: "btn-start-camera", class: "menu-item", onclick: on_start_camera,
                        "Use Camera"
                    }
                    button { id: "btn-capture", class: "menu-item", onclick: on_capture_photo,
                        "Capture Photo"
                    }

                    if let Some(ref message) = device_error() {
                        p { class: "camera-error", "{message}" }
                    }

                    label { class: "point-count",
                        "Points"
                        input {
                            id: "input-point-count",
                            r#type: "number",
                            min: "0",
                            placeholder: "0",
                            value: "{point_count}",
                            oninput: move |evt| point_count.set(evt.value()),
                        }
                    }
                    button { id: "btn-detect", class: "menu-item", onclick: on_detect,
                        "Detect Landmarks"
                    }
                    button { id: "btn-triangulate", class: "menu-item", onclick: on_triangulate,
                        "Triangulate"
                    }
                    button { id: "btn-rotate", class: "menu-item", onclick: on_rotate_open,
                        "Rotate"
                    }
                    button { id: "btn-export", class: "menu-item", onclick: on_export,
                        "Export"
                    }
                }
            }

            main { class: "main-content",
                match view {
                    View::Intro => rsx! {
                        p { id: "intro-message", class: "intro",
                            "Start a session, then upload a photo or capture one to begin."
                        }
                    },
                    View::Busy(op) => rsx! {
                        p { class: "busy", "{op.busy_message()}" }
                    },
                    View::Error(message) => rsx! {
                        div { class: "error-panel",
                            h2 { "Error" }
                            p { "{message}" }
                        }
                    },
                    View::RotateUnavailable => rsx! {
                        div { class: "notice-panel",
                            h2 { "Nothing to rotate yet" }
                            p { "Upload an image and run a processing step first." }
                        }
                    },
                    View::RotateForm { rotation, image } => rsx! {
                        RotateForm {
                            key: "{rotation.x}:{rotation.y}:{rotation.z}",
                            rotation,
                            image,
                            on_submit: on_rotate_submit,
                            on_close: on_rotate_close,
                        }
                    },
                    View::Results(panels) => rsx! {
                        ResultPanels { panels }
                    },
                }
            }
        }
    }
}

//! visage-io: Browser I/O and Dioxus component library.
//!
//! Implements the remote-service contract over `fetch`, wraps the
//! platform camera as an acquirable/releasable resource, triggers the
//! export download, and provides the UI components the visage app
//! composes: upload zone, result panel grid, and the rotate form.

pub mod capture;
pub mod components;
pub mod export;
pub mod http;

pub use capture::{CaptureDevice, CaptureError, DEVICE_ERROR_MESSAGE};
pub use components::{FileUpload, ResultPanels, RotateForm, mime_for};
pub use export::trigger_export;
pub use http::HttpFaceService;

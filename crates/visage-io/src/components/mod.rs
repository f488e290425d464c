//! Dioxus UI components for visage.
//!
//! Provides the file upload zone, the result panel grid, and the
//! three-angle rotate form. The intro, busy, notice, and error views are
//! simple enough that the app renders them inline.

mod panels;
mod rotate_form;
mod upload;

pub use panels::ResultPanels;
pub use rotate_form::RotateForm;
pub use upload::{FileUpload, mime_for};

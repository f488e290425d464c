//! Export: hand the browser a download of the current server-side result.
//!
//! The export endpoint is plain navigation -- the service sets the
//! download headers. Dioxus has no built-in navigation-download API, so
//! this programmatically clicks a temporary `<a download>` element.
//!
//! Requires a browser environment (`wasm32-unknown-unknown` target).

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

/// Errors that can occur when triggering the export download.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for ExportError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Navigate to the export endpoint via a temporary anchor click.
///
/// `base_url` is the same prefix the HTTP service uses; empty for
/// same-origin.
///
/// # Errors
///
/// Returns [`ExportError::JsError`] if any browser API call fails
/// (element creation, DOM attachment).
pub fn trigger_export(base_url: &str) -> Result<(), ExportError> {
    let window =
        web_sys::window().ok_or_else(|| ExportError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ExportError::JsError("no document".into()))?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| ExportError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(&format!("{base_url}/export"));
    // The service names the file via Content-Disposition; the empty
    // download attribute keeps the click from navigating away.
    anchor.set_download("");

    let body = document
        .body()
        .ok_or_else(|| ExportError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // Best-effort cleanup -- the download is already initiated.
    let _ = body.remove_child(&anchor);

    Ok(())
}

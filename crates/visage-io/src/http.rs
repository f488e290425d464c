//! HTTP implementation of the remote service contract over `fetch`.
//!
//! [`HttpFaceService`] builds one request per pipeline call, awaits the
//! browser's `fetch`, and maps the response body into the typed shapes
//! from `visage-session`. Non-success responses are parsed as
//! `{"error": ...}` bodies; anything unparseable falls back to the fixed
//! user message downstream.

use serde::de::DeserializeOwned;
use visage_session::service::{
    DetectResponse, FaceService, ImagePayload, RotateResponse, ServiceError, TriangulateResponse,
    UploadResponse,
};
use visage_session::state::Rotation;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Request, RequestInit, Response};

/// The remote face-processing service, reached via the browser `fetch`
/// API. Cheap to construct; holds only the base URL.
#[derive(Debug, Clone, Default)]
pub struct HttpFaceService {
    /// Prefix for every request path. Empty for same-origin.
    base_url: String,
}

impl HttpFaceService {
    /// Create a client against the given base URL (no trailing slash).
    /// An empty base targets the page's own origin.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Issue a request and decode the success body as `T`.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    async fn fetch_json<T: DeserializeOwned>(request: &Request) -> Result<T, ServiceError> {
        let window = web_sys::window()
            .ok_or_else(|| ServiceError::Transport("no global window".into()))?;

        let response: Response = JsFuture::from(window.fetch_with_request(request))
            .await
            .map_err(js_transport)?
            .dyn_into()
            .map_err(|_| ServiceError::Transport("fetch did not yield a Response".into()))?;

        let body = JsFuture::from(response.text().map_err(js_transport)?)
            .await
            .map_err(js_transport)?
            .as_string()
            .unwrap_or_default();

        if !response.ok() {
            return Err(ServiceError::from_error_body(&body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ServiceError::Transport(format!("unexpected response body: {e}")))
    }

    fn post(&self, path: &str) -> Result<Request, ServiceError> {
        let init = RequestInit::new();
        init.set_method("POST");
        Request::new_with_str_and_init(&self.url(path), &init).map_err(js_transport)
    }
}

impl FaceService for HttpFaceService {
    #[allow(clippy::future_not_send)]
    async fn upload(&self, image: ImagePayload) -> Result<UploadResponse, ServiceError> {
        // Multipart body with a single binary part named "file".
        let bytes = js_sys::Uint8Array::from(image.bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&bytes.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(&image.mime_type);
        let blob =
            Blob::new_with_buffer_source_sequence_and_options(&parts, &opts).map_err(js_transport)?;

        let form = FormData::new().map_err(js_transport)?;
        form.append_with_blob_and_filename("file", &blob, &image.filename)
            .map_err(js_transport)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);
        let request = Request::new_with_str_and_init(&self.url("/upload_image"), &init)
            .map_err(js_transport)?;

        Self::fetch_json(&request).await
    }

    #[allow(clippy::future_not_send)]
    async fn detect(&self, num_points: u32) -> Result<DetectResponse, ServiceError> {
        // The count rides in the path, forwarded as given -- 0 included.
        let request = self.post(&format!("/detect_landmarks/{num_points}"))?;
        Self::fetch_json(&request).await
    }

    #[allow(clippy::future_not_send)]
    async fn triangulate(&self) -> Result<TriangulateResponse, ServiceError> {
        let request = self.post("/triangulate")?;
        Self::fetch_json(&request).await
    }

    #[allow(clippy::future_not_send)]
    async fn rotate(&self, angles: Rotation) -> Result<RotateResponse, ServiceError> {
        // Absolute degrees in the path, exactly as submitted.
        let request = self.post(&format!("/rotate/{}/{}/{}", angles.x, angles.y, angles.z))?;
        Self::fetch_json(&request).await
    }
}

fn js_transport(value: JsValue) -> ServiceError {
    ServiceError::Transport(format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let svc = HttpFaceService::new("http://localhost:5000");
        assert_eq!(svc.url("/triangulate"), "http://localhost:5000/triangulate");

        let same_origin = HttpFaceService::default();
        assert_eq!(same_origin.url("/upload_image"), "/upload_image");
    }

    #[test]
    fn rotate_path_carries_angles_verbatim() {
        let angles = Rotation::new(15.0, 0.0, -7.5);
        let path = format!("/rotate/{}/{}/{}", angles.x, angles.y, angles.z);
        assert_eq!(path, "/rotate/15/0/-7.5");
    }
}

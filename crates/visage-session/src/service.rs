//! Remote service contract: typed requests, responses, and errors.
//!
//! The processing service (landmark detection, triangulation, 3-D
//! rotation) is consumed, never reproduced. This module defines the wire
//! shapes and the [`FaceService`] trait the dispatcher is driven against;
//! the HTTP implementation lives in `visage-io`, and tests use scripted
//! in-memory implementations.

use serde::{Deserialize, Serialize};

use crate::state::Rotation;

/// Shown when the service fails without a usable error body.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong while processing the image.";

/// An image resource on its way to the upload endpoint.
///
/// Either a user-chosen file or a frame captured from the camera -- the
/// upload controller does not distinguish the two. No client-side type or
/// size validation is performed; the service is the arbiter.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// File name sent in the multipart part (e.g. `capture.png`).
    pub filename: String,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Raw encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Success body of the upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URL of the stored original image.
    pub original_image_url: String,
}

/// Success body of the landmark detection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectResponse {
    /// Original image with landmarks drawn onto it.
    pub detected_image_url: String,
    /// Landmarks alone on a blank background.
    pub points_only_url: String,
}

/// Success body of the triangulation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangulateResponse {
    /// Original image with the Delaunay mesh drawn onto it.
    pub triangulated_image_url: String,
    /// The mesh alone on a blank background.
    pub triangulation_only_url: String,
    /// Landmarks-only image, when the service includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_only_url: Option<String>,
}

/// Success body of the rotate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateResponse {
    /// The reprocessed image after applying the requested angles.
    pub reprocessed_image_url: String,
}

/// Failure body the service sends on non-success responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason supplied by the service.
    pub error: String,
}

/// Errors produced while talking to the remote service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// The service answered with a non-success status.
    ///
    /// `message` is the server-supplied reason when the body was a
    /// parseable `{"error": ...}` object, `None` otherwise.
    #[error("service rejected the request: {}", message.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE))]
    Remote {
        /// Server-supplied reason, if the error body was parseable.
        message: Option<String>,
    },

    /// The request never settled into an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Build a `Remote` error from a non-success response body.
    ///
    /// A parseable `{"error": ...}` body yields the server's message;
    /// anything else (empty, truncated, non-JSON) yields `None`, which
    /// renders as [`FALLBACK_ERROR_MESSAGE`].
    #[must_use]
    pub fn from_error_body(body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error);
        Self::Remote { message }
    }

    /// The message to show the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
            } => message.clone(),
            Self::Remote { message: None } | Self::Transport(_) => {
                FALLBACK_ERROR_MESSAGE.to_owned()
            }
        }
    }
}

/// The remote face-processing service, one method per pipeline call.
///
/// Implementations issue the actual requests (`visage-io` over fetch);
/// the dispatcher only ever sees the typed results.
#[allow(async_fn_in_trait)] // WASM is single-threaded; Send bounds are not needed
pub trait FaceService {
    /// Upload an image resource. Multipart body with one binary part.
    async fn upload(&self, image: ImagePayload) -> Result<UploadResponse, ServiceError>;

    /// Detect landmarks. The count is embedded in the request path and
    /// forwarded as given -- `0` included.
    async fn detect(&self, num_points: u32) -> Result<DetectResponse, ServiceError>;

    /// Triangulate the detected or derived landmarks. No parameters.
    async fn triangulate(&self) -> Result<TriangulateResponse, ServiceError>;

    /// Reprocess with three absolute angles, embedded in the path as
    /// given (not normalized).
    async fn rotate(&self, angles: Rotation) -> Result<RotateResponse, ServiceError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_parses_service_fixture() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"original_image_url": "/s/o1.png"}"#).unwrap();
        assert_eq!(resp.original_image_url, "/s/o1.png");
    }

    #[test]
    fn detect_response_parses_service_fixture() {
        let resp: DetectResponse = serde_json::from_str(
            r#"{"detected_image_url": "/s/d1.png", "points_only_url": "/s/p1.png"}"#,
        )
        .unwrap();
        assert_eq!(resp.detected_image_url, "/s/d1.png");
        assert_eq!(resp.points_only_url, "/s/p1.png");
    }

    #[test]
    fn triangulate_response_points_only_is_optional() {
        let without: TriangulateResponse = serde_json::from_str(
            r#"{"triangulated_image_url": "/s/t1.png", "triangulation_only_url": "/s/to1.png"}"#,
        )
        .unwrap();
        assert_eq!(without.points_only_url, None);

        let with: TriangulateResponse = serde_json::from_str(
            r#"{"triangulated_image_url": "/s/t1.png",
                "triangulation_only_url": "/s/to1.png",
                "points_only_url": "/s/p1.png"}"#,
        )
        .unwrap();
        assert_eq!(with.points_only_url.as_deref(), Some("/s/p1.png"));
    }

    #[test]
    fn error_body_with_message_is_surfaced() {
        let err = ServiceError::from_error_body(r#"{"error": "bad image"}"#);
        assert_eq!(err.user_message(), "bad image");
    }

    #[test]
    fn unparseable_error_body_falls_back() {
        for body in ["", "<html>502</html>", r#"{"detail": "nope"}"#] {
            let err = ServiceError::from_error_body(body);
            assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE, "body: {body:?}");
        }
    }

    #[test]
    fn transport_errors_fall_back() {
        let err = ServiceError::Transport("connection refused".into());
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }
}

//! Session state: the single record of pipeline progress.
//!
//! [`SessionState`] holds every artifact handle the remote service has
//! produced so far, plus the transient presentation fields (busy marker,
//! error message, rotate notice) the renderer projects from. All mutation
//! goes through [`crate::dispatch::Dispatcher`]; nothing else writes here.

use crate::dispatch::Operation;

/// Opaque reference to a displayable image artifact.
///
/// Either a locally-constructed preview (Blob URL) or a server-returned
/// URL path -- the renderer treats both identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle(String);

impl ImageHandle {
    /// Wrap a URL (or URL path) as an image handle.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The underlying URL, suitable for an `<img src>` attribute.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }
}

impl From<String> for ImageHandle {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Absolute rotation angles in degrees around the three axes.
///
/// Always the angles of the *last accepted* rotate request -- replaced
/// wholesale on success, never accumulated across requests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Rotation around the horizontal axis (pitch), degrees.
    pub x: f64,
    /// Rotation around the vertical axis (yaw), degrees.
    pub y: f64,
    /// Rotation around the depth axis (roll), degrees.
    pub z: f64,
}

impl Rotation {
    /// Create a rotation from three absolute angles in degrees.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The orchestrator's current position in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// No session activity yet.
    #[default]
    Idle,
    /// An original image has been accepted by the service.
    Uploaded,
    /// Landmark detection has produced artifacts.
    Detected,
    /// Triangulation has produced artifacts.
    Triangulated,
    /// The rotate form is open (resumable submit/reopen loop).
    RotateActive,
    /// The last operation failed; the error view replaces all content.
    Error,
}

/// The single mutable record of pipeline progress for one page view.
///
/// Created empty when the session becomes active and fully cleared by
/// [`SessionState::reset`] on session exit. Artifact handles are only
/// ever written by successful dispatches; failures leave prior progress
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Current pipeline stage.
    pub stage: Stage,
    /// The accepted original image. Set once per upload/capture.
    pub original_image: Option<ImageHandle>,
    /// Original with landmarks drawn onto it.
    pub detected_image: Option<ImageHandle>,
    /// Landmarks alone, on a blank background.
    pub points_only_image: Option<ImageHandle>,
    /// Original with the Delaunay mesh drawn onto it.
    pub triangulated_image: Option<ImageHandle>,
    /// The Delaunay mesh alone, on a blank background.
    pub triangulation_only_image: Option<ImageHandle>,
    /// The artifact used as the base for the next rotate call.
    /// Non-empty only after at least one successful upload.
    pub last_displayed_image: Option<ImageHandle>,
    /// Angles of the last accepted rotate request.
    pub rotation: Rotation,
    /// Landmark count requested at detect time. `0` when the input is
    /// absent or unset; forwarded to the service without validation.
    pub num_points_requested: u32,

    // -- Transient presentation fields --
    /// The operation currently awaiting a response, if any.
    pub busy: Option<Operation>,
    /// Message for the error view. `Some` only when `stage == Error`.
    pub error: Option<String>,
    /// Whether the "nothing to rotate yet" notice should be shown.
    pub rotate_unavailable: bool,
}

impl SessionState {
    /// A fresh, empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether landmark detection may be requested.
    #[must_use]
    pub const fn can_detect(&self) -> bool {
        self.original_image.is_some()
    }

    /// Whether triangulation may be requested.
    ///
    /// Depends only on the original image -- triangulation may be
    /// requested directly after upload, without detecting first.
    #[must_use]
    pub const fn can_triangulate(&self) -> bool {
        self.original_image.is_some()
    }

    /// Whether the rotate form may be opened.
    #[must_use]
    pub const fn can_rotate(&self) -> bool {
        self.last_displayed_image.is_some()
    }

    /// Return every field to its empty default. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_permits_nothing() {
        let state = SessionState::new();
        assert_eq!(state.stage, Stage::Idle);
        assert!(!state.can_detect());
        assert!(!state.can_triangulate());
        assert!(!state.can_rotate());
    }

    #[test]
    fn guards_follow_original_image() {
        let mut state = SessionState::new();
        state.original_image = Some(ImageHandle::new("/s/o1.png"));
        assert!(state.can_detect());
        assert!(state.can_triangulate());
        // Rotate tracks last_displayed_image, not original_image.
        assert!(!state.can_rotate());

        state.last_displayed_image = Some(ImageHandle::new("/s/o1.png"));
        assert!(state.can_rotate());
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = SessionState::new();
        state.stage = Stage::Detected;
        state.original_image = Some(ImageHandle::new("/s/o1.png"));
        state.detected_image = Some(ImageHandle::new("/s/d1.png"));
        state.last_displayed_image = Some(ImageHandle::new("/s/d1.png"));
        state.rotation = Rotation::new(15.0, 0.0, -5.0);
        state.num_points_requested = 68;
        state.error = Some("bad image".into());

        state.reset();
        assert_eq!(state.stage, Stage::Idle);
        assert!(state.original_image.is_none());
        assert!(state.detected_image.is_none());
        assert!(state.last_displayed_image.is_none());
        assert_eq!(state.rotation, Rotation::default());
        assert_eq!(state.num_points_requested, 0);
        assert!(state.error.is_none());

        // Resetting an already-empty session is a no-op.
        state.reset();
        assert_eq!(state.stage, Stage::Idle);
    }

    #[test]
    fn rotation_default_is_zero() {
        let r = Rotation::default();
        assert!((r.x).abs() < f64::EPSILON);
        assert!((r.y).abs() < f64::EPSILON);
        assert!((r.z).abs() < f64::EPSILON);
    }
}

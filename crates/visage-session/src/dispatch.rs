//! The dispatcher: single writer for [`SessionState`].
//!
//! Every remote operation is bracketed by two synchronous calls:
//! a `*_begin` method that validates the stage preconditions, marks the
//! session busy, and issues a fenced [`Ticket`]; and [`Dispatcher::settle`],
//! which applies the settled outcome only if the ticket is still the
//! latest issued for its controller. Responses superseded by a newer
//! dispatch (or by a session reset) are discarded as [`Settlement::Stale`]
//! instead of silently overwriting fresher state.
//!
//! The async service call itself happens between the two brackets, in
//! whatever executor the caller uses -- the dispatcher never suspends.

use crate::service::{
    DetectResponse, RotateResponse, ServiceError, TriangulateResponse, UploadResponse,
};
use crate::state::{ImageHandle, Rotation, SessionState, Stage};

/// A remote pipeline operation, one per controller.
///
/// `Rotate` covers the submit phase only; opening the rotate form is a
/// local transition with no remote call ([`Dispatcher::rotate_open`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Send an image resource to the service.
    Upload,
    /// Request landmark detection on the uploaded original.
    Detect,
    /// Request Delaunay triangulation on the uploaded original.
    Triangulate,
    /// Submit three absolute angles for reprocessing.
    Rotate,
}

impl Operation {
    /// Transient message shown while this operation is outstanding.
    #[must_use]
    pub const fn busy_message(self) -> &'static str {
        match self {
            Self::Upload => "Uploading image...",
            Self::Detect => "Detecting landmarks...",
            Self::Triangulate => "Triangulating...",
            Self::Rotate => "Rotating image...",
        }
    }

    const fn fence_index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Detect => 1,
            Self::Triangulate => 2,
            Self::Rotate => 3,
        }
    }
}

/// Proof that a dispatch was issued, carrying its fencing token.
///
/// Consumed by [`Dispatcher::settle`]; a ticket can settle at most once.
#[derive(Debug)]
pub struct Ticket {
    op: Operation,
    token: u64,
    /// Angles submitted with a rotate dispatch. The service echoes only
    /// the reprocessed image, so the accepted angles travel on the ticket.
    angles: Option<Rotation>,
}

impl Ticket {
    /// The operation this ticket was issued for.
    #[must_use]
    pub const fn op(&self) -> Operation {
        self.op
    }
}

/// Typed success payload for [`Dispatcher::settle`], one variant per
/// controller.
#[derive(Debug, Clone)]
pub enum OpResponse {
    /// Settled upload call.
    Upload(UploadResponse),
    /// Settled detect call.
    Detect(DetectResponse),
    /// Settled triangulate call.
    Triangulate(TriangulateResponse),
    /// Settled rotate call.
    Rotate(RotateResponse),
}

/// What [`Dispatcher::settle`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The outcome was current and has been applied to the session.
    Applied,
    /// A newer dispatch (or a reset) superseded this ticket; the outcome
    /// was discarded without touching the session.
    Stale,
}

/// Monotonic per-controller fencing tokens.
#[derive(Debug, Default)]
struct Fences([u64; 4]);

impl Fences {
    fn bump(&mut self, op: Operation) -> u64 {
        let slot = &mut self.0[op.fence_index()];
        *slot += 1;
        *slot
    }

    const fn current(&self, op: Operation) -> u64 {
        self.0[op.fence_index()]
    }

    /// Invalidate every outstanding ticket (used on session reset).
    fn bump_all(&mut self) {
        for slot in &mut self.0 {
            *slot += 1;
        }
    }
}

/// Owns the session state and serializes all mutation through itself.
#[derive(Debug, Default)]
pub struct Dispatcher {
    state: SessionState,
    fences: Fences,
}

impl Dispatcher {
    /// A dispatcher over a fresh, empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the session state (for rendering).
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    fn issue(&mut self, op: Operation) -> Ticket {
        self.state.rotate_unavailable = false;
        self.state.busy = Some(op);
        Ticket {
            op,
            token: self.fences.bump(op),
            angles: None,
        }
    }

    /// Begin an upload dispatch. No precondition: upload is always the
    /// way back into the pipeline.
    pub fn upload_begin(&mut self) -> Ticket {
        self.issue(Operation::Upload)
    }

    /// Begin a detect dispatch, recording the landmark count read from
    /// the UI at this moment (`0` when the input was unset).
    ///
    /// Returns `None` without issuing anything when no original image
    /// exists yet -- a silent no-op, not an error.
    pub fn detect_begin(&mut self, num_points: u32) -> Option<Ticket> {
        if !self.state.can_detect() {
            return None;
        }
        self.state.num_points_requested = num_points;
        Some(self.issue(Operation::Detect))
    }

    /// Begin a triangulate dispatch.
    ///
    /// Returns `None` without issuing anything when no original image
    /// exists yet. The precondition deliberately ignores whether detect
    /// has run: triangulation is an independent branch off the upload.
    pub fn triangulate_begin(&mut self) -> Option<Ticket> {
        if !self.state.can_triangulate() {
            return None;
        }
        Some(self.issue(Operation::Triangulate))
    }

    /// Rotate phase 1: open the angle form, seeded with the current
    /// rotation. Purely local, no remote call.
    ///
    /// With nothing displayed yet this instead raises the
    /// "nothing to rotate yet" notice -- a visible guard, unlike the
    /// silent detect/triangulate skips.
    pub fn rotate_open(&mut self) {
        if self.state.can_rotate() {
            self.state.rotate_unavailable = false;
            self.state.error = None;
            self.state.stage = Stage::RotateActive;
        } else {
            self.state.rotate_unavailable = true;
        }
    }

    /// Leave the rotate form and return to the result view.
    pub fn rotate_close(&mut self) {
        if self.state.stage == Stage::RotateActive {
            self.state.stage = results_stage(&self.state);
        }
    }

    /// Rotate phase 2: begin a submit dispatch with the angles as given
    /// (absolute degrees, not normalized, not accumulated).
    ///
    /// Returns `None` when nothing is displayed; only reachable that way
    /// if the form outlived the session it was opened for.
    pub fn rotate_begin(&mut self, angles: Rotation) -> Option<Ticket> {
        if !self.state.can_rotate() {
            return None;
        }
        let mut ticket = self.issue(Operation::Rotate);
        ticket.angles = Some(angles);
        Some(ticket)
    }

    /// Apply a settled outcome, unless the ticket has been superseded.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<OpResponse, ServiceError>,
    ) -> Settlement {
        if ticket.token != self.fences.current(ticket.op) {
            return Settlement::Stale;
        }
        if self.state.busy == Some(ticket.op) {
            self.state.busy = None;
        }
        match outcome {
            Ok(response) => self.apply_success(&ticket, response),
            Err(err) => {
                // Failures replace the view but never roll back
                // previously acquired artifacts.
                self.state.stage = Stage::Error;
                self.state.error = Some(err.user_message());
            }
        }
        Settlement::Applied
    }

    /// Session exit: return to the empty session and invalidate every
    /// in-flight dispatch. Idempotent.
    pub fn reset(&mut self) {
        self.state.reset();
        self.fences.bump_all();
    }

    fn apply_success(&mut self, ticket: &Ticket, response: OpResponse) {
        match (ticket.op, response) {
            (Operation::Upload, OpResponse::Upload(resp)) => {
                // A new original invalidates all downstream artifacts
                // before anything is installed.
                self.state.detected_image = None;
                self.state.points_only_image = None;
                self.state.triangulated_image = None;
                self.state.triangulation_only_image = None;
                self.state.rotation = Rotation::default();

                let original = ImageHandle::new(resp.original_image_url);
                self.state.last_displayed_image = Some(original.clone());
                self.state.original_image = Some(original);
                self.state.stage = Stage::Uploaded;
                self.state.error = None;
            }
            (Operation::Detect, OpResponse::Detect(resp)) => {
                let detected = ImageHandle::new(resp.detected_image_url);
                self.state.points_only_image = Some(ImageHandle::new(resp.points_only_url));
                self.state.last_displayed_image = Some(detected.clone());
                self.state.detected_image = Some(detected);
                self.state.stage = Stage::Detected;
                self.state.error = None;
            }
            (Operation::Triangulate, OpResponse::Triangulate(resp)) => {
                let mesh_only = ImageHandle::new(resp.triangulation_only_url);
                self.state.triangulated_image =
                    Some(ImageHandle::new(resp.triangulated_image_url));
                if let Some(points) = resp.points_only_url {
                    self.state.points_only_image = Some(ImageHandle::new(points));
                }
                self.state.last_displayed_image = Some(mesh_only.clone());
                self.state.triangulation_only_image = Some(mesh_only);
                self.state.stage = Stage::Triangulated;
                self.state.error = None;
            }
            (Operation::Rotate, OpResponse::Rotate(resp)) => {
                self.state.last_displayed_image =
                    Some(ImageHandle::new(resp.reprocessed_image_url));
                if let Some(angles) = ticket.angles {
                    // Replaced wholesale -- the accepted request's angles,
                    // never a composition with earlier ones.
                    self.state.rotation = angles;
                }
                // The form reopens seeded with the new values.
                self.state.stage = Stage::RotateActive;
                self.state.error = None;
            }
            // A response of the wrong kind for the ticket cannot come out
            // of the service wrappers; if it does, fail the view rather
            // than corrupt the artifacts.
            (_, _) => {
                self.state.stage = Stage::Error;
                self.state.error = Some(crate::service::FALLBACK_ERROR_MESSAGE.to_owned());
            }
        }
    }
}

/// The stage the result view corresponds to, derived from which
/// artifacts exist.
fn results_stage(state: &SessionState) -> Stage {
    if state.triangulated_image.is_some() {
        Stage::Triangulated
    } else if state.detected_image.is_some() {
        Stage::Detected
    } else if state.original_image.is_some() {
        Stage::Uploaded
    } else {
        Stage::Idle
    }
}

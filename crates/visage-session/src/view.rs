//! Pure projection from session state to a view description.
//!
//! [`render`] is re-invoked wholesale after every accepted transition;
//! nothing patches a view in place. The result panel list is built in a
//! fixed canonical order and contains exactly the panels whose backing
//! handle exists.

use std::fmt;

use crate::dispatch::Operation;
use crate::service::FALLBACK_ERROR_MESSAGE;
use crate::state::{ImageHandle, Rotation, SessionState, Stage};

/// Identifier for one result panel, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// The uploaded or captured source image.
    Original,
    /// Original with landmarks drawn onto it.
    Detected,
    /// Original with the Delaunay mesh drawn onto it.
    Triangulated,
    /// Landmarks alone on a blank background.
    PointsOnly,
    /// The Delaunay mesh alone on a blank background.
    TriangulationOnly,
}

impl PanelKind {
    /// All panels in canonical display order:
    /// Original, Detected, Triangulated, PointsOnly, TriangulationOnly.
    pub const ALL: [Self; 5] = [
        Self::Original,
        Self::Detected,
        Self::Triangulated,
        Self::PointsOnly,
        Self::TriangulationOnly,
    ];

    /// Display label for the panel heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Detected => "Landmarks",
            Self::Triangulated => "Triangulation",
            Self::PointsOnly => "Points Only",
            Self::TriangulationOnly => "Mesh Only",
        }
    }

    /// The state field backing this panel.
    #[must_use]
    pub const fn backing(self, state: &SessionState) -> Option<&ImageHandle> {
        match self {
            Self::Original => state.original_image.as_ref(),
            Self::Detected => state.detected_image.as_ref(),
            Self::Triangulated => state.triangulated_image.as_ref(),
            Self::PointsOnly => state.points_only_image.as_ref(),
            Self::TriangulationOnly => state.triangulation_only_image.as_ref(),
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Which artifact this panel shows.
    pub kind: PanelKind,
    /// The artifact to display.
    pub image: ImageHandle,
}

/// A full description of what the page should show.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// No session activity yet: introductory message.
    Intro,
    /// A request is outstanding; show the operation's transient message.
    Busy(Operation),
    /// The last operation failed. Replaces all content; never merged
    /// with result panels.
    Error(String),
    /// Rotate was requested with nothing to rotate yet.
    RotateUnavailable,
    /// The editable angle form, seeded with the last accepted rotation
    /// and showing the image it would reprocess.
    RotateForm {
        /// Seed values for the three angle inputs.
        rotation: Rotation,
        /// The artifact the next submit is based on.
        image: ImageHandle,
    },
    /// Result panels in canonical order, one per existing artifact.
    Results(Vec<Panel>),
}

/// Project the session state into a view description.
#[must_use]
pub fn render(state: &SessionState) -> View {
    if let Some(op) = state.busy {
        return View::Busy(op);
    }
    if state.stage == Stage::Error {
        let message = state
            .error
            .clone()
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned());
        return View::Error(message);
    }
    if state.rotate_unavailable {
        return View::RotateUnavailable;
    }
    if state.stage == Stage::RotateActive {
        if let Some(image) = &state.last_displayed_image {
            return View::RotateForm {
                rotation: state.rotation,
                image: image.clone(),
            };
        }
    }

    let panels = result_panels(state);
    if panels.is_empty() {
        View::Intro
    } else {
        View::Results(panels)
    }
}

/// The result panel list: exactly the panels whose backing handle is
/// set, in canonical order.
#[must_use]
pub fn result_panels(state: &SessionState) -> Vec<Panel> {
    PanelKind::ALL
        .into_iter()
        .filter_map(|kind| {
            kind.backing(state).map(|image| Panel {
                kind,
                image: image.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn handle(url: &str) -> Option<ImageHandle> {
        Some(ImageHandle::new(url))
    }

    #[test]
    fn all_contains_every_variant_once() {
        let mut seen = std::collections::HashSet::new();
        for kind in PanelKind::ALL {
            assert!(seen.insert(kind), "duplicate panel in ALL: {kind}");
        }
        assert_eq!(PanelKind::ALL.len(), 5);
    }

    #[test]
    fn empty_state_renders_intro() {
        assert_eq!(render(&SessionState::new()), View::Intro);
    }

    #[test]
    fn uploaded_state_renders_one_panel() {
        let state = SessionState {
            stage: Stage::Uploaded,
            original_image: handle("/s/o1.png"),
            last_displayed_image: handle("/s/o1.png"),
            ..SessionState::default()
        };
        let View::Results(panels) = render(&state) else {
            panic!("expected result view");
        };
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].kind, PanelKind::Original);
        assert_eq!(panels[0].image.url(), "/s/o1.png");
    }

    #[test]
    fn panel_set_equals_set_fields_in_canonical_order() {
        // Detect ran but triangulation did not: Original, Detected,
        // PointsOnly, with the gap where Triangulated would sit.
        let state = SessionState {
            stage: Stage::Detected,
            original_image: handle("/s/o1.png"),
            detected_image: handle("/s/d1.png"),
            points_only_image: handle("/s/p1.png"),
            last_displayed_image: handle("/s/d1.png"),
            ..SessionState::default()
        };
        let kinds: Vec<PanelKind> = result_panels(&state).iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PanelKind::Original, PanelKind::Detected, PanelKind::PointsOnly]
        );
    }

    #[test]
    fn full_pipeline_renders_five_panels_in_order() {
        let state = SessionState {
            stage: Stage::Triangulated,
            original_image: handle("/s/o1.png"),
            detected_image: handle("/s/d1.png"),
            points_only_image: handle("/s/p1.png"),
            triangulated_image: handle("/s/t1.png"),
            triangulation_only_image: handle("/s/to1.png"),
            last_displayed_image: handle("/s/to1.png"),
            ..SessionState::default()
        };
        let kinds: Vec<PanelKind> = result_panels(&state).iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PanelKind::ALL.to_vec());
    }

    #[test]
    fn busy_takes_precedence_over_results() {
        let state = SessionState {
            stage: Stage::Uploaded,
            original_image: handle("/s/o1.png"),
            last_displayed_image: handle("/s/o1.png"),
            busy: Some(Operation::Detect),
            ..SessionState::default()
        };
        assert_eq!(render(&state), View::Busy(Operation::Detect));
    }

    #[test]
    fn error_view_replaces_result_panels_entirely() {
        let state = SessionState {
            stage: Stage::Error,
            original_image: handle("/s/o1.png"),
            detected_image: handle("/s/d1.png"),
            error: Some("bad image".into()),
            ..SessionState::default()
        };
        assert_eq!(render(&state), View::Error("bad image".into()));
    }

    #[test]
    fn error_view_without_message_uses_fallback() {
        let state = SessionState {
            stage: Stage::Error,
            ..SessionState::default()
        };
        assert_eq!(render(&state), View::Error(FALLBACK_ERROR_MESSAGE.into()));
    }

    #[test]
    fn rotate_notice_renders_dedicated_panel() {
        let state = SessionState {
            rotate_unavailable: true,
            ..SessionState::default()
        };
        assert_eq!(render(&state), View::RotateUnavailable);
    }

    #[test]
    fn rotate_form_is_not_a_result_panel() {
        let state = SessionState {
            stage: Stage::RotateActive,
            original_image: handle("/s/o1.png"),
            last_displayed_image: handle("/s/r1.png"),
            rotation: Rotation::new(15.0, 0.0, 0.0),
            ..SessionState::default()
        };
        let View::RotateForm { rotation, image } = render(&state) else {
            panic!("expected rotate form view");
        };
        assert_eq!(rotation, Rotation::new(15.0, 0.0, 0.0));
        assert_eq!(image.url(), "/s/r1.png");
    }

    #[test]
    fn busy_messages_are_stage_specific() {
        let messages: std::collections::HashSet<&str> = [
            Operation::Upload,
            Operation::Detect,
            Operation::Triangulate,
            Operation::Rotate,
        ]
        .into_iter()
        .map(Operation::busy_message)
        .collect();
        assert_eq!(messages.len(), 4, "each operation has its own message");
    }
}

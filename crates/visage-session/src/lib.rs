//! visage-session: Pure session orchestration for the face pipeline (sans-IO).
//!
//! Tracks which pipeline artifacts exist (original, landmark, triangulation
//! and rotation images), decides which remote operation is currently valid,
//! and reconciles settled responses into renderable state:
//! upload/capture -> landmark detection -> Delaunay triangulation ->
//! 3-axis rotation.
//!
//! This crate has **no I/O dependencies** -- it never talks to the network
//! or the browser. The remote service is abstracted behind the
//! [`FaceService`] trait and all state mutation goes through the
//! [`Dispatcher`]. Browser interaction lives in `visage-io`.

pub mod dispatch;
pub mod service;
pub mod state;
pub mod view;

pub use dispatch::{Dispatcher, OpResponse, Operation, Settlement, Ticket};
pub use service::{
    DetectResponse, FaceService, ImagePayload, RotateResponse, ServiceError, TriangulateResponse,
    UploadResponse,
};
pub use state::{ImageHandle, Rotation, SessionState, Stage};
pub use view::{Panel, PanelKind, View, render};

//! Camera capture as a scoped, single-stream resource.
//!
//! [`CaptureDevice`] wraps `getUserMedia`: at most one live stream is
//! held, acquiring while one is open releases the prior stream first,
//! and release is idempotent -- including on session reset and on error
//! paths during capture. The open-stream bookkeeping lives in the pure
//! [`StreamSlot`] so the discipline is testable off-browser.
//!
//! Captured frames are drawn onto a canvas and encoded as PNG bytes,
//! which feed the upload controller exactly like a user-chosen file.

use std::cell::RefCell;

use visage_session::service::ImagePayload;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamConstraints};

/// Fixed user message when the platform denies camera access or no
/// device exists. No retry state is kept.
pub const DEVICE_ERROR_MESSAGE: &str =
    "Could not access the camera. Check that one is connected and allowed for this page.";

/// Errors from the capture device.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    /// The platform denied access or found no camera.
    #[error("{DEVICE_ERROR_MESSAGE}")]
    Unavailable,

    /// A browser API call failed mid-capture.
    #[error("browser API error: {0}")]
    Js(String),
}

impl From<JsValue> for CaptureError {
    fn from(value: JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

/// Holder for the at-most-one open stream.
///
/// Replacing or taking the content hands the prior value back exactly
/// once, so the caller can release it; there is no path that drops an
/// open stream without surfacing it.
#[derive(Debug)]
pub struct StreamSlot<T> {
    current: Option<T>,
}

impl<T> Default for StreamSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> StreamSlot<T> {
    /// An empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self { current: None }
    }

    /// Whether a stream is currently held.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Install a new stream, returning the previously held one (to be
    /// released by the caller) if there was one.
    pub fn replace(&mut self, stream: T) -> Option<T> {
        self.current.replace(stream)
    }

    /// Remove and return the held stream, leaving the slot empty.
    /// Safe to call when nothing is open.
    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }
}

/// The platform camera, owned exclusively by the orchestrator.
///
/// Owns a live `MediaStream` plus the `<video>` element it plays into.
/// The element is created programmatically and attached to the document
/// body under a fixed class, so the page stylesheet can position it.
///
/// Methods take `&self` over interior `RefCell`s so the device can sit
/// in an `Rc` shared between event handlers; no borrow is ever held
/// across an await point.
#[derive(Debug, Default)]
pub struct CaptureDevice {
    slot: RefCell<StreamSlot<MediaStream>>,
    video: RefCell<Option<HtmlVideoElement>>,
}

impl CaptureDevice {
    /// A device with no open stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stream is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.slot.borrow().is_open()
    }

    /// Open the camera and start playing it into a preview element.
    ///
    /// Any previously open stream is released first.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Unavailable`] when the platform denies
    /// access or no camera exists; [`CaptureError::Js`] when DOM setup
    /// fails afterwards.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn acquire(&self) -> Result<(), CaptureError> {
        self.release();

        let window = web_sys::window().ok_or_else(|| CaptureError::Js("no global window".into()))?;
        let media_devices = window
            .navigator()
            .media_devices()
            .map_err(|_| CaptureError::Unavailable)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&JsValue::TRUE);

        let promise = media_devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|_| CaptureError::Unavailable)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|_| CaptureError::Unavailable)?
            .dyn_into()
            .map_err(|_| CaptureError::Js("getUserMedia did not yield a MediaStream".into()))?;

        // The stream is live from here on: every exit path below must
        // either install it in the slot or stop its tracks.
        let video = match self.ensure_video_element() {
            Ok(video) => video,
            Err(err) => {
                stop_tracks(&stream);
                return Err(err);
            }
        };
        video.set_src_object(Some(&stream));
        // Playback failures surface as a blank preview; the stream
        // itself is already live.
        let _ = video.play();

        // Normally empty after the release() above, but a concurrent
        // acquire may have raced past it while we awaited getUserMedia.
        // The loser's stream comes back out and is stopped here.
        if let Some(prior) = self.slot.borrow_mut().replace(stream) {
            stop_tracks(&prior);
        }
        Ok(())
    }

    /// Stop every track of the open stream and drop the preview
    /// element. Safe to call when nothing is open.
    pub fn release(&self) {
        if let Some(stream) = self.slot.borrow_mut().take() {
            stop_tracks(&stream);
        }
        if let Some(video) = self.video.borrow_mut().take() {
            video.set_src_object(None);
            video.remove();
        }
    }

    /// Render the current frame to a canvas and encode it as a PNG,
    /// packaged for the upload controller.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Js`] when no stream is open or encoding
    /// fails.
    #[allow(clippy::future_not_send)]
    pub async fn capture_frame(&self) -> Result<ImagePayload, CaptureError> {
        let video = self
            .video
            .borrow()
            .clone()
            .filter(|_| self.is_open())
            .ok_or_else(|| CaptureError::Js("no open camera stream".into()))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CaptureError::Js("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| CaptureError::Js("failed to create canvas".into()))?;
        canvas.set_width(video.video_width());
        canvas.set_height(video.video_height());

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| CaptureError::Js("no 2d canvas context".into()))?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(|_| CaptureError::Js("unexpected canvas context type".into()))?;
        context.draw_image_with_html_video_element(&video, 0.0, 0.0)?;

        let blob = canvas_to_png_blob(&canvas).await?;
        let buffer = JsFuture::from(blob.array_buffer()).await?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

        Ok(ImagePayload {
            filename: "capture.png".into(),
            mime_type: "image/png".into(),
            bytes,
        })
    }

    /// Find or create the preview `<video>` element.
    fn ensure_video_element(&self) -> Result<HtmlVideoElement, CaptureError> {
        if let Some(video) = self.video.borrow().as_ref() {
            return Ok(video.clone());
        }
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CaptureError::Js("no document".into()))?;
        let video: HtmlVideoElement = document
            .create_element("video")?
            .dyn_into()
            .map_err(|_| CaptureError::Js("failed to create video element".into()))?;
        video.set_class_name("camera-preview");
        video.set_autoplay(true);
        video.set_muted(true);

        let body = document
            .body()
            .ok_or_else(|| CaptureError::Js("no document body".into()))?;
        body.append_child(&video)?;

        *self.video.borrow_mut() = Some(video.clone());
        Ok(video)
    }
}

/// Stop every track of a stream, turning the camera light off.
fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Encode a canvas as a PNG `Blob` via `toBlob`, promisified.
#[allow(clippy::future_not_send)]
async fn canvas_to_png_blob(canvas: &HtmlCanvasElement) -> Result<web_sys::Blob, CaptureError> {
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let callback = Closure::once_into_js(move |blob: JsValue| {
            resolve.call1(&JsValue::NULL, &blob).ok();
        });
        // toBlob defaults to image/png, the fixed capture format. If the
        // call itself throws, reject so the awaiting caller sees the
        // failure instead of a promise that never settles.
        if let Err(err) = canvas.to_blob(callback.unchecked_ref()) {
            reject.call1(&JsValue::NULL, &err).ok();
        }
    });

    JsFuture::from(promise)
        .await?
        .dyn_into()
        .map_err(|_| CaptureError::Js("canvas produced no frame".into()))
}

// SPDX-License-Identifier: GPL-3.0-only

//! Camera view lifecycle
//!
//! ```text
//! Requesting ──▶ Streaming ──▶ Captured
//!     │              │
//!     ▼              ▼
//!   Denied         Closed   (close from Requesting, Streaming or Denied)
//! ```
//!
//! The view exclusively owns the capture stream. The stream is stopped once:
//! on capture, on close, or when the view is dropped.

use super::{CameraFrame, CaptureStream};
use crate::constants::messages;
use crate::errors::CameraError;
use crate::media::RasterImage;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    /// Waiting for the device to start streaming
    Requesting,
    /// Live frames available; capture enabled
    Streaming,
    /// A frame was frozen and the stream released
    Captured,
    /// Acquisition failed; capture disabled
    Denied,
    /// Closed without capturing
    Closed,
}

impl CameraState {
    /// Captured and Closed end the view's life
    pub fn is_terminal(&self) -> bool {
        matches!(self, CameraState::Captured | CameraState::Closed)
    }
}

/// Modal camera view owning one capture stream
pub struct CameraView {
    /// Acquisition request this view waits for
    request: u64,
    state: CameraState,
    stream: Option<Box<dyn CaptureStream>>,
    error: Option<CameraError>,
}

impl CameraView {
    /// New view waiting for acquisition request `request`
    pub fn requesting(request: u64) -> Self {
        debug!(request, "Camera view requesting stream");
        Self {
            request,
            state: CameraState::Requesting,
            stream: None,
            error: None,
        }
    }

    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Capture is only offered while streaming
    pub fn can_capture(&self) -> bool {
        self.state == CameraState::Streaming
    }

    /// Whether the view is still shown
    pub fn is_open(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    /// User-facing message for a denied view
    pub fn error_message(&self) -> Option<&'static str> {
        (self.state == CameraState::Denied).then_some(messages::CAMERA_DENIED)
    }

    /// Format of the live stream
    pub fn stream_format(&self) -> Option<&super::CameraFormat> {
        self.stream.as_ref().map(|s| s.format())
    }

    /// Latest live frame, for preview
    pub fn preview(&self) -> Option<CameraFrame> {
        self.stream.as_ref().and_then(|s| s.latest_frame())
    }

    /// Hand the acquired stream to the view
    ///
    /// A stream arriving after the view left `Requesting` is stopped at once
    /// and `false` is returned.
    pub fn attach(&mut self, mut stream: Box<dyn CaptureStream>) -> bool {
        if self.state != CameraState::Requesting {
            info!(state = ?self.state, "Stream arrived late, stopping it");
            stream.stop();
            return false;
        }
        info!(format = %stream.format(), "Camera streaming");
        self.stream = Some(stream);
        self.state = CameraState::Streaming;
        true
    }

    /// Record an acquisition failure
    pub fn deny(&mut self, err: CameraError) {
        if self.state != CameraState::Requesting {
            debug!(state = ?self.state, error = %err, "Ignoring acquisition error for settled view");
            return;
        }
        warn!(error = %err, "Camera access failed");
        self.error = Some(err);
        self.state = CameraState::Denied;
    }

    /// Freeze the current frame and release the stream
    ///
    /// On error the view keeps streaming so the user can retry.
    pub fn capture(&mut self) -> Result<RasterImage, CameraError> {
        if !self.can_capture() {
            return Err(CameraError::NotStreaming);
        }
        let frame = self
            .stream
            .as_ref()
            .and_then(|s| s.latest_frame())
            .ok_or(CameraError::NoFrameAvailable)?;
        let raster = RasterImage::from_camera_frame(&frame)?;

        self.release();
        self.state = CameraState::Captured;
        info!(
            width = raster.width(),
            height = raster.height(),
            "Camera frame captured"
        );
        Ok(raster)
    }

    /// Close without capturing
    pub fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.release();
        self.state = CameraState::Closed;
        debug!("Camera view closed");
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("Stopping camera stream");
            stream.stop();
        }
    }
}

impl Drop for CameraView {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraView")
            .field("request", &self.request)
            .field("state", &self.state)
            .field("has_stream", &self.stream.is_some())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CameraFormat;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStream {
        format: CameraFormat,
        frame: Option<CameraFrame>,
        stops: Arc<AtomicUsize>,
    }

    impl CaptureStream for FakeStream {
        fn format(&self) -> &CameraFormat {
            &self.format
        }

        fn latest_frame(&self) -> Option<CameraFrame> {
            self.frame.clone()
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            true
        }
    }

    fn fake(with_frame: bool) -> (Box<dyn CaptureStream>, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let stream = FakeStream {
            format: CameraFormat {
                width: 2,
                height: 1,
                pixel_format: "RGBA".into(),
            },
            frame: with_frame.then(|| CameraFrame::from_rgba(2, 1, vec![0; 8])),
            stops: Arc::clone(&stops),
        };
        (Box::new(stream), stops)
    }

    #[test]
    fn test_capture_stops_stream_once() {
        let (stream, stops) = fake(true);
        let mut view = CameraView::requesting(1);
        assert!(view.attach(stream));
        assert!(view.can_capture());

        let raster = view.capture().unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 1));
        assert_eq!(view.state(), CameraState::Captured);
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        drop(view);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_without_frame_keeps_streaming() {
        let (stream, stops) = fake(false);
        let mut view = CameraView::requesting(1);
        view.attach(stream);
        assert_eq!(view.capture(), Err(CameraError::NoFrameAvailable));
        assert_eq!(view.state(), CameraState::Streaming);
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_denied_disables_capture() {
        let mut view = CameraView::requesting(1);
        view.deny(CameraError::AccessDenied("permission denied".into()));
        assert_eq!(view.state(), CameraState::Denied);
        assert!(!view.can_capture());
        assert_eq!(view.capture(), Err(CameraError::NotStreaming));
        assert_eq!(
            view.error_message(),
            Some("Could not access the camera. Please check permissions and try again.")
        );
    }

    #[test]
    fn test_late_stream_is_stopped() {
        let (stream, stops) = fake(true);
        let mut view = CameraView::requesting(1);
        view.close();
        assert!(!view.attach(stream));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}

// SPDX-License-Identifier: GPL-3.0-only
//! Thread lifecycle management for capture loops
//!
//! Every backend runs its capture loop on a dedicated thread that publishes
//! the most recent frame into a shared slot. [`CaptureLoopController`] owns
//! that thread and is the [`CaptureStream`] handed to the camera view.

use super::CaptureStream;
use super::types::{BackendError, BackendResult, CameraFormat, CameraFrame};
use crate::constants::camera::{CAPTURE_ERROR_BACKOFF, STARTUP_TIMEOUT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Most recent frame published by a capture loop
pub type FrameSlot = Arc<Mutex<Option<CameraFrame>>>;

/// Handle given to the capture loop body
pub struct CaptureContext {
    stop_signal: Arc<AtomicBool>,
    latest_frame: FrameSlot,
    ready: mpsc::Sender<BackendResult<CameraFormat>>,
}

impl CaptureContext {
    /// Report the negotiated format; `start` returns once this is called
    pub fn ready(&self, format: CameraFormat) {
        let _ = self.ready.send(Ok(format));
    }

    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    /// Replace the latest frame
    pub fn publish(&self, frame: CameraFrame) {
        if let Ok(mut guard) = self.latest_frame.lock() {
            *guard = Some(frame);
        }
    }
}

/// Consecutive read failures of a capture loop
///
/// A device that keeps failing (unplugged, driver reset) is backed off
/// linearly and abandoned once `limit` failures happen in a row.
#[derive(Debug, Clone, Copy)]
pub struct FailureStreak {
    count: u32,
    limit: u32,
}

impl FailureStreak {
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Record a failure; `None` once the limit is reached, else the wait
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.count += 1;
        (self.count < self.limit).then(|| CAPTURE_ERROR_BACKOFF * self.count.min(10))
    }

    /// A frame arrived
    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Controller for a capture loop running in a separate thread
pub struct CaptureLoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    latest_frame: FrameSlot,
    format: CameraFormat,
    /// Name for logging
    name: String,
}

impl CaptureLoopController {
    /// Start a capture loop and wait until it reports its format
    ///
    /// `body` opens the device, calls [`CaptureContext::ready`], then loops
    /// until [`CaptureContext::should_stop`]. An error returned before
    /// `ready` becomes the error of `start`.
    pub fn start<B>(name: &str, body: B) -> BackendResult<Self>
    where
        B: FnOnce(&CaptureContext) -> BackendResult<()> + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let latest_frame: FrameSlot = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = mpsc::channel();

        let ctx = CaptureContext {
            stop_signal: Arc::clone(&stop_signal),
            latest_frame: Arc::clone(&latest_frame),
            ready: ready_tx,
        };
        let name_clone = name.to_string();

        info!(name = %name, "Starting capture loop");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Capture loop thread started");
                if let Err(e) = body(&ctx) {
                    error!(name = %name_clone, error = %e, "Capture loop error");
                    // Ignored once the controller has started
                    let _ = ctx.ready.send(Err(e));
                }
                info!(name = %name_clone, "Capture loop thread exiting");
            })?;

        let mut controller = Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            latest_frame,
            format: CameraFormat {
                width: 0,
                height: 0,
                pixel_format: String::new(),
            },
            name: name.to_string(),
        };

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(format)) => {
                info!(name = %name, format = %format, "Capture loop ready");
                controller.format = format;
                Ok(controller)
            }
            Ok(Err(e)) => {
                controller.join();
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                // The thread may be blocked opening the device; detach it
                controller.request_stop();
                controller.thread_handle.take();
                Err(BackendError::InitializationFailed(format!(
                    "{} did not start within {:?}",
                    name, STARTUP_TIMEOUT
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                controller.join();
                Err(BackendError::InitializationFailed(format!(
                    "{} exited before reporting a format",
                    name
                )))
            }
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting capture loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Wait for the thread to finish without sending stop signal
    fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for capture loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Capture loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Capture loop thread finished");
            }
        }
    }
}

impl CaptureStream for CaptureLoopController {
    fn format(&self) -> &CameraFormat {
        &self.format
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest_frame.lock().ok().and_then(|guard| guard.clone())
    }

    /// Stop the loop and wait for the thread to finish
    fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    fn is_live(&self) -> bool {
        !self.stop_signal.load(Ordering::SeqCst) && self.is_running()
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "CaptureLoopController dropped, stopping loop");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> CameraFormat {
        CameraFormat {
            width: 1,
            height: 1,
            pixel_format: "RGBA".into(),
        }
    }

    #[test]
    fn test_publishes_frames_until_stopped() {
        let mut controller = CaptureLoopController::start("test-loop", |ctx| {
            ctx.ready(format());
            while !ctx.should_stop() {
                ctx.publish(CameraFrame::from_rgba(1, 1, vec![9, 9, 9, 255]));
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        })
        .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while controller.latest_frame().is_none() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(controller.latest_frame().is_some());
        assert!(controller.is_live());

        controller.stop();
        assert!(!controller.is_live());
        // Idempotent
        controller.stop();
    }

    #[test]
    fn test_startup_error_is_returned() {
        let result = CaptureLoopController::start("failing-loop", |_ctx| {
            Err(BackendError::DeviceNotFound("/dev/video99".into()))
        });
        assert!(matches!(result, Err(BackendError::DeviceNotFound(_))));
    }

    #[test]
    fn test_failure_streak_backs_off_then_gives_up() {
        let mut streak = FailureStreak::new(3);
        assert_eq!(streak.record_failure(), Some(CAPTURE_ERROR_BACKOFF));
        assert_eq!(streak.record_failure(), Some(CAPTURE_ERROR_BACKOFF * 2));
        assert_eq!(streak.record_failure(), None);

        streak.reset();
        assert_eq!(streak.count(), 0);
        assert_eq!(streak.record_failure(), Some(CAPTURE_ERROR_BACKOFF));
    }
}

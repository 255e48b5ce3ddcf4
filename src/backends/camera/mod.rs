// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Session (App)      │
//! └──────────┬──────────┘
//!            │ owns
//!            ▼
//! ┌─────────────────────┐
//! │     CameraView      │  ← Requesting / Streaming / Captured / Denied / Closed
//! └──────────┬──────────┘
//!            │ Box<dyn CaptureStream>
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend Trait │  ← enumerate, open
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌──────┐   ┌──────┐
//!   │ V4L2 │   │ File │
//!   └──────┘   └──────┘
//! ```

pub mod file_source;
pub mod frame_loop;
pub mod types;
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub mod v4l2;
pub mod view;

pub use file_source::FileSourceBackend;
pub use frame_loop::CaptureLoopController;
pub use types::*;
pub use view::{CameraState, CameraView};

use std::path::PathBuf;

/// Camera backend trait
///
/// Opening is blocking (it waits for the device to start streaming) and is
/// run off the session loop.
pub trait CameraBackend: Send + Sync {
    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;

    /// Check if this backend can be used on the current system
    fn is_available(&self) -> bool;

    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Get supported formats for a specific camera device
    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat>;

    /// Start streaming from `device`
    ///
    /// `format` is a preference; the stream reports what was negotiated.
    fn open(
        &self,
        device: &CameraDevice,
        format: Option<&CameraFormat>,
    ) -> BackendResult<Box<dyn CaptureStream>>;
}

/// A live camera stream
pub trait CaptureStream: Send {
    /// Negotiated format
    fn format(&self) -> &CameraFormat;

    /// Most recent frame, if any has arrived yet
    fn latest_frame(&self) -> Option<CameraFrame>;

    /// Stop all tracks and release the device. Calling it again is a no-op.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Backend placeholder when support was not compiled in
#[cfg(not(all(target_os = "linux", feature = "v4l2")))]
#[derive(Debug, Clone, Copy)]
struct UnavailableBackend(CameraBackendType);

#[cfg(not(all(target_os = "linux", feature = "v4l2")))]
impl CameraBackend for UnavailableBackend {
    fn backend_type(&self) -> CameraBackendType {
        self.0
    }

    fn is_available(&self) -> bool {
        false
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        Vec::new()
    }

    fn get_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        Vec::new()
    }

    fn open(
        &self,
        _device: &CameraDevice,
        _format: Option<&CameraFormat>,
    ) -> BackendResult<Box<dyn CaptureStream>> {
        Err(BackendError::NotAvailable(format!(
            "{} support is not included in this build",
            self.0
        )))
    }
}

/// Get a concrete backend instance
///
/// `file_path` is the image served by the file backend.
pub fn get_backend_for_type(
    backend_type: CameraBackendType,
    file_path: Option<PathBuf>,
) -> Box<dyn CameraBackend> {
    match backend_type {
        CameraBackendType::File => Box::new(FileSourceBackend::new(file_path)),
        #[cfg(all(target_os = "linux", feature = "v4l2"))]
        CameraBackendType::V4l2 => Box::new(v4l2::V4l2Backend::new()),
        #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
        CameraBackendType::V4l2 => Box::new(UnavailableBackend(CameraBackendType::V4l2)),
    }
}

/// Pick the device to open: the one matching `path`, else the first found
pub fn select_device(backend: &dyn CameraBackend, path: Option<&str>) -> BackendResult<CameraDevice> {
    if !backend.is_available() {
        return Err(BackendError::NotAvailable(format!(
            "{} support is not included in this build",
            backend.backend_type()
        )));
    }

    let cameras = backend.enumerate_cameras();
    let selected = match path {
        Some(path) => cameras.into_iter().find(|c| c.path == path),
        None => cameras.into_iter().next(),
    };
    selected.ok_or_else(|| {
        BackendError::DeviceNotFound(match path {
            Some(path) => format!("No {} camera at {}", backend.backend_type(), path),
            None => format!("No {} cameras found", backend.backend_type()),
        })
    })
}

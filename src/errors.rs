// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the QR analyzer
//!
//! Image-handling errors ([`ScanError`]) never escape the decode pipeline:
//! they are mapped to fixed user-facing messages there. The remaining types
//! cover configuration, the camera view and the system clipboard.

use crate::backends::camera::BackendError;
use crate::constants::messages;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Image acquisition or decoding errors
    Scan(ScanError),
    /// System clipboard errors
    Clipboard(String),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Failure of a single decode attempt
///
/// `NotFound` is deliberately absent: an image without a QR code is an
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Source bytes unreadable or the bitmap failed to decode
    Load(String),
    /// Offscreen surface could not be allocated
    Surface(String),
    /// The decoder binding raised
    Decode(String),
}

impl ScanError {
    /// Fixed message shown to the user; the detail is only logged
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::Load(_) => messages::LOAD_FAILED,
            ScanError::Surface(_) => messages::SURFACE_UNAVAILABLE,
            ScanError::Decode(_) => messages::SCAN_FAILED,
        }
    }

    /// Internal detail for diagnostics
    pub fn detail(&self) -> &str {
        match self {
            ScanError::Load(detail) | ScanError::Surface(detail) | ScanError::Decode(detail) => {
                detail
            }
        }
    }
}

/// Camera view errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Permission or device acquisition failed
    AccessDenied(String),
    /// Capture requested while the view is not streaming
    NotStreaming,
    /// The stream has not delivered a frame yet
    NoFrameAvailable,
    /// Frame could not be converted to RGBA
    InvalidFrame(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Scan(e) => write!(f, "Scan error: {}", e),
            AppError::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Load(msg) => write!(f, "Image load failed: {}", msg),
            ScanError::Surface(msg) => write!(f, "Surface unavailable: {}", msg),
            ScanError::Decode(msg) => write!(f, "Decoder failed: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::AccessDenied(msg) => write!(f, "Camera access denied: {}", msg),
            CameraError::NotStreaming => write!(f, "Camera is not streaming"),
            CameraError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CameraError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ScanError {}
impl std::error::Error for CameraError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError::Scan(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<BackendError> for CameraError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DeviceNotFound(_) => CameraError::NoCameraFound,
            other => CameraError::AccessDenied(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Load(err.to_string())
    }
}

impl From<image::ImageError> for ScanError {
    fn from(err: image::ImageError) -> Self {
        ScanError::Load(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_messages_are_fixed() {
        let load = ScanError::Load("truncated PNG chunk".into());
        assert_eq!(load.user_message(), "Failed to load the image.");
        assert_eq!(load.detail(), "truncated PNG chunk");

        let surface = ScanError::Surface("0x0".into());
        assert_eq!(surface.user_message(), "Could not get canvas context.");

        let decode = ScanError::Decode("buffer length mismatch".into());
        assert_eq!(
            decode.user_message(),
            "An error occurred while scanning the QR code."
        );
    }

    #[test]
    fn test_backend_errors_map_to_camera_errors() {
        assert_eq!(
            CameraError::from(BackendError::DeviceNotFound("/dev/video0".into())),
            CameraError::NoCameraFound
        );
        assert!(matches!(
            CameraError::from(BackendError::PermissionDenied("EACCES".into())),
            CameraError::AccessDenied(_)
        ));
    }

    #[test]
    fn test_io_error_becomes_load_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        assert!(matches!(ScanError::from(io), ScanError::Load(_)));
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// User-facing text. Internal error detail never replaces these.
pub mod messages {
    /// Bitmap could not be loaded from the source bytes
    pub const LOAD_FAILED: &str = "Failed to load the image.";

    /// Offscreen surface allocation failed
    pub const SURFACE_UNAVAILABLE: &str = "Could not get canvas context.";

    /// Decoder binding raised
    pub const SCAN_FAILED: &str = "An error occurred while scanning the QR code.";

    /// Valid image without a QR code
    pub const NOT_FOUND: &str = "No QR Code found in the image. Please try another one.";

    /// Camera acquisition failed
    pub const CAMERA_DENIED: &str =
        "Could not access the camera. Please check permissions and try again.";

    /// Shown while a decode is pending
    pub const ANALYZING: &str = "Analyzing QR Code...";

    /// Idle prompt
    pub const GET_STARTED: &str = "Choose an image from your device, use your camera, or simply paste an image from your clipboard.";
}

/// Offscreen surface limits
pub mod surface {
    /// Largest width or height accepted for the decode surface.
    /// Matches the common browser canvas limit.
    pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

    /// Bytes per RGBA pixel
    pub const BYTES_PER_PIXEL: usize = 4;
}

/// Supported image file formats
pub mod file_formats {
    /// Image file extensions offered by the file picker
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Camera timing constants
pub mod camera {
    use super::Duration;

    /// Default wait before the one-shot `camera` command captures a frame
    pub const DEFAULT_WARMUP_MS: u64 = 500;

    /// Default capture resolution requested from V4L2 devices
    pub const DEFAULT_WIDTH: u32 = 1280;
    pub const DEFAULT_HEIGHT: u32 = 720;

    /// Number of mmap buffers for V4L2 streaming
    pub const V4L2_BUFFER_COUNT: u32 = 4;

    /// How long `open` waits for the capture thread to report its format
    pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

    /// Frame interval of the still-image virtual camera (~30fps)
    pub const STILL_FRAME_INTERVAL: Duration = Duration::from_millis(33);

    /// Consecutive device read failures before a capture loop gives up
    pub const MAX_CONSECUTIVE_CAPTURE_ERRORS: u32 = 20;

    /// Base wait after a failed device read, multiplied by the failure streak
    pub const CAPTURE_ERROR_BACKOFF: Duration = Duration::from_millis(50);

    /// Capture retries while the stream has not delivered a frame yet
    pub const CAPTURE_ATTEMPTS: u32 = 20;
    pub const CAPTURE_RETRY_INTERVAL: Duration = Duration::from_millis(100);
}

/// Result presentation timing
pub mod presentation {
    use super::Duration;

    /// How long the "Copied" indicator stays visible
    pub const COPIED_INDICATOR: Duration = Duration::from_secs(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_case_insensitive() {
        assert!(file_formats::is_image_extension("PNG"));
        assert!(file_formats::is_image_extension("jpeg"));
        assert!(!file_formats::is_image_extension("mp4"));
    }
}

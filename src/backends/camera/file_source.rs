// SPDX-License-Identifier: GPL-3.0-only

//! Still-image virtual camera
//!
//! Streams one image file as if it were a live device, republishing the same
//! frame at a steady interval. Useful for demos and for exercising the camera
//! flow on machines without a capture device.

use super::frame_loop::CaptureLoopController;
use super::types::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFormat, CameraFrame,
    PixelFormat,
};
use super::{CameraBackend, CaptureStream};
use crate::constants::{camera::STILL_FRAME_INTERVAL, file_formats};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Load an image file as an RGBA camera frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => BackendError::from(io),
        other => BackendError::FormatNotSupported(format!(
            "Failed to load image '{}': {}",
            path.display(),
            other
        )),
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    info!(width, height, "Image loaded successfully");
    Ok(CameraFrame::from_rgba(width, height, rgba.into_raw()))
}

/// Camera backend that serves a single image file
#[derive(Debug, Clone, Default)]
pub struct FileSourceBackend {
    path: Option<PathBuf>,
}

impl FileSourceBackend {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl CameraBackend for FileSourceBackend {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::File
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let Some(path) = self.path.as_ref() else {
            return Vec::new();
        };
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(file_formats::is_image_extension);
        if !is_image || !path.is_file() {
            debug!(path = %path.display(), "File camera source is not an image file");
            return Vec::new();
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        vec![CameraDevice {
            name: format!("{} (Still Image)", name),
            path: path.display().to_string(),
            driver: Some("file".to_string()),
        }]
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        match image::image_dimensions(&device.path) {
            Ok((width, height)) => vec![CameraFormat {
                width,
                height,
                pixel_format: "RGBA".to_string(),
            }],
            Err(_) => Vec::new(),
        }
    }

    fn open(
        &self,
        device: &CameraDevice,
        _format: Option<&CameraFormat>,
    ) -> BackendResult<Box<dyn CaptureStream>> {
        // The image's own size is the only format offered
        let path = PathBuf::from(&device.path);
        let controller = CaptureLoopController::start("file-camera", move |ctx| {
            let frame = load_image_as_frame(&path)?;
            ctx.ready(CameraFormat {
                width: frame.width,
                height: frame.height,
                pixel_format: "RGBA".to_string(),
            });

            let data: Arc<[u8]> = Arc::clone(&frame.data);
            while !ctx.should_stop() {
                ctx.publish(CameraFrame {
                    width: frame.width,
                    height: frame.height,
                    data: Arc::clone(&data),
                    format: PixelFormat::RGBA,
                    stride: frame.stride,
                    captured_at: Instant::now(),
                });
                std::thread::sleep(STILL_FRAME_INTERVAL);
            }
            Ok(())
        })?;
        Ok(Box::new(controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_device_not_found() {
        let err = load_image_as_frame(Path::new("/nonexistent/still.png")).unwrap_err();
        assert!(matches!(err, BackendError::DeviceNotFound(_)));
    }

    #[test]
    fn test_no_path_means_no_cameras() {
        assert!(FileSourceBackend::new(None).enumerate_cameras().is_empty());
    }

    #[test]
    fn test_streams_still_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        image::RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let backend = FileSourceBackend::new(Some(path.clone()));
        let devices = backend.enumerate_cameras();
        assert_eq!(devices.len(), 1);

        let mut stream = backend.open(&devices[0], None).unwrap();
        assert_eq!(stream.format().width, 4);
        assert_eq!(stream.format().height, 3);

        let deadline = Instant::now() + std::time::Duration::from_secs(2);
        while stream.latest_frame().is_none() && Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let frame = stream.latest_frame().unwrap();
        assert_eq!(&frame.data[0..4], &[1, 2, 3, 255]);

        stream.stop();
        assert!(!stream.is_live());
    }
}

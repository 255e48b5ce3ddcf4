// SPDX-License-Identifier: GPL-3.0-only

//! Video4Linux capture backend
//!
//! Opens `/dev/video*` nodes with memory-mapped streaming. Packed formats are
//! passed through untouched and converted on capture; MJPEG frames are decoded
//! to RGBA on the capture thread.

use super::frame_loop::{CaptureContext, CaptureLoopController, FailureStreak};
use super::types::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFormat, CameraFrame,
    PixelFormat,
};
use super::{CameraBackend, CaptureStream};
use crate::constants::camera::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_CONSECUTIVE_CAPTURE_ERRORS, V4L2_BUFFER_COUNT,
};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream as _;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// FourCC codes tried, in order, when the requested one is refused
const PREFERRED_FOURCCS: [&[u8; 4]; 2] = [b"YUYV", b"MJPG"];

fn fourcc_str(fourcc: &FourCC) -> String {
    fourcc.str().unwrap_or("????").to_string()
}

/// Camera backend for V4L2 capture devices
#[derive(Debug, Clone, Copy, Default)]
pub struct V4l2Backend;

impl V4l2Backend {
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for V4l2Backend {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let mut cameras = Vec::new();

        for node in v4l::context::enum_devices() {
            let path = node.path().to_string_lossy().into_owned();
            let Ok(dev) = Device::with_path(node.path()) else {
                debug!(path = %path, "Skipping device that cannot be opened");
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            // Metadata nodes share the card name but cannot capture video
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                continue;
            }

            info!(name = %caps.card, path = %path, driver = %caps.driver, "Found V4L2 camera");
            cameras.push(CameraDevice {
                name: caps.card.clone(),
                path,
                driver: Some(caps.driver.clone()),
            });
        }

        cameras
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        let dev = match Device::with_path(&device.path) {
            Ok(d) => d,
            Err(_) => return Vec::new(),
        };

        let mut formats = Vec::new();
        if let Ok(descriptions) = dev.enum_formats() {
            for desc in descriptions {
                let Ok(sizes) = dev.enum_framesizes(desc.fourcc) else {
                    continue;
                };
                for size in sizes {
                    match size.size {
                        v4l::framesize::FrameSizeEnum::Discrete(discrete) => {
                            formats.push(CameraFormat {
                                width: discrete.width,
                                height: discrete.height,
                                pixel_format: fourcc_str(&desc.fourcc),
                            });
                        }
                        v4l::framesize::FrameSizeEnum::Stepwise(step) => {
                            formats.push(CameraFormat {
                                width: step.max_width,
                                height: step.max_height,
                                pixel_format: fourcc_str(&desc.fourcc),
                            });
                        }
                    }
                }
            }
        }

        formats
    }

    fn open(
        &self,
        device: &CameraDevice,
        format: Option<&CameraFormat>,
    ) -> BackendResult<Box<dyn CaptureStream>> {
        let path = device.path.clone();
        let requested = format.cloned().unwrap_or_else(|| CameraFormat {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pixel_format: "YUYV".to_string(),
        });
        info!(device = %device.name, format = %requested, "Opening V4L2 camera");

        let controller = CaptureLoopController::start("v4l2-capture", move |ctx| {
            capture_loop(&path, &requested, ctx)
        })?;
        Ok(Box::new(controller))
    }
}

/// Negotiate a format we can convert, falling back through the preferred list
fn negotiate_format(dev: &Device, requested: &CameraFormat) -> BackendResult<Format> {
    let mut candidates: Vec<FourCC> = Vec::new();
    if let Ok(bytes) = <[u8; 4]>::try_from(requested.pixel_format.as_bytes()) {
        candidates.push(FourCC::new(&bytes));
    }
    for fourcc in PREFERRED_FOURCCS {
        let fourcc = FourCC::new(fourcc);
        if !candidates.contains(&fourcc) {
            candidates.push(fourcc);
        }
    }

    for fourcc in candidates {
        let wanted = Format::new(requested.width, requested.height, fourcc);
        match dev.set_format(&wanted) {
            Ok(actual) if is_supported(&actual.fourcc) => return Ok(actual),
            Ok(actual) => {
                debug!(requested = %fourcc_str(&fourcc), got = %fourcc_str(&actual.fourcc), "Driver substituted an unsupported format");
            }
            Err(e) => debug!(fourcc = %fourcc_str(&fourcc), error = %e, "Format refused"),
        }
    }

    Err(BackendError::FormatNotSupported(format!(
        "no convertible pixel format for {}",
        requested
    )))
}

fn is_supported(fourcc: &FourCC) -> bool {
    *fourcc == FourCC::new(b"MJPG") || PixelFormat::from_fourcc(&fourcc_str(fourcc)).is_some()
}

/// Capture loop running in a separate thread
fn capture_loop(path: &str, requested: &CameraFormat, ctx: &CaptureContext) -> BackendResult<()> {
    let dev = Device::with_path(path)?;
    let actual = negotiate_format(&dev, requested)?;
    let fourcc = fourcc_str(&actual.fourcc);
    let is_mjpeg = actual.fourcc == FourCC::new(b"MJPG");
    let pixel_format = PixelFormat::from_fourcc(&fourcc);

    info!(
        width = actual.width,
        height = actual.height,
        fourcc = %fourcc,
        stride = actual.stride,
        "V4L2 format configured"
    );

    let mut stream = Stream::with_buffers(&dev, Type::VideoCapture, V4L2_BUFFER_COUNT)
        .map_err(|e| BackendError::InitializationFailed(format!("Failed to create stream: {}", e)))?;

    ctx.ready(CameraFormat {
        width: actual.width,
        height: actual.height,
        pixel_format: fourcc.clone(),
    });

    let mut failures = FailureStreak::new(MAX_CONSECUTIVE_CAPTURE_ERRORS);
    while !ctx.should_stop() {
        let (buf, _meta) = match stream.next() {
            Ok(frame) => {
                failures.reset();
                frame
            }
            Err(e) => {
                let Some(backoff) = failures.record_failure() else {
                    return Err(BackendError::IoError(format!(
                        "Device stopped delivering frames after {} errors: {}",
                        failures.count(),
                        e
                    )));
                };
                warn!(error = %e, streak = failures.count(), "Failed to capture frame");
                thread::sleep(backoff);
                continue;
            }
        };
        let captured_at = Instant::now();

        let frame = if is_mjpeg {
            match image::load_from_memory_with_format(buf, image::ImageFormat::Jpeg) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let (width, height) = rgba.dimensions();
                    CameraFrame::from_rgba(width, height, rgba.into_raw())
                }
                Err(e) => {
                    debug!(error = %e, "Dropping undecodable MJPEG frame");
                    continue;
                }
            }
        } else if let Some(format) = pixel_format {
            CameraFrame {
                width: actual.width,
                height: actual.height,
                data: Arc::from(buf),
                format,
                stride: actual.stride,
                captured_at,
            }
        } else {
            warn!(fourcc = %fourcc, "Unsupported pixel format");
            continue;
        };

        ctx.publish(frame);
    }

    info!("V4L2 capture loop stopped");
    Ok(())
}

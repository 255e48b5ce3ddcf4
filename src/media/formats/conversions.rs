// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format conversion for camera frames
//!
//! Every camera frame is normalized to tightly packed RGBA before it becomes a
//! [`RasterImage`](crate::media::RasterImage). Row stride padding is dropped
//! here; the output has exactly `width * height * 4` bytes.

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::constants::surface::BYTES_PER_PIXEL;

/// Error raised when a frame's buffer cannot hold the advertised geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError(pub String);

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConversionError {}

/// Convert a camera frame of any supported format to packed RGBA
pub fn frame_to_rgba(frame: &CameraFrame) -> Result<Vec<u8>, ConversionError> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if width == 0 || height == 0 {
        return Err(ConversionError(format!(
            "frame has no pixels ({}x{})",
            frame.width, frame.height
        )));
    }
    if frame.format.is_packed_422() && width % 2 != 0 {
        return Err(ConversionError(format!(
            "{:?} frame width must be even, got {}",
            frame.format, frame.width
        )));
    }

    let row_bytes = frame.format.min_stride(frame.width);
    let stride = frame.stride as usize;
    if stride < row_bytes {
        return Err(ConversionError(format!(
            "stride {} shorter than row of {} bytes",
            stride, row_bytes
        )));
    }
    let required = stride * (height - 1) + row_bytes;
    if frame.data.len() < required {
        return Err(ConversionError(format!(
            "buffer holds {} bytes, {} required",
            frame.data.len(),
            required
        )));
    }

    let mut rgba = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
    for row in 0..height {
        let start = row * stride;
        let src = &frame.data[start..start + row_bytes];
        match frame.format {
            PixelFormat::RGBA => rgba.extend_from_slice(src),
            PixelFormat::BGRA => {
                for px in src.chunks_exact(4) {
                    rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
            PixelFormat::RGB24 => {
                for px in src.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            PixelFormat::Gray8 => {
                for &y in src {
                    rgba.extend_from_slice(&[y, y, y, 255]);
                }
            }
            PixelFormat::YUYV => {
                // Y0 U Y1 V
                for chunk in src.chunks_exact(4) {
                    push_yuv(&mut rgba, chunk[0], chunk[1], chunk[3]);
                    push_yuv(&mut rgba, chunk[2], chunk[1], chunk[3]);
                }
            }
            PixelFormat::UYVY => {
                // U Y0 V Y1
                for chunk in src.chunks_exact(4) {
                    push_yuv(&mut rgba, chunk[1], chunk[0], chunk[2]);
                    push_yuv(&mut rgba, chunk[3], chunk[0], chunk[2]);
                }
            }
        }
    }

    Ok(rgba)
}

/// Append one BT.601 YUV sample as an opaque RGBA pixel
fn push_yuv(rgba: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    rgba.extend_from_slice(&[r, g, b, 255]);
}

// SPDX-License-Identifier: GPL-3.0-only

//! RGBA raster shared by every input source

use crate::backends::camera::types::CameraFrame;
use crate::constants::surface::BYTES_PER_PIXEL;
use crate::errors::{CameraError, ScanError};
use crate::media::formats::frame_to_rgba;

/// Decoded bitmap as packed RGBA rows
///
/// Always holds `width * height * 4` bytes with non-zero dimensions; the
/// constructors are the only way to build one.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ScanError> {
        if width == 0 || height == 0 {
            return Err(ScanError::Surface(format!(
                "zero-sized raster {}x{}",
                width, height
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| ScanError::Surface(format!("raster {}x{} overflows", width, height)))?;
        if pixels.len() != expected {
            return Err(ScanError::Decode(format!(
                "raster buffer holds {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Freeze a camera frame at its native resolution
    pub fn from_camera_frame(frame: &CameraFrame) -> Result<Self, CameraError> {
        let pixels = frame_to_rgba(frame).map_err(|e| CameraError::InvalidFrame(e.to_string()))?;
        Self::new(frame.width, frame.height, pixels)
            .map_err(|e| CameraError::InvalidFrame(e.detail().to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            RasterImage::new(0, 4, Vec::new()),
            Err(ScanError::Surface(_))
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(RasterImage::new(2, 2, vec![0; 15]).is_err());
        let raster = RasterImage::new(2, 2, vec![0; 16]).unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 2));
    }

    #[test]
    fn test_from_camera_frame_converts_to_rgba() {
        let frame = CameraFrame::from_rgba(1, 1, vec![1, 2, 3, 4]);
        let raster = RasterImage::from_camera_frame(&frame).unwrap();
        assert_eq!(raster.pixels(), &[1, 2, 3, 4]);
    }
}

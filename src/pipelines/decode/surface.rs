// SPDX-License-Identifier: GPL-3.0-only

//! Offscreen drawing surface
//!
//! The loaded bitmap is drawn 1:1 onto a transparent RGBA surface of exactly
//! its natural size, then the whole buffer is read back. Nothing is cropped or
//! scaled.

use crate::errors::ScanError;
use crate::media::RasterImage;
use image::{DynamicImage, RgbaImage, imageops};
use tracing::trace;

/// Transparent RGBA surface sized to one bitmap
pub struct OffscreenSurface {
    buffer: RgbaImage,
}

impl OffscreenSurface {
    /// Allocate a `width` x `height` surface
    ///
    /// Fails when either side is zero or larger than `max_dimension`.
    pub fn allocate(width: u32, height: u32, max_dimension: u32) -> Result<Self, ScanError> {
        if width == 0 || height == 0 {
            return Err(ScanError::Surface(format!(
                "cannot allocate a {}x{} surface",
                width, height
            )));
        }
        if width > max_dimension || height > max_dimension {
            return Err(ScanError::Surface(format!(
                "{}x{} exceeds the {}px surface limit",
                width, height, max_dimension
            )));
        }

        trace!(width, height, "Allocating offscreen surface");
        Ok(Self {
            buffer: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Draw `bitmap` at the origin without scaling
    pub fn draw(&mut self, bitmap: &DynamicImage) {
        let rgba = bitmap.to_rgba8();
        imageops::replace(&mut self.buffer, &rgba, 0, 0);
    }

    /// Read back the full pixel buffer
    pub fn into_raster(self) -> Result<RasterImage, ScanError> {
        let (width, height) = self.buffer.dimensions();
        RasterImage::new(width, height, self.buffer.into_raw())
    }
}

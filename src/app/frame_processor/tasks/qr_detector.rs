// SPDX-License-Identifier: GPL-3.0-only

//! QR code decoder binding
//!
//! The decode pipeline never calls a QR library directly. It is handed a
//! [`QrDecoder`] at construction, which keeps the pipeline testable with a
//! substitute implementation. [`RqrrDecoder`] is the production binding,
//! backed by the rqrr crate.

use crate::app::frame_processor::types::DecodedCode;
use crate::constants::surface::BYTES_PER_PIXEL;
use std::fmt;
use tracing::{debug, trace};

/// Error raised by a decoder binding on input it cannot handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    /// Pixel buffer length does not match width x height x 4
    MalformedBuffer { expected: usize, actual: usize },
    /// Width or height is zero
    EmptyImage,
    /// Unexpected internal decoder state
    Internal(String),
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderError::MalformedBuffer { expected, actual } => write!(
                f,
                "Malformed pixel buffer: expected {} bytes, got {}",
                expected, actual
            ),
            DecoderError::EmptyImage => write!(f, "Image has no pixels"),
            DecoderError::Internal(msg) => write!(f, "Internal decoder error: {}", msg),
        }
    }
}

impl std::error::Error for DecoderError {}

/// Pixel-matrix-to-text QR decoding capability
///
/// `Ok(None)` means the image was valid but no QR code was located.
pub trait QrDecoder: Send + Sync {
    fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<DecodedCode>, DecoderError>;
}

/// QR decoder backed by rqrr
///
/// Only the first grid that decodes is reported; multiple codes per image
/// are not supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<DecodedCode>, DecoderError> {
        if width == 0 || height == 0 {
            return Err(DecoderError::EmptyImage);
        }

        let w = width as usize;
        let h = height as usize;
        let expected = w * h * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(DecoderError::MalformedBuffer {
                expected,
                actual: pixels.len(),
            });
        }

        let start = std::time::Instant::now();
        let grey = rgba_to_greyscale(pixels, w, h);

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| grey[y * w + x]);
        let grids = prepared.detect_grids();
        trace!(
            grids = grids.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "QR grid detection complete"
        );

        for grid in grids {
            match grid.decode() {
                Ok((meta, payload)) => {
                    debug!(
                        version = meta.version.0,
                        ecc_level = meta.ecc_level,
                        payload_len = payload.len(),
                        "Decoded QR code"
                    );
                    return Ok(Some(DecodedCode {
                        payload,
                        version: meta.version.0,
                        ecc_level: meta.ecc_level,
                    }));
                }
                Err(e) => {
                    // A located grid that fails to decode counts as not found
                    debug!(error = ?e, "Failed to decode QR grid");
                }
            }
        }

        Ok(None)
    }
}

/// Convert RGBA to greyscale, compositing alpha over white
///
/// Transparent regions of a PNG behave like the white page behind them, so a
/// black-on-transparent code still reads as dark modules.
fn rgba_to_greyscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut grey = Vec::with_capacity(width * height);
    for px in rgba.chunks_exact(BYTES_PER_PIXEL) {
        let r = px[0] as u32;
        let g = px[1] as u32;
        let b = px[2] as u32;
        let a = px[3] as u32;
        // ITU-R BT.601 luminance: (77R + 150G + 29B) >> 8
        let luma = (77 * r + 150 * g + 29 * b) >> 8;
        let composited = (luma * a + 255 * (255 - a)) / 255;
        grey.push(composited as u8);
    }
    grey
}

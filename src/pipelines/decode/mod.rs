// SPDX-License-Identifier: GPL-3.0-only

//! QR decode pipeline
//!
//! ```text
//! SourceImage → Load bitmap → Offscreen surface → RGBA buffer → QrDecoder
//!                    ↓               ↓                             ↓
//!               LoadFailed    SurfaceUnavailable          Success / NotFound / ScanFailed
//! ```
//!
//! Both stages are CPU-bound and run on the blocking pool. Every failure is
//! converted into a [`DecodeOutcome`] here; callers never see a [`ScanError`].

pub mod surface;

pub use surface::OffscreenSurface;

use crate::app::frame_processor::{DecodeOutcome, DecodedCode, QrDecoder};
use crate::constants::surface::DEFAULT_MAX_DIMENSION;
use crate::errors::ScanError;
use crate::media::SourceImage;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Turns one source image into exactly one decode outcome
#[derive(Clone)]
pub struct DecodePipeline {
    decoder: Arc<dyn QrDecoder>,
    max_surface_dimension: u32,
}

impl DecodePipeline {
    pub fn new(decoder: Arc<dyn QrDecoder>) -> Self {
        Self {
            decoder,
            max_surface_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    /// Override the largest surface side accepted
    pub fn with_max_surface_dimension(mut self, max_surface_dimension: u32) -> Self {
        self.max_surface_dimension = max_surface_dimension;
        self
    }

    pub fn max_surface_dimension(&self) -> u32 {
        self.max_surface_dimension
    }

    /// Decode `source`, never failing and never retrying
    pub async fn run(&self, source: &SourceImage) -> DecodeOutcome {
        let id = source.id();
        match self.try_run(source).await {
            Ok(Some(code)) => {
                info!(%id, version = code.version, "QR code decoded");
                DecodeOutcome::Success {
                    payload: code.payload,
                }
            }
            Ok(None) => {
                info!(%id, "No QR code found");
                DecodeOutcome::NotFound
            }
            Err(err) => {
                match &err {
                    ScanError::Decode(detail) => error!(%id, detail = %detail, "QR decoder failed"),
                    other => warn!(%id, error = %other, "Decode attempt failed"),
                }
                DecodeOutcome::from_error(&err)
            }
        }
    }

    async fn try_run(&self, source: &SourceImage) -> Result<Option<DecodedCode>, ScanError> {
        let bitmap = Self::load_bitmap(source.clone()).await?;
        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            "Bitmap loaded"
        );

        let decoder = Arc::clone(&self.decoder);
        let max_dimension = self.max_surface_dimension;
        tokio::task::spawn_blocking(move || {
            let mut surface =
                OffscreenSurface::allocate(bitmap.width(), bitmap.height(), max_dimension)?;
            surface.draw(&bitmap);
            drop(bitmap);

            let raster = surface.into_raster()?;
            decoder
                .decode(raster.pixels(), raster.width(), raster.height())
                .map_err(|e| ScanError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| ScanError::Decode(format!("Decode task error: {}", e)))?
    }

    /// Decode the encoded bytes into a bitmap of known dimensions
    async fn load_bitmap(source: SourceImage) -> Result<DynamicImage, ScanError> {
        tokio::task::spawn_blocking(move || {
            image::load_from_memory(source.bytes()).map_err(ScanError::from)
        })
        .await
        .map_err(|e| ScanError::Load(format!("Load task error: {}", e)))?
    }
}

impl std::fmt::Debug for DecodePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodePipeline")
            .field("max_surface_dimension", &self.max_surface_dimension)
            .finish_non_exhaustive()
    }
}

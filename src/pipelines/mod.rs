// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! All heavy work runs in background tasks so the session loop stays
//! responsive.
//!
//! # Modules
//!
//! - [`decode`]: Source image to QR decode outcome

pub mod decode;

pub use decode::{DecodePipeline, OffscreenSurface};

// SPDX-License-Identifier: GPL-3.0-only

//! Image inputs and pixel handling
//!
//! # Sources
//!
//! Files, clipboard pastes and camera captures all become a [`SourceImage`]
//! holding the encoded bytes. The decode pipeline later rasterizes it.
//!
//! # Modules
//!
//! - [`source`]: Source images and the paste guard
//! - [`raster`]: Packed RGBA bitmaps
//! - [`formats`]: Camera pixel format conversion
//! - [`clipboard`]: System clipboard helpers

pub mod clipboard;
pub mod formats;
pub mod raster;
pub mod source;

pub use clipboard::{ClipboardReader, ClipboardWriter, SystemClipboard};
pub use raster::RasterImage;
pub use source::{
    ClipboardItem, PasteDisposition, PasteGuard, SourceImage, SourceOrigin, encode_png,
};

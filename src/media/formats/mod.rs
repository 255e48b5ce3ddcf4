// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format handling

pub mod conversions;

pub use conversions::{ConversionError, frame_to_rgba};

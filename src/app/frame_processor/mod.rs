// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor module for QR analysis
//!
//! Holds the decoder binding and the result types shared by the decode
//! pipeline, the session controller and the presentation layer.

pub mod tasks;
pub mod types;

pub use tasks::qr_detector;
pub use tasks::{DecoderError, QrDecoder, RqrrDecoder};
pub use types::{DecodeOutcome, DecodedCode, PayloadKind, is_url};

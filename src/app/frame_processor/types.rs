// SPDX-License-Identifier: GPL-3.0-only

//! Core types for decode results
//!
//! These types represent the output of one decode attempt and are consumed
//! read-only by the presentation layer.

use crate::constants::messages;
use crate::errors::ScanError;

/// A QR code located and decoded by the decoder binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCode {
    /// Decoded text payload
    pub payload: String,
    /// QR symbol version (1-40)
    pub version: usize,
    /// Error correction level as reported by the decoder
    pub ecc_level: u16,
}

/// Result of one decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A QR code was found and decoded
    Success { payload: String },
    /// The image loaded fine but contains no QR code
    NotFound,
    /// Load, surface or decoder failure, with the user-facing reason
    Failure { reason: String },
}

impl DecodeOutcome {
    /// Map a pipeline error to its fixed user-facing failure
    pub fn from_error(err: &ScanError) -> Self {
        Self::Failure {
            reason: err.user_message().to_string(),
        }
    }

    /// Decoded payload, if the attempt succeeded
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Success { payload } => Some(payload),
            _ => None,
        }
    }

    /// Text to show in the error slot. NotFound renders like a failure.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::NotFound => Some(messages::NOT_FOUND),
            Self::Failure { reason } => Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// How a payload should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Absolute URL, rendered as a link that can be opened
    Link,
    /// Anything else, rendered as plain text
    Text,
}

impl PayloadKind {
    pub fn of(payload: &str) -> Self {
        if is_url(payload) {
            Self::Link
        } else {
            Self::Text
        }
    }
}

/// Check whether `text` parses as an absolute URL
///
/// Any scheme is accepted, there is no allow-list. Relative references and
/// invalid hosts or ports are rejected.
pub fn is_url(text: &str) -> bool {
    url::Url::parse(text).is_ok()
}

// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::frame_processor::DecodeOutcome;
use crate::backends::camera::{CameraView, CaptureStream};
use crate::errors::{CameraError, ScanError};
use crate::media::{ClipboardItem, SourceImage};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Identifies one decode attempt
///
/// A result is only recorded when its ticket still matches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket {
    pub generation: u64,
    pub source_id: Uuid,
}

/// Current source, its outcome and whether a decode is pending
///
/// - `pending` implies no outcome yet
/// - no source implies no outcome and nothing pending
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    source: Option<SourceImage>,
    outcome: Option<DecodeOutcome>,
    pending: bool,
}

impl SessionState {
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn outcome(&self) -> Option<&DecodeOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Nothing loaded
    pub fn is_idle(&self) -> bool {
        self.source.is_none()
    }
}

/// Owns the session state and decides which decode results count
#[derive(Debug, Default)]
pub struct SessionController {
    state: SessionState,
    /// Bumped by every load and reset
    generation: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the source and start a new pending decode
    pub fn load_source(&mut self, source: SourceImage) -> DecodeTicket {
        self.generation += 1;
        let ticket = DecodeTicket {
            generation: self.generation,
            source_id: source.id(),
        };
        debug!(generation = ticket.generation, source = %ticket.source_id, "Source loaded");

        self.state = SessionState {
            source: Some(source),
            outcome: None,
            pending: true,
        };
        ticket
    }

    /// Record `outcome` if `ticket` is still current
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub fn complete(&mut self, ticket: DecodeTicket, outcome: DecodeOutcome) -> bool {
        let current = ticket.generation == self.generation
            && self.state.pending
            && self
                .state
                .source
                .as_ref()
                .is_some_and(|source| source.id() == ticket.source_id);

        if !current {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Discarding stale decode result"
            );
            return false;
        }

        self.state.outcome = Some(outcome);
        self.state.pending = false;
        true
    }

    /// Return to idle; any in-flight decode is discarded when it resolves
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::default();
    }
}

/// Capture stream delivered by an acquisition task
pub struct AcquiredStream(pub Box<dyn CaptureStream>);

impl std::fmt::Debug for AcquiredStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AcquiredStream")
            .field(&self.0.format().to_string())
            .finish()
    }
}

/// Messages emitted by the front end and by background tasks
#[derive(Debug)]
pub enum Message {
    // ===== Inputs =====
    /// User picked an image file
    SelectFile(PathBuf),
    /// Asynchronous file read finished
    SourceRead {
        request: u64,
        result: Result<SourceImage, ScanError>,
    },
    /// Decode an already-read image
    LoadSource(SourceImage),
    /// User asked to paste; read the system clipboard
    ReadClipboard,
    /// Paste event carrying the clipboard items
    Paste(Vec<ClipboardItem>),

    // ===== Decode =====
    DecodeFinished {
        ticket: DecodeTicket,
        outcome: DecodeOutcome,
    },

    // ===== Camera =====
    OpenCamera,
    CameraAcquired {
        request: u64,
        result: Result<AcquiredStream, CameraError>,
    },
    CaptureFrame,
    CloseCamera,
    /// Captured frame was written to disk
    CaptureSaved(Result<PathBuf, String>),

    // ===== Result =====
    Reset,
    CopyPayload,
    CopyFinished(bool),
    OpenLink,

    /// No-op message for tasks that don't need a response
    Noop,
}

/// Where the front end should route a paste event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteResult {
    Accepted,
    Ignored,
    Unhandled,
}

/// Camera view plus the request counter that guards late acquisitions
#[derive(Debug, Default)]
pub struct CameraSlot {
    pub view: Option<CameraView>,
    /// Last acquisition request issued
    pub requests: u64,
}

impl CameraSlot {
    /// Whether a camera view is currently shown
    pub fn is_open(&self) -> bool {
        self.view.as_ref().is_some_and(CameraView::is_open)
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Source handlers
//!
//! Handles file selection, clipboard pastes, decode completion and reset.
//! Every new source, and every reset, supersedes whatever was in flight.

use crate::app::AppModel;
use crate::app::frame_processor::DecodeOutcome;
use crate::app::runtime::Task;
use crate::app::state::{DecodeTicket, Message, PasteResult};
use crate::constants::messages;
use crate::errors::ScanError;
use crate::media::{ClipboardItem, PasteDisposition, PasteGuard, SourceImage, SourceOrigin};
use std::path::PathBuf;
use tracing::{debug, info, warn};

impl AppModel {
    // =========================================================================
    // Input Handlers
    // =========================================================================

    pub(crate) fn handle_select_file(&mut self, path: PathBuf) -> Task {
        let request = self.next_source_request();
        info!(path = %path.display(), request, "Reading image file");
        Task::perform(SourceImage::from_file(path), move |result| {
            Message::SourceRead { request, result }
        })
    }

    pub(crate) fn handle_source_read(
        &mut self,
        request: u64,
        result: Result<SourceImage, ScanError>,
    ) -> Task {
        if request != self.source_requests {
            debug!(request, current = self.source_requests, "Discarding superseded read");
            return Task::none();
        }

        match result {
            Ok(source) => {
                let save = self.save_capture_task(&source);
                Task::batch([self.start_decode(source), save])
            }
            Err(e) => {
                warn!(error = %e, "Failed to read image");
                self.notice = Some(messages::LOAD_FAILED.to_string());
                Task::none()
            }
        }
    }

    pub(crate) fn handle_load_source(&mut self, source: SourceImage) -> Task {
        self.start_decode(source)
    }

    pub(crate) fn handle_read_clipboard(&mut self) -> Task {
        if self.paste_guard().blocks() {
            debug!("Paste ignored, session busy");
            self.last_paste = Some(PasteResult::Ignored);
            return Task::none();
        }

        let reader = &self.services().clipboard_reader;
        Task::perform(reader.read_items(), |result| match result {
            Ok(items) => Message::Paste(items),
            Err(e) => {
                warn!(error = %e, "Failed to read clipboard");
                Message::Paste(Vec::new())
            }
        })
    }

    /// Paste event; the guard is evaluated against the state right now
    pub(crate) fn handle_paste(&mut self, items: Vec<ClipboardItem>) -> Task {
        match self.paste_guard().evaluate(items) {
            PasteDisposition::Accepted(item) => {
                info!(mime = %item.mime, len = item.data.len(), "Pasted image");
                self.last_paste = Some(PasteResult::Accepted);
                self.start_decode(SourceImage::from(item))
            }
            PasteDisposition::Ignored => {
                debug!("Paste ignored, session busy");
                self.last_paste = Some(PasteResult::Ignored);
                Task::none()
            }
            PasteDisposition::Unhandled => {
                debug!("No image on the clipboard");
                self.last_paste = Some(PasteResult::Unhandled);
                Task::none()
            }
        }
    }

    // =========================================================================
    // Decode Lifecycle
    // =========================================================================

    pub(crate) fn handle_decode_finished(
        &mut self,
        ticket: DecodeTicket,
        outcome: DecodeOutcome,
    ) -> Task {
        if self.session.complete(ticket, outcome) {
            debug!(generation = ticket.generation, "Decode outcome recorded");
        }
        Task::none()
    }

    pub(crate) fn handle_reset(&mut self) -> Task {
        info!("Resetting session");
        self.session.reset();
        self.next_source_request();
        self.copied_at = None;
        self.notice = None;
        self.last_paste = None;
        Task::none()
    }

    // =========================================================================
    // Helper Functions
    // =========================================================================

    /// Load `source` into the session and decode it in the background
    pub(crate) fn start_decode(&mut self, source: SourceImage) -> Task {
        self.next_source_request();
        self.notice = None;
        self.copied_at = None;

        let ticket = self.session.load_source(source.clone());
        let pipeline = self.pipeline.clone();
        Task::perform(
            async move { pipeline.run(&source).await },
            move |outcome| Message::DecodeFinished { ticket, outcome },
        )
    }

    pub(crate) fn next_source_request(&mut self) -> u64 {
        self.source_requests += 1;
        self.source_requests
    }

    fn paste_guard(&self) -> PasteGuard {
        PasteGuard {
            image_loaded: !self.session.state().is_idle(),
            camera_open: self.camera.is_open(),
        }
    }

    /// Write a camera capture to the capture directory, if one is set
    fn save_capture_task(&self, source: &SourceImage) -> Task {
        let (Some(dir), SourceOrigin::Camera { captured_at }) =
            (self.capture_dir.clone(), source.origin())
        else {
            return Task::none();
        };

        let filename = format!("capture_{}.png", captured_at.format("%Y%m%d_%H%M%S"));
        let path = dir.join(filename);
        let bytes = source.bytes().to_vec();
        info!(path = %path.display(), "Saving capture");
        Task::perform(
            async move {
                tokio::fs::create_dir_all(&dir).await?;
                tokio::fs::write(&path, bytes).await?;
                Ok::<_, std::io::Error>(path)
            },
            |result| Message::CaptureSaved(result.map_err(|e| e.to_string())),
        )
    }
}

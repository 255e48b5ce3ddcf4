// SPDX-License-Identifier: GPL-3.0-only

//! Result actions
//!
//! Copy and open-link actions on a decoded payload.

use crate::app::AppModel;
use crate::app::frame_processor::is_url;
use crate::app::runtime::Task;
use crate::app::state::Message;
use std::time::Instant;
use tracing::{debug, error, info, warn};

impl AppModel {
    /// Payload of a successful decode
    fn current_payload(&self) -> Option<String> {
        self.session
            .state()
            .outcome()
            .and_then(|outcome| outcome.payload())
            .map(str::to_string)
    }

    pub(crate) fn handle_copy_payload(&mut self) -> Task {
        let Some(payload) = self.current_payload() else {
            debug!("Nothing to copy");
            return Task::none();
        };

        info!(text_length = payload.len(), "Copying payload to clipboard");
        let writer = &self.services().clipboard_writer;
        Task::perform(writer.write_text(payload), |result| match result {
            Ok(()) => Message::CopyFinished(true),
            Err(e) => {
                warn!(error = %e, "Failed to copy payload");
                Message::CopyFinished(false)
            }
        })
    }

    pub(crate) fn handle_copy_finished(&mut self, ok: bool) -> Task {
        if ok {
            self.copied_at = Some(Instant::now());
        }
        Task::none()
    }

    pub(crate) fn handle_open_link(&mut self) -> Task {
        let Some(url) = self.current_payload().filter(|payload| is_url(payload)) else {
            debug!("Payload is not a link");
            return Task::none();
        };

        info!(url = %url, "Opening link from QR code");
        match open::that_detached(&url) {
            Ok(()) => {
                info!("Link opened successfully");
            }
            Err(err) => {
                error!(url = %url, error = %err, "Failed to open link");
            }
        }
        Task::none()
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::source`: File, clipboard and decode lifecycle
//! - `handlers::camera`: Camera view acquisition, capture and close
//! - `handlers::result`: Copy and open-link actions on a decoded payload

use crate::app::AppModel;
use crate::app::runtime::Task;
use crate::app::state::Message;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task {
        match message {
            // ===== Inputs =====
            Message::SelectFile(path) => self.handle_select_file(path),
            Message::SourceRead { request, result } => self.handle_source_read(request, result),
            Message::LoadSource(source) => self.handle_load_source(source),
            Message::ReadClipboard => self.handle_read_clipboard(),
            Message::Paste(items) => self.handle_paste(items),

            // ===== Decode =====
            Message::DecodeFinished { ticket, outcome } => {
                self.handle_decode_finished(ticket, outcome)
            }

            // ===== Camera =====
            Message::OpenCamera => self.handle_open_camera(),
            Message::CameraAcquired { request, result } => {
                self.handle_camera_acquired(request, result)
            }
            Message::CaptureFrame => self.handle_capture_frame(),
            Message::CloseCamera => self.handle_close_camera(),
            Message::CaptureSaved(result) => self.handle_capture_saved(result),

            // ===== Result =====
            Message::Reset => self.handle_reset(),
            Message::CopyPayload => self.handle_copy_payload(),
            Message::CopyFinished(ok) => self.handle_copy_finished(ok),
            Message::OpenLink => self.handle_open_link(),

            Message::Noop => Task::none(),
        }
    }
}

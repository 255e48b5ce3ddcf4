// SPDX-License-Identifier: GPL-3.0-only

//! QR analyzer session
//!
//! [`AppModel`] holds the session controller, the camera view and the
//! injected services. Front ends send [`Message`]s through a [`Runtime`] and
//! render [`AppModel::view`].

pub mod frame_processor;
mod handlers;
pub mod runtime;
mod state;
mod update;
mod view;

pub use runtime::{Runtime, Task};
pub use state::{
    AcquiredStream, CameraSlot, DecodeTicket, Message, PasteResult, SessionController,
    SessionState,
};
pub use view::Screen;

use crate::app::frame_processor::{QrDecoder, RqrrDecoder};
use crate::backends::camera::{CameraBackend, get_backend_for_type};
use crate::config::Config;
use crate::media::{ClipboardReader, ClipboardWriter, SystemClipboard};
use crate::pipelines::DecodePipeline;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Capabilities the session depends on
#[derive(Clone)]
pub struct Services {
    pub decoder: Arc<dyn QrDecoder>,
    pub camera_backend: Arc<dyn CameraBackend>,
    pub clipboard_reader: Arc<dyn ClipboardReader>,
    pub clipboard_writer: Arc<dyn ClipboardWriter>,
}

impl Services {
    /// Production services for `config`
    pub fn system(config: &Config) -> Self {
        let clipboard = Arc::new(SystemClipboard::new(config.clipboard_command.clone()));
        let file_path = config.camera_path.as_ref().map(PathBuf::from);
        Self {
            decoder: Arc::new(RqrrDecoder::new()),
            camera_backend: Arc::from(get_backend_for_type(config.camera_backend, file_path)),
            clipboard_reader: clipboard.clone(),
            clipboard_writer: clipboard,
        }
    }
}

/// The application model
pub struct AppModel {
    /// Configuration loaded at startup
    pub config: Config,
    /// Current source and decode outcome
    pub session: SessionController,
    /// Modal camera view, if open
    pub camera: CameraSlot,
    /// When the payload was last copied
    pub copied_at: Option<Instant>,
    /// Transient message shown on the idle screen
    pub notice: Option<String>,
    /// How the last paste event was handled
    pub last_paste: Option<PasteResult>,
    /// Directory captured frames are written to
    pub capture_dir: Option<PathBuf>,
    /// Last capture written to `capture_dir`
    pub last_saved_capture: Option<PathBuf>,
    pipeline: DecodePipeline,
    services: Services,
    /// Bumped by every file read, capture encode, load and reset
    source_requests: u64,
}

impl AppModel {
    pub fn new(config: Config, services: Services) -> Self {
        let pipeline = DecodePipeline::new(Arc::clone(&services.decoder))
            .with_max_surface_dimension(config.max_surface_dimension);
        info!(
            backend = %services.camera_backend.backend_type(),
            max_surface_dimension = config.max_surface_dimension,
            "Session created"
        );
        Self {
            config,
            session: SessionController::new(),
            camera: CameraSlot::default(),
            copied_at: None,
            notice: None,
            last_paste: None,
            capture_dir: None,
            last_saved_capture: None,
            pipeline,
            services,
            source_requests: 0,
        }
    }

    /// Write captured frames to `dir`
    pub fn with_capture_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.capture_dir = dir;
        self
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}

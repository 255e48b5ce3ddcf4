// SPDX-License-Identifier: GPL-3.0-only

//! Camera view handlers
//!
//! Handles acquisition, capture and close of the modal camera view. Only the
//! newest acquisition request may attach a stream; anything older is stopped
//! as soon as it arrives.

use crate::app::AppModel;
use crate::app::runtime::Task;
use crate::app::state::{AcquiredStream, Message};
use crate::backends::camera::{CameraFormat, CameraView, select_device};
use crate::errors::{CameraError, ScanError};
use crate::media::SourceImage;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

impl AppModel {
    // =========================================================================
    // Camera Control Handlers
    // =========================================================================

    pub(crate) fn handle_open_camera(&mut self) -> Task {
        if !self.session.state().is_idle() {
            debug!("Camera not offered while an image is loaded");
            return Task::none();
        }
        if self.camera.is_open() {
            debug!("Camera view already open");
            return Task::none();
        }

        self.camera.requests += 1;
        let request = self.camera.requests;
        self.camera.view = Some(CameraView::requesting(request));
        self.notice = None;

        let backend = Arc::clone(&self.services().camera_backend);
        let device_path = self.config.camera_path.clone();
        let format = CameraFormat::from(&self.config.camera_format);
        info!(request, backend = %backend.backend_type(), "Requesting camera");

        Task::perform(
            tokio::task::spawn_blocking(move || {
                let device = select_device(backend.as_ref(), device_path.as_deref())?;
                info!(camera = %device.name, path = %device.path, "Opening camera");
                backend.open(&device, Some(&format))
            }),
            move |joined| {
                let result = match joined {
                    Ok(opened) => opened.map(AcquiredStream).map_err(CameraError::from),
                    Err(e) => Err(CameraError::AccessDenied(e.to_string())),
                };
                Message::CameraAcquired { request, result }
            },
        )
    }

    pub(crate) fn handle_camera_acquired(
        &mut self,
        request: u64,
        result: Result<AcquiredStream, CameraError>,
    ) -> Task {
        let view = self
            .camera
            .view
            .as_mut()
            .filter(|view| view.request() == request);

        match (view, result) {
            (Some(view), Ok(AcquiredStream(stream))) => {
                view.attach(stream);
            }
            (Some(view), Err(e)) => view.deny(e),
            (None, Ok(AcquiredStream(mut stream))) => {
                info!(request, "Stream for a dismissed camera view, stopping it");
                stream.stop();
            }
            (None, Err(e)) => {
                debug!(request, error = %e, "Acquisition failed for a dismissed camera view");
            }
        }
        Task::none()
    }

    pub(crate) fn handle_capture_frame(&mut self) -> Task {
        let Some(view) = self.camera.view.as_mut() else {
            debug!("Capture requested without a camera view");
            return Task::none();
        };

        let raster = match view.capture() {
            Ok(raster) => raster,
            Err(e) => {
                warn!(error = %e, "Capture failed");
                return Task::none();
            }
        };
        self.camera.view = None;

        let request = self.next_source_request();
        let captured_at = Local::now();
        Task::perform(
            tokio::task::spawn_blocking(move || SourceImage::from_raster(&raster, captured_at)),
            move |joined| {
                let result = joined
                    .unwrap_or_else(|e| Err(ScanError::Load(format!("encode task failed: {}", e))));
                Message::SourceRead { request, result }
            },
        )
    }

    pub(crate) fn handle_close_camera(&mut self) -> Task {
        if let Some(mut view) = self.camera.view.take() {
            view.close();
        }
        Task::none()
    }

    pub(crate) fn handle_capture_saved(&mut self, result: Result<PathBuf, String>) -> Task {
        match result {
            Ok(path) => {
                info!(path = %path.display(), "Capture saved");
                self.last_saved_capture = Some(path);
            }
            Err(e) => error!(error = %e, "Failed to save capture"),
        }
        Task::none()
    }
}

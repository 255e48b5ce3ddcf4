// SPDX-License-Identifier: GPL-3.0-only

//! Presentation state
//!
//! [`AppModel::view`] projects the model onto exactly one [`Screen`]. Front
//! ends render the screen; they never read session state directly.

use crate::app::AppModel;
use crate::app::frame_processor::PayloadKind;
use crate::backends::camera::{CameraFormat, CameraState};
use crate::constants::{messages, presentation};
use crate::media::SourceImage;
use std::fmt;
use std::time::Instant;

/// What the user currently sees
#[derive(Debug, Clone)]
pub enum Screen<'a> {
    /// Nothing loaded: the three input options
    Idle {
        prompt: &'static str,
        notice: Option<&'a str>,
    },
    /// Modal camera view
    Camera {
        state: CameraState,
        message: Option<&'static str>,
        can_capture: bool,
        format: Option<&'a CameraFormat>,
    },
    /// Source shown, decode pending
    Analyzing { source: &'a SourceImage },
    /// Decoded payload
    Result {
        source: &'a SourceImage,
        payload: &'a str,
        kind: PayloadKind,
        copied: bool,
    },
    /// Load, surface or decoder failure, or no code found
    Error {
        source: &'a SourceImage,
        message: &'a str,
    },
}

impl AppModel {
    /// Current screen; an open camera view takes precedence
    pub fn view(&self) -> Screen<'_> {
        if let Some(view) = self.camera.view.as_ref().filter(|view| view.is_open()) {
            return Screen::Camera {
                state: view.state(),
                message: view.error_message(),
                can_capture: view.can_capture(),
                format: view.stream_format(),
            };
        }

        let state = self.session.state();
        let Some(source) = state.source() else {
            return Screen::Idle {
                prompt: messages::GET_STARTED,
                notice: self.notice.as_deref(),
            };
        };

        match state.outcome() {
            None => Screen::Analyzing { source },
            Some(outcome) => match outcome.payload() {
                Some(payload) => Screen::Result {
                    source,
                    payload,
                    kind: PayloadKind::of(payload),
                    copied: self.copied_recently(Instant::now()),
                },
                None => Screen::Error {
                    source,
                    message: outcome.error_message().unwrap_or(messages::SCAN_FAILED),
                },
            },
        }
    }

    /// Whether the "Copied" indicator is still showing at `now`
    pub fn copied_recently(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < presentation::COPIED_INDICATOR)
    }
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Idle { prompt, notice } => {
                if let Some(notice) = notice {
                    writeln!(f, "{}", notice)?;
                }
                write!(f, "{}", prompt)
            }
            Screen::Camera {
                state,
                message,
                can_capture,
                format,
            } => {
                write!(f, "Camera: {:?}", state)?;
                if let Some(format) = format {
                    write!(f, " ({})", format)?;
                }
                if let Some(message) = message {
                    write!(f, "\n{}", message)?;
                }
                if *can_capture {
                    write!(f, "\nReady to capture.")?;
                }
                Ok(())
            }
            Screen::Analyzing { source } => {
                write!(f, "[{}]\n{}", source.origin(), messages::ANALYZING)
            }
            Screen::Result {
                source,
                payload,
                kind,
                copied,
            } => {
                write!(f, "[{}]\n", source.origin())?;
                match kind {
                    PayloadKind::Link => write!(f, "Link: {}", payload)?,
                    PayloadKind::Text => write!(f, "{}", payload)?,
                }
                if *copied {
                    write!(f, "\nCopied")?;
                }
                Ok(())
            }
            Screen::Error { source, message } => {
                write!(f, "[{}]\n{}", source.origin(), message)
            }
        }
    }
}

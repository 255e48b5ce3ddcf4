// SPDX-License-Identifier: GPL-3.0-only

//! QR Analyzer - decode QR codes from images
//!
//! Images come from a file, a clipboard paste or a single camera capture.
//! Each one is rasterized and handed to a QR decoder; the session shows the
//! source together with the decoded text, a link, or an error.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Session model, message loop and presentation state
//! - [`backends`]: Camera backend abstraction (V4L2, still image file)
//! - [`media`]: Source images, RGBA rasters, clipboard access
//! - [`pipelines`]: The decode pipeline
//! - [`config`]: User configuration handling
//! - [`terminal`]: Live camera preview in the terminal
//!
//! # Example
//!
//! ```ignore
//! let config = qr_analyzer::Config::load()?;
//! let model = qr_analyzer::AppModel::new(config.clone(), qr_analyzer::Services::system(&config));
//! let mut runtime = qr_analyzer::Runtime::new(model);
//! runtime.dispatch(qr_analyzer::Message::SelectFile("code.png".into()));
//! runtime.settle().await;
//! println!("{}", runtime.model().view());
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod terminal;

// Re-export commonly used types
pub use app::frame_processor::{DecodeOutcome, PayloadKind, QrDecoder, RqrrDecoder, is_url};
pub use app::{AppModel, Message, Runtime, Screen, Services, Task};
pub use config::Config;
pub use media::{SourceImage, SourceOrigin};
pub use pipelines::DecodePipeline;

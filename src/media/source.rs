// SPDX-License-Identifier: GPL-3.0-only

//! Pixel source adapter
//!
//! Turns each input (file bytes, a clipboard image, a captured camera frame)
//! into a [`SourceImage`]: the encoded image plus its identity. The decode
//! pipeline treats all origins the same way.

use crate::errors::ScanError;
use crate::media::RasterImage;
use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Where a source image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    Clipboard { mime: String },
    Camera { captured_at: DateTime<Local> },
    Stdin,
}

impl std::fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "{}", path.display()),
            SourceOrigin::Clipboard { mime } => write!(f, "clipboard ({})", mime),
            SourceOrigin::Camera { captured_at } => {
                write!(f, "camera capture at {}", captured_at.format("%H:%M:%S"))
            }
            SourceOrigin::Stdin => write!(f, "standard input"),
        }
    }
}

/// Encoded image that can be displayed and decoded
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone)]
pub struct SourceImage {
    id: Uuid,
    bytes: Arc<[u8]>,
    mime: Option<&'static str>,
    origin: SourceOrigin,
}

impl SourceImage {
    /// Wrap raw bytes without validating them
    ///
    /// Unreadable bytes surface later as a load failure in the pipeline.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, origin: SourceOrigin) -> Self {
        let bytes = bytes.into();
        let mime = image::guess_format(&bytes)
            .ok()
            .map(|format| format.to_mime_type());
        let source = Self {
            id: Uuid::new_v4(),
            bytes,
            mime,
            origin,
        };
        debug!(id = %source.id, origin = %source.origin, mime = ?source.mime, len = source.bytes.len(), "Source image created");
        source
    }

    /// Read a whole file asynchronously
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(bytes, SourceOrigin::File(path.to_path_buf())))
    }

    /// Encode a captured raster as PNG
    pub fn from_raster(raster: &RasterImage, captured_at: DateTime<Local>) -> Result<Self, ScanError> {
        let bytes = encode_png(raster)?;
        Ok(Self::from_bytes(bytes, SourceOrigin::Camera { captured_at }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sniffed MIME type, `None` when the bytes match no known format
    pub fn mime(&self) -> Option<&'static str> {
        self.mime
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Encode an RGBA raster as PNG bytes
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, ScanError> {
    let buffer = RgbaImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
        .ok_or_else(|| ScanError::Load("raster does not match its dimensions".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    buffer.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// One typed entry of a clipboard paste
#[derive(Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    pub data: Vec<u8>,
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.contains("image")
    }
}

impl std::fmt::Debug for ClipboardItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardItem")
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .finish()
    }
}

/// What to do with a paste event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteDisposition {
    /// An image is already shown or the camera is open
    Ignored,
    /// No clipboard item is an image; default paste handling applies
    Unhandled,
    /// First image item in clipboard order
    Accepted(ClipboardItem),
}

/// Paste predicate, evaluated against the state at event time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteGuard {
    pub image_loaded: bool,
    pub camera_open: bool,
}

impl PasteGuard {
    /// An image is shown or the camera view is open
    pub fn blocks(&self) -> bool {
        self.image_loaded || self.camera_open
    }

    pub fn evaluate(&self, items: Vec<ClipboardItem>) -> PasteDisposition {
        if self.blocks() {
            return PasteDisposition::Ignored;
        }
        match items.into_iter().find(ClipboardItem::is_image) {
            Some(item) => PasteDisposition::Accepted(item),
            None => PasteDisposition::Unhandled,
        }
    }
}

impl From<ClipboardItem> for SourceImage {
    fn from(item: ClipboardItem) -> Self {
        SourceImage::from_bytes(item.data, SourceOrigin::Clipboard { mime: item.mime })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ClipboardItem> {
        vec![
            ClipboardItem::new("text/plain", b"hello".to_vec()),
            ClipboardItem::new("image/png", vec![1]),
            ClipboardItem::new("image/jpeg", vec![2]),
        ]
    }

    #[test]
    fn test_paste_picks_first_image_item() {
        let guard = PasteGuard::default();
        assert_eq!(
            guard.evaluate(items()),
            PasteDisposition::Accepted(ClipboardItem::new("image/png", vec![1]))
        );
    }

    #[test]
    fn test_paste_without_image_is_unhandled() {
        let guard = PasteGuard::default();
        let text_only = vec![ClipboardItem::new("text/plain", b"hi".to_vec())];
        assert_eq!(guard.evaluate(text_only), PasteDisposition::Unhandled);
    }

    #[test]
    fn test_paste_ignored_when_busy() {
        let loaded = PasteGuard {
            image_loaded: true,
            camera_open: false,
        };
        let camera = PasteGuard {
            image_loaded: false,
            camera_open: true,
        };
        assert_eq!(loaded.evaluate(items()), PasteDisposition::Ignored);
        assert_eq!(camera.evaluate(items()), PasteDisposition::Ignored);
    }

    #[test]
    fn test_sources_have_distinct_ids() {
        let a = SourceImage::from_bytes(vec![0u8; 4], SourceOrigin::Stdin);
        let b = SourceImage::from_bytes(vec![0u8; 4], SourceOrigin::Stdin);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.mime(), None);
    }

    #[test]
    fn test_raster_png_round_trip() {
        let raster = RasterImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let source = SourceImage::from_raster(&raster, Local::now()).unwrap();
        assert_eq!(source.mime(), Some("image/png"));
        let decoded = image::load_from_memory(source.bytes()).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), raster.pixels());
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let err = SourceImage::from_file("/nonexistent/qr.png").await.unwrap_err();
        assert!(matches!(err, ScanError::Load(_)));
    }
}

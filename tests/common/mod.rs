// SPDX-License-Identifier: GPL-3.0-only

//! Shared fixtures for integration tests

#![allow(dead_code)]

use futures::FutureExt;
use futures::future::BoxFuture;
use image::{ImageFormat, Rgba, RgbaImage};
use qr_analyzer::app::frame_processor::{DecodedCode, DecoderError, QrDecoder, RqrrDecoder};
use qr_analyzer::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraBackendType, CameraDevice, CameraFormat,
    CameraFrame, CaptureStream,
};
use qr_analyzer::errors::AppError;
use qr_analyzer::media::{ClipboardItem, ClipboardReader, ClipboardWriter};
use qr_analyzer::{AppModel, Config, Runtime, Services};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Pixels per QR module
const SCALE: u32 = 8;
/// Quiet zone width in modules
const QUIET_ZONE: u32 = 4;

/// Render `payload` as a black-on-white QR code
pub fn qr_image(payload: &str) -> RgbaImage {
    let code = qrcode::QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * SCALE;

    RgbaImage::from_fn(side, side, |x, y| {
        let mx = (x / SCALE).checked_sub(QUIET_ZONE);
        let my = (y / SCALE).checked_sub(QUIET_ZONE);
        let dark = match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                colors[(my * modules + mx) as usize] == qrcode::Color::Dark
            }
            _ => false,
        };
        if dark {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

pub fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

/// PNG bytes of a QR code encoding `payload`
pub fn qr_png(payload: &str) -> Vec<u8> {
    encode(&qr_image(payload), ImageFormat::Png)
}

/// PNG bytes of a plain white image
pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        &RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        ImageFormat::Png,
    )
}

/// Decoder that always raises
pub struct ErroringDecoder;

impl QrDecoder for ErroringDecoder {
    fn decode(&self, _: &[u8], _: u32, _: u32) -> Result<Option<DecodedCode>, DecoderError> {
        Err(DecoderError::Internal("binding exploded".to_string()))
    }
}

/// Decoder that panics
pub struct PanickingDecoder;

impl QrDecoder for PanickingDecoder {
    fn decode(&self, _: &[u8], _: u32, _: u32) -> Result<Option<DecodedCode>, DecoderError> {
        panic!("decoder binding panicked");
    }
}

/// Decoder that counts calls and delegates to rqrr
#[derive(Default)]
pub struct CountingDecoder {
    pub calls: AtomicUsize,
}

impl QrDecoder for CountingDecoder {
    fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<DecodedCode>, DecoderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RqrrDecoder::new().decode(pixels, width, height)
    }
}

/// In-memory clipboard
#[derive(Default)]
pub struct FakeClipboard {
    pub items: Mutex<Vec<ClipboardItem>>,
    pub written: Mutex<Vec<String>>,
    pub reads: AtomicUsize,
}

impl FakeClipboard {
    pub fn with_items(items: Vec<ClipboardItem>) -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(items),
            ..Default::default()
        })
    }
}

impl ClipboardReader for FakeClipboard {
    fn read_items(&self) -> BoxFuture<'static, Result<Vec<ClipboardItem>, AppError>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().unwrap().clone();
        async move { Ok(items) }.boxed()
    }
}

impl ClipboardWriter for FakeClipboard {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), AppError>> {
        self.written.lock().unwrap().push(text);
        async { Ok(()) }.boxed()
    }
}

/// Stream that records how often it was stopped
pub struct FakeStream {
    format: CameraFormat,
    frame: Option<CameraFrame>,
    stopped: bool,
    stops: Arc<AtomicUsize>,
}

impl CaptureStream for FakeStream {
    fn format(&self) -> &CameraFormat {
        &self.format
    }

    fn latest_frame(&self) -> Option<CameraFrame> {
        if self.stopped { None } else { self.frame.clone() }
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }
}

/// Camera backend serving a fixed frame, or refusing access
pub struct FakeCamera {
    frame: Option<RgbaImage>,
    deny: bool,
    pub opens: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn streaming(frame: RgbaImage) -> Arc<Self> {
        Arc::new(Self {
            frame: Some(frame),
            deny: false,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            frame: None,
            deny: true,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl CameraBackend for FakeCamera {
    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::File
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: "Fake Camera".to_string(),
            path: "fake0".to_string(),
            driver: None,
        }]
    }

    fn get_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        Vec::new()
    }

    fn open(
        &self,
        _device: &CameraDevice,
        _format: Option<&CameraFormat>,
    ) -> BackendResult<Box<dyn CaptureStream>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            return Err(BackendError::PermissionDenied("user refused".to_string()));
        }
        let frame = self.frame.as_ref().map(|image| {
            CameraFrame::from_rgba(image.width(), image.height(), image.as_raw().clone())
        });
        let format = frame
            .as_ref()
            .map(|f| CameraFormat {
                width: f.width,
                height: f.height,
                pixel_format: "RGBA".to_string(),
            })
            .unwrap_or(CameraFormat {
                width: 0,
                height: 0,
                pixel_format: "RGBA".to_string(),
            });
        Ok(Box::new(FakeStream {
            format,
            frame,
            stopped: false,
            stops: Arc::clone(&self.stops),
        }))
    }
}

pub struct Harness {
    pub clipboard: Arc<FakeClipboard>,
    pub camera: Arc<FakeCamera>,
    pub decoder: Arc<CountingDecoder>,
}

impl Harness {
    pub fn new(clipboard: Arc<FakeClipboard>, camera: Arc<FakeCamera>) -> Self {
        Self {
            clipboard,
            camera,
            decoder: Arc::new(CountingDecoder::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            decoder: self.decoder.clone(),
            camera_backend: self.camera.clone(),
            clipboard_reader: self.clipboard.clone(),
            clipboard_writer: self.clipboard.clone(),
        }
    }

    pub fn runtime(&self) -> Runtime {
        Runtime::new(AppModel::new(Config::default(), self.services()))
    }

    pub fn decode_calls(&self) -> usize {
        self.decoder.calls.load(Ordering::SeqCst)
    }
}

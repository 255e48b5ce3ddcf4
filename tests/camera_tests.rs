// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the camera view lifecycle

mod common;

use common::{FakeCamera, FakeClipboard, Harness, qr_image, qr_png};
use qr_analyzer::app::PasteResult;
use qr_analyzer::backends::camera::CameraState;
use qr_analyzer::constants::messages;
use qr_analyzer::media::ClipboardItem;
use qr_analyzer::{AppModel, Config, Message, Runtime, Screen, SourceImage, SourceOrigin};

fn camera_harness() -> Harness {
    Harness::new(
        FakeClipboard::with_items(vec![ClipboardItem::new("image/png", qr_png("pasted"))]),
        FakeCamera::streaming(qr_image("from the camera")),
    )
}

async fn open_camera(runtime: &mut Runtime) {
    runtime.dispatch(Message::OpenCamera);
    runtime.settle().await;
}

#[tokio::test]
async fn test_open_camera_streams() {
    let h = camera_harness();
    let mut runtime = h.runtime();

    runtime.dispatch(Message::OpenCamera);
    assert!(matches!(
        runtime.model().view(),
        Screen::Camera {
            state: CameraState::Requesting,
            can_capture: false,
            ..
        }
    ));

    runtime.settle().await;
    match runtime.model().view() {
        Screen::Camera {
            state,
            message,
            can_capture,
            format,
        } => {
            assert_eq!(state, CameraState::Streaming);
            assert!(can_capture);
            assert!(message.is_none());
            assert!(format.is_some());
        }
        other => panic!("expected the camera view, got {:?}", other),
    }
    assert_eq!(h.camera.stop_count(), 0);
}

#[tokio::test]
async fn test_capture_stops_stream_and_decodes() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    open_camera(&mut runtime).await;

    runtime.dispatch(Message::CaptureFrame);
    assert!(runtime.model().camera.view.is_none());
    assert_eq!(h.camera.stop_count(), 1);

    runtime.settle().await;
    match runtime.model().view() {
        Screen::Result { source, payload, .. } => {
            assert_eq!(payload, "from the camera");
            assert!(matches!(source.origin(), SourceOrigin::Camera { .. }));
            assert_eq!(source.mime(), Some("image/png"));
        }
        other => panic!("expected a result, got {:?}", other),
    }
    assert_eq!(h.camera.stop_count(), 1);
}

#[tokio::test]
async fn test_close_releases_stream() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    open_camera(&mut runtime).await;

    runtime.dispatch(Message::CloseCamera);
    assert_eq!(h.camera.stop_count(), 1);
    assert!(matches!(runtime.model().view(), Screen::Idle { .. }));
    assert!(runtime.model().session.state().is_idle());

    // Closing again is harmless
    runtime.dispatch(Message::CloseCamera);
    assert_eq!(h.camera.stop_count(), 1);
}

#[tokio::test]
async fn test_dropping_session_releases_stream() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    open_camera(&mut runtime).await;
    drop(runtime);
    assert_eq!(h.camera.stop_count(), 1);
}

#[tokio::test]
async fn test_stream_arriving_after_close_is_stopped() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    runtime.dispatch(Message::OpenCamera);
    runtime.dispatch(Message::CloseCamera);
    runtime.settle().await;

    assert_eq!(h.camera.stop_count(), 1);
    assert!(runtime.model().camera.view.is_none());
}

#[tokio::test]
async fn test_stale_stream_does_not_attach_to_new_view() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    runtime.dispatch(Message::OpenCamera);
    runtime.dispatch(Message::CloseCamera);
    runtime.dispatch(Message::OpenCamera);
    runtime.settle().await;

    // First stream stopped on arrival, second one streaming
    assert_eq!(h.camera.stop_count(), 1);
    let view = runtime.model().camera.view.as_ref().unwrap();
    assert_eq!(view.state(), CameraState::Streaming);
    assert_eq!(view.request(), 2);
}

#[tokio::test]
async fn test_denied_camera_shows_message() {
    let h = Harness::new(FakeClipboard::default().into(), FakeCamera::denied());
    let mut runtime = h.runtime();
    open_camera(&mut runtime).await;

    match runtime.model().view() {
        Screen::Camera {
            state,
            message,
            can_capture,
            ..
        } => {
            assert_eq!(state, CameraState::Denied);
            assert_eq!(message, Some(messages::CAMERA_DENIED));
            assert!(!can_capture);
        }
        other => panic!("expected the camera view, got {:?}", other),
    }

    runtime.dispatch(Message::CaptureFrame);
    assert!(runtime.model().camera.view.is_some());

    runtime.dispatch(Message::CloseCamera);
    assert!(matches!(runtime.model().view(), Screen::Idle { .. }));
}

#[tokio::test]
async fn test_camera_not_offered_while_image_loaded() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    runtime.dispatch(Message::LoadSource(SourceImage::from_bytes(
        qr_png("loaded"),
        SourceOrigin::Stdin,
    )));
    runtime.dispatch(Message::OpenCamera);
    runtime.settle().await;

    assert!(runtime.model().camera.view.is_none());
    assert_eq!(h.camera.opens.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_paste_ignored_while_camera_open() {
    let h = camera_harness();
    let mut runtime = h.runtime();
    open_camera(&mut runtime).await;

    runtime.dispatch(Message::ReadClipboard);
    runtime.settle().await;

    assert_eq!(runtime.model().last_paste, Some(PasteResult::Ignored));
    assert!(runtime.model().session.state().is_idle());
    assert!(runtime.model().camera.is_open());
}

#[tokio::test]
async fn test_capture_is_saved_to_capture_dir() {
    let dir = tempfile::tempdir().unwrap();
    let h = camera_harness();
    let model = AppModel::new(Config::default(), h.services())
        .with_capture_dir(Some(dir.path().to_path_buf()));
    let mut runtime = Runtime::new(model);
    open_camera(&mut runtime).await;

    runtime.dispatch(Message::CaptureFrame);
    runtime.settle().await;

    let saved = runtime.model().last_saved_capture.clone().unwrap();
    assert!(saved.starts_with(dir.path()));
    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

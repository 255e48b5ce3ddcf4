// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the decode pipeline

mod common;

use common::{ErroringDecoder, PanickingDecoder, blank_png, qr_image, qr_png};
use image::ImageFormat;
use qr_analyzer::{
    DecodeOutcome, DecodePipeline, RqrrDecoder, SourceImage, SourceOrigin, is_url,
};
use std::io::Cursor;
use std::sync::Arc;

fn pipeline() -> DecodePipeline {
    DecodePipeline::new(Arc::new(RqrrDecoder::new()))
}

fn source(bytes: Vec<u8>) -> SourceImage {
    SourceImage::from_bytes(bytes, SourceOrigin::Stdin)
}

#[tokio::test]
async fn test_decodes_png() {
    let outcome = pipeline().run(&source(qr_png("Hello World!"))).await;
    assert_eq!(
        outcome,
        DecodeOutcome::Success {
            payload: "Hello World!".to_string()
        }
    );
}

#[tokio::test]
async fn test_decodes_url_from_jpeg() {
    // JPEG has no alpha channel
    let rgb = image::DynamicImage::ImageRgba8(qr_image("https://example.com/a?b=c")).to_rgb8();
    let mut bytes = Cursor::new(Vec::new());
    rgb.write_to(&mut bytes, ImageFormat::Jpeg).unwrap();
    let bytes = bytes.into_inner();
    let outcome = pipeline().run(&source(bytes)).await;
    assert_eq!(outcome.payload(), Some("https://example.com/a?b=c"));
}

#[tokio::test]
async fn test_round_trip_payload_corpus() {
    let long = "The quick brown fox jumps over the lazy dog. ".repeat(8);
    // (payload, is a link)
    let corpus: &[(&str, bool)] = &[
        ("a", false),
        ("0", false),
        ("0123456789012345", false),
        ("HELLO WORLD $%*+-./:", false),
        ("Grüße, Ελληνικά 🚀", false),
        ("line one\nline two\ttabbed", false),
        (long.as_str(), false),
        ("WIFI:S:MyNetwork;T:WPA;P:secret;;", true),
        ("mailto:someone@example.com", true),
        ("geo:37.786971,-122.399677", true),
        ("tel:+1234567890", true),
        ("otpauth://totp/Example:alice?secret=JBSWY3DPEHPK3PXP", true),
        ("https://example.com/a?b=c#d", true),
    ];

    // A payload this long needs a larger symbol than the short ones
    assert!(qr_image(&long).width() > qr_image("a").width());

    for &(payload, link) in corpus {
        let outcome = pipeline().run(&source(qr_png(payload))).await;
        assert_eq!(
            outcome,
            DecodeOutcome::Success {
                payload: payload.to_string()
            },
            "payload {:?}",
            payload
        );
        assert_eq!(is_url(payload), link, "link detection for {:?}", payload);
    }
}

#[tokio::test]
async fn test_image_without_code_is_not_found() {
    let outcome = pipeline().run(&source(blank_png(64, 48))).await;
    assert_eq!(outcome, DecodeOutcome::NotFound);
    assert_eq!(
        outcome.error_message(),
        Some("No QR Code found in the image. Please try another one.")
    );
}

#[tokio::test]
async fn test_corrupt_bytes_fail_to_load() {
    let outcome = pipeline().run(&source(b"definitely not an image".to_vec())).await;
    assert_eq!(
        outcome,
        DecodeOutcome::Failure {
            reason: "Failed to load the image.".to_string()
        }
    );

    let outcome = pipeline().run(&source(Vec::new())).await;
    assert_eq!(outcome.error_message(), Some("Failed to load the image."));
}

#[tokio::test]
async fn test_oversized_surface_is_unavailable() {
    let pipeline = pipeline().with_max_surface_dimension(32);
    let outcome = pipeline.run(&source(blank_png(64, 16))).await;
    assert_eq!(
        outcome.error_message(),
        Some("Could not get canvas context.")
    );
}

#[tokio::test]
async fn test_decoder_error_is_scan_failure() {
    let pipeline = DecodePipeline::new(Arc::new(ErroringDecoder));
    let outcome = pipeline.run(&source(qr_png("x"))).await;
    assert_eq!(
        outcome.error_message(),
        Some("An error occurred while scanning the QR code.")
    );
}

#[tokio::test]
async fn test_decoder_panic_is_scan_failure() {
    let pipeline = DecodePipeline::new(Arc::new(PanickingDecoder));
    let outcome = pipeline.run(&source(qr_png("x"))).await;
    assert_eq!(
        outcome.error_message(),
        Some("An error occurred while scanning the QR code.")
    );
}

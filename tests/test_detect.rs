mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use notesight::{CurrencyDetector, Denomination, TextRecognizer};

// Grey ink inside the grey-note HSV box; magenta inside both the violet and
// magenta boxes.
const GREY: [u8; 3] = [128, 128, 128];
const MAGENTA: [u8; 3] = [180, 0, 150];

fn detector(recognizer: Arc<dyn TextRecognizer>) -> CurrencyDetector {
    CurrencyDetector::new(recognizer)
}

#[test]
fn near_black_frame_reports_no_note() {
    let verdict = detector(Arc::new(SilentRecognizer)).detect(&solid_frame(400, 300, [20, 20, 20]));
    assert!(!verdict.success);
    assert_eq!(verdict.denomination, None);
    assert!(verdict.message.contains("fully visible"));
}

#[test]
fn featureless_grey_frame_fails_with_guidance() {
    // Grey matches the grey-note color box but nothing else, which is not
    // enough to clear the confidence floor.
    let verdict = detector(Arc::new(SilentRecognizer)).detect(&solid_frame(400, 300, [90, 90, 90]));
    assert!(!verdict.success);
    assert!(verdict.message.contains("confidence too low"));
}

#[test]
fn repeated_detection_is_deterministic() {
    let frame = note_frame((640, 360), (400, 176), GREY);
    let first = detector(FixedRecognizer::new("500")).detect(&frame);
    let second = detector(FixedRecognizer::new("500")).detect(&frame);
    assert_eq!(first, second);
}

#[test]
fn agreeing_methods_verify_and_cap_confidence() {
    // Grey note with the 150x66 mm shape: digits, size and color all land
    // on the same answer.
    let frame = note_frame((640, 360), (400, 176), GREY);
    let recognizer = FixedRecognizer::new("500");
    let verdict = detector(recognizer.clone()).detect(&frame);

    assert!(verdict.success);
    assert_eq!(verdict.denomination, Some(Denomination::FiveHundred));
    assert_eq!(verdict.confidence, Some(95.0));
    assert!(verdict.verified);
    assert_eq!(
        verdict.method.as_deref(),
        Some("Multi-feature (3/3 methods verified)")
    );
    assert_eq!(verdict.color_name, Some("Stone Grey"));
    assert_eq!(verdict.currency, Some("INR"));
    assert!(verdict.message.contains("₹500"));

    // A unanimous first rotation reads above 80, so the sweep stops after
    // its three binarization variants.
    assert_eq!(recognizer.calls(), 3);
}

#[test]
fn verdict_serializes_to_the_wire_shape() {
    let frame = note_frame((640, 360), (400, 176), GREY);
    let verdict = detector(FixedRecognizer::new("500")).detect(&frame);
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["denomination"], 500);
    assert_eq!(json["currency"], "INR");
    assert_eq!(json["symbol"], "₹");
    assert_eq!(json["verified"], true);
}

#[test]
fn upside_down_frames_detect_identically() {
    let frame = note_frame((640, 360), (400, 176), GREY);
    let flipped = frame.rotate180();
    let upright = detector(FixedRecognizer::new("200")).detect(&frame);
    let rotated = detector(FixedRecognizer::new("200")).detect(&flipped);

    assert_eq!(upright.success, rotated.success);
    assert_eq!(upright.denomination, rotated.denomination);
    assert_eq!(upright.denomination, Some(Denomination::TwoHundred));
    assert_eq!(upright.verified, rotated.verified);
    // The measured outline may differ by a pixel between orientations, so
    // confidences agree closely rather than bit-for-bit.
    let difference =
        (upright.confidence.unwrap_or(0.0) - rotated.confidence.unwrap_or(0.0)).abs();
    assert!(difference < 5.0, "confidence drifted by {difference}");
}

#[test]
fn lone_ocr_reading_sits_at_the_weighted_score() {
    // One variant reads 500, nothing else sees anything: 75 x 0.6 = 45.
    let verdict = detector(ScriptedRecognizer::new(&["500"]))
        .detect(&solid_frame(400, 300, [20, 20, 20]));
    assert!(verdict.success);
    assert_eq!(verdict.denomination, Some(Denomination::FiveHundred));
    assert_eq!(verdict.confidence, Some(45.0));
    assert!(!verdict.verified);
    assert_eq!(verdict.method.as_deref(), Some("Single method detection"));
}

#[test]
fn size_beats_overlapping_color_candidates() {
    // Magenta ink matches both the violet and magenta boxes, but only the
    // 166x66 mm shape fits the measured outline; with no digit reading the
    // size-backed candidate must win.
    let frame = note_frame((640, 320), (400, 158), MAGENTA);
    let verdict = detector(Arc::new(SilentRecognizer)).detect(&frame);
    assert!(verdict.success);
    assert_eq!(verdict.denomination, Some(Denomination::TwoThousand));
    assert!(!verdict.verified);
    assert_eq!(verdict.method.as_deref(), Some("2/3 methods verified"));
}

#[test]
fn stalled_recognizer_degrades_to_a_verdict() {
    let recognizer = Arc::new(SleepyRecognizer {
        delay: Duration::from_millis(300),
    });
    let verdict = detector(recognizer)
        .with_ocr_timeout(Duration::from_millis(25))
        .detect(&solid_frame(400, 300, [20, 20, 20]));
    assert!(!verdict.success);
    assert!(verdict.message.contains("fully visible"));
}

#[test]
fn failing_recognizer_never_breaks_detection() {
    let verdict =
        detector(Arc::new(FailingRecognizer)).detect(&solid_frame(400, 300, [90, 90, 90]));
    assert!(!verdict.success);
    assert!(verdict.message.contains("confidence too low"));
}

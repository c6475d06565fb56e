use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use image::{GrayImage, RgbImage, imageops};
use imageproc::contrast::{ThresholdType, adaptive_threshold, otsu_level, threshold};

use super::ocr::{TextRecognizer, recognize_bounded};
use crate::models::{Denomination, MethodResult, MethodSource};

/// Rotations swept when hunting for denomination digits.
const SWEEP_DEGREES: [u32; 4] = [0, 90, 180, 270];

/// Block radius 5 gives the 11x11 adaptive threshold neighborhood.
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

/// The sweep stops once a rotation reads this confidently.
const EARLY_EXIT_CONFIDENCE: f32 = 80.0;

/// Best digit reading over the rotation sweep.
#[derive(Debug, Clone)]
pub struct DigitReading {
    pub result: MethodResult,
    /// Rotation (degrees clockwise) the best reading came from.
    pub rotation: u32,
}

impl DigitReading {
    pub fn empty() -> Self {
        Self {
            result: MethodResult::empty(MethodSource::Ocr),
            rotation: 0,
        }
    }
}

/// Read denomination digits from the frame.
///
/// Each rotation is recognized three times over distinct binarizations (raw
/// grayscale, Otsu global, adaptive local); readings naming a legal
/// denomination are tallied and the modal value wins. Confidence grows with
/// how many variants agreed and is capped at 95.
pub fn extract(
    frame: &RgbImage,
    recognizer: &Arc<dyn TextRecognizer>,
    timeout: Duration,
) -> DigitReading {
    let gray = imageops::grayscale(frame);
    let mut best = DigitReading::empty();

    for degrees in SWEEP_DEGREES {
        let rotated = rotate(&gray, degrees);
        let variants = [
            rotated.clone(),
            threshold(&rotated, otsu_level(&rotated), ThresholdType::Binary),
            adaptive_threshold(&rotated, ADAPTIVE_BLOCK_RADIUS),
        ];

        let mut tally: BTreeMap<Denomination, u32> = BTreeMap::new();
        for variant in &variants {
            let Some(text) = recognize_bounded(recognizer, variant, timeout) else {
                continue;
            };
            for denomination in valid_denominations(&text) {
                *tally.entry(denomination).or_insert(0) += 1;
            }
        }

        if let Some((denomination, frequency)) = modal(&tally) {
            let confidence = (60.0 + 15.0 * frequency as f32).min(95.0);
            if confidence > best.result.confidence {
                best = DigitReading {
                    result: MethodResult::new(denomination, confidence, MethodSource::Ocr),
                    rotation: degrees,
                };
            }
            if confidence > EARLY_EXIT_CONFIDENCE {
                break;
            }
        }
    }

    best
}

fn rotate(gray: &GrayImage, degrees: u32) -> GrayImage {
    match degrees {
        90 => imageops::rotate90(gray),
        180 => imageops::rotate180(gray),
        270 => imageops::rotate270(gray),
        _ => gray.clone(),
    }
}

/// All integer substrings of `text` that name a legal denomination.
fn valid_denominations(text: &str) -> Vec<Denomination> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter_map(|digits| digits.parse::<u32>().ok())
        .filter_map(Denomination::from_value)
        .collect()
}

/// Most frequent tallied denomination; ties go to the smaller face value.
fn modal(tally: &BTreeMap<Denomination, u32>) -> Option<(Denomination, u32)> {
    let mut best: Option<(Denomination, u32)> = None;
    for (&denomination, &count) in tally {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((denomination, count)),
        }
    }
    best
}

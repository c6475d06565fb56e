use std::cmp::Ordering;

use image::{
    RgbImage,
    imageops::{self, FilterType},
};
use palette::{FromColor, Hsv, Srgb};

use crate::models::{Denomination, MethodResult, MethodSource};
use crate::profiles::ProfileTable;

/// Downsample edge for the mean-color pass.
const MEAN_SAMPLE_SIZE: u32 = 150;

/// Value-channel gates excluding near-black background and blown highlights.
const VALUE_FLOOR: f32 = 0.118;
const VALUE_CEILING: f32 = 0.902;

/// Minimum share of frame pixels inside a profile box to count (percent).
const MIN_COVERAGE_PERCENT: f32 = 2.0;

fn pixel_hsv(pixel: &image::Rgb<u8>) -> (f32, f32, f32) {
    let hsv = Hsv::from_color(Srgb::new(
        pixel.0[0] as f32 / 255.0,
        pixel.0[1] as f32 / 255.0,
        pixel.0[2] as f32 / 255.0,
    ));
    (hsv.hue.into_positive_degrees(), hsv.saturation, hsv.value)
}

/// Range-overlap matcher: for each denomination, the share of frame pixels
/// inside its reference HSV box. Candidates below 2% coverage are dropped;
/// the rest come back sorted by coverage, ties by ascending face value.
pub fn match_by_coverage(frame: &RgbImage, table: &ProfileTable) -> Vec<MethodResult> {
    let total = (frame.width() as u64 * frame.height() as u64) as f32;
    if total == 0.0 {
        return Vec::new();
    }

    let mut counts = [0u64; 7];
    for pixel in frame.pixels() {
        let (hue, saturation, value) = pixel_hsv(pixel);
        for (i, profile) in table.iter().enumerate() {
            if profile.color_range.contains(hue, saturation, value) {
                counts[i] += 1;
            }
        }
    }

    let mut matches: Vec<(Denomination, f32)> = table
        .iter()
        .zip(counts)
        .map(|(profile, count)| (profile.denomination, count as f32 / total * 100.0))
        .filter(|&(_, coverage)| coverage > MIN_COVERAGE_PERCENT)
        .collect();

    matches.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    matches
        .into_iter()
        .map(|(denomination, coverage)| {
            MethodResult::new(denomination, coverage, MethodSource::ColorCoverage)
        })
        .collect()
}

/// Average-color matcher: downsample, gate out background and glare by the
/// value channel, and test the mean (hue, saturation) point against each
/// reference box. Confidence reflects how centered the mean hue sits; only
/// the single best match is returned.
///
/// The hue mean is plain arithmetic, not circular; reference boxes never
/// wrap the hue origin so the shortcut holds.
pub fn match_by_mean(frame: &RgbImage, table: &ProfileTable) -> MethodResult {
    let small = imageops::resize(frame, MEAN_SAMPLE_SIZE, MEAN_SAMPLE_SIZE, FilterType::Triangle);

    let mut hue_sum = 0.0f64;
    let mut saturation_sum = 0.0f64;
    let mut samples = 0u32;
    for pixel in small.pixels() {
        let (hue, saturation, value) = pixel_hsv(pixel);
        if value > VALUE_FLOOR && value < VALUE_CEILING {
            hue_sum += hue as f64;
            saturation_sum += saturation as f64;
            samples += 1;
        }
    }
    if samples == 0 {
        return MethodResult::empty(MethodSource::ColorAverage);
    }

    let mean_hue = (hue_sum / samples as f64) as f32;
    let mean_saturation = (saturation_sum / samples as f64) as f32;

    let mut best = MethodResult::empty(MethodSource::ColorAverage);
    for profile in table.iter() {
        let range = &profile.color_range;
        if !range.contains_mean(mean_hue, mean_saturation) {
            continue;
        }
        let half_width = range.hue_half_width();
        let distance = if half_width > 0.0 {
            (mean_hue - range.hue_center()).abs() / half_width
        } else {
            0.0
        };
        let confidence = ((1.0 - distance) * 100.0).max(0.0);
        // Strictly greater keeps the smaller face value on ties and leaves
        // zero-confidence matches unreported.
        if confidence > best.confidence {
            best = MethodResult::new(profile.denomination, confidence, MethodSource::ColorAverage);
        }
    }
    best
}

/// Histogram-mode hue (degrees) of the non-background pixels. Diagnostic
/// only; surfaced in verbose output.
pub fn dominant_hue(frame: &RgbImage) -> Option<f32> {
    const BINS: usize = 180;
    let mut histogram = [0u32; BINS];
    let mut seen = false;
    for pixel in frame.pixels() {
        let (hue, _, value) = pixel_hsv(pixel);
        if value <= VALUE_FLOOR {
            continue;
        }
        let bin = ((hue / 360.0 * BINS as f32) as usize).min(BINS - 1);
        histogram[bin] += 1;
        seen = true;
    }
    if !seen {
        return None;
    }
    let (bin, _) = histogram
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| count)?;
    Some((bin as f32 + 0.5) * 360.0 / BINS as f32)
}

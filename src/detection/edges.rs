use image::{RgbImage, imageops};
use imageproc::edges::canny;

use crate::models::{Denomination, MethodResult, MethodSource};

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Mean Canny response (0-255 scale) separating busy engravings from plain
/// fields. Higher denominations carry denser motifs.
const HIGH_COMPLEXITY: f32 = 0.15;
const MEDIUM_COMPLEXITY: f32 = 0.10;

/// This heuristic is a coarse fallback and always votes at low confidence.
const EDGE_CONFIDENCE: f32 = 40.0;

/// Mean edge response per horizontal third plus the whole frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeDensity {
    pub left: f32,
    pub center: f32,
    pub right: f32,
    pub global: f32,
}

pub fn measure(frame: &RgbImage) -> EdgeDensity {
    let gray = imageops::grayscale(frame);
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 {
        return EdgeDensity::default();
    }

    let third = (width / 3).max(1);
    let mut sums = [0.0f64; 3];
    let mut counts = [0u64; 3];
    for (x, _, pixel) in edges.enumerate_pixels() {
        let band = ((x / third) as usize).min(2);
        sums[band] += pixel.0[0] as f64;
        counts[band] += 1;
    }

    let density = |band: usize| -> f32 {
        if counts[band] == 0 {
            0.0
        } else {
            (sums[band] / counts[band] as f64) as f32
        }
    };
    let total: f64 = sums.iter().sum();
    EdgeDensity {
        left: density(0),
        center: density(1),
        right: density(2),
        global: (total / (width as u64 * height as u64) as f64) as f32,
    }
}

/// Bucket overall edge complexity into a coarse candidate set and vote for
/// its middle element. The per-third densities ride along as diagnostics.
pub fn estimate(frame: &RgbImage) -> (MethodResult, EdgeDensity) {
    let density = measure(frame);

    let candidates: &[Denomination] = if density.global > HIGH_COMPLEXITY {
        &[
            Denomination::FiveHundred,
            Denomination::TwoThousand,
            Denomination::TwoHundred,
        ]
    } else if density.global > MEDIUM_COMPLEXITY {
        &[Denomination::OneHundred, Denomination::TwoHundred]
    } else {
        &[
            Denomination::Ten,
            Denomination::Twenty,
            Denomination::Fifty,
        ]
    };

    let pick = candidates[candidates.len() / 2];
    (
        MethodResult::new(pick, EDGE_CONFIDENCE, MethodSource::EdgeComplexity),
        density,
    )
}

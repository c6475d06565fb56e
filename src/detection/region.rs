use std::cmp::Ordering;

use image::{GrayImage, RgbImage, imageops};
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::models::{Denomination, MethodResult, MethodSource, NoteRegion};
use crate::profiles::ProfileTable;

/// Sigma matching a 5x5 smoothing kernel.
const BLUR_SIGMA: f32 = 1.1;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Contours smaller than this are speckle, not a note.
const MIN_CONTOUR_AREA: f64 = 1000.0;

/// Polygon approximation epsilon as a share of the closed perimeter.
const APPROX_EPSILON_FRACTION: f64 = 0.02;

/// Size window half-width as a share of the reference ratio.
const RATIO_TOLERANCE_FRACTION: f32 = 0.10;

/// Find the note outline: the largest four-cornered outer contour.
pub fn locate(frame: &RgbImage) -> Option<NoteRegion> {
    let gray = imageops::grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    largest_quad(&edges).map(|quad| region_from_quad(&quad))
}

fn largest_quad(edges: &GrayImage) -> Option<Vec<Point<i32>>> {
    let mut best: Option<(f64, Vec<Point<i32>>)> = None;

    for contour in find_contours::<i32>(edges) {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let area = polygon_area(&contour.points);
        if area < MIN_CONTOUR_AREA {
            continue;
        }
        let perimeter = arc_length(&contour.points, true);
        let approx =
            approximate_polygon_dp(&contour.points, APPROX_EPSILON_FRACTION * perimeter, true);
        if approx.len() != 4 {
            continue;
        }
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, approx));
        }
    }

    best.map(|(_, quad)| quad)
}

/// Shoelace area of a closed polygon.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

fn region_from_quad(quad: &[Point<i32>]) -> NoteRegion {
    let min_x = quad.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = quad.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = quad.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = quad.iter().map(|p| p.y).max().unwrap_or(0);

    let width = (max_x - min_x + 1).max(1) as u32;
    let height = (max_y - min_y + 1).max(1) as u32;

    let mut corners = [(0i32, 0i32); 4];
    for (slot, point) in corners.iter_mut().zip(quad) {
        *slot = (point.x, point.y);
    }

    NoteRegion {
        corners,
        width,
        height,
        aspect_ratio: normalize_ratio(width, height),
    }
}

/// Width over height, inverted when below 1. Notes may be photographed in
/// either orientation.
pub fn normalize_ratio(width: u32, height: u32) -> f32 {
    let ratio = width as f32 / height.max(1) as f32;
    if ratio < 1.0 { 1.0 / ratio } else { ratio }
}

/// Compare a measured aspect ratio against every profile within a ±10%
/// window. Top three by confidence; ties by smaller absolute difference,
/// then ascending face value.
pub fn match_by_size(aspect_ratio: f32, table: &ProfileTable) -> Vec<MethodResult> {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Vec::new();
    }

    let mut matches: Vec<(Denomination, f32, f32)> = Vec::new();
    for profile in table.iter() {
        let tolerance = profile.aspect_ratio * RATIO_TOLERANCE_FRACTION;
        let difference = (aspect_ratio - profile.aspect_ratio).abs();
        if difference <= tolerance {
            let confidence = (1.0 - difference / tolerance) * 100.0;
            matches.push((profile.denomination, confidence, difference));
        }
    }

    matches.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
            .then(a.0.cmp(&b.0))
    });
    matches.truncate(3);
    matches
        .into_iter()
        .map(|(denomination, confidence, _)| {
            MethodResult::new(denomination, confidence, MethodSource::Size)
        })
        .collect()
}

use image::{
    DynamicImage, Rgb, RgbImage,
    imageops::{self, FilterType},
};
use palette::{FromColor, IntoColor, Lab, Srgb};

/// Longest frame edge fed to the analysis methods.
const MAX_DIMENSION: u32 = 800;

/// Contrast-limited equalization parameters: clip factor over a uniform
/// histogram, and the tile grid edge.
const CLAHE_CLIP_LIMIT: f32 = 3.0;
const CLAHE_GRID: u32 = 8;

/// Range-weighted denoise parameters.
const DENOISE_RADIUS: u32 = 3;
const DENOISE_RANGE_SIGMA: f32 = 25.0;

/// Normalize a raw frame before any analysis: bounded resize, local
/// lightness equalization, edge-preserving denoise.
pub fn preprocess(frame: &DynamicImage) -> RgbImage {
    let rgb = frame.to_rgb8();
    let resized = cap_size(rgb);
    let equalized = equalize_lightness(&resized);
    denoise(&equalized)
}

fn cap_size(rgb: RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    let longest = width.max(height);
    if longest <= MAX_DIMENSION {
        return rgb;
    }
    let scale = MAX_DIMENSION as f32 / longest as f32;
    let new_width = ((width as f32 * scale).round() as u32).max(1);
    let new_height = ((height as f32 * scale).round() as u32).max(1);
    imageops::resize(&rgb, new_width, new_height, FilterType::Triangle)
}

/// Equalize perceptual lightness tile-locally, leaving chroma untouched.
/// Works on the L plane of Lab so color casts survive the contrast boost.
fn equalize_lightness(rgb: &RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    if width < CLAHE_GRID || height < CLAHE_GRID {
        return rgb.clone();
    }

    let mut lab_pixels: Vec<Lab> = Vec::with_capacity((width * height) as usize);
    let mut lightness: Vec<u8> = Vec::with_capacity((width * height) as usize);
    for pixel in rgb.pixels() {
        let lab = Lab::from_color(Srgb::new(
            pixel.0[0] as f32 / 255.0,
            pixel.0[1] as f32 / 255.0,
            pixel.0[2] as f32 / 255.0,
        ));
        lightness.push((lab.l / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8);
        lab_pixels.push(lab);
    }

    let equalized = clahe(&lightness, width, height);

    let mut out = RgbImage::new(width, height);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let mut lab = lab_pixels[i];
        lab.l = equalized[i] as f32 / 255.0 * 100.0;
        let srgb: Srgb = lab.into_color();
        *pixel = Rgb([
            (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
            (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
            (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]);
    }
    out
}

/// Contrast-limited adaptive histogram equalization: per-tile clipped
/// histograms become lookup tables, blended bilinearly between the four
/// surrounding tiles so tile seams never show.
fn clahe(plane: &[u8], width: u32, height: u32) -> Vec<u8> {
    let grid = CLAHE_GRID as usize;
    let mut luts = vec![[0u8; 256]; grid * grid];

    for tile_y in 0..grid {
        for tile_x in 0..grid {
            let x0 = tile_x * width as usize / grid;
            let x1 = (tile_x + 1) * width as usize / grid;
            let y0 = tile_y * height as usize / grid;
            let y1 = (tile_y + 1) * height as usize / grid;
            let area = ((x1 - x0) * (y1 - y0)) as u32;
            if area == 0 {
                continue;
            }

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[plane[y * width as usize + x] as usize] += 1;
                }
            }

            // Clip the histogram and hand the excess back evenly.
            let limit = ((CLAHE_CLIP_LIMIT * area as f32 / 256.0).max(1.0)) as u32;
            let mut excess = 0u32;
            for count in histogram.iter_mut() {
                if *count > limit {
                    excess += *count - limit;
                    *count = limit;
                }
            }
            let refill = excess / 256;
            for count in histogram.iter_mut() {
                *count += refill;
            }
            let remainder = excess % 256;
            if remainder > 0 {
                let stride = 256.0 / remainder as f32;
                for k in 0..remainder {
                    let bin = ((k as f32 * stride) as usize).min(255);
                    histogram[bin] += 1;
                }
            }

            let lut = &mut luts[tile_y * grid + tile_x];
            let mut cumulative = 0u32;
            for (value, &count) in histogram.iter().enumerate() {
                cumulative += count;
                lut[value] = ((cumulative as f32 * 255.0 / area as f32).round()).min(255.0) as u8;
            }
        }
    }

    let tile_w = width as f32 / grid as f32;
    let tile_h = height as f32 / grid as f32;
    let mut out = vec![0u8; plane.len()];
    for y in 0..height as usize {
        let fy = ((y as f32 + 0.5) / tile_h - 0.5).clamp(0.0, (grid - 1) as f32);
        let ty0 = fy.floor() as usize;
        let ty1 = (ty0 + 1).min(grid - 1);
        let wy = fy - ty0 as f32;
        for x in 0..width as usize {
            let fx = ((x as f32 + 0.5) / tile_w - 0.5).clamp(0.0, (grid - 1) as f32);
            let tx0 = fx.floor() as usize;
            let tx1 = (tx0 + 1).min(grid - 1);
            let wx = fx - tx0 as f32;

            let value = plane[y * width as usize + x] as usize;
            let top = luts[ty0 * grid + tx0][value] as f32 * (1.0 - wx)
                + luts[ty0 * grid + tx1][value] as f32 * wx;
            let bottom = luts[ty1 * grid + tx0][value] as f32 * (1.0 - wx)
                + luts[ty1 * grid + tx1][value] as f32 * wx;
            out[y * width as usize + x] = (top * (1.0 - wy) + bottom * wy).round() as u8;
        }
    }
    out
}

/// Range-weighted smoothing: neighbors vote on a pixel in proportion to how
/// similar their color is, so flat regions smooth out while edges hold.
fn denoise(rgb: &RgbImage) -> RgbImage {
    let (width, height) = rgb.dimensions();
    let mut out = RgbImage::new(width, height);
    let sigma_term = 2.0 * DENOISE_RANGE_SIGMA * DENOISE_RANGE_SIGMA;

    for y in 0..height {
        for x in 0..width {
            let center = rgb.get_pixel(x, y);
            let mut sums = [0.0f32; 3];
            let mut weight_sum = 0.0f32;

            let y_lo = y.saturating_sub(DENOISE_RADIUS);
            let y_hi = (y + DENOISE_RADIUS + 1).min(height);
            let x_lo = x.saturating_sub(DENOISE_RADIUS);
            let x_hi = (x + DENOISE_RADIUS + 1).min(width);

            for ny in y_lo..y_hi {
                for nx in x_lo..x_hi {
                    let neighbor = rgb.get_pixel(nx, ny);
                    let mut distance_sq = 0.0f32;
                    for channel in 0..3 {
                        let diff = neighbor.0[channel] as f32 - center.0[channel] as f32;
                        distance_sq += diff * diff;
                    }
                    let weight = (-distance_sq / sigma_term).exp();
                    for channel in 0..3 {
                        sums[channel] += neighbor.0[channel] as f32 * weight;
                    }
                    weight_sum += weight;
                }
            }

            let smoothed = Rgb([
                (sums[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (sums[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (sums[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
            ]);
            out.put_pixel(x, y, smoothed);
        }
    }
    out
}

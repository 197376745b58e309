//! Canny edge detection with a 3x3 Sobel aperture and L1 gradient magnitude.
//!
//! The input is used as-is (no pre-blur). Non-maximum suppression compares
//! strictly against the predecessor and non-strictly against the successor
//! along horizontal and vertical directions, so a symmetric step produces a
//! single-pixel line. Hysteresis keeps weak pixels only when they are
//! 8-connected to a strong pixel.

use std::collections::HashSet;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::gradients::{sobel, GradientDirection};

/// tan(22.5°) in Q15 fixed point
const TAN_22_5_Q15: i64 = 13573;

/// Detect edges; output pixels are 255 on edges and 0 elsewhere
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let (low, high) = ordered_thresholds(low_threshold, high_threshold);

    let gx = sobel(image, GradientDirection::Horizontal);
    let gy = sobel(image, GradientDirection::Vertical);
    let magnitude: ImageBuffer<Luma<i32>, Vec<i32>> = ImageBuffer::from_fn(width, height, |x, y| {
        Luma([(gx.get_pixel(x, y)[0] as i32).abs() + (gy.get_pixel(x, y)[0] as i32).abs()])
    });

    let mut candidates = GrayImage::new(width, height);
    let mut strong = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let m = magnitude.get_pixel(x, y)[0];
            if m <= low {
                continue;
            }
            let (dx, dy) = (gx.get_pixel(x, y)[0] as i32, gy.get_pixel(x, y)[0] as i32);
            if !is_local_maximum(&magnitude, x, y, dx, dy) {
                continue;
            }
            candidates.put_pixel(x, y, Luma([255]));
            if m > high {
                strong.push((x, y));
            }
        }
    }

    hysteresis(&candidates, &strong)
}

/// Integer thresholds with `low <= high`
fn ordered_thresholds(low: f32, high: f32) -> (i32, i32) {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    (low.floor() as i32, high.floor() as i32)
}

fn magnitude_at(magnitude: &ImageBuffer<Luma<i32>, Vec<i32>>, x: i64, y: i64) -> i32 {
    let (width, height) = magnitude.dimensions();
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return 0;
    }
    magnitude.get_pixel(x as u32, y as u32)[0]
}

fn is_local_maximum(
    magnitude: &ImageBuffer<Luma<i32>, Vec<i32>>,
    x: u32,
    y: u32,
    dx: i32,
    dy: i32,
) -> bool {
    let m = magnitude.get_pixel(x, y)[0];
    let (x, y) = (x as i64, y as i64);
    let ax = dx.unsigned_abs() as i64;
    let ay = (dy.unsigned_abs() as i64) << 15;

    let tan22 = ax * TAN_22_5_Q15;
    if ay < tan22 {
        // gradient mostly along x
        return m > magnitude_at(magnitude, x - 1, y) && m >= magnitude_at(magnitude, x + 1, y);
    }

    let tan67 = tan22 + (ax << 16);
    if ay > tan67 {
        return m > magnitude_at(magnitude, x, y - 1) && m >= magnitude_at(magnitude, x, y + 1);
    }

    let s = if (dx ^ dy) < 0 { -1 } else { 1 };
    m > magnitude_at(magnitude, x - s, y - 1) && m > magnitude_at(magnitude, x + s, y + 1)
}

/// Keep candidate components that contain at least one strong pixel
fn hysteresis(candidates: &GrayImage, strong: &[(u32, u32)]) -> GrayImage {
    let (width, height) = candidates.dimensions();
    if strong.is_empty() {
        return GrayImage::new(width, height);
    }

    let labels = connected_components(candidates, Connectivity::Eight, Luma([0u8]));
    let anchored: HashSet<u32> = strong
        .iter()
        .map(|&(x, y)| labels.get_pixel(x, y)[0])
        .collect();

    GrayImage::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y)[0];
        if label != 0 && anchored.contains(&label) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

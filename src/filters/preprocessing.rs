use anyhow::{bail, Result};
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::stats;

/// Thresholding rule applied per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdType {
    Binary,
    BinaryInverted,
    Truncate,
    ToZero,
    ToZeroInverted,
}

impl ThresholdType {
    pub const ALL: [ThresholdType; 5] = [
        ThresholdType::Binary,
        ThresholdType::BinaryInverted,
        ThresholdType::Truncate,
        ThresholdType::ToZero,
        ThresholdType::ToZeroInverted,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ThresholdType::Binary => "BINARY",
            ThresholdType::BinaryInverted => "BINARY_INV",
            ThresholdType::Truncate => "TRUNC",
            ThresholdType::ToZero => "TOZERO",
            ThresholdType::ToZeroInverted => "TOZERO_INV",
        }
    }

    fn apply(&self, value: u8, threshold: u8, max_value: u8) -> u8 {
        let above = value > threshold;
        match self {
            ThresholdType::Binary => if above { max_value } else { 0 },
            ThresholdType::BinaryInverted => if above { 0 } else { max_value },
            ThresholdType::Truncate => if above { threshold } else { value },
            ThresholdType::ToZero => if above { value } else { 0 },
            ThresholdType::ToZeroInverted => if above { 0 } else { value },
        }
    }
}

/// Sigma used for a Gaussian kernel of the given size when none is specified
pub fn sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian blur with a square odd-sized kernel
pub fn gaussian_blur(img: &GrayImage, ksize: u32) -> Result<GrayImage> {
    check_odd_kernel(ksize)?;
    Ok(gaussian_blur_f32(img, sigma_for_kernel(ksize)))
}

/// Median blur with a square odd-sized kernel
pub fn median_blur(img: &GrayImage, ksize: u32) -> Result<GrayImage> {
    check_odd_kernel(ksize)?;
    let radius = ksize / 2;
    Ok(median_filter(img, radius, radius))
}

fn check_odd_kernel(ksize: u32) -> Result<()> {
    if ksize == 0 || ksize % 2 == 0 {
        bail!("Kernel size must be odd and positive, got {}", ksize);
    }
    Ok(())
}

/// Apply a fixed threshold
pub fn threshold(img: &GrayImage, threshold: u8, max_value: u8, kind: ThresholdType) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([kind.apply(img.get_pixel(x, y)[0], threshold, max_value)])
    })
}

/// Binary threshold at the Otsu level; returns the level and the result
pub fn otsu_threshold(img: &GrayImage, max_value: u8) -> (u8, GrayImage) {
    let level = otsu_level(img);
    (level, threshold(img, level, max_value, ThresholdType::Binary))
}

/// 256-bin intensity histogram
pub fn histogram(img: &GrayImage) -> [u32; 256] {
    stats::histogram(img)
        .channels
        .into_iter()
        .next()
        .unwrap_or([0; 256])
}

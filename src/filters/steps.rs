use crate::filters::gradients::{self, GradientDirection};
use crate::filters::{canny, preprocessing};
use crate::filters::preprocessing::ThresholdType;
use crate::pipeline::{FilterContext, FilterStep};
use anyhow::Result;
use image::GrayImage;

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeDetectionStep {
    fn default() -> Self {
        Self {
            low_threshold: 100.0,
            high_threshold: 200.0,
        }
    }
}

impl FilterStep for EdgeDetectionStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        Ok(canny::canny(image, self.low_threshold, self.high_threshold))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }

    fn label(&self) -> String {
        format!("Canny ({},{})", self.low_threshold, self.high_threshold)
    }
}

/// Blend of |Sobel X| and |Sobel Y|
pub struct WeightedSobelStep {
    pub x_weight: f32,
    pub y_weight: f32,
}

impl FilterStep for WeightedSobelStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        let sx = gradients::abs_saturate(&gradients::sobel(image, GradientDirection::Horizontal));
        let sy = gradients::abs_saturate(&gradients::sobel(image, GradientDirection::Vertical));
        gradients::blend_weighted(&sx, self.x_weight, &sy, self.y_weight)
    }

    fn name(&self) -> &str {
        "Sobel Blend"
    }

    fn label(&self) -> String {
        format!("Sobel ({}, {})", self.x_weight, self.y_weight)
    }
}

/// Absolute Laplacian
pub struct LaplacianStep {
    pub ksize: u32,
}

impl FilterStep for LaplacianStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        Ok(gradients::abs_saturate(&gradients::laplacian(image, self.ksize)?))
    }

    fn name(&self) -> &str {
        "Laplacian"
    }

    fn label(&self) -> String {
        format!("Laplacian (ksize={})", self.ksize)
    }
}

/// Fixed-level threshold
pub struct ThresholdStep {
    pub threshold: u8,
    pub max_value: u8,
    pub kind: ThresholdType,
}

impl FilterStep for ThresholdStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        Ok(preprocessing::threshold(image, self.threshold, self.max_value, self.kind))
    }

    fn name(&self) -> &str {
        "Threshold"
    }

    fn label(&self) -> String {
        format!("{} (v={})", self.kind.title(), self.threshold)
    }
}

/// Binary threshold at the Otsu level
pub struct OtsuStep {
    pub max_value: u8,
}

impl FilterStep for OtsuStep {
    fn apply(&self, image: &GrayImage, context: &FilterContext) -> Result<GrayImage> {
        let (level, out) = preprocessing::otsu_threshold(image, self.max_value);
        if context.verbose {
            tracing::debug!("Otsu level: {}", level);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "Otsu Threshold"
    }
}

/// Apply Gaussian blur
pub struct BlurStep {
    pub ksize: u32,
}

impl FilterStep for BlurStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        preprocessing::gaussian_blur(image, self.ksize)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }

    fn label(&self) -> String {
        format!("Gaussian Blur ({}x{})", self.ksize, self.ksize)
    }
}

/// Apply median blur
pub struct MedianBlurStep {
    pub ksize: u32,
}

impl FilterStep for MedianBlurStep {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        preprocessing::median_blur(image, self.ksize)
    }

    fn name(&self) -> &str {
        "Median Blur"
    }

    fn label(&self) -> String {
        format!("Median Blur ({})", self.ksize)
    }
}

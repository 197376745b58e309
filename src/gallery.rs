//! Display-only figures: edge comparisons, filter sweeps and dataset samples.

use anyhow::{anyhow, Result};
use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::LabeledBatches;
use crate::figure::{Figure, Panel};
use crate::filters::{self, preprocessing, SweepGroup, GLOBAL_THRESHOLD};
use crate::filters::preprocessing::ThresholdType;
use crate::models::Category;
use crate::pipeline::{FilterContext, FilterStep};

/// Layout for the sample-thumbnail figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub max_samples: usize,
    pub rows: usize,
    pub cols: usize,
}

impl SampleGrid {
    /// 18 thumbnails on a 5x4 grid
    pub const RAW: SampleGrid = SampleGrid {
        max_samples: 18,
        rows: 5,
        cols: 4,
    };

    /// 9 thumbnails on a 5x3 grid
    pub const FILTERED: SampleGrid = SampleGrid {
        max_samples: 9,
        rows: 5,
        cols: 3,
    };
}

/// Original next to its edge map, titled after the category
pub fn render_comparison(
    original: &GrayImage,
    edges: &GrayImage,
    category: &Category,
    figures_dir: &Path,
) -> Result<PathBuf> {
    let mut figure = Figure::new(1, 2).with_title(format!("Edge Detection - {}", category.display_name()));
    figure.set(0, Panel::image("Original Image", original.clone()))?;
    figure.set(1, Panel::image("Edge Image", edges.clone()))?;
    figure.save(figures_dir, &format!("edge_comparison_{}", category.name()))
}

/// Original followed by the output of every step of one sweep group
pub fn render_sweep(
    image: &GrayImage,
    group: &SweepGroup,
    context: &FilterContext,
    figures_dir: &Path,
) -> Result<PathBuf> {
    let mut figure = Figure::new(group.rows, group.cols).with_title(group.title);
    figure.push(Panel::image("Original Grayscale Image", image.clone()))?;
    for step in &group.steps {
        let out = step.apply(image, context)?;
        figure.push(Panel::image(step.label(), out))?;
    }
    figure.save(figures_dir, group.name)
}

/// Canny, Sobel, Laplacian, thresholding and smoothing sweeps, one figure each
pub fn render_edge_sweep(image: &GrayImage, context: &FilterContext, figures_dir: &Path) -> Result<Vec<PathBuf>> {
    filters::build_edge_sweep()
        .iter()
        .map(|group| render_sweep(image, group, context, figures_dir))
        .collect()
}

/// The five fixed-level threshold types in a 2x3 grid
pub fn render_threshold_gallery(image: &GrayImage, figures_dir: &Path) -> Result<PathBuf> {
    let context = FilterContext::default();
    let mut figure = Figure::new(2, 3).with_title("Thresholding");
    figure.push(Panel::image("Original Image", image.clone()))?;
    for step in filters::build_threshold_sweep() {
        let out = step.apply(image, &context)?;
        figure.push(Panel::image(step.label(), out))?;
    }
    figure.save(figures_dir, "thresholds")
}

/// Global vs. Otsu vs. blurred Otsu, each with the histogram of its input
pub fn render_otsu_comparison(image: &GrayImage, verbose: bool, figures_dir: &Path) -> Result<PathBuf> {
    let global = preprocessing::threshold(image, GLOBAL_THRESHOLD, 255, ThresholdType::Binary);
    let (level, otsu) = preprocessing::otsu_threshold(image, 255);

    let blurred = preprocessing::gaussian_blur(image, 5)?;
    let blurred_otsu = filters::build_blurred_otsu_pipeline(verbose).run(image, "otsu")?;
    info!("Otsu level: {}", level);

    let rows = [
        ("Original Noisy Image", image, format!("Global Thresholding (v={})", GLOBAL_THRESHOLD), global),
        ("Original Noisy Image", image, "Otsu's Thresholding".to_string(), otsu),
        ("Gaussian filtered Image", &blurred, "Otsu's Thresholding".to_string(), blurred_otsu),
    ];

    let mut figure = Figure::new(3, 3).with_title("Otsu Thresholding");
    for (input_title, input, result_title, result) in rows {
        figure.push(Panel::image(input_title, input.clone()))?;
        figure.push(Panel::histogram("Histogram", preprocessing::histogram(input)))?;
        figure.push(Panel::image(result_title, result))?;
    }
    figure.save(figures_dir, "otsu")
}

/// Thumbnails from the first batch titled with their class names
///
/// Fails before drawing anything when the source does not expose class names.
pub fn plot_sample_images(
    source: &dyn LabeledBatches,
    grid: SampleGrid,
    heading: &str,
    figures_dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let class_names = source
        .class_names()
        .ok_or_else(|| anyhow!("{} dataset does not expose class names", heading))?;
    info!("{} class names: {:?}", heading, class_names);

    let mut figure = Figure::new(grid.rows, grid.cols).with_title(format!("{} samples", heading));
    if let Some(batch) = source.first_batch()? {
        let count = batch.len().min(grid.max_samples).min(grid.rows * grid.cols);
        for i in 0..count {
            let label = batch.labels[i];
            let class_name = class_names
                .get(label)
                .ok_or_else(|| anyhow!("Label {} has no class name", label))?;
            figure.set(i, Panel::image(class_name.clone(), batch.image(i)?))?;
        }
    }
    figure.save(figures_dir, name)
}

pub mod canny;
pub mod gradients;
pub mod preprocessing;
pub mod steps;

use crate::filters::preprocessing::ThresholdType;
use crate::filters::steps::*;
use crate::pipeline::{FilterStep, Pipeline};
use std::sync::Arc;

/// Canny hysteresis thresholds used for the batch run
pub const DEFAULT_LOW_THRESHOLD: f32 = 100.0;
pub const DEFAULT_HIGH_THRESHOLD: f32 = 200.0;

/// Threshold level used by the fixed-level galleries
pub const GLOBAL_THRESHOLD: u8 = 127;

/// Binary threshold level of the filter sweep
pub const SWEEP_BINARY_THRESHOLD: u8 = 90;

/// The edge filter applied to every file of a batch run
pub fn default_edge_filter() -> Arc<dyn FilterStep> {
    Arc::new(EdgeDetectionStep {
        low_threshold: DEFAULT_LOW_THRESHOLD,
        high_threshold: DEFAULT_HIGH_THRESHOLD,
    })
}

/// A titled set of parameterisations rendered together as one figure
pub struct SweepGroup {
    pub title: &'static str,
    /// File stem of the figure
    pub name: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub steps: Vec<Arc<dyn FilterStep>>,
}

/// The filter sweep, one group per figure; the original image takes the first cell
pub fn build_edge_sweep() -> Vec<SweepGroup> {
    let canny: Vec<Arc<dyn FilterStep>> = [(50.0, 150.0), (100.0, 200.0), (150.0, 250.0)]
        .into_iter()
        .map(|(low, high)| {
            Arc::new(EdgeDetectionStep {
                low_threshold: low,
                high_threshold: high,
            }) as Arc<dyn FilterStep>
        })
        .collect();

    let sobel: Vec<Arc<dyn FilterStep>> = [(0.5, 0.5), (0.7, 0.3), (0.3, 0.7), (0.9, 0.1)]
        .into_iter()
        .map(|(x_weight, y_weight)| Arc::new(WeightedSobelStep { x_weight, y_weight }) as Arc<dyn FilterStep>)
        .collect();

    let laplacian: Vec<Arc<dyn FilterStep>> = [1, 3, 5]
        .into_iter()
        .map(|ksize| Arc::new(LaplacianStep { ksize }) as Arc<dyn FilterStep>)
        .collect();

    let thresholds: Vec<Arc<dyn FilterStep>> = vec![
        Arc::new(ThresholdStep {
            threshold: SWEEP_BINARY_THRESHOLD,
            max_value: 255,
            kind: ThresholdType::Binary,
        }),
        Arc::new(OtsuStep { max_value: 255 }),
    ];

    let smoothing: Vec<Arc<dyn FilterStep>> = vec![
        Arc::new(BlurStep { ksize: 3 }),
        Arc::new(BlurStep { ksize: 21 }),
        Arc::new(MedianBlurStep { ksize: 3 }),
        Arc::new(MedianBlurStep { ksize: 21 }),
    ];

    vec![
        SweepGroup {
            title: "Canny Edge Detection",
            name: "canny_sweep",
            rows: 2,
            cols: 2,
            steps: canny,
        },
        SweepGroup {
            title: "Sobel Edge Detection with Different Weight Combinations",
            name: "sobel_sweep",
            rows: 2,
            cols: 3,
            steps: sobel,
        },
        SweepGroup {
            title: "Laplacian Edge Detection with Different Kernel Sizes",
            name: "laplacian_sweep",
            rows: 2,
            cols: 2,
            steps: laplacian,
        },
        SweepGroup {
            title: "Thresholding Techniques Comparison",
            name: "threshold_sweep",
            rows: 1,
            cols: 3,
            steps: thresholds,
        },
        SweepGroup {
            title: "Smoothing Techniques Comparison",
            name: "smoothing_sweep",
            rows: 2,
            cols: 3,
            steps: smoothing,
        },
    ]
}

/// One step per threshold type at the global level
pub fn build_threshold_sweep() -> Vec<Arc<dyn FilterStep>> {
    ThresholdType::ALL
        .into_iter()
        .map(|kind| {
            Arc::new(ThresholdStep {
                threshold: GLOBAL_THRESHOLD,
                max_value: 255,
                kind,
            }) as Arc<dyn FilterStep>
        })
        .collect()
}

/// Blur followed by Otsu thresholding
pub fn build_blurred_otsu_pipeline(verbose: bool) -> Pipeline {
    Pipeline::new()
        .with_verbose(verbose)
        .add_step(Arc::new(BlurStep { ksize: 5 }))
        .add_step(Arc::new(OtsuStep { max_value: 255 }))
}

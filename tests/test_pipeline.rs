mod common;

use anyhow::Result;
use common::*;
use image::DynamicImage;
use kitchenware::filters::{self, steps::BlurStep};
use kitchenware::gallery;
use kitchenware::pipeline::{FilterContext, FilterStep, Pipeline};
use std::sync::Arc;

fn sample() -> image::GrayImage {
    DynamicImage::ImageRgb8(textured_image(40, 32, 60)).to_luma8()
}

#[test]
fn pipeline_label_joins_step_labels() {
    let pipeline = filters::build_blurred_otsu_pipeline(false);
    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline.label(), "Gaussian Blur (5x5) + Otsu Threshold");
}

#[test]
fn debug_pipeline_saves_every_stage() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");

    let out = filters::build_blurred_otsu_pipeline(false)
        .with_debug(debug_dir.clone())?
        .run(&sample(), "sample")?;

    assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    for stage in ["00_input", "01_gaussian_blur", "02_otsu_threshold"] {
        assert!(debug_dir.join(stage).join("sample.png").is_file(), "missing {}", stage);
    }
    Ok(())
}

#[test]
fn sweep_groups_follow_the_comparison_layout() {
    let groups = filters::build_edge_sweep();
    let summary: Vec<(&str, Vec<String>)> = groups
        .iter()
        .map(|g| (g.name, g.steps.iter().map(|s| s.label()).collect()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("canny_sweep", vec!["Canny (50,150)".to_string(), "Canny (100,200)".into(), "Canny (150,250)".into()]),
            (
                "sobel_sweep",
                vec![
                    "Sobel (0.5, 0.5)".to_string(),
                    "Sobel (0.7, 0.3)".into(),
                    "Sobel (0.3, 0.7)".into(),
                    "Sobel (0.9, 0.1)".into(),
                ]
            ),
            (
                "laplacian_sweep",
                vec!["Laplacian (ksize=1)".to_string(), "Laplacian (ksize=3)".into(), "Laplacian (ksize=5)".into()]
            ),
            ("threshold_sweep", vec!["BINARY (v=90)".to_string(), "Otsu Threshold".into()]),
            (
                "smoothing_sweep",
                vec![
                    "Gaussian Blur (3x3)".to_string(),
                    "Gaussian Blur (21x21)".into(),
                    "Median Blur (3)".into(),
                    "Median Blur (21)".into(),
                ]
            ),
        ]
    );

    for group in &groups {
        assert!(group.steps.len() < group.rows * group.cols, "{} does not fit", group.name);
    }
}

#[test]
fn debug_output_is_off_until_requested() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("stages");

    let pipeline = Pipeline::new();
    assert!(pipeline.context().debug.is_none());

    let pipeline = pipeline.with_debug(debug_dir.clone())?;
    let debug = pipeline.context().debug.as_ref().expect("debug configured");
    assert_eq!(debug.output_dir, debug_dir);
    assert!(debug_dir.is_dir());
    Ok(())
}

#[test]
fn debug_directory_must_be_empty() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.png"), b"x")?;

    let result = Pipeline::new().with_debug(dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}

#[test]
fn invalid_kernel_fails_the_run() {
    let pipeline = Pipeline::new().add_step(Arc::new(BlurStep { ksize: 4 }));
    assert!(pipeline.apply(&sample(), &FilterContext::default()).is_err());
}

#[test]
fn sweep_figures_are_written() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let figures = dir.path().join("figures");
    let img = sample();

    let sweep = gallery::render_edge_sweep(&img, &FilterContext::default(), &figures)?;
    let names: Vec<String> = sweep
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "canny_sweep.svg",
            "sobel_sweep.svg",
            "laplacian_sweep.svg",
            "threshold_sweep.svg",
            "smoothing_sweep.svg",
        ]
    );

    let sobel_svg = std::fs::read_to_string(&sweep[1])?;
    assert!(sobel_svg.contains("Sobel Edge Detection with Different Weight Combinations"));
    assert!(sobel_svg.contains("Sobel (0.9, 0.1)"));
    // original plus four blends
    assert_eq!(file_names(&figures.join("sobel_sweep_files")).len(), 5);
    assert_eq!(file_names(&figures.join("threshold_sweep_files")).len(), 3);

    let thresholds = gallery::render_threshold_gallery(&img, &figures)?;
    let svg = std::fs::read_to_string(&thresholds)?;
    for title in ["BINARY", "BINARY_INV", "TRUNC", "TOZERO", "TOZERO_INV"] {
        assert!(svg.contains(title), "missing {}", title);
    }
    assert_eq!(file_names(&figures.join("thresholds_files")).len(), 6);

    let otsu = gallery::render_otsu_comparison(&img, false, &figures)?;
    let svg = std::fs::read_to_string(&otsu)?;
    assert!(svg.contains("Global Thresholding (v=127)"));
    assert!(svg.contains("Histogram"));
    // 6 image panels, 3 histograms drawn inline
    assert_eq!(file_names(&figures.join("otsu_files")).len(), 6);
    Ok(())
}

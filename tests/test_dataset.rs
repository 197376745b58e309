mod common;

use anyhow::Result;
use common::*;
use image::{Rgb, RgbImage};
use kitchenware::dataset::{self, Batch, LabeledBatches};
use kitchenware::gallery::{self, SampleGrid};

fn kitchen_tree(root: &std::path::Path) {
    create_category(root, "plates", &["1.jpg", "2.jpg", "3.jpg"]);
    create_category(root, "cups", &["1.jpg", "2.jpg"]);
    create_category(root, "dishes", &["1.jpg"]);
}

#[test]
fn class_names_are_sorted_subdirectories() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    kitchen_tree(dir.path());

    let config = DatasetConfig {
        batch_size: 4,
        ..DatasetConfig::default()
    };
    let ds = ImageFolderDataset::from_directory(dir.path(), config)?;

    assert_eq!(ds.class_names(), ["cups", "dishes", "plates"]);
    assert_eq!(ds.len(), 6);
    assert_eq!(ds.num_batches(), 2);

    let batches: Vec<Batch> = ds.batches().collect::<Result<_>>()?;
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].images.shape(), &[4, 128, 128, 3]);
    assert_eq!(batches[1].images.shape(), &[2, 128, 128, 3]);

    let labels: Vec<usize> = batches.iter().flat_map(|b| b.labels.clone()).collect();
    assert_eq!(labels, vec![0, 0, 1, 2, 2, 2]);
    Ok(())
}

#[test]
fn non_images_are_ignored_and_nested_files_included() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    create_category(dir.path(), "cups", &["1.jpg"]);
    write_png(&dir.path().join("cups/deeper/2.png"), &textured_image(20, 20, 0));
    std::fs::write(dir.path().join("cups/readme.txt"), "notes")?;
    std::fs::write(dir.path().join("stray.jpg"), "root-level files are not samples")?;

    let ds = ImageFolderDataset::from_directory(dir.path(), DatasetConfig::default())?;
    assert_eq!(ds.class_names(), ["cups"]);
    assert_eq!(ds.len(), 2);
    Ok(())
}

#[test]
fn grayscale_mode_resizes_to_one_channel() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    write_png(
        &dir.path().join("cups/flat.png"),
        &RgbImage::from_pixel(30, 10, Rgb([200, 200, 200])),
    );

    let config = DatasetConfig {
        color_mode: ColorMode::Grayscale,
        image_size: (8, 16),
        ..DatasetConfig::default()
    };
    let ds = ImageFolderDataset::from_directory(dir.path(), config)?;
    let batch = ds.first_batch()?.expect("one batch");

    assert_eq!(batch.images.shape(), &[1, 8, 16, 1]);
    assert!(batch.images.iter().all(|&v| (199.0..=201.0).contains(&v)));
    Ok(())
}

#[test]
fn shuffle_is_deterministic_for_a_seed() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    for category in ["a", "b", "c", "d"] {
        create_category(dir.path(), category, &["1.jpg", "2.jpg", "3.jpg"]);
    }

    let shuffled = |seed| {
        let config = DatasetConfig {
            shuffle: true,
            seed,
            ..DatasetConfig::default()
        };
        ImageFolderDataset::from_directory(dir.path(), config)
    };

    let first = shuffled(123)?;
    let second = shuffled(123)?;
    assert_eq!(first.samples(), second.samples());

    let ordered = ImageFolderDataset::from_directory(dir.path(), DatasetConfig::default())?;
    let mut paths: Vec<_> = first.samples().iter().map(|s| s.path.clone()).collect();
    paths.sort();
    let mut expected: Vec<_> = ordered.samples().iter().map(|s| s.path.clone()).collect();
    expected.sort();
    assert_eq!(paths, expected);
    Ok(())
}

#[test]
fn missing_raw_root_is_reported() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let raw = dir.path().join("train_missing");

    let err = dataset::resolve_data_paths(&raw, dir.path().join("filtered")).expect_err("must fail");
    assert!(err.to_string().contains("train_missing"));
    Ok(())
}

#[test]
fn missing_filtered_root_fails_when_opened() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    kitchen_tree(&dir.path().join("raw"));

    let paths = dataset::resolve_data_paths(dir.path().join("raw"), dir.path().join("filtered"))?;
    assert!(ImageFolderDataset::from_directory(&paths.raw, DatasetConfig::default()).is_ok());
    assert!(ImageFolderDataset::from_directory(&paths.filtered, DatasetConfig::default()).is_err());
    Ok(())
}

#[test]
fn directory_without_images_is_rejected() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::create_dir_all(dir.path().join("cups"))?;
    std::fs::write(dir.path().join("cups/readme.txt"), "notes")?;

    let err = ImageFolderDataset::from_directory(dir.path(), DatasetConfig::default())
        .expect_err("must fail");
    assert!(err.to_string().contains("No images found"));
    Ok(())
}

#[test]
fn sample_plot_is_titled_with_class_names() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let data = dir.path().join("data");
    let figures = dir.path().join("figures");
    kitchen_tree(&data);

    let ds = ImageFolderDataset::from_directory(&data, DatasetConfig::default())?;
    let path = gallery::plot_sample_images(&ds, SampleGrid::RAW, "Training", &figures, "training_samples")?;

    let svg = std::fs::read_to_string(&path)?;
    assert!(svg.contains("Training samples"));
    for name in ["cups", "dishes", "plates"] {
        assert!(svg.contains(name), "missing {}", name);
    }
    assert_eq!(file_names(&figures.join("training_samples_files")).len(), 6);
    Ok(())
}

#[test]
fn sample_plot_is_capped_by_grid() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let data = dir.path().join("data");
    let figures = dir.path().join("figures");
    let files: Vec<String> = (0..12).map(|i| format!("{:02}.jpg", i)).collect();
    let files: Vec<&str> = files.iter().map(String::as_str).collect();
    create_category(&data, "cups", &files);

    let ds = ImageFolderDataset::from_directory(&data, DatasetConfig::default())?;
    gallery::plot_sample_images(&ds, SampleGrid::FILTERED, "Validation", &figures, "validation_samples")?;

    assert_eq!(file_names(&figures.join("validation_samples_files")).len(), 9);
    Ok(())
}

struct UnlabeledSource;

impl LabeledBatches for UnlabeledSource {
    fn class_names(&self) -> Option<&[String]> {
        None
    }

    fn first_batch(&self) -> Result<Option<Batch>> {
        Ok(None)
    }
}

#[test]
fn sample_plot_requires_class_names() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let figures = dir.path().join("figures");

    let result = gallery::plot_sample_images(&UnlabeledSource, SampleGrid::RAW, "Training", &figures, "samples");
    assert!(result.is_err());
    assert!(!figures.join("samples.svg").exists());
    Ok(())
}

#[test]
fn edge_maps_load_as_a_dataset() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let input = dir.path().join("test");
    let output = dir.path().join("edge_detected/test");
    kitchen_tree(&input);

    let report = BatchFilterRunner::new(&input, &output).run()?;
    let ds = ImageFolderDataset::from_directory(&output, DatasetConfig::default())?;

    assert_eq!(ds.class_names(), ["cups", "dishes", "plates"]);
    assert_eq!(ds.len(), report.total_written());
    Ok(())
}

//! Labeled image-folder dataset
//!
//! Loads a directory laid out as one subdirectory per class into batches of
//! resized images paired with integer labels.
//!
//! The directory should be structured as:
//! ```text
//! root_dir/
//! ├── cups/
//! │   ├── 1.1.jpg
//! │   └── 1.2.jpg
//! ├── dishes/
//! │   └── ...
//! └── plates/
//!     └── ...
//! ```
//!
//! Class names are the sorted subdirectory names and a label is the index of
//! its class in that list. Files are sorted by name, so batch membership is
//! the same on every platform unless shuffling is requested.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::Array4;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use walkdir::WalkDir;

/// File extensions picked up by the loader (case-insensitive)
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["bmp", "gif", "jpeg", "jpg", "png"];

/// Default raw-image root
pub const DEFAULT_RAW_ROOT: &str = "data/my_data/test";
/// Default edge-map root
pub const DEFAULT_FILTERED_ROOT: &str = "data/my_data/edge_detected/test";

/// Channel layout of loaded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    Grayscale,
    #[default]
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    fn convert(&self, img: DynamicImage) -> DynamicImage {
        match self {
            ColorMode::Grayscale => DynamicImage::ImageLuma8(img.to_luma8()),
            ColorMode::Rgb => DynamicImage::ImageRgb8(img.to_rgb8()),
            ColorMode::Rgba => DynamicImage::ImageRgba8(img.to_rgba8()),
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub color_mode: ColorMode,
    /// Target (height, width)
    pub image_size: (u32, u32),
    pub batch_size: usize,
    pub shuffle: bool,
    /// Only used when `shuffle` is set
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Rgb,
            image_size: (128, 128),
            batch_size: 32,
            shuffle: false,
            seed: 123,
        }
    }
}

impl DatasetConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("Batch size must be positive");
        }
        if self.image_size.0 == 0 || self.image_size.1 == 0 {
            bail!("Image size must be positive, got {:?}", self.image_size);
        }
        Ok(())
    }
}

/// A single image file with its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    pub path: PathBuf,
    pub label: usize,
}

/// One batch: images shaped (batch, height, width, channels) with values in [0, 255]
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: Array4<f32>,
    pub labels: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rebuild image `index` as an 8-bit image for display
    pub fn image(&self, index: usize) -> Result<DynamicImage> {
        let (n, height, width, channels) = self.images.dim();
        if index >= n {
            bail!("Image index {} out of range for batch of {}", index, n);
        }

        let (w, h) = (width as u32, height as u32);
        let images = &self.images;
        let at = |x: u32, y: u32, c: usize| -> u8 {
            images[[index, y as usize, x as usize, c]].round().clamp(0.0, 255.0) as u8
        };

        let img = match channels {
            1 => DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, y| Luma([at(x, y, 0)]))),
            3 => DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
                Rgb([at(x, y, 0), at(x, y, 1), at(x, y, 2)])
            })),
            4 => DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
                Rgba([at(x, y, 0), at(x, y, 1), at(x, y, 2), at(x, y, 3)])
            })),
            other => bail!("Unsupported channel count: {}", other),
        };
        Ok(img)
    }
}

/// Something that yields labeled batches and may know its class names
pub trait LabeledBatches {
    /// Names indexed by label; `None` when the source does not track them
    fn class_names(&self) -> Option<&[String]>;

    /// First batch, if any
    fn first_batch(&self) -> Result<Option<Batch>>;
}

/// Paths used by the dataset stage
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw: PathBuf,
    pub filtered: PathBuf,
}

/// Check that the raw root exists; the filtered root is only checked when opened
pub fn resolve_data_paths(raw: impl Into<PathBuf>, filtered: impl Into<PathBuf>) -> Result<DataPaths> {
    let raw = raw.into();
    if !raw.exists() {
        bail!("Training data path does not exist: {}", raw.display());
    }
    Ok(DataPaths {
        raw,
        filtered: filtered.into(),
    })
}

/// Image-folder dataset with lazy decoding
#[derive(Debug, Clone)]
pub struct ImageFolderDataset {
    root: PathBuf,
    class_names: Vec<String>,
    samples: Vec<ImageSample>,
    config: DatasetConfig,
}

impl ImageFolderDataset {
    /// Index `root`; images are decoded only while iterating
    pub fn from_directory(root: impl AsRef<Path>, config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let root = root.as_ref().to_path_buf();
        debug!("Loading image folder dataset from: {}", root.display());

        let mut class_names = Vec::new();
        for entry in std::fs::read_dir(&root)
            .with_context(|| format!("Failed to open dataset directory: {}", root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    class_names.push(name.to_string());
                }
            }
        }
        class_names.sort();

        let mut samples = Vec::new();
        for (label, class_name) in class_names.iter().enumerate() {
            let class_dir = root.join(class_name);
            for entry in WalkDir::new(&class_dir).min_depth(1).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to list directory: {}", class_dir.display()))?;
                if entry.file_type().is_file() && has_allowed_extension(entry.path()) {
                    samples.push(ImageSample {
                        path: entry.into_path(),
                        label,
                    });
                }
            }
            debug!("Class '{}' (label {}) indexed", class_name, label);
        }

        if samples.is_empty() {
            bail!(
                "No images found in directory {}. Allowed formats: {:?}",
                root.display(),
                ALLOWED_EXTENSIONS
            );
        }

        info!(
            "Found {} files belonging to {} classes.",
            samples.len(),
            class_names.len()
        );

        if config.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            samples.shuffle(&mut rng);
        }

        Ok(Self {
            root,
            class_names,
            samples,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn samples(&self) -> &[ImageSample] {
        &self.samples
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn num_batches(&self) -> usize {
        self.samples.len().div_ceil(self.config.batch_size)
    }

    /// Decode one sample, convert it to the colour mode and resize it
    pub fn load_image(&self, sample: &ImageSample) -> Result<DynamicImage> {
        let img = ImageReader::open(&sample.path)
            .with_context(|| format!("Failed to open image: {}", sample.path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to read image: {}", sample.path.display()))?
            .decode()
            .map_err(|e| anyhow!("Failed to decode image {}: {}", sample.path.display(), e))?;

        let (height, width) = self.config.image_size;
        let resized = img.resize_exact(width, height, FilterType::Triangle);
        Ok(self.config.color_mode.convert(resized))
    }

    /// Iterate over batches in sample order
    pub fn batches(&self) -> Batches<'_> {
        Batches {
            dataset: self,
            position: 0,
        }
    }

    fn load_batch(&self, samples: &[ImageSample]) -> Result<Batch> {
        let (height, width) = self.config.image_size;
        let channels = self.config.color_mode.channels();
        let mut images = Array4::<f32>::zeros((samples.len(), height as usize, width as usize, channels));
        let mut labels = Vec::with_capacity(samples.len());

        for (i, sample) in samples.iter().enumerate() {
            let img = self.load_image(sample)?;
            let raw = img.as_bytes();
            for y in 0..height as usize {
                for x in 0..width as usize {
                    for c in 0..channels {
                        images[[i, y, x, c]] = raw[(y * width as usize + x) * channels + c] as f32;
                    }
                }
            }
            labels.push(sample.label);
        }

        Ok(Batch { images, labels })
    }
}

impl LabeledBatches for ImageFolderDataset {
    fn class_names(&self) -> Option<&[String]> {
        Some(&self.class_names)
    }

    fn first_batch(&self) -> Result<Option<Batch>> {
        self.batches().next().transpose()
    }
}

/// Iterator over the batches of an [`ImageFolderDataset`]
pub struct Batches<'a> {
    dataset: &'a ImageFolderDataset,
    position: usize,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let samples = &self.dataset.samples;
        if self.position >= samples.len() {
            return None;
        }
        let end = (self.position + self.dataset.config.batch_size).min(samples.len());
        let chunk = &samples[self.position..end];
        self.position = end;
        Some(self.dataset.load_batch(chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.samples.len().saturating_sub(self.position);
        let batches = remaining.div_ceil(self.dataset.config.batch_size);
        (batches, Some(batches))
    }
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

//! Directory-driven batch edge detection with a mirrored output tree.

use anyhow::{anyhow, bail, Context, Result};
use image::{GrayImage, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::filters;
use crate::gallery;
use crate::models::{BatchReport, Category, CategoryReport, FileFailure};
use crate::pipeline::{FilterContext, FilterStep};

/// Default root holding one subdirectory of photographs per category
pub const DEFAULT_INPUT_ROOT: &str = "data/my_data/test";
/// Default root receiving the edge maps
pub const DEFAULT_OUTPUT_ROOT: &str = "data/my_data/edge_detected/test";

/// Whether a file name ends in `.jpg` or `.jpeg`, ignoring case
pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// JPEG files directly inside `dir`, sorted by file name
pub fn list_jpeg_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Category directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list directory: {}", dir.display()))?;
        if entry.file_type().is_file() && is_jpeg(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Decode any supported image file as single-channel grayscale
pub fn read_grayscale(path: &Path) -> Result<GrayImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?
        .decode()
        .map_err(|e| anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    Ok(img.to_luma8())
}

/// Applies one edge filter to every category directory of an input tree
pub struct BatchFilterRunner {
    input_root: PathBuf,
    output_root: PathBuf,
    categories: Vec<Category>,
    filter: Arc<dyn FilterStep>,
    comparison_dir: Option<PathBuf>,
    context: FilterContext,
}

impl BatchFilterRunner {
    /// Runner over the default categories with Canny 100/200
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            categories: Category::defaults(),
            filter: filters::default_edge_filter(),
            comparison_dir: None,
            context: FilterContext::default(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn FilterStep>) -> Self {
        self.filter = filter;
        self
    }

    /// Render an original-vs-edges figure for the first file of each category
    pub fn with_comparison(mut self, figures_dir: impl Into<PathBuf>) -> Self {
        self.comparison_dir = Some(figures_dir.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Process every configured category in order
    pub fn run(&self) -> Result<BatchReport> {
        if !self.input_root.is_dir() {
            bail!("Input data path does not exist: {}", self.input_root.display());
        }

        let mut report = BatchReport::default();
        for category in &self.categories {
            report.categories.push(self.run_category(category)?);
        }

        info!(
            "Processing complete: {} written, {} skipped",
            report.total_written(),
            report.total_failed()
        );
        Ok(report)
    }

    /// Process one category directory; per-file failures are recorded, not returned
    pub fn run_category(&self, category: &Category) -> Result<CategoryReport> {
        let input_dir = self.input_root.join(category.name());
        let output_dir = self.output_root.join(category.name());

        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

        let files = list_jpeg_files(&input_dir)?;
        info!("Processing {} images ({} files)...", category, files.len());

        let mut report = CategoryReport::new(category.clone());
        for input_path in &files {
            let file_name = input_path
                .file_name()
                .ok_or_else(|| anyhow!("Path has no file name: {}", input_path.display()))?;
            let output_path = output_dir.join(file_name);
            let shown = format!("{}/{}", category, file_name.to_string_lossy());

            let img = match read_grayscale(input_path) {
                Ok(img) => img,
                Err(e) => {
                    warn!("Failed to read image: {} ({:#})", shown, e);
                    report.failures.push(FileFailure {
                        path: input_path.clone(),
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            };

            info!("Processing {}, shape: {}x{}", shown, img.width(), img.height());
            let edges = match self.filter.apply(&img, &self.context) {
                Ok(edges) => edges,
                Err(e) => {
                    warn!("Failed to filter image: {} ({:#})", shown, e);
                    report.failures.push(FileFailure {
                        path: input_path.clone(),
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            };

            if report.comparison.is_none() {
                if let Some(figures_dir) = &self.comparison_dir {
                    info!("Creating detailed comparison for {}", shown);
                    let figure = gallery::render_comparison(&img, &edges, category, figures_dir)?;
                    report.comparison = Some(figure);
                }
            }

            if let Err(e) = edges.save(&output_path) {
                warn!("Failed to write image: {} ({})", output_path.display(), e);
                report.failures.push(FileFailure {
                    path: input_path.clone(),
                    reason: format!("Failed to write {}: {}", output_path.display(), e),
                });
                continue;
            }
            report.written.push(output_path);
        }

        Ok(report)
    }
}

use anyhow::Result;
use image::GrayImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all filter steps
#[derive(Clone, Debug, Default)]
pub struct FilterContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// A single-image grayscale filter
pub trait FilterStep: Send + Sync {
    /// Transform one grayscale image into another of the same size
    fn apply(&self, image: &GrayImage, context: &FilterContext) -> Result<GrayImage>;

    /// Human-readable name (used in logs and debug directory names)
    fn name(&self) -> &str;

    /// Panel title including parameters, e.g. "Canny (100,200)"
    fn label(&self) -> String {
        self.name().to_string()
    }
}

/// Composable chain of filter steps
pub struct Pipeline {
    steps: Vec<Arc<dyn FilterStep>>,
    context: FilterContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: FilterContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn FilterStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn context(&self) -> &FilterContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order; `name` identifies the image in debug outputs
    pub fn run(&self, input: &GrayImage, name: &str) -> Result<GrayImage> {
        self.save_debug(0, "input", name, input)?;

        let mut current = input.clone();
        for (step_idx, step) in self.steps.iter().enumerate() {
            debug!("Running step: {} on {}", step.name(), name);
            current = step.apply(&current, &self.context)?;
            self.save_debug(step_idx + 1, step.name(), name, &current)?;
        }

        Ok(current)
    }

    fn save_debug(&self, index: usize, step_name: &str, name: &str, image: &GrayImage) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir_name = format!("{:02}_{}", index, step_name.to_lowercase().replace(' ', "_"));
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let filename = format!("{}.png", name);
        image
            .save(step_dir.join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        if self.context.verbose {
            debug!("Debug: saved {}/{}", step_dir_name, filename);
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStep for Pipeline {
    fn apply(&self, image: &GrayImage, _context: &FilterContext) -> Result<GrayImage> {
        self.run(image, "image")
    }

    fn name(&self) -> &str {
        "Pipeline"
    }

    /// Titles of all steps joined with " + "
    fn label(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use kitchenware::batch::{self, BatchFilterRunner, DEFAULT_INPUT_ROOT, DEFAULT_OUTPUT_ROOT};
use kitchenware::dataset::{self, ColorMode, DatasetConfig, ImageFolderDataset};
use kitchenware::filters::steps::EdgeDetectionStep;
use kitchenware::filters::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use kitchenware::gallery::{self, SampleGrid};
use kitchenware::logging::init_logging;
use kitchenware::models::Category;
use kitchenware::pipeline::FilterContext;

#[derive(Parser)]
#[command(name = "kitchenware")]
#[command(about = "Edge-filter kitchenware photographs and load them as labeled datasets")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a Canny edge map for every JPEG of every category
    Edges {
        /// Root with one subdirectory per category
        #[arg(long, value_name = "DIR", default_value = DEFAULT_INPUT_ROOT)]
        input: PathBuf,

        /// Root receiving the mirrored edge maps
        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_ROOT)]
        output: PathBuf,

        /// Category to process (repeatable)
        #[arg(long = "category", value_name = "NAME")]
        categories: Vec<String>,

        /// Hysteresis low threshold
        #[arg(long, default_value_t = DEFAULT_LOW_THRESHOLD)]
        low: f32,

        /// Hysteresis high threshold
        #[arg(long, default_value_t = DEFAULT_HIGH_THRESHOLD)]
        high: f32,

        /// Render an original-vs-edges figure for the first file of each category
        #[arg(long)]
        compare: bool,

        /// Directory receiving figures
        #[arg(long, value_name = "DIR", default_value = "figures")]
        figures: PathBuf,
    },

    /// Compare many filter parameterisations on one image
    Sweep {
        /// Sample image
        #[arg(value_name = "IMAGE", default_value = "data/my_data/test/cups/1.1.jpg")]
        image: PathBuf,

        /// Directory receiving figures
        #[arg(long, value_name = "DIR", default_value = "figures")]
        figures: PathBuf,

        /// Save intermediate results of chained filters to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Load raw and edge-map folders as labeled datasets and plot samples
    Dataset {
        /// Root of the raw images
        #[arg(long, value_name = "DIR", default_value = dataset::DEFAULT_RAW_ROOT)]
        raw: PathBuf,

        /// Root of the edge maps
        #[arg(long, value_name = "DIR", default_value = dataset::DEFAULT_FILTERED_ROOT)]
        filtered: PathBuf,

        #[arg(long, default_value_t = 128)]
        height: u32,

        #[arg(long, default_value_t = 128)]
        width: u32,

        #[arg(long, value_enum, default_value_t = ColorArg::Rgb)]
        color_mode: ColorArg,

        #[arg(long, default_value_t = 32)]
        batch_size: usize,

        #[arg(long)]
        shuffle: bool,

        #[arg(long, default_value_t = 123)]
        seed: u64,

        /// Directory receiving figures
        #[arg(long, value_name = "DIR", default_value = "figures")]
        figures: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Grayscale,
    Rgb,
    Rgba,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Grayscale => ColorMode::Grayscale,
            ColorArg::Rgb => ColorMode::Rgb,
            ColorArg::Rgba => ColorMode::Rgba,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let _ = init_logging(args.verbose);

    match args.command {
        Command::Edges {
            input,
            output,
            categories,
            low,
            high,
            compare,
            figures,
        } => {
            let categories: Vec<Category> = if categories.is_empty() {
                Category::defaults()
            } else {
                categories.into_iter().map(Category::new).collect()
            };

            let mut runner = BatchFilterRunner::new(input, output)
                .with_verbose(args.verbose)
                .with_categories(categories)
                .with_filter(Arc::new(EdgeDetectionStep {
                    low_threshold: low,
                    high_threshold: high,
                }));
            if compare {
                runner = runner.with_comparison(figures);
            }

            let report = runner.run()?;
            println!(
                "\nProcessing complete! {} edge maps written, {} files skipped.",
                report.total_written(),
                report.total_failed()
            );
            for category in &report.categories {
                if let Some(path) = &category.comparison {
                    println!("  {} comparison: {}", category.category, path.display());
                }
            }
        }

        Command::Sweep {
            image,
            figures,
            debug_out,
        } => {
            let img = batch::read_grayscale(&image)?;
            info!("Loaded image: {}x{}", img.width(), img.height());

            let context = FilterContext {
                verbose: args.verbose,
                debug: None,
            };

            let mut written = gallery::render_edge_sweep(&img, &context, &figures)?;
            written.push(gallery::render_threshold_gallery(&img, &figures)?);
            written.push(gallery::render_otsu_comparison(&img, args.verbose, &figures)?);

            if let Some(debug_dir) = debug_out {
                kitchenware::filters::build_blurred_otsu_pipeline(args.verbose)
                    .with_debug(debug_dir.clone())?
                    .run(&img, "sample")?;
                info!("Debug outputs saved to: {}/", debug_dir.display());
            }

            println!("Figures written:");
            for path in &written {
                println!("  {}", path.display());
            }
        }

        Command::Dataset {
            raw,
            filtered,
            height,
            width,
            color_mode,
            batch_size,
            shuffle,
            seed,
            figures,
        } => {
            let paths = dataset::resolve_data_paths(raw, filtered)?;
            let config = DatasetConfig {
                color_mode: color_mode.into(),
                image_size: (height, width),
                batch_size,
                shuffle,
                seed,
            };

            let train = ImageFolderDataset::from_directory(&paths.raw, config.clone())?;
            let validation = ImageFolderDataset::from_directory(&paths.filtered, config)?;

            let train_plot =
                gallery::plot_sample_images(&train, SampleGrid::RAW, "Training", &figures, "training_samples")?;
            let validation_plot = gallery::plot_sample_images(
                &validation,
                SampleGrid::FILTERED,
                "Validation",
                &figures,
                "validation_samples",
            )?;

            println!("Figures written:");
            println!("  {}", train_plot.display());
            println!("  {}", validation_plot.display());
        }
    }

    Ok(())
}

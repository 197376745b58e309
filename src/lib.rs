pub mod batch;
pub mod dataset;
pub mod figure;
pub mod filters;
pub mod gallery;
pub mod logging;
pub mod models;
pub mod pipeline;

pub use batch::BatchFilterRunner;
pub use dataset::{Batch, ColorMode, DatasetConfig, ImageFolderDataset, LabeledBatches};
pub use figure::{Figure, Panel};
pub use gallery::SampleGrid;
pub use models::{BatchReport, Category, CategoryReport, FileFailure};
pub use pipeline::{FilterContext, FilterStep, Pipeline};

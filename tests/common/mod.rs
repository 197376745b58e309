mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from kitchenware for tests
#[allow(unused_imports)]
pub use kitchenware::{
    BatchFilterRunner, BatchReport, Category, ColorMode, DatasetConfig, ImageFolderDataset,
};

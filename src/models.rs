use std::fmt;
use std::path::PathBuf;

/// Category names processed when none are configured
pub const DEFAULT_CATEGORIES: [&str; 3] = ["cups", "dishes", "plates"];

/// A kitchenware class; matches a subdirectory name under the input and output roots
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name with the first letter upper-cased and the rest lower-cased ("cups" -> "Cups")
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }

    pub fn defaults() -> Vec<Category> {
        DEFAULT_CATEGORIES.iter().map(|name| Category::new(*name)).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Category::new(name)
    }
}

/// A file that could not be processed
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of processing one category directory
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: Category,
    /// Output files written, in processing order
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    /// Comparison figure for the first file, when rendered
    pub comparison: Option<PathBuf>,
}

impl CategoryReport {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            written: Vec::new(),
            failures: Vec::new(),
            comparison: None,
        }
    }
}

/// Outcome of a full batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub categories: Vec<CategoryReport>,
}

impl BatchReport {
    pub fn total_written(&self) -> usize {
        self.categories.iter().map(|c| c.written.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.categories.iter().map(|c| c.failures.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.categories.iter().flat_map(|c| c.failures.iter())
    }
}

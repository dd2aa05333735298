use std::path::PathBuf;

use serde::Deserialize;

/// Where staged artifacts land when nothing else is configured.
pub const DEFAULT_RESULTS_ROOT: &str = "/var/lib/boinc/pymw/tasks";

/// Assimilator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssimilatorConfig {
    /// Directory artifacts are staged into, named by their `open_name`.
    pub results_root: PathBuf,
    /// Create `results_root` at startup when it does not exist.
    pub create_root: bool,
}

impl AssimilatorConfig {
    pub fn with_results_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.results_root = root.into();
        self
    }

    pub fn with_create_root(mut self, create: bool) -> Self {
        self.create_root = create;
        self
    }
}

impl Default for AssimilatorConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
            create_root: false,
        }
    }
}

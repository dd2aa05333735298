use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ExecError;

/// Zero-length marker signalling that no further progress will happen for a task.
///
/// Its presence says nothing about whether the computation succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSentinel {
    path: PathBuf,
}

impl CompletionSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sentinel with the well-known name inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(crate::SENTINEL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_signalled(&self) -> bool {
        self.path.exists()
    }

    /// Create (or truncate) the marker.
    pub fn signal(&self) -> Result<(), ExecError> {
        fs::File::create(&self.path)
            .map(drop)
            .map_err(|e| ExecError::Sentinel {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn signal_creates_empty_marker() {
        let dir = TempDir::new().unwrap();
        let sentinel = CompletionSentinel::in_dir(dir.path());
        assert!(!sentinel.is_signalled());

        sentinel.signal().unwrap();
        assert!(sentinel.is_signalled());
        assert_eq!(fs::metadata(sentinel.path()).unwrap().len(), 0);

        // signalling twice is harmless
        sentinel.signal().unwrap();
    }

    #[test]
    fn signal_reports_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let sentinel = CompletionSentinel::new(dir.path().join("missing/boinc_finish_called"));
        assert!(matches!(sentinel.signal(), Err(ExecError::Sentinel { .. })));
    }
}

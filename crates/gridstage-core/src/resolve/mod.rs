//! Locating a result's output artifact on the server's filesystem.
use std::{
    io,
    path::{Path, PathBuf},
};

use gridstage_model::ResultRecord;
use tracing::trace;

use crate::error::{CoreError, ResolveError};

/// Maps a result to the path of its uploaded output artifact.
///
/// Resolution failures are per-result data problems, not fatal ones: the assimilator
/// reports them and moves on.
pub trait OutputResolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve_output_path(&self, result: &ResultRecord) -> Result<PathBuf, ResolveError>;
}

impl<R: OutputResolver + ?Sized> OutputResolver for std::sync::Arc<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resolve_output_path(&self, result: &ResultRecord) -> Result<PathBuf, ResolveError> {
        (**self).resolve_output_path(result)
    }
}

/// Uses the path the framework already recorded on the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedPathResolver;

impl OutputResolver for RecordedPathResolver {
    fn name(&self) -> &'static str {
        "recorded-path"
    }

    fn resolve_output_path(&self, result: &ResultRecord) -> Result<PathBuf, ResolveError> {
        let path = result
            .output_path
            .as_ref()
            .ok_or_else(|| ResolveError::MissingLocator {
                result: result.name.clone(),
                field: "output path",
            })?;
        ensure_exists(path)?;
        trace!(target: "gridstage.core.resolve", result = %result.name, path = %path.display(), "resolved recorded path");
        Ok(path.clone())
    }
}

/// Looks the uploaded file up by name inside a flat upload directory.
#[derive(Debug, Clone)]
pub struct UploadDirResolver {
    upload_dir: PathBuf,
}

impl UploadDirResolver {
    /// Fails when `upload_dir` is not an existing directory.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let upload_dir = upload_dir.into();
        if !upload_dir.is_dir() {
            return Err(CoreError::Resolver {
                name: "upload-dir",
                reason: format!("{} is not a directory", upload_dir.display()),
            });
        }
        Ok(Self { upload_dir })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

impl OutputResolver for UploadDirResolver {
    fn name(&self) -> &'static str {
        "upload-dir"
    }

    fn resolve_output_path(&self, result: &ResultRecord) -> Result<PathBuf, ResolveError> {
        let file = result
            .output_file
            .as_deref()
            .ok_or_else(|| ResolveError::MissingLocator {
                result: result.name.clone(),
                field: "output file name",
            })?;

        if file.is_empty() || file == "." || file == ".." || file.contains(['/', '\\', '\0']) {
            return Err(ResolveError::InvalidFileName(file.to_string()));
        }

        let path = self.upload_dir.join(file);
        ensure_exists(&path)?;
        trace!(target: "gridstage.core.resolve", result = %result.name, path = %path.display(), "resolved upload path");
        Ok(path)
    }
}

fn ensure_exists(path: &Path) -> Result<(), ResolveError> {
    match path.try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(ResolveError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ResolveError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(ResolveError::Io(e.to_string())),
    }
}

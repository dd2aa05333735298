//! The results root and the copy-then-rename transfer into it.
//!
//! An artifact is first copied to a hidden sibling of its final location
//! (`.<name>.<uuid>.partial`) and then renamed into place, so a reader of the
//! target path sees either the previous content or the complete new one.
//! Two work units staging the same name race; the last rename wins.
mod copy;
mod name;

pub use name::StagingName;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::{
    config::AssimilatorConfig,
    error::{CoreError, StagingError},
};

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    pub target: PathBuf,
    /// A previous artifact existed at `target` and was replaced.
    pub replaced: bool,
    pub bytes: u64,
}

/// A results root verified to be a writable directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Validate the configured results root.
    ///
    /// Missing (without `create_root`), non-directory and unwritable roots are fatal.
    pub fn open(cfg: &AssimilatorConfig) -> Result<Self, CoreError> {
        let path = &cfg.results_root;
        let fail = |reason: String| CoreError::ResultsRoot {
            path: path.clone(),
            reason,
        };

        if !path.exists() {
            if !cfg.create_root {
                return Err(fail("does not exist".into()));
            }
            fs::create_dir_all(path).map_err(|e| fail(format!("create: {e}")))?;
            debug!(target: "gridstage.core.staging", root = %path.display(), "created results root");
        }
        if !path.is_dir() {
            return Err(fail("not a directory".into()));
        }

        let root = path
            .canonicalize()
            .map_err(|e| fail(format!("canonicalize: {e}")))?;

        let probe = root.join(format!(".gridstage-probe.{}", uuid::Uuid::new_v4()));
        fs::write(&probe, b"").map_err(|e| fail(format!("not writable: {e}")))?;
        let _ = fs::remove_file(&probe);

        Ok(Self { root })
    }

    /// Canonical results root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location for `name`. Nothing is created.
    pub fn target_for(&self, name: &StagingName) -> PathBuf {
        self.root.join(name.as_path())
    }

    /// Copy `source` (file or directory) to the target for `name`, replacing prior content.
    pub fn stage(&self, source: &Path, name: &StagingName) -> Result<StagedArtifact, StagingError> {
        if !source.exists() {
            return Err(StagingError::SourceMissing(source.to_path_buf()));
        }

        let target = self.target_for(name);
        let parent = target
            .parent()
            .ok_or_else(|| StagingError::EscapesRoot(target.clone()))?;
        fs::create_dir_all(parent).map_err(StagingError::io("create dir", parent))?;

        // a symlinked directory inside the root must not lead outside it
        let real_parent = parent
            .canonicalize()
            .map_err(StagingError::io("canonicalize", parent))?;
        if !real_parent.starts_with(&self.root) {
            return Err(StagingError::EscapesRoot(target));
        }

        let file_name = target
            .file_name()
            .ok_or_else(|| StagingError::EscapesRoot(target.clone()))?
            .to_string_lossy()
            .into_owned();
        let partial = real_parent.join(format!(".{file_name}.{}.partial", uuid::Uuid::new_v4()));
        let target = real_parent.join(&file_name);

        trace!(
            target: "gridstage.core.staging",
            source = %source.display(),
            partial = %partial.display(),
            "copying artifact"
        );

        let bytes = match copy::copy_recursive(source, &partial) {
            Ok(bytes) => bytes,
            Err(e) => {
                copy::discard(&partial);
                return Err(e);
            }
        };

        let replaced = match copy::replace(&partial, &target) {
            Ok(replaced) => replaced,
            Err(e) => {
                copy::discard(&partial);
                return Err(e);
            }
        };

        debug!(
            target: "gridstage.core.staging",
            target_path = %target.display(),
            bytes,
            replaced,
            "artifact staged"
        );
        Ok(StagedArtifact {
            target,
            replaced,
            bytes,
        })
    }
}

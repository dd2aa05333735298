use std::{fs, io, path::Path};

#[cfg(not(unix))]
use tracing::warn;

use crate::error::StagingError;

/// Copy a file, or a directory tree, from `src` to the not-yet-existing `dst`.
///
/// `src` itself is followed if it is a symlink. Symlinks found inside a
/// directory tree are recreated as links and never dereferenced.
pub(super) fn copy_recursive(src: &Path, dst: &Path) -> Result<u64, StagingError> {
    let meta = fs::metadata(src).map_err(StagingError::io("stat", src))?;
    copy_entry(src, dst, meta)
}

fn copy_entry(src: &Path, dst: &Path, meta: fs::Metadata) -> Result<u64, StagingError> {
    let file_type = meta.file_type();
    if file_type.is_symlink() {
        copy_link(src, dst)?;
        return Ok(0);
    }
    if !file_type.is_dir() {
        return fs::copy(src, dst).map_err(StagingError::io("copy", src));
    }

    fs::create_dir(dst).map_err(StagingError::io("create dir", dst))?;
    let mut total = 0;
    for entry in fs::read_dir(src).map_err(StagingError::io("read dir", src))? {
        let entry = entry.map_err(StagingError::io("read dir", src))?;
        let path = entry.path();
        let meta = fs::symlink_metadata(&path).map_err(StagingError::io("stat", &path))?;
        total += copy_entry(&path, &dst.join(entry.file_name()), meta)?;
    }
    Ok(total)
}

#[cfg(unix)]
fn copy_link(src: &Path, dst: &Path) -> Result<(), StagingError> {
    let target = fs::read_link(src).map_err(StagingError::io("read link", src))?;
    std::os::unix::fs::symlink(&target, dst).map_err(StagingError::io("symlink", dst))
}

#[cfg(not(unix))]
fn copy_link(src: &Path, _dst: &Path) -> Result<(), StagingError> {
    warn!(target: "gridstage.core.staging", link = %src.display(), "skipping symlink inside artifact");
    Ok(())
}

/// Move the fully written `staged` path over `target`.
///
/// File over file is a single `rename`. Any other existing target has to be
/// removed first because `rename` cannot replace a directory with different content
/// or swap a file for a directory. Returns whether a previous target existed.
pub(super) fn replace(staged: &Path, target: &Path) -> Result<bool, StagingError> {
    let existing = match fs::symlink_metadata(target) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(StagingError::io("stat", target)(e)),
    };

    if let Some(meta) = &existing {
        let staged_is_dir = fs::symlink_metadata(staged)
            .map_err(StagingError::io("stat", staged))?
            .is_dir();
        if meta.is_dir() {
            fs::remove_dir_all(target).map_err(StagingError::io("remove", target))?;
        } else if staged_is_dir {
            fs::remove_file(target).map_err(StagingError::io("remove", target))?;
        }
    }

    fs::rename(staged, target).map_err(StagingError::io("rename", staged))?;
    Ok(existing.is_some())
}

/// Best-effort removal of a leftover staging path.
pub(super) fn discard(path: &Path) {
    let _ = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(_) => Ok(()),
    };
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Fatal configuration problems, raised while the assimilator is being built.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("results root {path}: {reason}")]
    ResultsRoot { path: PathBuf, reason: String },

    #[error("output resolver {name} unavailable: {reason}")]
    Resolver { name: &'static str, reason: String },
}

/// Failure to locate a result's output artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("result {result} has no {field}")]
    MissingLocator { result: String, field: &'static str },

    #[error("output file {0} does not exist")]
    NotFound(PathBuf),

    #[error("invalid upload file name: {0}")]
    InvalidFileName(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Failure while copying an artifact into the results root.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("rejected staging name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("staging target {0} escapes the results root")]
    EscapesRoot(PathBuf),

    #[error("source artifact {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StagingError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StagingError::Io { op, path, source }
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("expected 3 args (script, input, output), got {got}")]
    Usage { got: usize },
    #[error("spawn {program} failed: {reason}")]
    Spawn { program: String, reason: String },
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("completion sentinel {path}: {reason}")]
    Sentinel { path: PathBuf, reason: String },
}

pub type ExecResult<T> = Result<T, ExecError>;

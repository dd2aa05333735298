use std::path::PathBuf;

use serde::Deserialize;

use crate::utils::limits::RlimitConfig;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python";

/// Marker file the host framework polls for.
pub const SENTINEL_FILE: &str = "boinc_finish_called";

/// Producer settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Program that receives `<script> <input> <output>`.
    pub interpreter: String,
    /// Completion sentinel path; relative paths resolve against the producer's working directory.
    pub sentinel: PathBuf,
    /// Working directory of the interpreter. `None` inherits the producer's.
    pub cwd: Option<PathBuf>,
    /// Extra environment for the interpreter.
    pub env: Vec<(String, String)>,
    /// POSIX limits applied to the interpreter process.
    pub rlimits: RlimitConfig,
    /// Forward the interpreter's stdout lines into the log.
    pub forward_output: bool,
    /// Exit with the interpreter's own exit code instead of 0.
    pub propagate_exit_code: bool,
}

impl ProducerConfig {
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<PathBuf>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_rlimits(mut self, rlimits: RlimitConfig) -> Self {
        self.rlimits = rlimits;
        self
    }

    pub fn with_propagate_exit_code(mut self, propagate: bool) -> Self {
        self.propagate_exit_code = propagate;
        self
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            sentinel: PathBuf::from(SENTINEL_FILE),
            cwd: None,
            env: Vec::new(),
            rlimits: RlimitConfig::default(),
            forward_output: true,
            propagate_exit_code: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_worker_contract() {
        let cfg = ProducerConfig::default();
        assert_eq!(cfg.interpreter, "python");
        assert_eq!(cfg.sentinel, PathBuf::from("boinc_finish_called"));
        assert!(cfg.forward_output);
        assert!(!cfg.propagate_exit_code);
    }

    #[test]
    fn deserializes_overrides() {
        let cfg: ProducerConfig =
            serde_json::from_str(r#"{"interpreter":"python3","propagate_exit_code":true}"#)
                .unwrap();
        assert_eq!(cfg.interpreter, "python3");
        assert!(cfg.propagate_exit_code);
        assert_eq!(cfg.sentinel, PathBuf::from(SENTINEL_FILE));
    }
}

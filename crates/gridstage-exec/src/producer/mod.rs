//! Worker-side sidecar: run the interpreter, then always leave the completion sentinel.
//!
//! A task whose interpreter crashes, exits non-zero or never starts is still
//! marked finished. Failures have to be detected downstream from the output
//! artifact, not from a missing sentinel.
use std::process::ExitStatus;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    CompletionSentinel, ProducerArgs, ProducerConfig, error::{ExecError, ExecResult},
    util::interpreter_command,
};

#[cfg(all(test, unix))]
mod tests;

/// How the interpreter process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Exited(i32),
    /// Terminated by a signal (number when known).
    Signaled(Option<i32>),
}

impl RunOutcome {
    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => RunOutcome::Exited(code),
            None => RunOutcome::Signaled(signal_of(status)),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, RunOutcome::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            RunOutcome::Exited(code) => Some(*code),
            RunOutcome::Signaled(_) => None,
        }
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

pub struct Producer {
    cfg: ProducerConfig,
}

impl Producer {
    pub fn new(cfg: ProducerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.cfg
    }

    pub fn sentinel(&self) -> CompletionSentinel {
        CompletionSentinel::new(&self.cfg.sentinel)
    }

    /// Spawn `<interpreter> <script> <input> <output>` and wait for it.
    ///
    /// Blocks for the whole lifetime of the child; there is no timeout.
    #[instrument(level = "debug", skip_all, fields(script = %args.script.display()))]
    pub async fn run(&self, args: &ProducerArgs) -> Result<RunOutcome, ExecError> {
        let mut cmd = interpreter_command(&self.cfg, args);

        trace!(
            target: "gridstage.exec.producer",
            interpreter = %self.cfg.interpreter,
            input = %args.input.display(),
            output = %args.output.display(),
            "spawn"
        );
        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
            program: self.cfg.interpreter.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child.stdout.take();
        let forward = async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(target: "gridstage.exec.producer.out", "{line}");
                }
            }
        };

        let (status, ()) = tokio::join!(child.wait(), forward);
        let outcome = RunOutcome::from_status(status.map_err(|e| ExecError::Wait(e.to_string()))?);

        match outcome {
            RunOutcome::Exited(0) => debug!(target: "gridstage.exec.producer", "exit success"),
            RunOutcome::Exited(code) => {
                warn!(target: "gridstage.exec.producer", code, "interpreter exited non-zero")
            }
            RunOutcome::Signaled(signal) => {
                warn!(target: "gridstage.exec.producer", ?signal, "interpreter terminated by signal")
            }
        }
        Ok(outcome)
    }

    /// Write the completion sentinel.
    pub fn signal_completion(&self) -> ExecResult<()> {
        let sentinel = self.sentinel();
        sentinel.signal()?;
        debug!(target: "gridstage.exec.producer", path = %sentinel.path().display(), "completion sentinel written");
        Ok(())
    }

    /// [`Producer::run`] followed unconditionally by [`Producer::signal_completion`].
    ///
    /// Returns the process exit code for the sidecar: 1 when the interpreter could
    /// not be run, otherwise 0, or the interpreter's own code with
    /// `propagate_exit_code`. A failed sentinel write also yields non-zero.
    pub async fn execute(&self, args: &ProducerArgs) -> i32 {
        let code = match self.run(args).await {
            Ok(outcome) if self.cfg.propagate_exit_code => outcome.code().unwrap_or(1),
            Ok(_) => 0,
            Err(e) => {
                error!(target: "gridstage.exec.producer", error = %e, "interpreter did not run");
                1
            }
        };

        match self.signal_completion() {
            Ok(()) => code,
            Err(e) => {
                error!(target: "gridstage.exec.producer", error = %e, "task will look stuck to the host");
                if code == 0 { 1 } else { code }
            }
        }
    }
}

use std::sync::{Mutex, MutexGuard};

use super::{Report, Reporter, Severity, log_report};

/// Keeps every report in emission order.
///
/// Optionally echoes each report to `tracing` as well, so it can stand in for
/// [`super::TracingReporter`] where the caller also wants an audit trail.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<Report>>,
    echo: bool,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward every report to `tracing`.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Report>> {
        // A panic while pushing cannot leave the vector half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn entries(&self) -> Vec<Report> {
        self.lock().clone()
    }

    pub fn critical_reports(&self) -> Vec<Report> {
        self.lock()
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .cloned()
            .collect()
    }

    /// Reports about `subject`, in emission order.
    pub fn for_subject(&self, subject: &str) -> Vec<Report> {
        self.lock()
            .iter()
            .filter(|r| r.subject == subject)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Report> {
        std::mem::take(&mut *self.lock())
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, report: Report) {
        if self.echo {
            log_report(&report);
        }
        self.lock().push(report);
    }
}

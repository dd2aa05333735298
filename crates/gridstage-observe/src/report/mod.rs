//! Append-only, leveled reporting channel.
//!
//! Every report carries a severity, the subject it is about (a work unit name
//! for the assimilator, a task locator for the producer) and free text.
//! Reports are never deduplicated; a retried invocation emits its reports again.
mod memory;
mod forward;

pub use memory::MemoryReporter;
pub use forward::{TracingReporter, log_report};

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress narration and recoverable data-quality conditions.
    Normal,
    /// Conditions an operator has to look at.
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub severity: Severity,
    pub subject: String,
    pub message: String,
}

impl Report {
    pub fn new(severity: Severity, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            subject: subject.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.subject, self.message)
    }
}

/// Sink for reports.
///
/// Implementations must be safe to share between threads handling different work units.
pub trait Reporter: Send + Sync {
    fn report(&self, report: Report);

    fn normal(&self, subject: &str, message: String) {
        self.report(Report::new(Severity::Normal, subject, message));
    }

    fn critical(&self, subject: &str, message: String) {
        self.report(Report::new(Severity::Critical, subject, message));
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, report: Report) {
        (**self).report(report);
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, report: Report) {
        (**self).report(report);
    }
}

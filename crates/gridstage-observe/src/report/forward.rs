use tracing::{error, info};

use super::{Report, Reporter, Severity};

/// Forwards reports to the installed `tracing` subscriber.
///
/// `Normal` maps to `info`, `Critical` maps to `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, report: Report) {
        log_report(&report);
    }
}

#[inline]
pub fn log_report(r: &Report) {
    match r.severity {
        Severity::Normal => {
            info!(target: "gridstage.report", subject = %r.subject, "{}", r.message)
        }
        Severity::Critical => {
            error!(target: "gridstage.report", subject = %r.subject, "{}", r.message)
        }
    }
}

mod logger;
pub use logger::*;

pub mod report;
pub use report::{MemoryReporter, Report, Reporter, Severity, TracingReporter};

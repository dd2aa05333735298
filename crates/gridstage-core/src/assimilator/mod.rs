//! Assimilation of completed work units.
//!
//! For every completed work unit the scheduler hands over the unit, its result
//! set and the canonical result. The assimilator stages the canonical result's
//! output artifact under the name recorded in its metadata, then reports every
//! recognized error-mask condition. It never fails the invocation: problems are
//! reported and reflected in the returned [`Assimilation`].
//!
//! Invocation is at-least-once. Re-running with the same inputs overwrites the
//! same target and repeats the same reports.
//!
//! Two work units whose results carry the same `open_name` stage to the same
//! target. Keeping names unique is up to whoever submits the jobs.
use std::{path::PathBuf, sync::Arc};

use gridstage_model::{MetadataError, ResultRecord, WorkUnit, WorkUnitFlag, extract_open_name};
use gridstage_observe::Reporter;
use tracing::{debug, instrument};

use crate::{
    config::AssimilatorConfig,
    error::{CoreError, ResolveError},
    resolve::OutputResolver,
    staging::{StagingArea, StagingName},
};

#[cfg(test)]
mod tests;

/// Why staging did not happen for a work unit that had a canonical result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A canonical id was set but the scheduler passed no canonical record.
    CanonicalNotSupplied,
    /// The output artifact could not be located.
    Unresolved(ResolveError),
    /// `open_name` was missing or malformed.
    Metadata(MetadataError),
    /// `open_name` was present but not acceptable as a path under the root.
    InvalidName(String),
    /// The copy itself failed.
    Transfer(String),
}

/// What happened to the canonical result's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staging {
    Staged { target: PathBuf, replaced: bool },
    NoCanonicalResult,
    Skipped(SkipReason),
}

/// Summary of one `assimilate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assimilation {
    pub work_unit: String,
    pub staging: Staging,
    /// Error-mask conditions that were reported, in report order.
    pub flags: Vec<WorkUnitFlag>,
}

impl Assimilation {
    pub fn is_staged(&self) -> bool {
        matches!(self.staging, Staging::Staged { .. })
    }

    pub fn target(&self) -> Option<&PathBuf> {
        match &self.staging {
            Staging::Staged { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Stages canonical artifacts and classifies work unit errors.
///
/// Holds no per-call state; share one instance across worker threads.
pub struct Assimilator<R> {
    staging: StagingArea,
    resolver: R,
    reporter: Arc<dyn Reporter>,
}

impl<R: OutputResolver> Assimilator<R> {
    /// Build an assimilator, failing when the results root is unusable.
    pub fn new(
        cfg: &AssimilatorConfig,
        resolver: R,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, CoreError> {
        let staging = StagingArea::open(cfg)?;
        debug!(
            target: "gridstage.core.assimilator",
            root = %staging.root().display(),
            resolver = resolver.name(),
            "assimilator ready"
        );
        Ok(Self {
            staging,
            resolver,
            reporter,
        })
    }

    pub fn staging_area(&self) -> &StagingArea {
        &self.staging
    }

    /// Assimilate one completed work unit.
    ///
    /// `results` is the full result set; only `canonical` is inspected.
    #[instrument(level = "debug", skip_all, fields(wu = %work_unit.name))]
    pub fn assimilate(
        &self,
        work_unit: &WorkUnit,
        results: &[ResultRecord],
        canonical: Option<&ResultRecord>,
    ) -> Assimilation {
        let wu = work_unit.name.as_str();
        self.reporter.normal(wu, "Assimilating".into());
        debug!(target: "gridstage.core.assimilator", results = results.len(), "result set received");

        let staging = match (work_unit.canonical_result_id, canonical) {
            (None, _) => {
                self.reporter.normal(wu, "No canonical result".into());
                Staging::NoCanonicalResult
            }
            (Some(id), None) => {
                self.reporter.normal(
                    wu,
                    format!("Canonical result {id} was not supplied; nothing to stage"),
                );
                Staging::Skipped(SkipReason::CanonicalNotSupplied)
            }
            (Some(id), Some(result)) => {
                if result.id != id {
                    self.reporter.normal(
                        wu,
                        format!(
                            "Canonical id is {id} but result {} was supplied; staging it anyway",
                            result.id
                        ),
                    );
                }
                self.stage_canonical(wu, result)
            }
        };

        let flags = self.classify(work_unit);

        Assimilation {
            work_unit: work_unit.name.clone(),
            staging,
            flags,
        }
    }

    fn stage_canonical(&self, wu: &str, result: &ResultRecord) -> Staging {
        self.reporter.normal(wu, "Found canonical result".into());

        // Resolve first so its failure is reported even when metadata is also bad.
        let source = match self.resolver.resolve_output_path(result) {
            Ok(path) => {
                self.reporter
                    .normal(wu, format!("Output file path {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.reporter.critical(
                    wu,
                    format!("Cannot resolve output of result {}: {e}", result.name),
                );
                Err(e)
            }
        };

        let open_name = match extract_open_name(&result.metadata) {
            Ok(name) => name,
            Err(e) => {
                self.reporter.normal(
                    wu,
                    format!("Result {} has unusable metadata: {e}; not staging", result.name),
                );
                return Staging::Skipped(SkipReason::Metadata(e));
            }
        };

        let name = match StagingName::try_from(&open_name) {
            Ok(name) => name,
            Err(e) => {
                self.reporter.normal(wu, format!("{e}; not staging"));
                return Staging::Skipped(SkipReason::InvalidName(open_name.into_inner()));
            }
        };

        let source = match source {
            Ok(path) => path,
            Err(e) => return Staging::Skipped(SkipReason::Unresolved(e)),
        };

        match self.staging.stage(&source, &name) {
            Ok(staged) => {
                if staged.replaced {
                    self.reporter.normal(
                        wu,
                        format!("Replaced existing artifact at {}", staged.target.display()),
                    );
                }
                self.reporter.normal(
                    wu,
                    format!(
                        "Staged {} -> {}",
                        source.display(),
                        staged.target.display()
                    ),
                );
                Staging::Staged {
                    target: staged.target,
                    replaced: staged.replaced,
                }
            }
            Err(e) => {
                self.reporter
                    .critical(wu, format!("Staging {name} failed: {e}"));
                Staging::Skipped(SkipReason::Transfer(e.to_string()))
            }
        }
    }

    /// One critical report per recognized flag; reserved bits are only traced.
    fn classify(&self, work_unit: &WorkUnit) -> Vec<WorkUnitFlag> {
        let mask = work_unit.error_mask;
        if mask.reserved_bits() != 0 {
            debug!(
                target: "gridstage.core.assimilator",
                reserved = mask.reserved_bits(),
                "ignoring unrecognized error mask bits"
            );
        }

        mask.flags()
            .inspect(|flag| {
                self.reporter
                    .critical(&work_unit.name, format!("Error: {flag}"));
            })
            .collect()
    }
}

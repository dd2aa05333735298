use serde::{Deserialize, Serialize};

use crate::{ErrorMask, ResultId, WorkUnitName};

/// A dispatched unit of distributed computation, as handed over by the scheduler.
///
/// The assimilator only ever reads `canonical_result_id` and `error_mask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnit {
    /// Unique work unit name.
    pub name: WorkUnitName,
    /// Result accepted as authoritative, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_result_id: Option<ResultId>,
    /// Accumulated failure conditions.
    #[serde(default)]
    pub error_mask: ErrorMask,
}

impl WorkUnit {
    pub fn new(name: impl Into<WorkUnitName>) -> Self {
        Self {
            name: name.into(),
            canonical_result_id: None,
            error_mask: ErrorMask::EMPTY,
        }
    }

    pub fn with_canonical(mut self, id: u64) -> Self {
        self.canonical_result_id = Some(ResultId(id));
        self
    }

    pub fn with_error_mask(mut self, mask: impl Into<ErrorMask>) -> Self {
        self.error_mask = mask.into();
        self
    }

    /// Returns `true` if the scheduler accepted a canonical result.
    #[inline]
    pub fn has_canonical(&self) -> bool {
        self.canonical_result_id.is_some()
    }
}

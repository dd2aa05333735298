use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ResultId;

/// One worker's returned outcome for a work unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Scheduler-side identifier.
    pub id: ResultId,
    /// Result instance name (e.g. `pymw_12_0`).
    pub name: String,
    /// Output artifact path as recorded by the framework.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Name under which the output file was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Free-text metadata payload carrying the `open_name` field.
    #[serde(default)]
    pub metadata: String,
}

impl ResultRecord {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ResultId(id),
            name: name.into(),
            output_path: None,
            output_file: None,
            metadata: String::new(),
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

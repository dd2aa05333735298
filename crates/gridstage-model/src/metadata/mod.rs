//! Reading the `open_name` field out of a result's metadata payload.
//!
//! Two payload shapes are accepted:
//! - the legacy template form, where the name sits between literal
//!   `<open_name>` and `</open_name>` markers inside free text;
//! - a structured JSON object (`{"open_name": "batch7/out.dat"}`).
//!
//! A payload whose first non-whitespace character is `{` is decoded as JSON
//! first. When that yields no name and the payload carries an `<open_name>`
//! marker, the markers win. Everything else goes through marker extraction.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MetadataError;

pub const OPEN_MARKER: &str = "<open_name>";
pub const CLOSE_MARKER: &str = "</open_name>";

/// The artifact's original logical name, as the job submitter understood it.
///
/// Guaranteed non-empty. No path validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpenName(String);

impl OpenName {
    pub fn new(name: impl Into<String>) -> Result<Self, MetadataError> {
        let name = name.into();
        if name.is_empty() {
            return Err(MetadataError::EmptyName);
        }
        Ok(Self(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for OpenName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured metadata record attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_name: Option<String>,
}

impl ResultMetadata {
    pub fn from_json(payload: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn open_name(&self) -> Result<OpenName, MetadataError> {
        match &self.open_name {
            Some(name) => OpenName::new(name.as_str()),
            None => Err(MetadataError::MissingField("open_name")),
        }
    }
}

/// Extract `open_name` from a metadata payload.
pub fn extract_open_name(payload: &str) -> Result<OpenName, MetadataError> {
    if payload.trim_start().starts_with('{') {
        let structured = ResultMetadata::from_json(payload).and_then(|m| m.open_name());
        match structured {
            Err(_) if payload.contains(OPEN_MARKER) => {}
            other => return other,
        }
    }
    extract_between_markers(payload)
}

/// First opening marker, then the first closing marker after it.
fn extract_between_markers(payload: &str) -> Result<OpenName, MetadataError> {
    let start = payload
        .find(OPEN_MARKER)
        .ok_or(MetadataError::MissingOpenMarker)?
        + OPEN_MARKER.len();

    let rest = &payload[start..];
    let end = rest
        .find(CLOSE_MARKER)
        .ok_or(MetadataError::MissingCloseMarker)?;

    OpenName::new(&rest[..end])
}

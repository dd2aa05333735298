use thiserror::Error;

/// Data-quality failures while reading a result's metadata payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata has no `<open_name>` marker")]
    MissingOpenMarker,
    #[error("metadata has no `</open_name>` marker after the opening marker")]
    MissingCloseMarker,
    #[error("metadata carries an empty open_name")]
    EmptyName,
    #[error("structured metadata has no `{0}` field")]
    MissingField(&'static str),
    #[error("structured metadata could not be decoded: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        MetadataError::Decode(e.to_string())
    }
}

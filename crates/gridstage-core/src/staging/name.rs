use std::{
    fmt,
    path::{Path, PathBuf},
};

use gridstage_model::OpenName;

use crate::error::StagingError;

/// A validated path relative to the results root.
///
/// Nested names such as `batch7/out.dat` are allowed. Anything that could
/// leave the root, or that a filesystem would silently normalize, is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagingName(PathBuf);

impl StagingName {
    pub fn parse(name: &str) -> Result<Self, StagingError> {
        let reject = |reason| StagingError::InvalidName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(reject("empty name"));
        }
        if name.contains('\0') {
            return Err(reject("contains a NUL byte"));
        }
        if name.contains('\\') {
            return Err(reject("contains a backslash"));
        }
        if name.starts_with('/') || Path::new(name).is_absolute() {
            return Err(reject("absolute path"));
        }
        for segment in name.split('/') {
            match segment {
                "" => return Err(reject("empty path segment")),
                "." | ".." => return Err(reject("traversal segment")),
                _ => {}
            }
        }

        Ok(Self(PathBuf::from(name)))
    }

    #[inline]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<&OpenName> for StagingName {
    type Error = StagingError;

    fn try_from(name: &OpenName) -> Result<Self, Self::Error> {
        StagingName::parse(name.as_str())
    }
}

impl fmt::Display for StagingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

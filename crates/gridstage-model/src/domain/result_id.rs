use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheduler-side identifier of a single result.
///
/// Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub u64);

impl ResultId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ResultId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_is_transparent() {
        let id = ResultId(17);
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
        let back: ResultId = serde_json::from_str("17").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_prints_number() {
        assert_eq!(ResultId::from(42u64).to_string(), "42");
    }
}

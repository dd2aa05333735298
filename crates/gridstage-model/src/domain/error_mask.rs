use std::fmt;

use serde::{Deserialize, Serialize};

/// A single recognized failure condition carried in a work unit's [`ErrorMask`].
///
/// Bit values match the scheduler's `WU_ERROR_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkUnitFlag {
    /// The scheduler could not send a result instance to any host.
    CouldntSendResult,
    /// Too many results came back with an error outcome.
    TooManyErrorResults,
    /// Too many results were created in total.
    TooManyTotalResults,
    /// Too many results succeeded without reaching a quorum.
    TooManySuccessResults,
}

impl WorkUnitFlag {
    /// Recognized flags in the order they are checked and reported.
    pub const ALL: [WorkUnitFlag; 4] = [
        WorkUnitFlag::CouldntSendResult,
        WorkUnitFlag::TooManyErrorResults,
        WorkUnitFlag::TooManyTotalResults,
        WorkUnitFlag::TooManySuccessResults,
    ];

    /// Bit value of this flag inside an [`ErrorMask`].
    pub const fn bit(self) -> u32 {
        match self {
            WorkUnitFlag::CouldntSendResult => 0x01,
            WorkUnitFlag::TooManyErrorResults => 0x02,
            WorkUnitFlag::TooManySuccessResults => 0x04,
            WorkUnitFlag::TooManyTotalResults => 0x08,
        }
    }

    /// Human readable description used in operator reports.
    pub fn describe(self) -> &'static str {
        match self {
            WorkUnitFlag::CouldntSendResult => "couldn't send a result",
            WorkUnitFlag::TooManyErrorResults => "too many error results",
            WorkUnitFlag::TooManyTotalResults => "too many total results",
            WorkUnitFlag::TooManySuccessResults => "too many success results",
        }
    }
}

impl fmt::Display for WorkUnitFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Bitmask of independent, non-exclusive failure conditions attached to a work unit.
///
/// Any combination of bits may be set. Bits outside [`ErrorMask::RECOGNIZED`] are reserved
/// and never reported, so masks produced by newer schedulers stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMask(pub u32);

impl ErrorMask {
    pub const EMPTY: ErrorMask = ErrorMask(0);

    pub const RECOGNIZED: u32 = WorkUnitFlag::CouldntSendResult.bit()
        | WorkUnitFlag::TooManyErrorResults.bit()
        | WorkUnitFlag::TooManyTotalResults.bit()
        | WorkUnitFlag::TooManySuccessResults.bit();

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, flag: WorkUnitFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Returns a copy with `flag` set.
    pub fn with(self, flag: WorkUnitFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Bits that are set but not recognized.
    pub fn reserved_bits(self) -> u32 {
        self.0 & !Self::RECOGNIZED
    }

    /// Iterate over the recognized flags that are set, in check order.
    pub fn flags(self) -> impl Iterator<Item = WorkUnitFlag> {
        WorkUnitFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl From<u32> for ErrorMask {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl FromIterator<WorkUnitFlag> for ErrorMask {
    fn from_iter<I: IntoIterator<Item = WorkUnitFlag>>(iter: I) -> Self {
        iter.into_iter().fold(ErrorMask::EMPTY, ErrorMask::with)
    }
}

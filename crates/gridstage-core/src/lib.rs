pub mod error;
pub use error::{CoreError, ResolveError, StagingError};

mod config;
pub use config::{AssimilatorConfig, DEFAULT_RESULTS_ROOT};

pub mod resolve;
pub use resolve::{OutputResolver, RecordedPathResolver, UploadDirResolver};

pub mod staging;
pub use staging::{StagedArtifact, StagingArea, StagingName};

pub mod assimilator;
pub use assimilator::{Assimilation, Assimilator, SkipReason, Staging};

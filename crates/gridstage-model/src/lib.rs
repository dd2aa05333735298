mod error;
pub use error::MetadataError;

mod domain;
pub use domain::*;

pub mod metadata;
pub use metadata::{OpenName, ResultMetadata, extract_open_name};

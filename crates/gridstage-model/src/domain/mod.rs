mod result_id;
pub use result_id::ResultId;

mod error_mask;
pub use error_mask::{ErrorMask, WorkUnitFlag};

mod work_unit;
pub use work_unit::WorkUnit;

mod result_record;
pub use result_record::ResultRecord;

/// Opaque work unit name as assigned by the scheduler.
///
/// Used as the correlation key in every report the assimilator emits.
pub type WorkUnitName = String;

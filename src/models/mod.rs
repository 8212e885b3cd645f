//! Data model: attorney records, record sets and phase artifacts.

pub mod artifacts;
pub mod attorney;
pub mod record_set;

pub use artifacts::{FetchStatus, FetchStatusMap, PracticeAreaIndex, ProgressManifest};
pub use attorney::{AttorneyRecord, FIELD_COUNT, FIELD_NAMES, URL_FIELDS};
pub use record_set::RecordSet;

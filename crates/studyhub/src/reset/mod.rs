/// Reset orchestration.
pub mod orchestrator;
/// Reset reports.
pub mod report;

pub use orchestrator::DatabaseReset;
pub use report::{CollectionFailure, ResetReport, ResetStage};

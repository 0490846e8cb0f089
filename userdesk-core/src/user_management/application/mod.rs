//! Services that orchestrate user-record operations.

pub mod record_updater;

pub use record_updater::UserRecordUpdater;

//! User management module.
//!
//! Application services that read and update user records on behalf of an
//! authenticated requester.

pub mod application;

pub use application::UserRecordUpdater;

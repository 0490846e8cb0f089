//! Repository traits the application layer depends on.

pub mod subscriptions;
pub mod users;

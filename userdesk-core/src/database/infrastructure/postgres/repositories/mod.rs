//! PostgreSQL-backed repository implementations.

pub mod subscriptions;
pub mod users;

//! Persistence ports and their adapters.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::memory::{
    InMemorySubscriptionsRepository, InMemoryUsersRepository,
};
#[cfg(feature = "database")]
pub use infrastructure::postgres::{PoolSettings, PostgresDatabase};
pub use ports::{subscriptions::SubscriptionsRepository, users::UsersRepository};

//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

use std::fmt;
use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

pub use repositories::subscriptions::PostgresSubscriptionsRepository;
pub use repositories::users::PostgresUsersRepository;

use crate::error::{CoreError, Result};

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
        }
    }
}

/// Connection pool plus the repositories built on it.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    users: PostgresUsersRepository,
    subscriptions: PostgresSubscriptionsRepository,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    /// Connect a new pool to `connection_string`.
    pub async fn new(
        connection_string: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Database connection failed: {e}"))
            })?;

        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "PostgreSQL pool ready"
        );

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool, e.g. one handed out by `#[sqlx::test]`.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            users: PostgresUsersRepository::new(pool.clone()),
            subscriptions: PostgresSubscriptionsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Users repository sharing this pool.
    pub fn users(&self) -> &PostgresUsersRepository {
        &self.users
    }

    /// Subscriptions repository sharing this pool.
    pub fn subscriptions(&self) -> &PostgresSubscriptionsRepository {
        &self.subscriptions
    }

    /// Apply the embedded migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Migration failed: {e}"))
            })?;

        info!("database migrations applied");
        Ok(())
    }
}

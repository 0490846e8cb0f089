//! Latest-subscription lookup over `user_subscriptions`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::ports::subscriptions::SubscriptionsRepository;
use crate::{
    domain::users::{SubscriptionPlan, UserSubscription},
    error::{CoreError, Result},
};

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    plan_id: Uuid,
    plan_name: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    remaining_uploads: Option<i32>,
    is_active: bool,
}

impl From<SubscriptionRow> for UserSubscription {
    fn from(r: SubscriptionRow) -> Self {
        UserSubscription {
            plan: SubscriptionPlan {
                id: r.plan_id,
                name: r.plan_name,
            },
            start_date: r.start_date,
            end_date: r.end_date,
            remaining_uploads: r.remaining_uploads,
            is_active: r.is_active,
        }
    }
}

/// PostgreSQL-backed implementation of the `SubscriptionsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresSubscriptionsRepository {
    pool: PgPool,
}

impl PostgresSubscriptionsRepository {
    /// Repository over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionsRepository for PostgresSubscriptionsRepository {
    async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserSubscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT
                p.id AS plan_id, p.name AS plan_name,
                s.start_date, s.end_date, s.remaining_uploads, s.is_active
            FROM user_subscriptions s
            JOIN subscription_plans p ON p.id = s.plan_id
            WHERE s.user_id = $1
            ORDER BY s.start_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to load subscription: {e}"))
        })?;

        Ok(row.map(UserSubscription::from))
    }
}

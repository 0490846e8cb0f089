//! Subscription lookups used to build the current-user view.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::UserSubscription;
use crate::error::Result;

/// Read access to user subscriptions.
#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    /// Most recently started subscription of the user, if any.
    async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserSubscription>>;
}

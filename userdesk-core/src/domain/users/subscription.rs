//! Subscription summary attached to the current-user view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plan a user can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Plan identifier
    pub id: Uuid,
    /// Display name, unique across plans
    pub name: String,
}

/// Summary of a user's most recent subscription, computed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    /// Subscribed plan
    pub plan: SubscriptionPlan,
    /// Ordering key for "latest"
    pub start_date: DateTime<Utc>,
    /// `None` for open-ended subscriptions
    pub end_date: Option<DateTime<Utc>>,
    /// `None` means unlimited
    pub remaining_uploads: Option<i32>,
    /// Cleared when the subscription is cancelled
    pub is_active: bool,
}

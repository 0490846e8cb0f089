//! In-process repositories backed by `tokio` locks.
//!
//! They honour the same contracts as the PostgreSQL adapters (unique emails,
//! not-found on update of a missing user) and back the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::ports::{
    subscriptions::SubscriptionsRepository, users::UsersRepository,
};
use crate::domain::users::{User, UserSubscription};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// [`UsersRepository`] kept in a map.
#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<HashMap<Uuid, StoredUser>>,
}

impl InMemoryUsersRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn create_user_with_password(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|stored| stored.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::Conflict("Email already exists".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(CoreError::Conflict(
                "User id already exists".to_string(),
            ));
        }
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .map(|stored| stored.user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|stored| stored.user.email.eq_ignore_ascii_case(email))
            .map(|stored| stored.user.clone()))
    }

    async fn update_user(
        &self,
        user: &User,
        password_hash: Option<&str>,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| {
                CoreError::NotFound(format!("User {} not found", user.id))
            })?;

        // Identity columns are not part of the update.
        let mut updated = user.clone();
        updated.email = stored.user.email.clone();
        updated.created_at = stored.user.created_at;
        stored.user = updated;

        if let Some(hash) = password_hash {
            stored.password_hash = hash.to_string();
        }
        Ok(())
    }

    async fn get_user_password_hash(
        &self,
        user_id: Uuid,
    ) -> Result<Option<String>> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|stored| stored.password_hash.clone()))
    }
}

/// [`SubscriptionsRepository`] kept in a map.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionsRepository {
    subscriptions: RwLock<HashMap<Uuid, Vec<UserSubscription>>>,
}

impl InMemorySubscriptionsRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription for `user_id`.
    pub async fn insert(&self, user_id: Uuid, subscription: UserSubscription) {
        self.subscriptions
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(subscription);
    }
}

#[async_trait]
impl SubscriptionsRepository for InMemorySubscriptionsRepository {
    async fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserSubscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .get(&user_id)
            .and_then(|subs| subs.iter().max_by_key(|sub| sub.start_date))
            .cloned())
    }
}

//! Account persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::User;
use crate::error::Result;

/// Account records and their credentials.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert `user` and its credential atomically. A taken email is a
    /// [`CoreError::Conflict`](crate::CoreError::Conflict).
    async fn create_user_with_password(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<()>;
    /// Lookup by primary key.
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    /// Case-insensitive lookup.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Persist the mutable columns of `user`. When `password_hash` is given
    /// the stored credential is replaced in the same write.
    async fn update_user(
        &self,
        user: &User,
        password_hash: Option<&str>,
    ) -> Result<()>;

    /// Stored PHC hash string, if a credential exists.
    async fn get_user_password_hash(
        &self,
        user_id: Uuid,
    ) -> Result<Option<String>>;
}

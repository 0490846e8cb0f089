//! `users` and `user_credentials` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::users::UsersRepository;
use crate::{
    domain::users::User,
    error::{CoreError, Result},
};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    address: String,
    phone_number: String,
    profile_image: Option<String>,
    is_staff: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            address: r.address,
            phone_number: r.phone_number,
            profile_image: r.profile_image,
            is_staff: r.is_staff,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    /// Repository over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user_with_password(
        &self,
        user: &User,
        password_hash: &str,
    ) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to start transaction: {e}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, address, phone_number,
                profile_image, is_staff, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(&user.profile_image)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("idx_users_email_unique")
            {
                return CoreError::Conflict("Email already exists".to_string());
            }
            CoreError::Internal(format!("Failed to create user: {e}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to store password: {e}"))
        })?;

        tx.commit()
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Failed to commit transaction: {e}"
                ))
            })?;

        info!(user_id = %user.id, "created user");
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, email, first_name, last_name, address, phone_number,
                profile_image, is_staff, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to get user by id: {e}"))
        })?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, email, first_name, last_name, address, phone_number,
                profile_image, is_staff, is_active, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to get user by email: {e}"))
        })?;

        Ok(row.map(User::from))
    }

    async fn update_user(
        &self,
        user: &User,
        password_hash: Option<&str>,
    ) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to start transaction: {e}"))
            })?;

        // id, email and created_at are never written here.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, address = $4,
                phone_number = $5, profile_image = $6, is_staff = $7,
                is_active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(&user.profile_image)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to update user: {e}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "User {} not found",
                user.id
            )));
        }

        if let Some(hash) = password_hash {
            sqlx::query(
                r#"
                INSERT INTO user_credentials
                    (user_id, password_hash, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (user_id) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(user.id)
            .bind(hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to update password: {e}"))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Failed to commit transaction: {e}"
                ))
            })?;

        info!(
            user_id = %user.id,
            password_changed = password_hash.is_some(),
            "updated user"
        );
        Ok(())
    }

    async fn get_user_password_hash(
        &self,
        user_id: Uuid,
    ) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password_hash
            FROM user_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to get password hash: {e}"))
        })?;

        Ok(hash)
    }
}

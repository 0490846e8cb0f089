#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum_test::TestServer;
use userdesk_core::{
    database::{
        InMemorySubscriptionsRepository, InMemoryUsersRepository,
        UsersRepository,
    },
    domain::users::{User, auth::PasswordCrypto},
};
use userdesk_server::{
    AppState,
    infra::config::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ServerConfig,
    },
    routes::build_app,
};

pub const PASSWORD: &str = "Password#123";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub users: Arc<InMemoryUsersRepository>,
    pub subscriptions: Arc<InMemorySubscriptionsRepository>,
    pub crypto: Arc<PasswordCrypto>,
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/userdesk_test".into(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-0123456789abcdef".into(),
            password_pepper: "integration-test-pepper".into(),
            access_token_ttl_secs: 900,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".into()],
        },
        metadata: ConfigMetadata::default(),
    }
}

pub fn build_test_app() -> Result<TestApp> {
    let users = Arc::new(InMemoryUsersRepository::new());
    let subscriptions = Arc::new(InMemorySubscriptionsRepository::new());
    let crypto = Arc::new(
        PasswordCrypto::for_tests("integration-test-pepper")
            .context("failed to build password crypto")?,
    );

    let state = AppState::new(
        Arc::new(test_config()),
        users.clone(),
        subscriptions.clone(),
        crypto.clone(),
    )?;
    let server = TestServer::new(build_app(state.clone()))
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        users,
        subscriptions,
        crypto,
    })
}

impl TestApp {
    /// Store a user with [`PASSWORD`] and return it.
    pub async fn seed_user(&self, email: &str, is_staff: bool) -> Result<User> {
        let mut user = User::new(email);
        user.first_name = "Initial".into();
        user.last_name = "User".into();
        user.profile_image = Some("avatars/initial.png".into());
        user.is_staff = is_staff;

        let hash = self.crypto.hash_password(PASSWORD)?;
        self.users.create_user_with_password(&user, &hash).await?;
        Ok(user)
    }

    pub fn token_for(&self, user: &User) -> Result<String> {
        Ok(self.state.jwt.issue(user.id)?.access_token)
    }

    pub async fn stored(&self, user: &User) -> Result<User> {
        self.users
            .get_user_by_id(user.id)
            .await?
            .context("user vanished from repository")
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

use std::{fmt, sync::Arc, time::Duration};

use anyhow::Context;
use userdesk_core::database::{SubscriptionsRepository, UsersRepository};
use userdesk_core::domain::users::auth::PasswordCrypto;
use userdesk_core::user_management::UserRecordUpdater;

use crate::infra::config::Config;
use crate::users::auth::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UsersRepository>,
    pub updater: Arc<UserRecordUpdater>,
    pub password_crypto: Arc<PasswordCrypto>,
    pub jwt: Arc<JwtKeys>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire repositories and crypto helpers from `config`.
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UsersRepository>,
        subscriptions: Arc<dyn SubscriptionsRepository>,
        password_crypto: Arc<PasswordCrypto>,
    ) -> anyhow::Result<Self> {
        let jwt = Arc::new(
            JwtKeys::new(
                config.auth.jwt_secret.as_bytes(),
                Duration::from_secs(config.auth.access_token_ttl_secs),
            )
            .context("failed to initialize JWT keys")?,
        );
        let updater = Arc::new(UserRecordUpdater::new(
            users.clone(),
            subscriptions,
            password_crypto.clone(),
        ));

        Ok(Self {
            config,
            users,
            updater,
            password_crypto,
            jwt,
        })
    }
}

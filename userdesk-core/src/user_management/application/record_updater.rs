//! Current-user update service
//!
//! Validates raw input against the field declaration, runs the field policy,
//! then performs the base update: password hashing, field assignment,
//! timestamp bump and persistence.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::ports::{
    subscriptions::SubscriptionsRepository, users::UsersRepository,
};
use crate::domain::users::{
    CurrentUserView, FieldDeclaration, FieldPolicy, FieldValue, RequestContext,
    StaffGatedPolicy, UpdateMode, User, UserField, UserPatch,
    auth::PasswordCrypto,
};
use crate::error::{CoreError, Result};

/// Applies validated patches to stored user records.
///
/// The policy decides which proposed fields survive; everything after that
/// (assignment, password hashing, persistence) is the same for every policy.
#[derive(Clone)]
pub struct UserRecordUpdater<P: FieldPolicy = StaffGatedPolicy> {
    users: Arc<dyn UsersRepository>,
    subscriptions: Arc<dyn SubscriptionsRepository>,
    crypto: Arc<PasswordCrypto>,
    declaration: FieldDeclaration,
    policy: P,
}

impl<P: FieldPolicy> fmt::Debug for UserRecordUpdater<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecordUpdater")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl UserRecordUpdater<StaffGatedPolicy> {
    /// Updater with the staff-gated policy.
    pub fn new(
        users: Arc<dyn UsersRepository>,
        subscriptions: Arc<dyn SubscriptionsRepository>,
        crypto: Arc<PasswordCrypto>,
    ) -> Self {
        Self::with_policy(users, subscriptions, crypto, StaffGatedPolicy)
    }
}

impl<P: FieldPolicy> UserRecordUpdater<P> {
    /// Updater with a custom field policy.
    pub fn with_policy(
        users: Arc<dyn UsersRepository>,
        subscriptions: Arc<dyn SubscriptionsRepository>,
        crypto: Arc<PasswordCrypto>,
        policy: P,
    ) -> Self {
        Self {
            users,
            subscriptions,
            crypto,
            declaration: FieldDeclaration::current_user(),
            policy,
        }
    }

    /// Current-user view of a stored record.
    pub async fn current_user(&self, user_id: Uuid) -> Result<CurrentUserView> {
        let user = self.load(user_id).await?;
        self.view(user).await
    }

    /// Attach the computed subscription summary to `user`.
    pub async fn view(&self, user: User) -> Result<CurrentUserView> {
        let subscription = self.subscriptions.latest_for_user(user.id).await?;
        Ok(CurrentUserView::new(user, subscription))
    }

    /// Apply `patch` to `instance` on behalf of the request in `ctx`.
    ///
    /// Fields the requester may not write are dropped silently; the rest is
    /// handed to [`Self::base_update`]. An absent context counts as an
    /// unprivileged requester.
    pub async fn update(
        &self,
        instance: User,
        patch: UserPatch,
        ctx: Option<&RequestContext>,
    ) -> Result<User> {
        let proposed = patch.len();
        let writable = self.policy.writable_fields(patch, ctx);
        debug!(
            user_id = %instance.id,
            proposed,
            kept = writable.len(),
            "update fields filtered by policy"
        );
        self.base_update(instance, writable).await
    }

    /// Assign every field of `patch` and persist the record.
    ///
    /// A password is hashed before it reaches the repository; `updated_at`
    /// is bumped even when the patch turned out empty.
    pub async fn base_update(
        &self,
        mut instance: User,
        mut patch: UserPatch,
    ) -> Result<User> {
        let password_hash = match patch.remove(UserField::Password) {
            Some(FieldValue::Text(password)) => Some(
                self.crypto
                    .hash_password(&password)
                    .map_err(|err| CoreError::Internal(err.to_string()))?,
            ),
            Some(other) => {
                return Err(CoreError::Internal(format!(
                    "cannot assign {} value to password",
                    other.kind_name()
                )));
            }
            None => None,
        };

        let fields: Vec<&'static str> =
            patch.fields().map(UserField::name).collect();
        instance.apply_patch(patch)?;
        instance.updated_at = Utc::now();

        self.users
            .update_user(&instance, password_hash.as_deref())
            .await?;

        info!(
            user_id = %instance.id,
            ?fields,
            password_changed = password_hash.is_some(),
            "user record updated"
        );
        Ok(instance)
    }

    /// Validate `input` against the declaration, update the requester's own
    /// record and return the refreshed view.
    pub async fn update_current_user(
        &self,
        ctx: &RequestContext,
        input: &Map<String, Value>,
        mode: UpdateMode,
    ) -> Result<CurrentUserView> {
        let patch = self.declaration.validate(input, mode)?;
        let instance = self.load(ctx.user.id).await?;
        let updated = self.update(instance, patch, Some(ctx)).await?;
        self.view(updated).await
    }

    async fn load(&self, user_id: Uuid) -> Result<User> {
        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("User {user_id} not found"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        InMemorySubscriptionsRepository, InMemoryUsersRepository,
    };
    use crate::domain::users::{SubscriptionPlan, UserSubscription};
    use serde_json::json;

    struct Fixture {
        users: Arc<InMemoryUsersRepository>,
        subscriptions: Arc<InMemorySubscriptionsRepository>,
        crypto: Arc<PasswordCrypto>,
        updater: UserRecordUpdater,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUsersRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionsRepository::new());
        let crypto = Arc::new(PasswordCrypto::for_tests("pepper").unwrap());
        let updater = UserRecordUpdater::new(
            users.clone(),
            subscriptions.clone(),
            crypto.clone(),
        );
        Fixture {
            users,
            subscriptions,
            crypto,
            updater,
        }
    }

    async fn seed(fx: &Fixture, email: &str, is_staff: bool) -> User {
        let mut user = User::new(email);
        user.is_staff = is_staff;
        user.profile_image = Some("avatars/original.png".to_string());
        let hash = fx.crypto.hash_password("initial-password").unwrap();
        fx.users.create_user_with_password(&user, &hash).await.unwrap();
        user
    }

    fn patch(entries: &[(UserField, FieldValue)]) -> UserPatch {
        entries.iter().cloned().collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn unprivileged_flag_change_is_dropped() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;
        let ctx = RequestContext::for_user(&user);

        let updated = fx
            .updater
            .update(
                user.clone(),
                patch(&[
                    (UserField::IsStaff, FieldValue::Flag(true)),
                    (UserField::FirstName, FieldValue::text("Ann")),
                ]),
                Some(&ctx),
            )
            .await
            .unwrap();

        assert!(!updated.is_staff);
        assert_eq!(updated.first_name, "Ann");

        let stored = fx.users.get_user_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.is_staff);
        assert_eq!(stored.first_name, "Ann");
    }

    #[tokio::test]
    async fn privileged_flag_change_is_applied() {
        let fx = fixture();
        let admin = seed(&fx, "admin@example.com", true).await;
        let ctx = RequestContext::for_user(&admin);

        let updated = fx
            .updater
            .update(
                admin.clone(),
                patch(&[(UserField::IsActive, FieldValue::Flag(false))]),
                Some(&ctx),
            )
            .await
            .unwrap();

        assert!(!updated.is_active);
        assert!(updated.is_staff);
    }

    #[tokio::test]
    async fn blank_image_leaves_image_alone() {
        let fx = fixture();
        for is_staff in [false, true] {
            let email = format!("img-{is_staff}@example.com");
            let user = seed(&fx, &email, is_staff).await;
            let ctx = RequestContext::for_user(&user);
            for blank in [FieldValue::text(""), FieldValue::Null] {
                let updated = fx
                    .updater
                    .update(
                        user.clone(),
                        patch(&[(UserField::ProfileImage, blank)]),
                        Some(&ctx),
                    )
                    .await
                    .unwrap();
                assert_eq!(
                    updated.profile_image.as_deref(),
                    Some("avatars/original.png")
                );
            }
        }
    }

    #[tokio::test]
    async fn non_blank_image_is_applied_for_anyone() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;

        let updated = fx
            .updater
            .update(
                user,
                patch(&[(
                    UserField::ProfileImage,
                    FieldValue::text("avatars/new.png"),
                )]),
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.profile_image.as_deref(), Some("avatars/new.png"));
    }

    #[tokio::test]
    async fn missing_context_is_unprivileged() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;

        let updated = fx
            .updater
            .update(
                user,
                patch(&[
                    (UserField::IsStaff, FieldValue::Flag(true)),
                    (UserField::IsActive, FieldValue::Flag(false)),
                ]),
                None,
            )
            .await
            .unwrap();

        assert!(!updated.is_staff);
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn identity_is_never_altered() {
        let fx = fixture();
        let admin = seed(&fx, "admin@example.com", true).await;
        let ctx = RequestContext::for_user(&admin);

        let view = fx
            .updater
            .update_current_user(
                &ctx,
                &object(json!({
                    "id": Uuid::new_v4(),
                    "email": "hijack@example.com",
                    "last_name": "Root",
                })),
                UpdateMode::Partial,
            )
            .await
            .unwrap();

        assert_eq!(view.id, admin.id);
        assert_eq!(view.email, "admin@example.com");
        assert_eq!(view.last_name, "Root");
    }

    #[tokio::test]
    async fn password_is_hashed_and_replaced() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;
        let ctx = RequestContext::for_user(&user);

        fx.updater
            .update_current_user(
                &ctx,
                &object(json!({"password": "new-secret-value"})),
                UpdateMode::Partial,
            )
            .await
            .unwrap();

        let hash = fx
            .users
            .get_user_password_hash(user.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(hash, "new-secret-value");
        assert!(fx.crypto.verify_password("new-secret-value", &hash).unwrap());
        assert!(!fx.crypto.verify_password("initial-password", &hash).unwrap());
    }

    #[tokio::test]
    async fn invalid_input_is_a_validation_error() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;
        let ctx = RequestContext::for_user(&user);

        let err = fx
            .updater
            .update_current_user(
                &ctx,
                &object(json!({"first_name": null})),
                UpdateMode::Partial,
            )
            .await
            .unwrap_err();

        match err {
            CoreError::Validation(errors) => {
                assert_eq!(
                    errors.message_for("first_name"),
                    Some("This field may not be null.")
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let fx = fixture();
        let ghost = User::new("ghost@example.com");
        let ctx = RequestContext::for_user(&ghost);

        let err = fx
            .updater
            .update_current_user(&ctx, &Map::new(), UpdateMode::Partial)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn view_includes_subscription_summary() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", false).await;

        let view = fx.updater.current_user(user.id).await.unwrap();
        assert!(view.usersubscription.is_none());

        fx.subscriptions
            .insert(
                user.id,
                UserSubscription {
                    plan: SubscriptionPlan {
                        id: Uuid::new_v4(),
                        name: "Pro".to_string(),
                    },
                    start_date: Utc::now(),
                    end_date: None,
                    remaining_uploads: Some(25),
                    is_active: true,
                },
            )
            .await;

        let view = fx.updater.current_user(user.id).await.unwrap();
        let summary = view.usersubscription.unwrap();
        assert_eq!(summary.plan.name, "Pro");
        assert_eq!(summary.remaining_uploads, Some(25));
    }

    #[derive(Debug)]
    struct FreezeEverything;

    impl FieldPolicy for FreezeEverything {
        fn writable_fields(
            &self,
            _patch: UserPatch,
            _ctx: Option<&RequestContext>,
        ) -> UserPatch {
            UserPatch::new()
        }
    }

    #[tokio::test]
    async fn custom_policy_controls_what_is_written() {
        let fx = fixture();
        let user = seed(&fx, "ann@example.com", true).await;
        let frozen = UserRecordUpdater::with_policy(
            fx.users.clone(),
            fx.subscriptions.clone(),
            fx.crypto.clone(),
            FreezeEverything,
        );

        let updated = frozen
            .update(
                user.clone(),
                patch(&[(UserField::FirstName, FieldValue::text("Changed"))]),
                Some(&RequestContext::for_user(&user)),
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "");
        assert!(updated.updated_at >= user.updated_at);
    }
}

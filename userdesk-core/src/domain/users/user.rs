//! User record and request context
//!
//! The [`User`] type is the stored account record. Credentials live beside it
//! in the repository and are never part of this type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::fields::{FieldValue, UserField, UserPatch};
use crate::error::{CoreError, Result};

/// Stored account record.
///
/// `id` and `email` are fixed at creation. `is_staff` and `is_active` are the
/// privileged flags; only a staff requester may change them through the
/// current-user update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Login email, unique and immutable
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Postal address, empty when unknown
    pub address: String,
    /// Contact number, empty when unknown
    pub phone_number: String,
    /// Optional URL or storage path of the profile picture
    pub profile_image: Option<String>,
    /// Staff members may change privileged flags
    pub is_staff: bool,
    /// Whether the account may authenticate
    pub is_active: bool,
    /// Timestamp of account creation
    pub created_at: DateTime<Utc>,
    /// Timestamp of last profile update
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh, active, non-staff record for `email`.
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            phone_number: String::new(),
            profile_image: None,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign every entry of `patch` onto the record.
    ///
    /// Only assignable profile fields and flags are written. `password` must be
    /// taken out of the patch and hashed by the caller beforehand; identifiers
    /// and computed fields are skipped.
    pub fn apply_patch(&mut self, patch: UserPatch) -> Result<()> {
        for (field, value) in patch {
            match (field, value) {
                (UserField::FirstName, FieldValue::Text(v)) => {
                    self.first_name = v
                }
                (UserField::LastName, FieldValue::Text(v)) => {
                    self.last_name = v
                }
                (UserField::Address, FieldValue::Text(v)) => self.address = v,
                (UserField::PhoneNumber, FieldValue::Text(v)) => {
                    self.phone_number = v
                }
                (UserField::ProfileImage, FieldValue::Text(v)) => {
                    self.profile_image = Some(v)
                }
                (UserField::ProfileImage, FieldValue::Null) => {
                    self.profile_image = None
                }
                (UserField::IsStaff, FieldValue::Flag(v)) => self.is_staff = v,
                (UserField::IsActive, FieldValue::Flag(v)) => {
                    self.is_active = v
                }
                (
                    UserField::Id
                    | UserField::Email
                    | UserField::Password
                    | UserField::UserSubscription,
                    _,
                ) => {
                    warn!(
                        field = field.name(),
                        "skipping non-assignable field"
                    );
                }
                (field, value) => {
                    return Err(CoreError::Internal(format!(
                        "cannot assign {} value to {}",
                        value.kind_name(),
                        field.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The acting user of a request, as far as authorization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    /// Id of the acting user
    pub id: Uuid,
    /// Staff status at authentication time
    pub is_staff: bool,
}

/// Per-request context handed to the update rule.
///
/// Built by the HTTP layer from the authenticated user and dropped once the
/// request completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// The authenticated user
    pub user: Requester,
}

impl RequestContext {
    /// Context acting as `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            user: Requester {
                id: user.id,
                is_staff: user.is_staff,
            },
        }
    }
}

//! Serialized shape of the current-user endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subscription::UserSubscription;
use super::user::User;

/// Output shape of the current-user endpoint.
///
/// Mirrors the readable part of
/// [`CURRENT_USER_FIELDS`](super::fields::CURRENT_USER_FIELDS), so the
/// write-only password has no member here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUserView {
    /// Read-only
    pub id: Uuid,
    /// Read-only
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Postal address
    pub address: String,
    /// Contact number
    pub phone_number: String,
    /// Profile picture URL or path
    pub profile_image: Option<String>,
    /// Latest subscription, `null` when the user never subscribed
    pub usersubscription: Option<UserSubscription>,
    /// Staff flag
    pub is_staff: bool,
    /// Account enabled
    pub is_active: bool,
}

impl CurrentUserView {
    /// Project `user` and its latest subscription into the view.
    pub fn new(user: User, subscription: Option<UserSubscription>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            address: user.address,
            phone_number: user.phone_number,
            profile_image: user.profile_image,
            usersubscription: subscription,
            is_staff: user.is_staff,
            is_active: user.is_active,
        }
    }
}

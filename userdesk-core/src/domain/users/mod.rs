//! User-domain boundary.
//!
//! Groups the account record, the current-user field declaration, the update
//! policy and credential hashing under a single namespace so other layers can
//! depend on cohesive submodules instead of scattered top-level exports.

pub mod auth;
pub mod fields;
pub mod policy;
pub mod subscription;
pub mod user;
pub mod view;

pub use fields::{
    CURRENT_USER_FIELDS, FieldAccess, FieldDeclaration, FieldErrors, FieldKind,
    FieldSpec, FieldValue, UpdateMode, UserField, UserPatch,
};
pub use policy::{
    FieldPolicy, PRIVILEGED_FIELDS, StaffGatedPolicy, filter_writable_fields,
    is_privileged, normalize_profile_image,
};
pub use subscription::{SubscriptionPlan, UserSubscription};
pub use user::{RequestContext, Requester, User};
pub use view::CurrentUserView;

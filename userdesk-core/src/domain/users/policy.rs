//! Update authorization for the current-user view
//!
//! Fields the requester may not change are dropped from the patch rather than
//! rejected: a non-staff requester who submits `is_staff` gets the rest of
//! the update applied and no error. A blank or null `profile_image` is
//! likewise treated as "leave the image alone" for every requester.

use std::fmt;

use tracing::debug;

use super::fields::{UserField, UserPatch};
use super::user::RequestContext;

/// Fields only a staff requester may write.
pub const PRIVILEGED_FIELDS: [UserField; 2] =
    [UserField::IsStaff, UserField::IsActive];

/// A request is privileged only when a context is present and its user is
/// staff.
pub fn is_privileged(ctx: Option<&RequestContext>) -> bool {
    ctx.is_some_and(|ctx| ctx.user.is_staff)
}

/// Drop a blank or null `profile_image` from the patch.
pub fn normalize_profile_image(patch: &mut UserPatch) {
    if patch
        .get(UserField::ProfileImage)
        .is_some_and(|value| value.is_blank())
    {
        patch.remove(UserField::ProfileImage);
    }
}

/// Reduce `patch` to the fields a requester with the given privilege may write.
pub fn filter_writable_fields(
    mut patch: UserPatch,
    is_privileged: bool,
) -> UserPatch {
    normalize_profile_image(&mut patch);

    if !is_privileged {
        let dropped: Vec<&'static str> = PRIVILEGED_FIELDS
            .iter()
            .filter(|field| patch.remove(**field).is_some())
            .map(|field| field.name())
            .collect();
        if !dropped.is_empty() {
            debug!(
                ?dropped,
                "dropped privileged fields from unprivileged update"
            );
        }
    }

    patch
}

/// Decides which proposed fields survive into the base update.
pub trait FieldPolicy: Send + Sync + fmt::Debug {
    /// Reduce `patch` to what the requester in `ctx` may write.
    fn writable_fields(
        &self,
        patch: UserPatch,
        ctx: Option<&RequestContext>,
    ) -> UserPatch;
}

/// Staff may write everything the declaration allows; everyone else loses the
/// privileged flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffGatedPolicy;

impl FieldPolicy for StaffGatedPolicy {
    fn writable_fields(
        &self,
        patch: UserPatch,
        ctx: Option<&RequestContext>,
    ) -> UserPatch {
        filter_writable_fields(patch, is_privileged(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::fields::FieldValue;
    use crate::domain::users::user::Requester;
    use uuid::Uuid;

    fn patch(entries: &[(UserField, FieldValue)]) -> UserPatch {
        entries.iter().cloned().collect()
    }

    fn ctx(is_staff: bool) -> RequestContext {
        RequestContext {
            user: Requester {
                id: Uuid::new_v4(),
                is_staff,
            },
        }
    }

    #[test]
    fn privilege_requires_staff_context() {
        assert!(is_privileged(Some(&ctx(true))));
        assert!(!is_privileged(Some(&ctx(false))));
        assert!(!is_privileged(None));
    }

    #[test]
    fn unprivileged_loses_flags_keeps_profile() {
        let filtered = filter_writable_fields(
            patch(&[
                (UserField::IsStaff, FieldValue::Flag(true)),
                (UserField::IsActive, FieldValue::Flag(false)),
                (UserField::FirstName, FieldValue::text("Ann")),
            ]),
            false,
        );

        assert_eq!(
            filtered,
            patch(&[(UserField::FirstName, FieldValue::text("Ann"))])
        );
    }

    #[test]
    fn privileged_keeps_flags() {
        let input = patch(&[
            (UserField::IsStaff, FieldValue::Flag(true)),
            (UserField::IsActive, FieldValue::Flag(false)),
        ]);

        assert_eq!(filter_writable_fields(input.clone(), true), input);
    }

    #[test]
    fn blank_image_is_dropped_for_everyone() {
        for privileged in [true, false] {
            for blank in [FieldValue::Null, FieldValue::text("")] {
                let filtered = filter_writable_fields(
                    patch(&[
                        (UserField::ProfileImage, blank.clone()),
                        (UserField::Address, FieldValue::text("1 Main St")),
                    ]),
                    privileged,
                );
                assert!(!filtered.contains(UserField::ProfileImage));
                assert!(filtered.contains(UserField::Address));
            }
        }
    }

    #[test]
    fn non_blank_image_survives_for_everyone() {
        for privileged in [true, false] {
            let filtered = filter_writable_fields(
                patch(&[(
                    UserField::ProfileImage,
                    FieldValue::text("avatars/a.png"),
                )]),
                privileged,
            );
            assert_eq!(
                filtered.get(UserField::ProfileImage),
                Some(&FieldValue::text("avatars/a.png"))
            );
        }
    }

    #[test]
    fn staff_gated_policy_reads_context() {
        let input = patch(&[(UserField::IsActive, FieldValue::Flag(false))]);
        let policy = StaffGatedPolicy;

        let staff = ctx(true);
        let member = ctx(false);

        assert!(policy.writable_fields(input.clone(), None).is_empty());
        assert!(
            policy
                .writable_fields(input.clone(), Some(&member))
                .is_empty()
        );
        assert_eq!(policy.writable_fields(input.clone(), Some(&staff)), input);
    }
}

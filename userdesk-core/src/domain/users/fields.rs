//! Field-visibility declaration for the current-user view
//!
//! The declaration is the allow-list of fields the current-user endpoint reads
//! and writes. Input validation consults it to turn a raw JSON object into a
//! [`UserPatch`]: undeclared, read-only and computed keys are dropped, value
//! types and lengths are checked, and `null` is only accepted where the field
//! is nullable.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde_json::{Map, Value};

/// Every field the current-user view knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    /// Read-only identifier
    Id,
    /// Read-only login email
    Email,
    /// Write-only; hashed before storage
    Password,
    /// Given name
    FirstName,
    /// Family name
    LastName,
    /// Postal address
    Address,
    /// Contact number
    PhoneNumber,
    /// Image URL or storage path; blank input means no change
    ProfileImage,
    /// Computed subscription summary
    UserSubscription,
    /// Privileged: staff flag
    IsStaff,
    /// Privileged: whether the account may sign in
    IsActive,
}

impl UserField {
    /// Wire name of the field.
    pub const fn name(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::Address => "address",
            UserField::PhoneNumber => "phone_number",
            UserField::ProfileImage => "profile_image",
            UserField::UserSubscription => "usersubscription",
            UserField::IsStaff => "is_staff",
            UserField::IsActive => "is_active",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a declared field may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// Present in output and accepted on input
    ReadWrite,
    /// Present in output, ignored on input
    ReadOnly,
    /// Accepted on input, never present in output
    WriteOnly,
}

/// Shape of the value a field accepts on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Server-assigned, never accepted on input
    Identifier,
    /// String with a length range in characters
    Text { min_len: usize, max_len: usize },
    /// Boolean
    Flag,
    /// Computed on read, never written
    Computed,
}

/// One entry of a field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Which field this entry describes
    pub field: UserField,
    /// Input/output direction
    pub access: FieldAccess,
    /// Accepted input shape
    pub kind: FieldKind,
    /// `null` is an accepted input value
    pub nullable: bool,
    /// Must be present on a full replacement
    pub required_on_replace: bool,
}

impl FieldSpec {
    const fn new(
        field: UserField,
        access: FieldAccess,
        kind: FieldKind,
    ) -> Self {
        Self {
            field,
            access,
            kind,
            nullable: false,
            required_on_replace: false,
        }
    }

    const fn read_write(field: UserField, kind: FieldKind) -> Self {
        Self::new(field, FieldAccess::ReadWrite, kind)
    }

    const fn read_only(field: UserField, kind: FieldKind) -> Self {
        Self::new(field, FieldAccess::ReadOnly, kind)
    }

    const fn write_only(field: UserField, kind: FieldKind) -> Self {
        Self::new(field, FieldAccess::WriteOnly, kind)
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn required(mut self) -> Self {
        self.required_on_replace = true;
        self
    }

    /// Present in serialized output.
    pub fn is_readable(&self) -> bool {
        !matches!(self.access, FieldAccess::WriteOnly)
    }

    /// Accepted on input.
    pub fn is_writable(&self) -> bool {
        !matches!(self.access, FieldAccess::ReadOnly)
            && !matches!(self.kind, FieldKind::Computed)
    }
}

const fn text(min_len: usize, max_len: usize) -> FieldKind {
    FieldKind::Text { min_len, max_len }
}

/// The current-user field set, in output order.
pub const CURRENT_USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::read_only(UserField::Id, FieldKind::Identifier),
    FieldSpec::read_only(UserField::Email, FieldKind::Identifier),
    FieldSpec::write_only(UserField::Password, text(1, 128)),
    FieldSpec::read_write(UserField::FirstName, text(0, 150)).required(),
    FieldSpec::read_write(UserField::LastName, text(0, 150)).required(),
    FieldSpec::read_write(UserField::Address, text(0, 255)),
    FieldSpec::read_write(UserField::PhoneNumber, text(0, 20)),
    FieldSpec::read_write(UserField::ProfileImage, text(0, 500)).nullable(),
    FieldSpec::read_only(UserField::UserSubscription, FieldKind::Computed),
    FieldSpec::read_write(UserField::IsStaff, FieldKind::Flag),
    FieldSpec::read_write(UserField::IsActive, FieldKind::Flag),
];

/// Whether an update replaces the resource or patches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// `PUT`: required fields must be present
    Replace,
    /// `PATCH`: every field optional
    #[default]
    Partial,
}

/// A proposed value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A string value
    Text(String),
    /// A boolean value
    Flag(bool),
    /// Explicit `null`
    Null,
}

impl FieldValue {
    /// Shorthand for [`FieldValue::Text`].
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// `null` or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(v) => v.is_empty(),
            FieldValue::Flag(_) => false,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Flag(_) => "flag",
            FieldValue::Null => "null",
        }
    }
}

/// Validated mapping of field to proposed value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    values: BTreeMap<UserField, FieldValue>,
}

impl UserPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field`, returning the value it replaced.
    pub fn insert(
        &mut self,
        field: UserField,
        value: FieldValue,
    ) -> Option<FieldValue> {
        self.values.insert(field, value)
    }

    /// Proposed value for `field`.
    pub fn get(&self, field: UserField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Drop `field` from the patch.
    pub fn remove(&mut self, field: UserField) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    /// Whether `field` is proposed.
    pub fn contains(&self, field: UserField) -> bool {
        self.values.contains_key(&field)
    }

    /// Number of proposed fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No field is proposed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Proposed fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = UserField> + '_ {
        self.values.keys().copied()
    }
}

impl FromIterator<(UserField, FieldValue)> for UserPatch {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (UserField, FieldValue)>,
    {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for UserPatch {
    type Item = (UserField, FieldValue);
    type IntoIter = btree_map::IntoIter<UserField, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Per-field validation failures, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    /// Record a failure for `field`.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push((field.into(), message.into()));
    }

    /// No failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.iter().find(|(f, _)| *f == field).map(|(_, m)| m)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Declared field set of a view plus the validation driven by it.
#[derive(Debug, Clone, Copy)]
pub struct FieldDeclaration {
    specs: &'static [FieldSpec],
}

impl Default for FieldDeclaration {
    fn default() -> Self {
        Self::current_user()
    }
}

impl FieldDeclaration {
    /// Declaration of the current-user view.
    pub const fn current_user() -> Self {
        Self {
            specs: CURRENT_USER_FIELDS,
        }
    }

    fn spec_by_name(&self, name: &str) -> Option<&'static FieldSpec> {
        self.specs.iter().find(|spec| spec.field.name() == name)
    }

    /// Names present in output, in declaration order.
    pub fn output_fields(&self) -> Vec<&'static str> {
        self.specs
            .iter()
            .filter(|spec| spec.is_readable())
            .map(|spec| spec.field.name())
            .collect()
    }

    /// Validate a raw input object into a patch.
    ///
    /// Keys the declaration does not accept on input are dropped without
    /// error. All failures are collected before returning.
    pub fn validate(
        &self,
        input: &Map<String, Value>,
        mode: UpdateMode,
    ) -> Result<UserPatch, FieldErrors> {
        let mut patch = UserPatch::new();
        let mut errors = FieldErrors::default();

        for (name, raw) in input {
            let Some(spec) = self.spec_by_name(name) else {
                continue;
            };
            if !spec.is_writable() {
                continue;
            }

            match Self::coerce(spec, raw) {
                Ok(value) => {
                    patch.insert(spec.field, value);
                }
                Err(message) => errors.push(name.clone(), message),
            }
        }

        if mode == UpdateMode::Replace {
            let required =
                self.specs.iter().filter(|spec| spec.required_on_replace);
            for spec in required {
                if !input.contains_key(spec.field.name()) {
                    errors.push(spec.field.name(), "This field is required.");
                }
            }
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }

    fn coerce(spec: &FieldSpec, raw: &Value) -> Result<FieldValue, String> {
        if raw.is_null() {
            return if spec.nullable {
                Ok(FieldValue::Null)
            } else {
                Err("This field may not be null.".to_string())
            };
        }

        match spec.kind {
            FieldKind::Text { min_len, max_len } => {
                let Value::String(s) = raw else {
                    return Err("Not a valid string.".to_string());
                };
                let len = s.chars().count();
                // Blank values of nullable fields pass through so the update
                // rule can treat them as "no change".
                if len < min_len && !(spec.nullable && s.is_empty()) {
                    return Err(if min_len == 1 {
                        "This field may not be blank.".to_string()
                    } else {
                        format!(
                            "Ensure this field has at least {min_len} \
                             characters."
                        )
                    });
                }
                if len > max_len {
                    return Err(format!(
                        "Ensure this field has no more than {max_len} \
                         characters."
                    ));
                }
                Ok(FieldValue::Text(s.clone()))
            }
            FieldKind::Flag => parse_flag(raw)
                .map(FieldValue::Flag)
                .ok_or_else(|| "Must be a valid boolean.".to_string()),
            FieldKind::Identifier | FieldKind::Computed => {
                Err("This field is read-only.".to_string())
            }
        }
    }
}

/// Booleans arrive as JSON `true`/`false` or, from form posts, as text.
fn parse_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

//! # Userdesk Core
//!
//! Core library for the Userdesk service: the user record, the declaration of
//! which fields the current-user endpoint exposes and accepts, the policy that
//! decides which of those fields a requester may actually change, and the
//! persistence ports behind it.
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapters and embedded migrations
//!
//! ## Architecture
//!
//! - [`domain`]: User record, field declaration, update policy, password
//!   hashing
//! - [`user_management`]: Application services that apply patches to records
//! - [`database`]: Repository ports with in-memory and PostgreSQL adapters
//! - [`api`]: Route constants shared with the HTTP layer
//!
//! ## Examples
//!
//! ```
//! use userdesk_core::domain::users::{
//!     FieldValue, UserField, UserPatch, filter_writable_fields,
//! };
//!
//! let mut patch = UserPatch::new();
//! patch.insert(UserField::IsStaff, FieldValue::Flag(true));
//! patch.insert(UserField::FirstName, FieldValue::text("Ann"));
//!
//! let kept = filter_writable_fields(patch, false);
//! assert!(!kept.contains(UserField::IsStaff));
//! assert!(kept.contains(UserField::FirstName));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Route constants shared across Userdesk services
pub mod api;

/// Repository ports and adapters
pub mod database;

/// Embedded schema migrations for the PostgreSQL adapters
#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Domain types and rules
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Application services for user records
pub mod user_management;

pub use error::{CoreError, Result};

//! Credential handling for user accounts.

pub mod crypto;

pub use crypto::{PasswordCrypto, PasswordCryptoError};

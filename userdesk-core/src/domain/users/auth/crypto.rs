//! Password hashing with Argon2id and a server-side pepper.

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id password hashing with a server-side pepper.
///
/// Every stored credential goes through this helper so parameter choices
/// stay consistent between account creation and profile updates.
#[derive(Debug)]
pub struct PasswordCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
}

/// Failures building the hasher or hashing a password.
#[derive(Debug, Error)]
pub enum PasswordCryptoError {
    /// The configured pepper is empty
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    /// Argon2 rejected the cost parameters
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    /// Hashing or parsing a stored hash failed
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<PasswordHashError> for PasswordCryptoError {
    fn from(err: PasswordHashError) -> Self {
        PasswordCryptoError::PasswordHash(err.to_string())
    }
}

impl PasswordCrypto {
    const DEFAULT_MEMORY_KIB: u32 = 64 * 1024; // 64 MiB
    const DEFAULT_ITERATIONS: u32 = 3;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    /// Build a helper with default Argon2id parameters.
    pub fn new(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, PasswordCryptoError> {
        Self::with_params(
            password_pepper,
            ParamsBuilder::new()
                .m_cost(Self::DEFAULT_MEMORY_KIB)
                .t_cost(Self::DEFAULT_ITERATIONS)
                .p_cost(Self::DEFAULT_PARALLELISM)
                .output_len(32)
                .build()
                .map_err(|err| {
                    PasswordCryptoError::InvalidArgon2Params(err.to_string())
                })?,
        )
    }

    /// Build a helper with caller-specified Argon2 parameters (useful for
    /// tests or constrained environments).
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, PasswordCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(PasswordCryptoError::EmptyPasswordPepper);
        }

        let argon2 =
            Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            argon2,
            password_pepper: Zeroizing::new(pepper.to_vec()),
        })
    }

    /// Cheap parameters for test suites; never use for stored credentials.
    pub fn for_tests(
        password_pepper: impl AsRef<[u8]>,
    ) -> Result<Self, PasswordCryptoError> {
        let params = Params::new(8, 1, 1, Some(32))
            .map_err(|err| {
                PasswordCryptoError::InvalidArgon2Params(err.to_string())
            })?;
        Self::with_params(password_pepper, params)
    }

    /// Hash a password with a random salt and the shared pepper. The result
    /// is a PHC string suitable for storage.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, PasswordCryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| PasswordCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;
        let hash = self.argon2.hash_password(&material, &salt)?.to_string();
        Ok(hash)
    }

    /// Verify a password against a stored hash, applying the shared pepper.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_passwords_and_verifies() {
        let crypto = PasswordCrypto::for_tests("pepper").unwrap();
        let hash = crypto.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(crypto.verify_password("correct horse", &hash).unwrap());
        assert!(!crypto.verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn pepper_is_part_of_the_hash() {
        let crypto = PasswordCrypto::for_tests("pepper").unwrap();
        let other = PasswordCrypto::for_tests("other-pepper").unwrap();
        let hash = crypto.hash_password("correct horse").unwrap();
        assert!(!other.verify_password("correct horse", &hash).unwrap());
    }

    #[test]
    fn rejects_empty_pepper() {
        assert!(matches!(
            PasswordCrypto::new(""),
            Err(PasswordCryptoError::EmptyPasswordPepper)
        ));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let crypto = PasswordCrypto::for_tests("pepper").unwrap();
        assert!(crypto.verify_password("x", "not-a-phc-string").is_err());
    }
}

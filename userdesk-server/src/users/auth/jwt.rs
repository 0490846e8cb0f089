use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret must not be empty")]
    EmptySecret,
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// HS256 signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        let now = Utc::now().timestamp();
        let ttl_secs = self.ttl.as_secs();
        let claims = Claims {
            sub: user_id,
            exp: now
                .saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            token_type: "Bearer",
            expires_in: ttl_secs,
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(
            b"test-secret-test-secret-test-secret",
            Duration::from_secs(900),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_validates() {
        let user_id = Uuid::new_v4();
        let issued = keys().issue(user_id).unwrap();
        assert_eq!(issued.expires_in, 900);
        assert_eq!(issued.token_type, "Bearer");

        let claims = keys().validate(&issued.access_token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: now - 1_000,
            iat: now - 2_000,
            jti: Uuid::new_v4().to_string(),
        };
        let token = keys().sign(&claims).unwrap();
        assert!(keys().validate(&token).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other =
            JwtKeys::new(b"another-secret", Duration::from_secs(900)).unwrap();
        let token = other.issue(Uuid::new_v4()).unwrap().access_token;
        assert!(keys().validate(&token).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            JwtKeys::new(b"", Duration::from_secs(1)),
            Err(JwtError::EmptySecret)
        ));
    }
}

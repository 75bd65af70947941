//! JWT Token Handler
//! Mission: Issue and verify HS256 tokens carrying a subject and a role

use crate::auth::models::Claims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// HS256 needs at least 256 bits of key material.
pub const MIN_KEY_BYTES: usize = 32;

/// Why a token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token subject must not be empty")]
    EmptySubject,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::SignatureInvalid
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Rejected handler configuration.
#[derive(Debug, Error)]
pub enum JwtConfigError {
    #[error("signing key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },
    #[error("token validity must be at least one second")]
    ValidityTooShort,
}

/// Symmetric signing key, built once at startup.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn from_secret(secret: &[u8]) -> Result<Self, JwtConfigError> {
        if secret.len() < MIN_KEY_BYTES {
            return Err(JwtConfigError::KeyTooShort {
                min: MIN_KEY_BYTES,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Seconds until expiration, as seen at issue time.
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

/// JWT Handler for token operations
///
/// Holds the process signing key and the validity window. Shared behind an
/// `Arc` by the login endpoint and the authentication middleware; nothing in
/// it is mutated after construction.
pub struct JwtHandler {
    key: SigningKey,
    validity: Duration,
    validation: Validation,
}

impl JwtHandler {
    pub fn new(key: SigningKey, validity: Duration) -> Result<Self, JwtConfigError> {
        if validity.num_seconds() < 1 {
            return Err(JwtConfigError::ValidityTooShort);
        }

        // Expiry is checked against the caller's clock in `decode_at`, with
        // no leeway, so the library check is switched off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            key,
            validity,
            validation,
        })
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a token for `subject` with `role` passed through verbatim.
    pub fn issue(&self, subject: &str, role: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat,
            exp: iat + self.validity.num_seconds(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        debug!(
            "Issued JWT for {} ({}), expires in {}s",
            subject,
            role,
            self.validity.num_seconds()
        );

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.key.decoding, &self.validation)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Binary gate over `decode`. The failure kind only reaches the logs.
    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Utc::now())
    }

    pub fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.decode_at(token, now) {
            Ok(_) => true,
            Err(kind) => {
                debug!(reason = %kind, "Rejected JWT");
                false
            }
        }
    }
}

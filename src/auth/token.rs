use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::models::Identity;

/// Access tokens live for one hour.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 1;
/// Refresh tokens live for one day.
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    /// Display name of the subject at issue time.
    pub name: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub,
            name: self.name.clone(),
        }
    }
}

/// An access/refresh token pair with their expiry instants.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_expired_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expired_at: DateTime<Utc>,
}

/// Token class. Each class is signed with its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token expired")]
    Expired,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// HS256 secrets for both token classes.
#[derive(Clone)]
pub struct SigningKeys {
    access: Vec<u8>,
    refresh: Vec<u8>,
}

impl SigningKeys {
    pub fn new(access: impl Into<Vec<u8>>, refresh: impl Into<Vec<u8>>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.access_secret.as_bytes(),
            config.refresh_secret.as_bytes(),
        )
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

/// Issues and verifies signed tokens.
///
/// Holds no per-request state; the clock is injected so expiry can be tested
/// deterministically.
#[derive(Clone)]
pub struct TokenService {
    keys: SigningKeys,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(keys: SigningKeys) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock))
    }

    pub fn with_clock(keys: SigningKeys, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }

    /// Issues a one-hour access token and a one-day refresh token for `subject`.
    pub fn issue_token_pair(&self, subject: &Identity) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let access_exp = now + Duration::hours(ACCESS_TOKEN_TTL_HOURS);
        let refresh_exp = now + Duration::hours(REFRESH_TOKEN_TTL_HOURS);

        Ok(TokenPair {
            access_token: self.sign(subject, access_exp, TokenKind::Access)?,
            access_token_expired_at: access_exp,
            refresh_token: self.sign(subject, refresh_exp, TokenKind::Refresh)?,
            refresh_token_expired_at: refresh_exp,
        })
    }

    fn sign(
        &self,
        subject: &Identity,
        expires_at: DateTime<Utc>,
        kind: TokenKind,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.id,
            name: subject.name.clone(),
            exp: expires_at.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.keys.secret(kind)),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies `token` against the key for `kind` and returns its claims.
    ///
    /// Structure is checked first, then expiry, then the signature: an
    /// expired token is reported as `Expired` whichever key signed it.
    pub fn verify_token(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let mut peek = Validation::new(Algorithm::HS256);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        let unverified = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &peek)
            .map_err(|e| {
                debug!("rejecting unparseable {:?} token: {}", kind, e);
                TokenError::Malformed
            })?;

        if unverified.claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.keys.secret(kind)),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            _ => TokenError::Malformed,
        })
    }

    /// Exchanges a valid refresh token for a fresh token pair.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify_token(refresh_token, TokenKind::Refresh)?;
        self.issue_token_pair(&claims.identity())
    }
}

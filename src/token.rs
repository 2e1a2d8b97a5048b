//! Token Service
//!
//! Issues and verifies the two classes of signed, time-limited credentials:
//! short-lived access tokens and longer-lived refresh tokens. Both are HS256
//! JWTs carrying the user id; validity is determined purely by signature and
//! expiry, never by a server-side lookup.
//!
//! Two independent secrets sign the two classes, and each token also carries
//! a `token_type` claim that is checked on verification. Either measure alone
//! prevents replaying an access token as a refresh token (and vice versa);
//! together they also survive an operator configuring both secrets to the
//! same value.
//!
//! There is no revocation list: a leaked token stays valid until its expiry
//! elapses. That is a deliberate tradeoff for lookup-free session validation.
//! If revocation is ever needed, add a denylist or shorten TTLs and rotate;
//! the token format itself does not need to change.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which class of token a claim set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: Uuid,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Token class, checked against the expected class on verify.
    pub token_type: TokenType,
}

/// Token verification/issuance failure.
///
/// All verification failures (bad signature, wrong algorithm, wrong class,
/// expired, garbage input) collapse into [`TokenError::Invalid`] so the error
/// surface does not tell an attacker which check tripped.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies access/refresh token pairs.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Build a token service from the two signing secrets and their TTLs.
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a short-lived access token for `user_id`.
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenType::Access)
    }

    /// Issue a longer-lived refresh token for `user_id`.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenType::Refresh)
    }

    /// Validate an access token's signature, expiry, and class.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenType::Access)
    }

    /// Validate a refresh token's signature, expiry, and class.
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenType::Refresh)
    }

    fn keys(&self, token_type: TokenType) -> &KeyPair {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl(token_type).as_secs() as i64,
            token_type,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.keys(token_type).encoding)
            .map_err(TokenError::Encode)
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        // HS256 only; a token that names any other algorithm is rejected
        // outright, which closes the alg-confusion class of forgeries.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.keys(expected).decoding, &validation)
                .map_err(|_| TokenError::Invalid)?;

        if data.claims.token_type != expected {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }
}

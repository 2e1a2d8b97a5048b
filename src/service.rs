//! Account Service
//!
//! The business logic behind every auth endpoint: registration, login,
//! token refresh, and the two-step password reset. Handlers stay thin and
//! delegate here; this layer owns the security-sensitive decisions.
//!
//! Two deliberate asymmetries in the error surface:
//!
//! - Login returns the same [`AuthError::InvalidCredentials`] whether the
//!   email is unknown or the password is wrong, and the password is still
//!   verified against a dummy digest when the account does not exist, so
//!   neither the response nor its timing reveals which accounts are real.
//! - Refresh collapses every failure into
//!   [`AuthError::InvalidRefreshToken`].
//!
//! bcrypt work runs under `spawn_blocking` so a burst of logins cannot
//! stall the async runtime.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::crypto::constant_time_str_eq;
use crate::directory::{DirectoryError, NewUser, PublicUser, UserDirectory, UserRecord};
use crate::events::SecurityEvent;
use crate::hasher::{HashError, PasswordHasher};
use crate::password::PasswordPolicy;
use crate::reset::{self, ResetToken};
use crate::security_event;
use crate::token::{TokenError, TokenService};

/// Failures surfaced by account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid or expired reset token")]
    InvalidResetToken,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),
    #[error("{0}")]
    Internal(String),
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

/// Outcome of a reset request. The token is only surfaced to the client in
/// non-production environments; delivery is otherwise out of band.
#[derive(Debug, Clone)]
pub struct ResetRequested {
    pub reset_token: String,
}

/// Registration input, already validated at the handler edge.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Orchestrates directory, hashing, and token issuance.
pub struct AccountService {
    directory: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    policy: PasswordPolicy,
    reset_ttl: Duration,
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            directory,
            hasher,
            tokens,
            policy: PasswordPolicy::default(),
            reset_ttl,
        }
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        self.policy
    }

    /// Create an account and sign the new user in.
    pub async fn register(&self, input: Registration) -> Result<AuthenticatedUser, AuthError> {
        if self.directory.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash_password(input.password).await?;

        let user = self
            .directory
            .create(NewUser {
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await
            .map_err(|e| match e {
                // The pre-check races with concurrent registration; the
                // unique index is the authority.
                DirectoryError::DuplicateEmail => AuthError::EmailTaken,
                other => AuthError::Directory(other),
            })?;

        security_event!(
            SecurityEvent::UserRegistered,
            user_id = %user.id,
            email = %user.email,
            "New user registered"
        );

        self.issue_pair(&user)
    }

    /// Verify credentials and sign the user in.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let user = self.directory.find_by_email(email).await?;

        let verified = match &user {
            Some(user) => {
                self.verify_password(password.to_string(), user.password_hash.clone())
                    .await?
            }
            None => {
                // Burn a bcrypt verification anyway so unknown emails take
                // as long as wrong passwords.
                self.verify_password(password.to_string(), DUMMY_DIGEST.to_string())
                    .await?;
                false
            }
        };

        let user = match (user, verified) {
            (Some(user), true) => user,
            _ => {
                security_event!(
                    SecurityEvent::AuthenticationFailure,
                    email = %email,
                    "Login failed"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.directory.touch_last_login(user.id).await?;

        security_event!(
            SecurityEvent::AuthenticationSuccess,
            user_id = %user.id,
            "User authenticated"
        );

        self.issue_pair(&user)
    }

    /// Exchange a valid refresh token for a new access/refresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token).map_err(|_| {
            security_event!(
                SecurityEvent::TokenRejected,
                token_class = "refresh",
                "Refresh token rejected"
            );
            AuthError::InvalidRefreshToken
        })?;

        // The subject must still exist; a deleted account's refresh tokens
        // die with it.
        let user = self
            .directory
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        security_event!(
            SecurityEvent::TokenRefreshed,
            user_id = %user.id,
            "Token pair refreshed"
        );

        Ok(TokenPair {
            access_token: self.tokens.issue_access(user.id)?,
            refresh_token: self.tokens.issue_refresh(user.id)?,
        })
    }

    /// Fetch the profile for an authenticated user id.
    pub async fn current_user(&self, user_id: Uuid) -> Result<PublicUser, AuthError> {
        let user = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(PublicUser::from(&user))
    }

    /// Begin a password reset: mint a token and store it with its expiry.
    ///
    /// Returns [`AuthError::UserNotFound`] for unknown emails; the handler
    /// masks that as a generic success so the endpoint cannot be used to
    /// enumerate accounts.
    pub async fn request_password_reset(&self, email: &str) -> Result<ResetRequested, AuthError> {
        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = ResetToken::generate(self.reset_ttl);
        self.directory
            .set_reset_token(user.id, &token.token, token.expires_at)
            .await?;

        security_event!(
            SecurityEvent::PasswordResetRequested,
            user_id = %user.id,
            "Password reset requested"
        );

        Ok(ResetRequested {
            reset_token: token.token,
        })
    }

    /// Complete a password reset with a previously issued token.
    ///
    /// The token is single-use: a successful reset clears it.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let user = self
            .directory
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let stored = user
            .reset_token
            .as_deref()
            .ok_or(AuthError::InvalidResetToken)?;
        if !constant_time_str_eq(stored, token) {
            return Err(AuthError::InvalidResetToken);
        }

        let live = user
            .reset_token_expires_at
            .map(reset::is_live)
            .unwrap_or(false);
        if !live {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = self.hash_password(new_password.to_string()).await?;
        self.directory.update_password(user.id, &password_hash).await?;

        security_event!(
            SecurityEvent::PasswordChanged,
            user_id = %user.id,
            "Password changed via reset"
        );

        Ok(())
    }

    fn issue_pair(&self, user: &UserRecord) -> Result<AuthenticatedUser, AuthError> {
        Ok(AuthenticatedUser {
            user: PublicUser::from(user),
            tokens: TokenPair {
                access_token: self.tokens.issue_access(user.id)?,
                refresh_token: self.tokens.issue_refresh(user.id)?,
            },
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(AuthError::Hash)
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))
    }
}

// A real bcrypt digest of a random string, used to equalize login timing
// for unknown emails. Never matches any user password.
const DUMMY_DIGEST: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_do_not_distinguish() {
        // Unknown email and wrong password must read identically.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::InvalidRefreshToken.to_string(),
            "Invalid refresh token"
        );
    }
}

//! HTTP Handlers
//!
//! Request/response types and the axum handlers for the auth endpoints.
//! Handlers validate input, call into [`AccountService`], and wrap results
//! in the standard success envelope:
//!
//! ```json
//! { "success": true, "data": { ... } }
//! ```
//!
//! All JSON fields are camelCase on the wire.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Environment;
use crate::directory::PublicUser;
use crate::error::AppError;
use crate::service::{AccountService, Registration};
use crate::token::TokenService;
use crate::validation::{validate_email, validate_required};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AccountService>,
    pub tokens: Arc<TokenService>,
    pub environment: Environment,
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequestBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub new_password: String,
}

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestedPayload {
    pub message: String,
    /// Surfaced outside production only; real deployments deliver the
    /// token by email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: String,
}

// ============================================================================
// Authenticated-User Extractor
// ============================================================================

/// Extracts and verifies the bearer access token from `Authorization`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let claims = state
            .tokens
            .verify_access(token)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), AppError> {
    validate_required(&payload.first_name, "firstName")?;
    validate_required(&payload.last_name, "lastName")?;
    validate_email(&payload.email)?;
    state.service.password_policy().validate(&payload.password)?;

    let authed = state
        .service
        .register(Registration {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AuthPayload {
            user: authed.user,
            access_token: authed.tokens.access_token,
            refresh_token: authed.tokens.refresh_token,
        })),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    validate_required(&payload.email, "email")?;
    validate_required(&payload.password, "password")?;

    let authed = state.service.login(&payload.email, &payload.password).await?;

    Ok(Json(ApiResponse::new(AuthPayload {
        user: authed.user,
        access_token: authed.tokens.access_token,
        refresh_token: authed.tokens.refresh_token,
    })))
}

/// POST /auth/refresh-token
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPayload>>, AppError> {
    validate_required(&payload.refresh_token, "refreshToken")?;

    let pair = state.service.refresh(&payload.refresh_token).await?;

    Ok(Json(ApiResponse::new(TokenPayload {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserPayload>>, AppError> {
    let user = state.service.current_user(auth.user_id).await?;
    Ok(Json(ApiResponse::new(UserPayload { user })))
}

/// POST /auth/reset-password-request
///
/// Always answers with the same generic message, whether or not the email
/// is registered.
pub async fn reset_password_request(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequestBody>,
) -> Result<Json<ApiResponse<ResetRequestedPayload>>, AppError> {
    validate_email(&payload.email)?;

    let message =
        "If your email is registered, you will receive a password reset link".to_string();

    let reset_token = match state.service.request_password_reset(&payload.email).await {
        Ok(requested) if !state.environment.is_production() => Some(requested.reset_token),
        Ok(_) => None,
        Err(crate::service::AuthError::UserNotFound) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(ApiResponse::new(ResetRequestedPayload {
        message,
        reset_token,
    })))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessagePayload>>, AppError> {
    validate_required(&payload.reset_token, "resetToken")?;
    state
        .service
        .password_policy()
        .validate(&payload.new_password)?;

    state
        .service
        .reset_password(&payload.reset_token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::new(MessagePayload {
        message: "Password has been reset successfully".to_string(),
    })))
}

//! Router Assembly
//!
//! Wires the auth handlers under the configured API prefix and attaches
//! request tracing. The prefix defaults to `/api`, giving the canonical
//! paths `/api/auth/register`, `/api/auth/login`, and so on.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Build the application router.
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let auth = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh-token", post(handlers::refresh))
        .route("/me", get(handlers::me))
        .route("/reset-password-request", post(handlers::reset_password_request))
        .route("/reset-password", post(handlers::reset_password));

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .nest(&format!("{}/auth", api_prefix), auth)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "portcullis",
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

/// Liveness probe. Database connectivity is verified at startup; this
/// endpoint only reports that the process is serving.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": { "status": "ok" }
    }))
}

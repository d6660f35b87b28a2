use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Extension, Json};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::{error::AppError, AuthSession};
use shared_state::AppState;
use shared_utils::{issue_token, verify_token, SESSION_LIFETIME_DAYS};

use crate::models::{LoginRequest, RegisterRequest, UserView};
use crate::services::account::AccountService;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(state.gateway.clone());
    let user = service.register(request).await?;

    Ok(Json(json!({
        "success": true,
        "user_id": user.id,
        "user": UserView::from(&user),
    })))
}

/// Login is clear-then-set: whatever session the client presented is revoked
/// before the new one is created, so a token can never carry state across
/// accounts.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = request
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email and password are required".to_string()))?;
    let password = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Email and password are required".to_string()))?;

    let service = AccountService::new(state.gateway.clone());
    let user = service.login(email, password).await?;

    if let Some(old) = presented_session(&headers, &state.config.session_secret) {
        debug!(session_id = %old, "revoking session presented with login");
        state.sessions.revoke(old).await;
    }

    let session_id = state.sessions.create(&user.id, user.role()).await;
    let token = issue_token(session_id, &state.config.session_secret)
        .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": UserView::from(&user),
    })))
}

/// Revokes the presented session if there is one. Always succeeds: calling
/// logout twice, or with a stale token, is not an error.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    if let Some(session_id) = presented_session(&headers, &state.config.session_secret) {
        state.sessions.revoke(session_id).await;
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn check_session(
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "success": true,
        "user_id": auth.user_id,
        "user_type": auth.role,
        "authenticated": true,
        "session_expires_in_hours": SESSION_LIFETIME_DAYS * 24,
    })))
}

/// Session id carried in the request's bearer header, if any. Garbage headers
/// and unverifiable tokens come back as `None`; login and logout treat a bad
/// presented token the same as no token.
fn presented_session(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    let bearer: Authorization<Bearer> = headers.typed_get()?;
    verify_token(bearer.token(), secret).ok()
}

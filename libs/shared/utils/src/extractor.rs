use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use shared_models::error::AppError;

use crate::session::SessionStore;
use crate::token::verify_token;

/// Everything the session gate needs; cells derive it from the app state
/// when layering the middleware.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: SessionStore,
    pub session_secret: String,
}

/// Session gate applied to every role-scoped route: resolves the bearer
/// token to an active session, slides its expiry, and stashes the resulting
/// `AuthSession` in request extensions. Missing, malformed, expired and
/// revoked tokens all surface as 401.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer: Authorization<Bearer> = request
        .headers()
        .typed_get()
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or malformed authorization header".to_string())
        })?;

    let session_id = verify_token(bearer.token(), &auth.session_secret)
        .map_err(AppError::Unauthorized)?;

    let session = auth
        .sessions
        .authenticate(session_id)
        .await
        .ok_or_else(|| AppError::Unauthorized("Session expired or revoked".to_string()))?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

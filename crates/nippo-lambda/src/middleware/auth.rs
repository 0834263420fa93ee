use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware for the protected routes.
///
/// Extracts `Authorization: Bearer <token>` and compares it against the
/// token configured at startup. No per-user identity: every caller of the
/// pipeline API is the application backend itself.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    if token.is_empty() || token != state.api_token {
        return Err(ApiError::Unauthenticated);
    }

    Ok(next.run(req).await)
}

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Resolve the `Authorization: Bearer <session token>` header to a
/// `Session` via the identity provider and attach it to the request.
/// Missing or invalid tokens end the request with a 401 envelope.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let session = state
        .identity
        .session_user(token)
        .await
        .map_err(|e| {
            debug!(error = %e, "session resolution failed");
            ApiError::Unauthenticated
        })?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

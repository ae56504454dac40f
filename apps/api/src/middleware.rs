use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use cultiva_core::{AppError, AuthClaims};

use crate::error::ApiResult;
use crate::state::AppState;

/// Verifies the bearer token and attaches the claims to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing auth token".to_owned()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("missing auth token".to_owned()))?;

    let claims = state.token_issuer.verify(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Rejects authenticated callers without the admin role. Must run after
/// [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> ApiResult<Response> {
    let claims = request
        .extensions()
        .get::<AuthClaims>()
        .ok_or_else(|| AppError::Unauthorized("not authenticated".to_owned()))?;

    if !claims.is_admin() {
        return Err(AppError::Forbidden("admin access required".to_owned()).into());
    }

    Ok(next.run(request).await)
}

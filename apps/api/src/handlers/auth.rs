use axum::Json;
use axum::extract::State;

use crate::dto::{LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let success = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_owned(),
        token: success.token,
        user: success.user.into(),
    }))
}

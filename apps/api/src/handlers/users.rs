use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use cultiva_application::RegisterParams;

use crate::dto::{CreateUserRequest, CreateUserResponse, ListUsersResponse, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/users/create - Register an account.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let role = payload.role()?;

    let profile = state
        .user_service
        .register(RegisterParams {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully".to_owned(),
            user: profile.into(),
        }),
    ))
}

/// GET /api/users/list - All accounts, without credentials.
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ListUsersResponse>> {
    let users: Vec<UserResponse> = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(ListUsersResponse {
        count: users.len(),
        users,
    }))
}

// handlers/protected/auth/me.rs - GET /divisional/me/ and /sub-divisional/me/

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::handlers::protected::PERMISSION_DENIED;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub async fn divisional_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    current_user(&state, &user, Role::Divisional).await
}

pub async fn sub_divisional_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    current_user(&state, &user, Role::SubDivisional).await
}

async fn current_user(state: &AppState, user: &AuthUser, role: Role) -> ApiResult<User> {
    user.require_role(role, PERMISSION_DENIED)?;
    let record = state
        .store
        .find_user(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;
    Ok(ApiResponse::success(record))
}

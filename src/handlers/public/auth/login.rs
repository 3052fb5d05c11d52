// handlers/public/auth/login.rs - POST /login/ handler

use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::open_session;
use crate::app::AppState;
use crate::auth::verify_password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::validation::FieldErrors;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub is_divisional: bool,
    pub is_sub_divisional: bool,
}

/// Exchange username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let mut errors = FieldErrors::new();
    let username = errors.required("username", &req.username).map(str::to_string);
    errors.present("password", &req.password);
    errors.into_result()?;

    let (Some(username), Some(password)) = (username, req.password) else {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    let Some(user) = state.store.find_user_by_username(&username).await? else {
        tracing::warn!(user = %username, "Login failed: unknown user");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::warn!(user = %username, "Login failed: wrong password");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let token = open_session(&state, &user).await?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        user_id: user.id,
        is_divisional: user.is_divisional(),
        is_sub_divisional: user.is_sub_divisional(),
    }))
}

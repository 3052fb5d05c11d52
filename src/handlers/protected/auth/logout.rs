// handlers/protected/auth/logout.rs - POST /logout/ handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Revoke the session behind the presented token
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<()> {
    state.store.revoke_session(user.session_id).await?;
    tracing::info!(user = %user.username, session = %user.session_id, "Session closed");
    Ok(ApiResponse::success(()).message("Logged out successfully."))
}

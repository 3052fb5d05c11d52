use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::validate_jwt;
use crate::database::models::Role;
use crate::error::ApiError;

/// Authenticated user context, resolved from the bearer token and its session
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Option<Role>,
    pub session_id: Uuid,
}

impl AuthUser {
    pub fn is_divisional(&self) -> bool {
        self.role == Some(Role::Divisional)
    }

    pub fn is_sub_divisional(&self) -> bool {
        self.role == Some(Role::SubDivisional)
    }

    /// 403 with `message` unless the user holds `role`
    pub fn require_role(&self, role: Role, message: &str) -> Result<(), ApiError> {
        if self.role == Some(role) {
            Ok(())
        } else {
            tracing::warn!(user = %self.username, required = %role, "Role check failed");
            Err(ApiError::forbidden(message))
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(&state.config.security, &token)?;

    // Logged-out tokens stay cryptographically valid; the session decides
    if !state.store.session_active(claims.jti, Utc::now()).await? {
        return Err(ApiError::unauthorized("Session has ended"));
    }

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
        session_id: claims.jti,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

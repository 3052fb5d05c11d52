// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Every token issued here is bound to
// a session row so that logout can revoke it.

pub mod login;
pub mod signup;

pub use login::login;
pub use signup::{signup_divisional, signup_sub_divisional};

use crate::app::AppState;
use crate::auth::issue_token;
use crate::database::models::User;
use crate::error::ApiError;

/// Persist a fresh session for `user` and return its signed token
pub(crate) async fn open_session(state: &AppState, user: &User) -> Result<String, ApiError> {
    let (session, token) = issue_token(&state.config.security, user)?;
    state.store.create_session(&session).await?;
    tracing::info!(user = %user.username, session = %session.id, "Session opened");
    Ok(token)
}

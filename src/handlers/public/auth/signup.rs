// handlers/public/auth/signup.rs - POST /signup/divisional/ and /signup/sub-divisional/

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::open_session;
use crate::app::AppState;
use crate::auth::hash_password;
use crate::database::models::{NewUser, OfficeAssignment, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::validation::FieldErrors;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub pincode: Option<String>,
    /// Sub-divisional signups only
    pub division_pincode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: User,
    pub token: String,
}

struct Credentials {
    username: String,
    email: String,
    password: String,
}

/**
 * POST /signup/divisional/ - Register a divisional officer
 *
 * Expected Input:
 * ```json
 * { "username": "div", "email": "div@example.com", "password": "...", "pincode": "110000" }
 * ```
 *
 * `pincode` must name an existing post office; it becomes the division the
 * officer administers.
 */
pub async fn signup_divisional(
    State(state): State<AppState>,
    Payload(req): Payload<SignupRequest>,
) -> ApiResult<SignupResponse> {
    let mut errors = FieldErrors::new();
    let credentials = credentials(&mut errors, &req);
    let pincode = errors.required("pincode", &req.pincode).map(str::to_string);
    errors.into_result()?;

    let (Some(credentials), Some(pincode)) = (credentials, pincode) else {
        return Err(ApiError::validation_error("Invalid input.", None));
    };

    if state.store.get_post_office(&pincode).await?.is_none() {
        return Err(ApiError::field_error("pincode", "Post office with this pincode does not exist."));
    }

    create_account(&state, credentials, OfficeAssignment::Divisional { pincode }).await
}

/**
 * POST /signup/sub-divisional/ - Register a sub-divisional officer
 *
 * Expected Input:
 * ```json
 * { "username": "sub", "email": "", "password": "...", "pincode": "110001", "division_pincode": "110000" }
 * ```
 *
 * The post office `pincode` must belong to `division_pincode`.
 */
pub async fn signup_sub_divisional(
    State(state): State<AppState>,
    Payload(req): Payload<SignupRequest>,
) -> ApiResult<SignupResponse> {
    let mut errors = FieldErrors::new();
    let credentials = credentials(&mut errors, &req);
    let pincode = errors.required("pincode", &req.pincode).map(str::to_string);
    let division_pincode = errors
        .required("division_pincode", &req.division_pincode)
        .map(str::to_string);
    errors.into_result()?;

    let (Some(credentials), Some(pincode), Some(division_pincode)) =
        (credentials, pincode, division_pincode)
    else {
        return Err(ApiError::validation_error("Invalid input.", None));
    };

    let office = state
        .store
        .get_post_office(&pincode)
        .await?
        .ok_or_else(|| ApiError::field_error("pincode", "Post office with this pincode does not exist."))?;

    if office.division_pincode.as_deref() != Some(division_pincode.as_str()) {
        return Err(ApiError::field_error(
            "division_pincode",
            format!("Post office {pincode} does not belong to division {division_pincode}."),
        ));
    }

    create_account(
        &state,
        credentials,
        OfficeAssignment::SubDivisional { pincode, division_pincode },
    )
    .await
}

fn credentials(errors: &mut FieldErrors, req: &SignupRequest) -> Option<Credentials> {
    let username = errors.required("username", &req.username);
    errors.max_len("username", username, 150);
    // passwords are kept verbatim; only blank ones are refused
    let password = errors.required("password", &req.password).and(req.password.clone());
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    errors.max_len("email", Some(email), 254);
    if !email.is_empty() && !email.contains('@') {
        errors.add("email", "Enter a valid email address.");
    }

    Some(Credentials {
        username: username?.to_string(),
        email: email.to_string(),
        password: password?,
    })
}

async fn create_account(
    state: &AppState,
    credentials: Credentials,
    office: OfficeAssignment,
) -> ApiResult<SignupResponse> {
    if state.store.find_user_by_username(&credentials.username).await?.is_some() {
        return Err(ApiError::conflict("A user with that username already exists."));
    }

    let password_hash = hash_password(credentials.password, state.config.security.bcrypt_cost).await?;
    let role = office.role();
    let user = state
        .store
        .create_user(
            NewUser {
                username: credentials.username,
                email: credentials.email,
                password_hash,
            },
            Some(office),
        )
        .await?;

    tracing::info!(user = %user.username, role = %role, "Officer account created");

    let token = open_session(state, &user).await?;
    Ok(ApiResponse::created(SignupResponse { user, token }).message("Account created Succesfully"))
}

// handlers/protected/cleaning_staff.rs - /cleaning-staff/ CRUD
//
// Anyone signed in may read; only sub-divisional officers write.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{CleaningStaff, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
pub struct StaffInput {
    pub name: Option<String>,
    pub pincode: Option<String>,
    pub contact: Option<String>,
}

fn validate(staff: &CleaningStaff) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    for (field, value, max) in [
        ("name", &staff.name, 255),
        ("pincode", &staff.pincode, 10),
        ("contact", &staff.contact, 15),
    ] {
        if value.trim().is_empty() {
            errors.add(field, crate::validation::REQUIRED);
        }
        errors.max_len(field, Some(value.as_str()), max);
    }
    errors.into_result()
}

/// GET /cleaning-staff/
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<CleaningStaff>> {
    let staff = state.store.list_staff().await?;
    Ok(ApiResponse::success(staff))
}

/// POST /cleaning-staff/
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Payload(input): Payload<StaffInput>,
) -> ApiResult<CleaningStaff> {
    user.require_role(Role::SubDivisional, "Only sub-divisional officers can add cleaning staff.")?;

    let staff = CleaningStaff {
        id: Uuid::new_v4(),
        name: input.name.unwrap_or_default(),
        pincode: input.pincode.unwrap_or_default().trim().to_string(),
        contact: input.contact.unwrap_or_default(),
    };
    validate(&staff)?;

    state.store.insert_staff(&staff).await?;
    tracing::info!(staff = %staff.id, by = %user.username, "Cleaning staff added");
    Ok(ApiResponse::created(staff))
}

/// GET /cleaning-staff/:id/
pub async fn retrieve(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CleaningStaff> {
    let staff = find(&state, id).await?;
    Ok(ApiResponse::success(staff))
}

/// PUT|PATCH /cleaning-staff/:id/ - partial
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<StaffInput>,
) -> ApiResult<CleaningStaff> {
    user.require_role(Role::SubDivisional, "Only sub-divisional officers can modify cleaning staff.")?;
    let mut staff = find(&state, id).await?;

    if let Some(name) = input.name {
        staff.name = name;
    }
    if let Some(pincode) = input.pincode {
        staff.pincode = pincode.trim().to_string();
    }
    if let Some(contact) = input.contact {
        staff.contact = contact;
    }
    validate(&staff)?;

    state.store.update_staff(&staff).await?;
    tracing::info!(staff = %staff.id, by = %user.username, "Cleaning staff updated");
    Ok(ApiResponse::success(staff))
}

/// DELETE /cleaning-staff/:id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require_role(Role::SubDivisional, "Only sub-divisional officers can delete cleaning staff.")?;
    if !state.store.delete_staff(id).await? {
        return Err(ApiError::not_found("Cleaning staff not found."));
    }
    tracing::info!(staff = %id, by = %user.username, "Cleaning staff deleted");
    Ok(ApiResponse::no_content())
}

async fn find(state: &AppState, id: Uuid) -> Result<CleaningStaff, ApiError> {
    state
        .store
        .get_staff(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cleaning staff not found."))
}

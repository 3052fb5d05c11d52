// handlers/protected/post_office.rs - /postoffice/ CRUD for divisional officers

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{PostOffice, Role};
use crate::database::store::PostOfficeFilter;
use crate::error::ApiError;
use crate::handlers::protected::PERMISSION_DENIED;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::scope;
use crate::validation::FieldErrors;

/// Create body and partial update body alike
#[derive(Debug, Default, Deserialize)]
pub struct PostOfficeInput {
    pub pincode: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "contactNo", alias = "contact_no")]
    pub contact_no: Option<String>,
    pub address: Option<String>,
    /// `null` detaches the post office from its division
    #[serde(default, deserialize_with = "explicit_null")]
    pub division_pincode: Option<Option<String>>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn ensure_divisional(user: &AuthUser) -> Result<(), ApiError> {
    user.require_role(Role::Divisional, PERMISSION_DENIED)
}

fn validate(errors: &mut FieldErrors, office: &PostOffice) {
    for (field, value, max) in [
        ("pincode", &office.pincode, 10),
        ("name", &office.name, 255),
        ("contactNo", &office.contact_no, 15),
    ] {
        if value.trim().is_empty() {
            errors.add(field, crate::validation::REQUIRED);
        }
        errors.max_len(field, Some(value.as_str()), max);
    }
    if office.address.trim().is_empty() {
        errors.add("address", crate::validation::REQUIRED);
    }
}

async fn ensure_division_exists(state: &AppState, errors: &mut FieldErrors, office: &PostOffice) -> Result<(), ApiError> {
    if let Some(division) = &office.division_pincode {
        if division != &office.pincode && state.store.get_post_office(division).await?.is_none() {
            errors.add("division_pincode", format!("Invalid pincode \"{division}\" - object does not exist."));
        }
    }
    Ok(())
}

/// GET /postoffice/
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<PostOffice>> {
    ensure_divisional(&user)?;
    let offices = state.store.list_post_offices(PostOfficeFilter::All).await?;
    Ok(ApiResponse::success(offices))
}

/// POST /postoffice/
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Payload(input): Payload<PostOfficeInput>,
) -> ApiResult<PostOffice> {
    ensure_divisional(&user)?;

    let office = PostOffice {
        pincode: input.pincode.unwrap_or_default().trim().to_string(),
        name: input.name.unwrap_or_default(),
        contact_no: input.contact_no.unwrap_or_default(),
        address: input.address.unwrap_or_default(),
        division_pincode: input.division_pincode.flatten(),
    };

    let mut errors = FieldErrors::new();
    validate(&mut errors, &office);
    ensure_division_exists(&state, &mut errors, &office).await?;
    errors.into_result()?;

    if state.store.get_post_office(&office.pincode).await?.is_some() {
        return Err(ApiError::conflict("post office with this pincode already exists."));
    }
    state.store.insert_post_office(&office).await?;

    tracing::info!(pincode = %office.pincode, by = %user.username, "Post office created");
    Ok(ApiResponse::created(office))
}

/// GET /postoffice/:pincode/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pincode): Path<String>,
) -> ApiResult<PostOffice> {
    ensure_divisional(&user)?;
    let office = find(&state, &pincode).await?;
    Ok(ApiResponse::success(office))
}

/// PUT|PATCH /postoffice/:pincode/ - partial; the pincode itself is immutable
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pincode): Path<String>,
    Payload(input): Payload<PostOfficeInput>,
) -> ApiResult<PostOffice> {
    ensure_divisional(&user)?;
    let mut office = find(&state, &pincode).await?;

    let mut errors = FieldErrors::new();
    if input.pincode.as_deref().is_some_and(|p| p.trim() != office.pincode) {
        errors.add("pincode", "The pincode of a post office cannot be changed.");
    }
    if let Some(name) = input.name {
        office.name = name;
    }
    if let Some(contact_no) = input.contact_no {
        office.contact_no = contact_no;
    }
    if let Some(address) = input.address {
        office.address = address;
    }
    if let Some(division_pincode) = input.division_pincode {
        office.division_pincode = division_pincode;
    }

    validate(&mut errors, &office);
    ensure_division_exists(&state, &mut errors, &office).await?;
    errors.into_result()?;

    state.store.update_post_office(&office).await?;
    tracing::info!(pincode = %office.pincode, by = %user.username, "Post office updated");
    Ok(ApiResponse::success(office))
}

/// DELETE /postoffice/:pincode/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pincode): Path<String>,
) -> ApiResult<()> {
    ensure_divisional(&user)?;
    if !state.store.delete_post_office(&pincode).await? {
        return Err(ApiError::not_found("Post office not found."));
    }
    tracing::info!(pincode = %pincode, by = %user.username, "Post office deleted");
    Ok(ApiResponse::no_content())
}

/// GET /postoffice/by_division/ - members of the caller's division
pub async fn by_division(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<PostOffice>> {
    let officer = scope::resolve_as(state.store.as_ref(), &user, Role::Divisional, PERMISSION_DENIED).await?;
    let offices = state
        .store
        .list_post_offices(PostOfficeFilter::Division(officer.own_pincode().to_string()))
        .await?;
    Ok(ApiResponse::success(offices))
}

async fn find(state: &AppState, pincode: &str) -> Result<PostOffice, ApiError> {
    state
        .store
        .get_post_office(pincode)
        .await?
        .ok_or_else(|| ApiError::not_found("Post office not found."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_pincode_distinguishes_null_from_absent() {
        let absent: PostOfficeInput = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(absent.division_pincode, None);

        let cleared: PostOfficeInput = serde_json::from_str(r#"{"division_pincode": null}"#).unwrap();
        assert_eq!(cleared.division_pincode, Some(None));

        let set: PostOfficeInput =
            serde_json::from_str(r#"{"contactNo": "011", "division_pincode": "110000"}"#).unwrap();
        assert_eq!(set.division_pincode, Some(Some("110000".to_string())));
        assert_eq!(set.contact_no.as_deref(), Some("011"));
    }
}

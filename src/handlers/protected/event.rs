// handlers/protected/event.rs - /event-management/event/* handlers
//
// Divisional officers file events against their division; both roles read
// the events of the division they belong to.

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Event, Role};
use crate::error::ApiError;
use crate::handlers::protected::PERMISSION_DENIED;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::scope::{self, Officer};
use crate::validation::FieldErrors;

/// Create body and partial update body alike. A client-sent `pincode` is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
}

fn validate(event: &Event) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    if event.title.trim().is_empty() {
        errors.add("title", crate::validation::REQUIRED);
    }
    errors.max_len("title", Some(event.title.as_str()), 255);
    errors.max_len("location", Some(event.location.as_str()), 255);
    errors.into_result()
}

async fn divisional_officer(state: &AppState, user: &AuthUser) -> Result<Officer, ApiError> {
    Ok(scope::resolve_as(state.store.as_ref(), user, Role::Divisional, PERMISSION_DENIED).await?)
}

/**
 * POST /event-management/event/create_event/
 *
 * Expected Input:
 * ```json
 * { "title": "Cleanliness drive", "description": "...", "location": "GPO", "event_date": "2024-12-01" }
 * ```
 *
 * The event is filed under the caller's division pincode.
 */
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Payload(input): Payload<EventInput>,
) -> ApiResult<Event> {
    let officer = divisional_officer(&state, &user).await?;
    let division = state
        .store
        .get_post_office(officer.event_pincode())
        .await?
        .ok_or_else(|| ApiError::not_found("Post office not found."))?;

    let Some(event_date) = input.event_date else {
        return Err(ApiError::field_error("event_date", crate::validation::REQUIRED));
    };

    let event = Event {
        id: Uuid::new_v4(),
        pincode: Some(division.pincode),
        title: input.title.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        location: input.location.unwrap_or_default(),
        event_date,
        created_at: Utc::now(),
    };
    validate(&event)?;

    state.store.insert_event(&event).await?;
    tracing::info!(event = %event.id, pincode = ?event.pincode, "Event created");
    Ok(ApiResponse::created(event).message("Event created successfully."))
}

/// GET /event-management/event/get_event/ - events of the caller's division
pub async fn get_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Event>> {
    let officer = scope::resolve(state.store.as_ref(), &user).await?;
    let events = state.store.list_events(officer.event_pincode()).await?;

    if events.is_empty() && state.config.api.legacy_empty_status {
        return Err(ApiError::forbidden("No events found"));
    }
    Ok(ApiResponse::success(events).message("Events fetched successfully!"))
}

/// PUT|PATCH /event-management/event/:id/update_event/ - partial, pincode is fixed
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<EventInput>,
) -> ApiResult<Event> {
    let officer = divisional_officer(&state, &user).await?;
    let mut event = owned_event(&state, &officer, id, "You are not authorized to update this Event.").await?;

    if let Some(title) = input.title {
        event.title = title;
    }
    if let Some(description) = input.description {
        event.description = description;
    }
    if let Some(location) = input.location {
        event.location = location;
    }
    if let Some(event_date) = input.event_date {
        event.event_date = event_date;
    }
    validate(&event)?;

    state.store.update_event(&event).await?;
    tracing::info!(event = %event.id, "Event updated");
    Ok(ApiResponse::success(event).message("Event updated successfully."))
}

/// DELETE /event-management/event/:id/delete_event/
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let officer = divisional_officer(&state, &user).await?;
    let event = owned_event(&state, &officer, id, "You are not authorized to delete this event.").await?;

    state.store.delete_event(event.id).await?;
    tracing::info!(event = %event.id, "Event deleted");
    Ok(ApiResponse::no_content())
}

/// The event, provided it is filed under the officer's division
async fn owned_event(state: &AppState, officer: &Officer, id: Uuid, denied: &str) -> Result<Event, ApiError> {
    let event = state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found."))?;

    if !event.belongs_to(officer.event_pincode()) {
        tracing::warn!(event = %id, division = officer.event_pincode(), "Event outside caller's division");
        return Err(ApiError::forbidden(denied));
    }
    Ok(event)
}

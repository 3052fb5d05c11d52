// handlers/protected/event_report.rs - /event-management/event-report/* handlers
//
// Reports are written by sub-divisional officers against events of their
// division. Reading follows the division; editing and deleting follow the
// caller's own post office, i.e. the uploader.

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{EventReport, Role};
use crate::database::store::ReportFilter;
use crate::error::ApiError;
use crate::handlers::protected::PERMISSION_DENIED;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::scope::{self, Officer};
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
pub struct ReportInput {
    #[serde(alias = "event")]
    pub event_id: Option<Uuid>,
    pub name: Option<String>,
    pub report_description: Option<String>,
    #[serde(rename = "atLocation", alias = "at_location")]
    pub at_location: Option<bool>,
    /// Opaque reference to an uploaded file
    pub attached_report: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub event_id: Option<String>,
}

fn validate(report: &EventReport) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    if report.name.trim().is_empty() {
        errors.add("name", crate::validation::REQUIRED);
    }
    errors.max_len("name", Some(report.name.as_str()), 255);
    errors.into_result()
}

async fn sub_divisional_officer(state: &AppState, user: &AuthUser) -> Result<Officer, ApiError> {
    Ok(scope::resolve_as(state.store.as_ref(), user, Role::SubDivisional, PERMISSION_DENIED).await?)
}

/**
 * POST /event-management/event-report/create-report/
 *
 * Expected Input:
 * ```json
 * {
 *   "event_id": "uuid",
 *   "name": "John Doe",
 *   "report_description": "Report for community event",
 *   "atLocation": true,
 *   "attached_report": "reports/drive.pdf",
 *   "date_time": "2024-12-01T10:30:00Z"
 * }
 * ```
 *
 * The report takes the event's division pincode; `date_time` defaults to now.
 */
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Payload(input): Payload<ReportInput>,
) -> ApiResult<EventReport> {
    let officer = sub_divisional_officer(&state, &user).await?;

    let Some(event_id) = input.event_id else {
        return Err(ApiError::bad_request("Event ID is required."));
    };
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found."))?;

    let division = officer.event_pincode();
    if !event.belongs_to(division) {
        tracing::warn!(event = %event_id, division, "Report for event outside caller's division");
        return Err(ApiError::forbidden("You are not authorized to add a report to this event."));
    }

    let report = EventReport {
        id: Uuid::new_v4(),
        event_id: event.id,
        pincode: Some(division.to_string()),
        name: input.name.unwrap_or_default(),
        report_description: input.report_description.unwrap_or_default(),
        at_location: input.at_location.unwrap_or(false),
        attached_report: input.attached_report,
        date_time: input.date_time.unwrap_or_else(Utc::now),
    };
    validate(&report)?;

    state.store.insert_report(&report).await?;
    tracing::info!(report = %report.id, event = %event.id, "Event report created");
    Ok(ApiResponse::created(report).message("Event report created successfully."))
}

/// GET /event-management/event-report/get-reports/[?event_id=]
///
/// Sub-divisional officers see every report of their division. Divisional
/// officers name one of their own events.
pub async fn get_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Vec<EventReport>> {
    if user.role.is_none() {
        return Err(ApiError::forbidden("You do not have permission to view reports."));
    }

    let officer = scope::resolve(state.store.as_ref(), &user).await?;
    let filter = match &officer {
        Officer::SubDivisional(office) => ReportFilter::Pincode(office.division_pincode.clone()),
        Officer::Divisional(office) => {
            let Some(raw) = query.event_id.as_deref().filter(|s| !s.is_empty()) else {
                return Err(ApiError::bad_request("Event ID is required for divisional users."));
            };
            let not_found = || ApiError::not_found("Event not found or not authorized to access it.");
            let event_id = Uuid::parse_str(raw).map_err(|_| not_found())?;
            match state.store.get_event(event_id).await? {
                Some(event) if event.belongs_to(&office.pincode) => ReportFilter::Event(event.id),
                _ => return Err(not_found()),
            }
        }
    };

    let reports = state.store.list_reports(filter).await?;
    if reports.is_empty() && state.config.api.legacy_empty_status {
        return Err(ApiError::not_found("No reports found."));
    }
    Ok(ApiResponse::success(reports).message("Reports fetched successfully."))
}

/// PUT|PATCH /event-management/event-report/:id/update-report/ - stamps date_time with now
pub async fn update_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<ReportInput>,
) -> ApiResult<EventReport> {
    let officer = sub_divisional_officer(&state, &user).await?;
    let mut report = uploaded_report(&state, &officer, id, "You can only update reports uploaded by you.").await?;

    if let Some(name) = input.name {
        report.name = name;
    }
    if let Some(report_description) = input.report_description {
        report.report_description = report_description;
    }
    if let Some(at_location) = input.at_location {
        report.at_location = at_location;
    }
    if input.attached_report.is_some() {
        report.attached_report = input.attached_report;
    }
    report.date_time = Utc::now();
    validate(&report)?;

    state.store.update_report(&report).await?;
    tracing::info!(report = %report.id, "Event report updated");
    Ok(ApiResponse::success(report).message("Event report updated successfully."))
}

/// DELETE /event-management/event-report/:id/delete-report/
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let officer = sub_divisional_officer(&state, &user).await?;
    let report = uploaded_report(&state, &officer, id, "You can only delete reports uploaded by you.").await?;

    state.store.delete_report(report.id).await?;
    tracing::info!(report = %report.id, "Event report deleted");
    Ok(ApiResponse::no_content())
}

/// The report, provided it carries the officer's own pincode
async fn uploaded_report(state: &AppState, officer: &Officer, id: Uuid, denied: &str) -> Result<EventReport, ApiError> {
    let report = state
        .store
        .get_report(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event report not found."))?;

    if !report.belongs_to(officer.own_pincode()) {
        tracing::warn!(report = %id, pincode = officer.own_pincode(), "Report not uploaded by caller");
        return Err(ApiError::forbidden(denied));
    }
    Ok(report)
}

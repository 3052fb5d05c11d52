// handlers/protected/waste.rs - /{ewaste|paperwaste|selledpaperwaste}/* handlers
//
// One handler set serves all three ledgers; the router hands each nest its
// WasteKind as a request extension.

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Role, WasteEntry, WasteKind, WasteMeasure};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::scope::{self, Officer, ScopeError};
use crate::services::analytics::totals;
use crate::validation::FieldErrors;

/// Column shapes: weights are NUMERIC(12, 3), prices NUMERIC(12, 2)
const WEIGHT_COLUMN: (u32, u32) = (12, 3);
const PRICE_COLUMN: (u32, u32) = (12, 2);

fn check_decimal(errors: &mut FieldErrors, field: &str, value: Decimal, (digits, places): (u32, u32)) {
    errors.non_negative(field, value.is_sign_negative() && !value.is_zero());
    errors.decimal_fits(field, value, digits, places);
}

/// Union of the three ledgers' fields; only those of the mounted kind are read
#[derive(Debug, Default, Deserialize)]
pub struct WasteInput {
    pub pincode: Option<String>,
    pub date: Option<NaiveDate>,
    pub no_of_units: Option<i32>,
    pub description: Option<String>,
    pub weight: Option<Decimal>,
    pub total_weight: Option<Decimal>,
    pub total_price: Option<Decimal>,
}

impl WasteInput {
    fn measure(&self, kind: WasteKind) -> Result<WasteMeasure, ApiError> {
        let mut errors = FieldErrors::new();
        let measure = match kind {
            WasteKind::Ewaste => {
                let units = errors.present("no_of_units", &self.no_of_units).copied();
                if let Some(units) = units {
                    errors.non_negative("no_of_units", units < 0);
                }
                errors.max_len("description", self.description.as_deref(), 255);
                units.map(|no_of_units| WasteMeasure::Units {
                    no_of_units,
                    description: self.description.clone().unwrap_or_default(),
                })
            }
            WasteKind::PaperWaste => {
                let weight = errors.present("weight", &self.weight).copied();
                if let Some(weight) = weight {
                    check_decimal(&mut errors, "weight", weight, WEIGHT_COLUMN);
                }
                weight.map(|weight| WasteMeasure::Weight { weight })
            }
            WasteKind::SelledPaperWaste => {
                let total_weight = errors.present("total_weight", &self.total_weight).copied();
                let total_price = errors.present("total_price", &self.total_price).copied();
                for (field, value, column) in [
                    ("total_weight", total_weight, WEIGHT_COLUMN),
                    ("total_price", total_price, PRICE_COLUMN),
                ] {
                    if let Some(value) = value {
                        check_decimal(&mut errors, field, value, column);
                    }
                }
                total_weight
                    .zip(total_price)
                    .map(|(total_weight, total_price)| WasteMeasure::Sale { total_weight, total_price })
            }
        };
        errors.into_result()?;
        measure.ok_or_else(|| ApiError::validation_error("Invalid input.", None))
    }
}

/**
 * POST /{kind}/add-data/ - Record a collection entry for the caller's post office
 *
 * Expected Input (paper waste):
 * ```json
 * { "pincode": "110001", "weight": 5.25, "date": "2024-12-01" }
 * ```
 *
 * `date` defaults to today.
 */
pub async fn add_data(
    State(state): State<AppState>,
    Extension(kind): Extension<WasteKind>,
    Extension(user): Extension<AuthUser>,
    Payload(input): Payload<WasteInput>,
) -> ApiResult<WasteEntry> {
    let officer = scope::resolve_as(
        state.store.as_ref(),
        &user,
        Role::SubDivisional,
        "Only sub-divisional officers can add data",
    )
    .await?;

    // a missing pincode is simply not among the visible ones
    let pincode = input.pincode.as_deref().map(str::trim).unwrap_or_default();
    officer.ensure_visible(state.store.as_ref(), pincode).await?;

    let entry = WasteEntry {
        id: Uuid::new_v4(),
        pincode: pincode.to_string(),
        date: input.date.unwrap_or_else(|| Utc::now().date_naive()),
        measure: input.measure(kind)?,
    };

    state.store.insert_waste(&entry).await?;
    tracing::info!(kind = kind.label(), entry = %entry.id, pincode = %entry.pincode, "Waste entry recorded");
    Ok(ApiResponse::created(entry))
}

/// GET /{kind}/analytics/ - entries visible to the caller with their totals
pub async fn analytics(
    State(state): State<AppState>,
    Extension(kind): Extension<WasteKind>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<WasteEntry>> {
    let officer = scope::resolve(state.store.as_ref(), &user).await?;
    let pincodes = officer.visible_post_offices(state.store.as_ref()).await?;
    let entries = state.store.list_waste(kind, &pincodes).await?;

    let message = match officer {
        Officer::Divisional(_) => "Divisional office analytics",
        Officer::SubDivisional(_) => "Sub-divisional office analytics",
    };
    let sums = totals(kind, &entries);

    let response = sums
        .fields()
        .into_iter()
        .fold(ApiResponse::success(entries), |response, (key, value)| response.field(key, value));
    Ok(response.message(message))
}

/// DELETE /{kind}/:id/delete-data/
pub async fn delete_data(
    State(state): State<AppState>,
    Extension(kind): Extension<WasteKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let entry = state
        .store
        .get_waste(kind, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} entry not found.", kind.label())))?;

    let officer = match scope::resolve(state.store.as_ref(), &user).await {
        Err(ScopeError::NoRole) => {
            return Err(ApiError::forbidden("User does not have access to delete this data"));
        }
        other => other?,
    };
    officer.ensure_visible(state.store.as_ref(), &entry.pincode).await?;

    state.store.delete_waste(kind, entry.id).await?;
    tracing::info!(kind = kind.label(), entry = %entry.id, by = %user.username, "Waste entry deleted");
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> WasteInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn measure_follows_the_mounted_kind() {
        let body = input(r#"{"pincode": "110001", "no_of_units": 3, "weight": 2.5}"#);

        assert_eq!(
            body.measure(WasteKind::Ewaste).unwrap(),
            WasteMeasure::Units { no_of_units: 3, description: String::new() }
        );
        assert_eq!(
            body.measure(WasteKind::PaperWaste).unwrap(),
            WasteMeasure::Weight { weight: Decimal::new(25, 1) }
        );
        assert!(body.measure(WasteKind::SelledPaperWaste).is_err());
    }

    #[test]
    fn negative_measures_are_rejected() {
        let err = input(r#"{"no_of_units": -1}"#).measure(WasteKind::Ewaste).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err = input(r#"{"total_weight": 1, "total_price": -0.5}"#)
            .measure(WasteKind::SelledPaperWaste)
            .unwrap_err();
        assert!(err.to_json()["field_errors"]["total_price"].is_string());
    }

    #[test]
    fn measures_beyond_the_column_are_rejected() {
        let huge = WasteInput { weight: Some(Decimal::from_scientific("5e28").unwrap()), ..Default::default() };
        let err = huge.measure(WasteKind::PaperWaste).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_json()["field_errors"]["weight"].is_string());

        let fine_grained = WasteInput {
            total_weight: Some(Decimal::new(12_345, 4)),
            total_price: Some(Decimal::new(10_005, 3)),
            ..Default::default()
        };
        let err = fine_grained.measure(WasteKind::SelledPaperWaste).unwrap_err();
        let fields = &err.to_json()["field_errors"];
        assert_eq!(fields["total_weight"], "Ensure that there are no more than 3 decimal places.");
        assert_eq!(fields["total_price"], "Ensure that there are no more than 2 decimal places.");

        let trailing_zeros = WasteInput {
            total_weight: Some(Decimal::new(15_000, 4)),
            total_price: Some(Decimal::new(1_050, 2)),
            ..Default::default()
        };
        assert!(trailing_zeros.measure(WasteKind::SelledPaperWaste).is_ok());
    }

    #[test]
    fn zero_is_a_valid_measure() {
        let body = input(r#"{"weight": 0}"#);
        assert!(body.measure(WasteKind::PaperWaste).is_ok());
    }
}

// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// Service description and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Postal Waste Management API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/signup/divisional/, /signup/sub-divisional/, /login/ (public), /logout/ (protected)",
                "profile": "/divisional/me/, /sub-divisional/me/ (protected)",
                "postoffice": "/postoffice/[:pincode/|by_division/] (divisional)",
                "events": "/event-management/event/* (protected)",
                "reports": "/event-management/event-report/* (protected)",
                "waste": "/{ewaste|paperwaste|selledpaperwaste}/{add-data/|analytics/|:id/delete-data/} (protected)",
                "cleaning_staff": "/cleaning-staff/[:id/] (protected)",
                "health": "/health (public)",
            }
        }
    }))
}

/// Store liveness: 200 when reachable, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

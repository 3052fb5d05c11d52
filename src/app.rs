use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::models::WasteKind;
use crate::database::SharedStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared handler state: the store handle and the configuration
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/signup/divisional/", post(auth::signup_divisional))
        .route("/signup/sub-divisional/", post(auth::signup_sub_divisional))
        .route("/login/", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(post_office_routes())
        .merge(event_routes())
        .merge(waste_routes())
        .merge(cleaning_staff_routes())
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/logout/", post(auth::logout))
        .route("/divisional/me/", get(auth::divisional_me))
        .route("/sub-divisional/me/", get(auth::sub_divisional_me))
}

fn post_office_routes() -> Router<AppState> {
    use protected::post_office;

    Router::new()
        .route("/postoffice/", get(post_office::list).post(post_office::create))
        .route("/postoffice/by_division/", get(post_office::by_division))
        .route(
            "/postoffice/:pincode/",
            get(post_office::retrieve)
                .put(post_office::update)
                .patch(post_office::update)
                .delete(post_office::destroy),
        )
}

fn event_routes() -> Router<AppState> {
    use protected::{event, event_report};

    Router::new()
        .route("/event-management/event/create_event/", post(event::create_event))
        .route("/event-management/event/get_event/", get(event::get_event))
        .route("/event-management/event/:id/delete_event/", delete(event::delete_event))
        .route(
            "/event-management/event/:id/update_event/",
            put(event::update_event).patch(event::update_event),
        )
        .route("/event-management/event-report/create-report/", post(event_report::create_report))
        .route("/event-management/event-report/get-reports/", get(event_report::get_reports))
        .route(
            "/event-management/event-report/:id/delete-report/",
            delete(event_report::delete_report),
        )
        .route(
            "/event-management/event-report/:id/update-report/",
            put(event_report::update_report).patch(event_report::update_report),
        )
}

/// The three ledgers share handlers; each mount carries its kind
fn waste_routes() -> Router<AppState> {
    use protected::waste;

    WasteKind::ALL.into_iter().fold(Router::new(), |router, kind| {
        let ledger = Router::new()
            .route("/add-data/", post(waste::add_data))
            .route("/analytics/", get(waste::analytics))
            .route("/:id/delete-data/", delete(waste::delete_data))
            .layer(Extension(kind));
        router.nest(&format!("/{}", kind.route()), ledger)
    })
}

fn cleaning_staff_routes() -> Router<AppState> {
    use protected::cleaning_staff;

    Router::new()
        .route("/cleaning-staff/", get(cleaning_staff::list).post(cleaning_staff::create))
        .route(
            "/cleaning-staff/:id/",
            get(cleaning_staff::retrieve)
                .put(cleaning_staff::update)
                .patch(cleaning_staff::update)
                .delete(cleaning_staff::destroy),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use crate::database::MemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.database.backend = StoreBackend::Memory;
        config.api.enable_request_logging = false;
        app(AppState::new(Arc::new(MemoryStore::new()), config))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_reports_store_status() {
        let (status, body) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["database"], "ok");
    }

    #[tokio::test]
    async fn every_ledger_is_mounted_behind_auth() {
        for kind in WasteKind::ALL {
            let uri = format!("/{}/analytics/", kind.route());
            let (status, body) = call(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.database.backend = StoreBackend::Memory;
        config.api.max_request_size_bytes = 16;
        let router = app(AppState::new(Arc::new(MemoryStore::new()), config));

        let payload = r#"{"username": "someone", "password": "long enough to overflow"}"#;
        let request = Request::post("/login/")
            .header("content-type", "application/json")
            .header("content-length", payload.len())
            .body(Body::from(payload))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

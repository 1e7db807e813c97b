use std::any::Any as PanicPayload;

use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::firebase_auth_middleware;
use crate::state::AppState;

/// Full application router: public probes plus the authenticated `/api` tree.
pub fn app(state: AppState) -> Router {
    let response_level = if state.config.api.enable_request_logging {
        Level::INFO
    } else {
        Level::DEBUG
    };
    let cors = cors_layer(&state.config.security);

    let api = Router::new()
        .merge(care_setting_routes())
        .merge(care_log_routes())
        .merge(reflection_note_routes())
        .route_layer(from_fn_with_state(state.clone(), firebase_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(api)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(response_level)))
                .layer(cors)
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}

fn care_setting_routes() -> Router<AppState> {
    use protected::care_settings;

    Router::new()
        .route("/api/care_settings", post(care_settings::create))
        .route("/api/care_settings/me", get(care_settings::me))
        .route("/api/care_settings/verify_pin", post(care_settings::verify_pin))
}

fn care_log_routes() -> Router<AppState> {
    use protected::care_logs;

    Router::new()
        .route("/api/care_logs", post(care_logs::create))
        .route("/api/care_logs/today", get(care_logs::today))
        .route("/api/care_logs/by_date", get(care_logs::by_date))
        .route("/api/care_logs/list", get(care_logs::list))
        .route("/api/care_logs/:id", patch(care_logs::update))
}

fn reflection_note_routes() -> Router<AppState> {
    use protected::reflection_notes;

    Router::new()
        .route(
            "/api/reflection_notes",
            get(reflection_notes::list).post(reflection_notes::create),
        )
        .route("/api/reflection_notes/:id", patch(reflection_notes::update))
}

/// A panicking handler still answers: 500 with the generic `detail`.
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let cause = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %cause, "request handler panicked");
    ApiError::internal(cause).into_response()
}

/// `*` allows any origin; an empty list or disabled CORS allows none.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    if !security.enable_cors || security.cors_origins.is_empty() {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(origins)
}

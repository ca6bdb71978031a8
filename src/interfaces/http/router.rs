//! API Router with Swagger UI

use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::service::StationService;

use super::dto::*;
use super::error::{ApiError, ErrorBody};
use super::handlers::{self, ApiState};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        handlers::health_check,
        // Reservations
        handlers::reserve,
        handlers::cancel_reservation,
        // Rentals
        handlers::unlock,
        handlers::lock,
        // Listings
        handlers::list_stations,
        handlers::list_vehicles,
        handlers::list_vehicles_at_station,
        handlers::stations_total,
    ),
    components(
        schemas(
            ErrorBody,
            ReserveRequest,
            ReservationResponse,
            CancelReservationRequest,
            CancelReservationResponse,
            UnlockRequest,
            UnlockResponse,
            LockRequest,
            LockResponse,
            StationDto,
            VehicleDto,
            StationsTotalResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Reservations", description = "Vehicle holds: create and cancel"),
        (name = "Rentals", description = "Physical unlock and lock of vehicles"),
        (name = "Listings", description = "Read-only station and vehicle listings"),
    ),
    info(
        title = "Station Service API",
        version = "0.1.0",
        description = "REST API coordinating shared rental vehicles across docking stations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Unexpected panics surface as the standard INTERNAL_ERROR shape, with
/// the original payload logged, never echoed.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");
    ApiError::internal().into_response()
}

async fn unknown_path() -> ApiError {
    ApiError::http(StatusCode::NOT_FOUND)
}

async fn method_not_allowed() -> ApiError {
    ApiError::http(StatusCode::METHOD_NOT_ALLOWED)
}

/// Create the API router with all routes
pub fn create_api_router(service: Arc<StationService>) -> Router {
    handlers::mark_started();

    let state = ApiState { service };

    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(handlers::health_check))
        // Listings ("/stations/total" must stay static, not a station id)
        .route("/stations", get(handlers::list_stations))
        .route("/stations/total", get(handlers::stations_total))
        .route("/vehicles", get(handlers::list_vehicles))
        .route(
            "/stations/{station_id}/vehicles",
            get(handlers::list_vehicles_at_station),
        )
        // Reservations
        .route(
            "/stations/{station_id}/reservations",
            post(handlers::reserve),
        )
        .route(
            "/stations/{station_id}/reservations/{reservation_id}/cancel",
            post(handlers::cancel_reservation),
        )
        // Rentals
        .route(
            "/stations/{station_id}/vehicles/{vehicle_id}/unlock",
            post(handlers::unlock),
        )
        .route(
            "/stations/{station_id}/vehicles/{vehicle_id}/lock",
            post(handlers::lock),
        )
        .fallback(unknown_path)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

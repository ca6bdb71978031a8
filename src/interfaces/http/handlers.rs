//! Station HTTP handlers
//!
//! Thin translation layer: extract, call the domain service, convert
//! the outcome. All status mapping lives in [`super::error::ApiError`].

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::service::StationService;

use super::dto::*;
use super::error::{ApiResult, ErrorBody};
use super::validated_json::ValidatedJson;

/// Application state for the station routes.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<StationService>,
}

#[utoipa::path(
    post,
    path = "/stations/{station_id}/reservations",
    tag = "Reservations",
    params(("station_id" = String, Path, description = "Station to reserve at")),
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Unknown station or vehicle", body = ErrorBody),
        (status = 409, description = "Vehicle not reservable", body = ErrorBody)
    )
)]
pub async fn reserve(
    State(state): State<ApiState>,
    Path(station_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ReserveRequest>,
) -> ApiResult<(StatusCode, Json<ReservationResponse>)> {
    let reservation = state
        .service
        .reserve(&station_id, &body.vehicle_id, &body.user_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::from(&reservation)),
    ))
}

#[utoipa::path(
    post,
    path = "/stations/{station_id}/reservations/{reservation_id}/cancel",
    tag = "Reservations",
    params(
        ("station_id" = String, Path, description = "Station the reservation belongs to"),
        ("reservation_id" = String, Path, description = "Reservation to cancel")
    ),
    request_body = CancelReservationRequest,
    responses(
        (status = 200, description = "Reservation canceled", body = CancelReservationResponse),
        (status = 403, description = "Caller does not own the reservation", body = ErrorBody),
        (status = 404, description = "Unknown station or reservation", body = ErrorBody),
        (status = 409, description = "Reservation already consumed", body = ErrorBody)
    )
)]
pub async fn cancel_reservation(
    State(state): State<ApiState>,
    Path((station_id, reservation_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<CancelReservationRequest>,
) -> ApiResult<Json<CancelReservationResponse>> {
    let reservation = state
        .service
        .cancel_reservation(&station_id, &reservation_id, &body.user_id)
        .await?;
    Ok(Json(CancelReservationResponse::from(&reservation)))
}

#[utoipa::path(
    post,
    path = "/stations/{station_id}/vehicles/{vehicle_id}/unlock",
    tag = "Rentals",
    params(
        ("station_id" = String, Path, description = "Station the vehicle leaves from"),
        ("vehicle_id" = String, Path, description = "Vehicle to unlock")
    ),
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Vehicle unlocked", body = UnlockResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 403, description = "Caller does not own the reservation", body = ErrorBody),
        (status = 404, description = "Unknown station, vehicle or reservation", body = ErrorBody),
        (status = 409, description = "Vehicle or reservation in a conflicting state", body = ErrorBody)
    )
)]
pub async fn unlock(
    State(state): State<ApiState>,
    Path((station_id, vehicle_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UnlockRequest>,
) -> ApiResult<Json<UnlockResponse>> {
    let outcome = state
        .service
        .unlock(
            &station_id,
            &vehicle_id,
            &body.rental_id,
            body.reservation_id.as_deref(),
            &body.user_id,
            &body.destination_station_id,
        )
        .await?;
    Ok(Json(UnlockResponse::from_outcome(&outcome, station_id.trim())))
}

#[utoipa::path(
    post,
    path = "/stations/{station_id}/vehicles/{vehicle_id}/lock",
    tag = "Rentals",
    params(
        ("station_id" = String, Path, description = "Station the vehicle docks at"),
        ("vehicle_id" = String, Path, description = "Vehicle to lock")
    ),
    request_body = LockRequest,
    responses(
        (status = 200, description = "Vehicle locked", body = LockResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Unknown station or vehicle", body = ErrorBody),
        (status = 409, description = "Rental mismatch, station full or wrong state", body = ErrorBody)
    )
)]
pub async fn lock(
    State(state): State<ApiState>,
    Path((station_id, vehicle_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<LockRequest>,
) -> ApiResult<Json<LockResponse>> {
    let outcome = state
        .service
        .lock(&station_id, &vehicle_id, &body.rental_id)
        .await?;
    Ok(Json(LockResponse::from_outcome(&outcome, station_id.trim())))
}

#[utoipa::path(
    get,
    path = "/stations",
    tag = "Listings",
    responses((status = 200, description = "All stations", body = [StationDto]))
)]
pub async fn list_stations(State(state): State<ApiState>) -> Json<Vec<StationDto>> {
    let stations = state.service.list_stations().await;
    Json(stations.iter().map(StationDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/vehicles",
    tag = "Listings",
    responses((status = 200, description = "All vehicles", body = [VehicleDto]))
)]
pub async fn list_vehicles(State(state): State<ApiState>) -> Json<Vec<VehicleDto>> {
    let vehicles = state.service.list_vehicles().await;
    Json(vehicles.iter().map(VehicleDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/stations/{station_id}/vehicles",
    tag = "Listings",
    params(("station_id" = String, Path, description = "Station to list")),
    responses(
        (status = 200, description = "Vehicles docked at the station", body = [VehicleDto]),
        (status = 404, description = "Unknown station", body = ErrorBody)
    )
)]
pub async fn list_vehicles_at_station(
    State(state): State<ApiState>,
    Path(station_id): Path<String>,
) -> ApiResult<Json<Vec<VehicleDto>>> {
    let vehicles = state.service.list_vehicles_at_station(&station_id).await?;
    Ok(Json(vehicles.iter().map(VehicleDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/stations/total",
    tag = "Listings",
    responses((status = 200, description = "Stations and vehicles combined", body = StationsTotalResponse))
)]
pub async fn stations_total(State(state): State<ApiState>) -> Json<StationsTotalResponse> {
    let stations = state.service.list_stations().await;
    let vehicles = state.service.list_vehicles().await;
    Json(StationsTotalResponse {
        stations: stations.iter().map(StationDto::from).collect(),
        vehicles: vehicles.iter().map(VehicleDto::from).collect(),
    })
}

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Pin the uptime baseline; called once at router construction.
pub(super) fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    let uptime = STARTED_AT.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
    })
}

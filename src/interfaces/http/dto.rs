//! Wire DTOs
//!
//! Request and response shapes for the station API. The wire casing is
//! camelCase; conversion from domain types happens here so handlers
//! stay thin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::reservation::Reservation;
use crate::domain::service::{LockOutcome, UnlockOutcome};
use crate::domain::station::Station;
use crate::domain::vehicle::Vehicle;

use super::validated_json::not_blank;

// ── Requests ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[validate(custom(function = not_blank))]
    pub vehicle_id: String,
    #[validate(custom(function = not_blank))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationRequest {
    #[validate(custom(function = not_blank))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest {
    #[validate(custom(function = not_blank))]
    pub rental_id: String,
    #[validate(custom(function = not_blank))]
    pub user_id: String,
    /// Present when redeeming a reservation, absent for a direct rent.
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[validate(custom(function = not_blank))]
    pub destination_station_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    #[validate(custom(function = not_blank))]
    pub rental_id: String,
}

// ── Responses ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: String,
    pub station_id: String,
    pub vehicle_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Reservation> for ReservationResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.reservation_id().to_string(),
            station_id: r.station_id().to_string(),
            vehicle_id: r.vehicle_id().to_string(),
            status: r.status().as_str().to_string(),
            created_at: r.created_at(),
            expires_at: r.expires_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationResponse {
    pub reservation_id: String,
    pub status: String,
}

impl From<&Reservation> for CancelReservationResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.reservation_id().to_string(),
            status: r.status().as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub vehicle_id: String,
    /// The station the vehicle was unlocked from.
    pub station_id: String,
    pub vehicle_state: String,
    pub active_rental_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_reservation_id: Option<String>,
}

impl UnlockResponse {
    /// The vehicle has no station while IN_USE, so the station in the
    /// response is the one the request addressed.
    pub fn from_outcome(outcome: &UnlockOutcome, station_id: &str) -> Self {
        Self {
            vehicle_id: outcome.vehicle.vehicle_id().to_string(),
            station_id: station_id.to_string(),
            vehicle_state: outcome.vehicle.state().code().to_string(),
            active_rental_id: outcome.vehicle.active_rental_id().map(str::to_string),
            consumed_reservation_id: outcome.consumed_reservation_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub vehicle_id: String,
    pub station_id: String,
    pub vehicle_state: String,
    pub closed_rental_id: String,
}

impl LockResponse {
    pub fn from_outcome(outcome: &LockOutcome, station_id: &str) -> Self {
        Self {
            vehicle_id: outcome.vehicle.vehicle_id().to_string(),
            station_id: station_id.to_string(),
            vehicle_state: outcome.vehicle.state().code().to_string(),
            closed_rental_id: outcome.closed_rental_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub station_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl From<&Station> for StationDto {
    fn from(s: &Station) -> Self {
        Self {
            station_id: s.station_id().to_string(),
            lat: s.lat(),
            lon: s.lon(),
            capacity: s.capacity(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
    pub vehicle_id: String,
    pub state: String,
    pub station_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_id: Option<String>,
}

impl From<&Vehicle> for VehicleDto {
    fn from(v: &Vehicle) -> Self {
        Self {
            vehicle_id: v.vehicle_id().to_string(),
            state: v.state().code().to_string(),
            station_id: v.current_station_id().map(str::to_string),
            reservation_id: v.active_reservation_id().map(str::to_string),
            rental_id: v.active_rental_id().map(str::to_string),
        }
    }
}

/// Combined listing of the whole network in one round trip.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationsTotalResponse {
    pub stations: Vec<StationDto>,
    pub vehicles: Vec<VehicleDto>,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

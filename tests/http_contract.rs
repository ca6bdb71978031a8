//! Wire-contract tests
//!
//! Drive the real router end to end and assert the JSON protocol:
//! response shapes, status codes and the `{"error": "<CODE>"}` contract.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use station_service::domain::service::StationService;
use station_service::domain::station::{Station, StationStore};
use station_service::domain::vehicle::{Vehicle, VehicleStore};
use station_service::infrastructure::dispatcher::{
    ChannelCommandDispatcher, CommandChannelRegistry,
};
use station_service::infrastructure::lock::VehicleLockManager;
use station_service::infrastructure::memory::{
    InMemoryReservationStore, InMemoryStationStore, InMemoryVehicleStore,
};
use station_service::interfaces::http::create_api_router;

/// Router over a small seeded network: S45 (with V123 docked), S46.
async fn app() -> Router {
    let stations = Arc::new(InMemoryStationStore::new());
    let vehicles = Arc::new(InMemoryVehicleStore::new());
    let reservations = Arc::new(InMemoryReservationStore::new());

    stations.upsert(Station::new("S45", 44.4949, 11.3426)).await;
    stations.upsert(Station::new("S46", 44.5075, 11.3514)).await;
    vehicles.upsert(Vehicle::docked_at("V123", "S45")).await;

    let dispatcher = Arc::new(ChannelCommandDispatcher::new(
        CommandChannelRegistry::shared(),
        Duration::from_millis(50),
    ));
    let service = Arc::new(StationService::new(
        stations,
        vehicles,
        reservations,
        VehicleLockManager::shared(),
        dispatcher,
        chrono::Duration::minutes(30),
    ));
    create_api_router(service)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn reserve_returns_201_with_the_reservation_shape() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U1"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["reservationId"].as_str().unwrap().starts_with("RSV-"));
    assert_eq!(body["stationId"], "S45");
    assert_eq!(body["vehicleId"], "V123");
    assert_eq!(body["status"], "ACTIVE");
    assert!(body["createdAt"].is_string());
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn malformed_and_blank_bodies_are_rejected_with_invalid_request() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "  ", "userId": "U1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");

    let request = Request::builder()
        .method("POST")
        .uri("/stations/S45/reservations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn domain_errors_map_to_the_documented_statuses() {
    let app = app().await;

    // Unknown station: 404.
    let (status, body) = send(
        &app,
        "POST",
        "/stations/S99/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "STATION_NOT_FOUND");

    // Conflicting second reserve: 409.
    send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U1"})),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "VEHICLE_ALREADY_RESERVED");
}

#[tokio::test]
async fn cancel_by_a_non_owner_is_forbidden() {
    let app = app().await;
    let (_, reservation) = send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U1"})),
    )
    .await;
    let res_id = reservation["reservationId"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/stations/S45/reservations/{res_id}/cancel"),
        Some(json!({"userId": "U2"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NOT_AUTHORIZED");
}

#[tokio::test]
async fn full_rental_round_trip_over_the_wire() {
    let app = app().await;

    let (_, reservation) = send(
        &app,
        "POST",
        "/stations/S45/reservations",
        Some(json!({"vehicleId": "V123", "userId": "U1"})),
    )
    .await;
    let res_id = reservation["reservationId"].as_str().unwrap().to_string();

    // Unlock redeeming the reservation.
    let (status, unlocked) = send(
        &app,
        "POST",
        "/stations/S45/vehicles/V123/unlock",
        Some(json!({
            "rentalId": "R1",
            "userId": "U1",
            "reservationId": res_id,
            "destinationStationId": "S46"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unlocked["vehicleId"], "V123");
    assert_eq!(unlocked["stationId"], "S45");
    assert_eq!(unlocked["vehicleState"], "IN_USE");
    assert_eq!(unlocked["activeRentalId"], "R1");
    assert_eq!(unlocked["consumedReservationId"], res_id);

    // The consumed reservation can no longer be canceled.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/stations/S45/reservations/{res_id}/cancel"),
        Some(json!({"userId": "U1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "RESERVATION_ALREADY_CONSUMED");

    // Lock back at the destination.
    let (status, locked) = send(
        &app,
        "POST",
        "/stations/S46/vehicles/V123/lock",
        Some(json!({"rentalId": "R1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["vehicleState"], "DOCKED_AVAILABLE");
    assert_eq!(locked["stationId"], "S46");
    assert_eq!(locked["closedRentalId"], "R1");

    // Idempotent lock retry.
    let (status, _) = send(
        &app,
        "POST",
        "/stations/S46/vehicles/V123/lock",
        Some(json!({"rentalId": "R1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listings_expose_the_network() {
    let app = app().await;

    let (status, stations) = send(&app, "GET", "/stations", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = stations
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stationId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["S45", "S46"]);

    let (status, vehicles) = send(&app, "GET", "/stations/S45/vehicles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vehicles.as_array().unwrap().len(), 1);
    assert_eq!(vehicles[0]["vehicleId"], "V123");
    assert_eq!(vehicles[0]["state"], "DOCKED_AVAILABLE");

    let (status, body) = send(&app, "GET", "/stations/S99/vehicles", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "STATION_NOT_FOUND");

    let (status, total) = send(&app, "GET", "/stations/total", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(total["stations"].as_array().unwrap().len(), 2);
    assert_eq!(total["vehicles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn routing_failures_use_the_http_code_shape() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "HTTP_404");

    let (status, body) = send(&app, "GET", "/stations/S45/reservations", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "HTTP_405");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

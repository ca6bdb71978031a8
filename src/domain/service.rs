//! Station domain service
//!
//! Orchestrates reserve / cancel / unlock / lock and the read-only
//! listings. Every mutating operation runs its whole critical section
//! (reads, validation, transition, persistence) under the per-vehicle
//! lock, so competing requests on the same vehicle are strictly
//! serialized while different vehicles proceed in parallel.
//!
//! Physical actuation commands are dispatched only after the lock is
//! released, and only when the operation performed a fresh transition:
//! an idempotent retry returns the committed state without re-signaling
//! the vehicle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::dispatcher::VehicleCommandDispatcher;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::reservation::{Reservation, ReservationStatus, ReservationStore};
use crate::domain::station::{Station, StationStore};
use crate::domain::vehicle::{Vehicle, VehicleState, VehicleStore};
use crate::infrastructure::lock::SharedVehicleLockManager;

/// Result of a successful unlock.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockOutcome {
    pub vehicle: Vehicle,
    /// Set when an ACTIVE reservation was consumed by this unlock,
    /// `None` for reservation-less unlocks and idempotent retries.
    pub consumed_reservation_id: Option<String>,
}

/// Result of a successful lock (dock).
#[derive(Debug, Clone, PartialEq)]
pub struct LockOutcome {
    pub vehicle: Vehicle,
    pub closed_rental_id: String,
}

/// The station domain core.
///
/// Owns all mutation of vehicles and reservations; the stores hold the
/// records but apply no rules of their own.
pub struct StationService {
    stations: Arc<dyn StationStore>,
    vehicles: Arc<dyn VehicleStore>,
    reservations: Arc<dyn ReservationStore>,
    locks: SharedVehicleLockManager,
    dispatcher: Arc<dyn VehicleCommandDispatcher>,
    reservation_ttl: Duration,
}

impl StationService {
    pub fn new(
        stations: Arc<dyn StationStore>,
        vehicles: Arc<dyn VehicleStore>,
        reservations: Arc<dyn ReservationStore>,
        locks: SharedVehicleLockManager,
        dispatcher: Arc<dyn VehicleCommandDispatcher>,
        reservation_ttl: Duration,
    ) -> Self {
        Self {
            stations,
            vehicles,
            reservations,
            locks,
            dispatcher,
            reservation_ttl,
        }
    }

    // ── Mutating operations ────────────────────────────────────

    /// Place a hold on a docked, available vehicle.
    pub async fn reserve(
        &self,
        station_id: &str,
        vehicle_id: &str,
        user_id: &str,
    ) -> DomainResult<Reservation> {
        let station_id = station_id.trim();
        let vehicle_id = vehicle_id.trim();
        let user_id = user_id.trim();

        if vehicle_id.is_empty() || user_id.is_empty() {
            return Err(DomainError::RentalMismatch);
        }

        self.require_station(station_id).await?;

        self.locks
            .with_vehicle_lock(vehicle_id, async {
                let mut vehicle = self.require_vehicle(vehicle_id).await?;

                if matches!(vehicle.state(), VehicleState::InUse { .. }) {
                    return Err(DomainError::VehicleInUse);
                }
                if vehicle.current_station_id() != Some(station_id) {
                    return Err(DomainError::VehicleNotAtStation);
                }

                // The vehicle may still be pinned by a canceled or
                // expired reservation; repair before deciding.
                self.reconcile_stale_reservation(&mut vehicle).await;
                if !matches!(vehicle.state(), VehicleState::DockedAvailable { .. }) {
                    return Err(DomainError::VehicleAlreadyReserved);
                }

                let now = Utc::now();
                let reservation = Reservation::new_active(
                    new_reservation_id(),
                    station_id,
                    vehicle_id,
                    user_id,
                    now,
                    Some(now + self.reservation_ttl),
                );
                vehicle.reserve(reservation.reservation_id(), user_id)?;

                self.reservations.upsert(reservation.clone()).await;
                self.vehicles.upsert(vehicle).await;

                info!(
                    station_id,
                    vehicle_id,
                    reservation_id = reservation.reservation_id(),
                    "Reservation created"
                );
                Ok(reservation)
            })
            .await
    }

    /// Cancel a reservation on behalf of its owner.
    ///
    /// Idempotent on repeat: canceling an already CANCELED or EXPIRED
    /// reservation returns it unchanged. A CONSUMED reservation can
    /// never be canceled.
    pub async fn cancel_reservation(
        &self,
        station_id: &str,
        reservation_id: &str,
        user_id: &str,
    ) -> DomainResult<Reservation> {
        let station_id = station_id.trim();
        let reservation_id = reservation_id.trim();
        let user_id = user_id.trim();

        if user_id.is_empty() {
            return Err(DomainError::RentalMismatch);
        }

        self.require_station(station_id).await?;

        // Advisory read only to learn which vehicle's lock to take;
        // everything is re-validated on a fresh read inside the lock.
        // A cross-station reservation id is hidden as not-found.
        let probe = self
            .reservations
            .find_by_id(reservation_id)
            .await
            .ok_or(DomainError::ReservationNotFound)?;
        if probe.station_id() != station_id {
            return Err(DomainError::ReservationNotFound);
        }
        let vehicle_id = probe.vehicle_id().to_string();

        self.locks
            .with_vehicle_lock(&vehicle_id, async {
                let mut reservation = self
                    .reservations
                    .find_by_id(reservation_id)
                    .await
                    .ok_or(DomainError::ReservationNotFound)?;
                if reservation.station_id() != station_id {
                    return Err(DomainError::ReservationNotFound);
                }
                if reservation.user_id() != user_id {
                    return Err(DomainError::NotAuthorized);
                }

                reservation.expire_if_due(Utc::now());
                if reservation.status() == ReservationStatus::Consumed {
                    return Err(DomainError::ReservationAlreadyConsumed);
                }
                reservation.cancel();
                self.reservations.upsert(reservation.clone()).await;

                // Free the vehicle if it is still pinned by this
                // reservation.
                if let Some(mut vehicle) = self.vehicles.find_by_id(&vehicle_id).await {
                    if vehicle.active_reservation_id() == Some(reservation_id) {
                        vehicle.clear_reservation();
                        self.vehicles.upsert(vehicle).await;
                    }
                }

                info!(
                    station_id,
                    reservation_id,
                    status = %reservation.status(),
                    "Reservation canceled"
                );
                Ok(reservation)
            })
            .await
    }

    /// Start a rental: the vehicle leaves the station and goes IN_USE.
    ///
    /// With `reservation_id` the caller redeems a hold they own; without
    /// it any available vehicle can be taken directly. Retrying with the
    /// same `rental_id` after success is a no-op that returns the
    /// committed state.
    pub async fn unlock(
        &self,
        station_id: &str,
        vehicle_id: &str,
        rental_id: &str,
        reservation_id: Option<&str>,
        user_id: &str,
        destination_station_id: &str,
    ) -> DomainResult<UnlockOutcome> {
        let station_id = station_id.trim();
        let vehicle_id = vehicle_id.trim();
        let rental_id = rental_id.trim();
        let user_id = user_id.trim();
        let reservation_id = reservation_id.map(str::trim).filter(|r| !r.is_empty());

        if rental_id.is_empty() || user_id.is_empty() {
            return Err(DomainError::RentalMismatch);
        }

        self.require_station(station_id).await?;
        let destination = self.require_station(destination_station_id.trim()).await?;

        let (outcome, fresh) = self
            .locks
            .with_vehicle_lock(vehicle_id, async {
                let mut vehicle = self.require_vehicle(vehicle_id).await?;

                if let Some(active_rental) = vehicle.active_rental_id() {
                    // Already out: same rental means a retry of an
                    // unlock we committed, anything else is a conflict.
                    if active_rental == rental_id {
                        debug!(vehicle_id, rental_id, "Unlock retry, already in use");
                        return Ok((
                            UnlockOutcome {
                                vehicle,
                                consumed_reservation_id: None,
                            },
                            false,
                        ));
                    }
                    return Err(DomainError::VehicleInUseByOtherRental);
                }

                if vehicle.current_station_id() != Some(station_id) {
                    return Err(DomainError::VehicleNotAtStation);
                }

                let consumed_reservation_id = match reservation_id {
                    Some(res_id) => {
                        self.redeem_reservation(&mut vehicle, station_id, res_id, user_id)
                            .await?;
                        Some(res_id.to_string())
                    }
                    None => {
                        self.reconcile_stale_reservation(&mut vehicle).await;
                        if !matches!(vehicle.state(), VehicleState::DockedAvailable { .. }) {
                            return Err(DomainError::VehicleNotAvailable);
                        }
                        None
                    }
                };

                vehicle.start_rental(rental_id)?;
                self.vehicles.upsert(vehicle.clone()).await;

                info!(station_id, vehicle_id, rental_id, "Vehicle unlocked");
                Ok((
                    UnlockOutcome {
                        vehicle,
                        consumed_reservation_id,
                    },
                    true,
                ))
            })
            .await?;

        if fresh {
            self.dispatcher
                .send_unlock_command(vehicle_id, destination.lat(), destination.lon())
                .await;
        }
        Ok(outcome)
    }

    /// End a rental: the vehicle docks at `station_id` and the rental
    /// closes. Retrying after success is a no-op as long as the station
    /// matches.
    pub async fn lock(
        &self,
        station_id: &str,
        vehicle_id: &str,
        rental_id: &str,
    ) -> DomainResult<LockOutcome> {
        let station_id = station_id.trim();
        let vehicle_id = vehicle_id.trim();
        let rental_id = rental_id.trim();

        if rental_id.is_empty() {
            return Err(DomainError::RentalMismatch);
        }

        let station = self.require_station(station_id).await?;

        let (outcome, fresh) = self
            .locks
            .with_vehicle_lock(vehicle_id, async {
                let mut vehicle = self.require_vehicle(vehicle_id).await?;

                match vehicle.state() {
                    VehicleState::DockedAvailable {
                        station_id: docked_at,
                    } => {
                        // Retry of a lock we already committed, or a
                        // genuine conflict with another dock.
                        if docked_at == station_id {
                            debug!(vehicle_id, rental_id, "Lock retry, already docked");
                            return Ok((
                                LockOutcome {
                                    vehicle,
                                    closed_rental_id: rental_id.to_string(),
                                },
                                false,
                            ));
                        }
                        return Err(DomainError::VehicleAlreadyDockedElsewhere);
                    }
                    VehicleState::DockedReserved { .. } => {
                        return Err(DomainError::VehicleNotInUse);
                    }
                    VehicleState::InUse { .. } => {}
                }

                if vehicle.active_rental_id() != Some(rental_id) {
                    return Err(DomainError::RentalMismatch);
                }

                if let Some(capacity) = station.capacity() {
                    let occupied = self.vehicles.count_docked_at(station_id).await;
                    if occupied >= capacity {
                        warn!(station_id, occupied, capacity, "Dock refused, station full");
                        return Err(DomainError::StationFull);
                    }
                }

                vehicle.end_rental_and_dock(station_id)?;
                self.vehicles.upsert(vehicle.clone()).await;

                info!(station_id, vehicle_id, rental_id, "Vehicle locked");
                Ok((
                    LockOutcome {
                        vehicle,
                        closed_rental_id: rental_id.to_string(),
                    },
                    true,
                ))
            })
            .await?;

        if fresh {
            self.dispatcher.send_lock_command(vehicle_id).await;
        }
        Ok(outcome)
    }

    // ── Read-only queries ──────────────────────────────────────

    /// All stations, sorted by id. Unlocked read.
    pub async fn list_stations(&self) -> Vec<Station> {
        self.stations.find_all().await
    }

    /// All vehicles, sorted by id. Unlocked read.
    pub async fn list_vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.find_all().await
    }

    /// Vehicles currently docked at one station.
    pub async fn list_vehicles_at_station(&self, station_id: &str) -> DomainResult<Vec<Vehicle>> {
        let station_id = station_id.trim();
        self.require_station(station_id).await?;
        let vehicles = self
            .vehicles
            .find_all()
            .await
            .into_iter()
            .filter(|v| v.current_station_id() == Some(station_id))
            .collect();
        Ok(vehicles)
    }

    // ── Internals ──────────────────────────────────────────────

    async fn require_station(&self, station_id: &str) -> DomainResult<Station> {
        self.stations
            .find_by_id(station_id)
            .await
            .ok_or(DomainError::StationNotFound)
    }

    async fn require_vehicle(&self, vehicle_id: &str) -> DomainResult<Vehicle> {
        self.vehicles
            .find_by_id(vehicle_id)
            .await
            .ok_or(DomainError::VehicleNotFound)
    }

    /// Redeem an ACTIVE reservation for an unlock. Must run inside the
    /// vehicle's lock. On success the reservation is CONSUMED and
    /// persisted, and the vehicle is back to DOCKED_AVAILABLE ready for
    /// the rental transition.
    async fn redeem_reservation(
        &self,
        vehicle: &mut Vehicle,
        station_id: &str,
        reservation_id: &str,
        user_id: &str,
    ) -> DomainResult<()> {
        let mut reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await
            .ok_or(DomainError::ReservationNotFound)?;

        if reservation.station_id() != station_id || reservation.vehicle_id() != vehicle.vehicle_id()
        {
            return Err(DomainError::ReservationMismatch);
        }

        if reservation.expire_if_due(Utc::now()) {
            self.reservations.upsert(reservation.clone()).await;
        }
        match reservation.status() {
            ReservationStatus::Active => {}
            ReservationStatus::Consumed => return Err(DomainError::ReservationAlreadyConsumed),
            _ => return Err(DomainError::ReservationMismatch),
        }
        if reservation.user_id() != user_id {
            return Err(DomainError::NotAuthorized);
        }

        if !matches!(vehicle.state(), VehicleState::DockedReserved { .. }) {
            return Err(DomainError::VehicleNotAvailable);
        }
        if vehicle.active_reservation_id() != Some(reservation_id) {
            return Err(DomainError::ReservationMismatch);
        }

        reservation.consume();
        self.reservations.upsert(reservation).await;
        vehicle.clear_reservation();
        Ok(())
    }

    /// Repair a vehicle pinned by a stale reservation. Must run inside
    /// the vehicle's lock.
    ///
    /// If the vehicle is DOCKED_RESERVED but its reservation is missing,
    /// CANCELED or EXPIRED (after lazy TTL expiry), the reservation hold
    /// is cleared and the vehicle re-docks as DOCKED_AVAILABLE at its
    /// station. Runs on demand, so no periodic cleanup job is needed.
    async fn reconcile_stale_reservation(&self, vehicle: &mut Vehicle) {
        let Some(reservation_id) = vehicle.active_reservation_id().map(str::to_string) else {
            return;
        };

        let stale = match self.reservations.find_by_id(&reservation_id).await {
            None => {
                warn!(
                    vehicle_id = vehicle.vehicle_id(),
                    reservation_id, "Vehicle pinned by unknown reservation"
                );
                true
            }
            Some(mut reservation) => {
                if reservation.expire_if_due(Utc::now()) {
                    self.reservations.upsert(reservation.clone()).await;
                }
                matches!(
                    reservation.status(),
                    ReservationStatus::Canceled | ReservationStatus::Expired
                )
            }
        };

        if stale {
            vehicle.clear_reservation();
            self.vehicles.upsert(vehicle.clone()).await;
            info!(
                vehicle_id = vehicle.vehicle_id(),
                reservation_id, "Stale reservation cleared, vehicle available again"
            );
        }
    }
}

fn new_reservation_id() -> String {
    format!("RSV-{}", Uuid::new_v4())
}

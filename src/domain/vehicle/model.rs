//! Vehicle domain entity
//!
//! The vehicle is a small state machine. Its state is a tagged enum
//! carrying only the fields valid for that state, so inconsistent
//! combinations ("in use but docked", "reserved without a reservation")
//! are unrepresentable. All mutation goes through the transition
//! methods; flow rules (who may trigger which transition and when) live
//! in the domain service.

use crate::domain::error::{DomainError, DomainResult};

/// Operational state of a vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleState {
    /// Docked at a station and free: can be reserved or unlocked for an
    /// immediate rent.
    DockedAvailable { station_id: String },
    /// Docked but held by a reservation: unlock requires that exact
    /// reservation.
    DockedReserved {
        station_id: String,
        reservation_id: String,
        owner_user_id: String,
    },
    /// Out of the station, on a rental. The rental id makes unlock
    /// retries idempotent.
    InUse { rental_id: String },
}

impl VehicleState {
    /// Wire name of the state, as clients see it.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DockedAvailable { .. } => "DOCKED_AVAILABLE",
            Self::DockedReserved { .. } => "DOCKED_RESERVED",
            Self::InUse { .. } => "IN_USE",
        }
    }
}

/// A rental vehicle and its operational state.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    vehicle_id: String,
    state: VehicleState,
}

impl Vehicle {
    /// Create a vehicle docked and available at `station_id`.
    pub fn docked_at(vehicle_id: impl Into<String>, station_id: impl Into<String>) -> Self {
        let vehicle_id = vehicle_id.into().trim().to_string();
        debug_assert!(!vehicle_id.is_empty(), "vehicleId must not be blank");
        Self {
            vehicle_id,
            state: VehicleState::DockedAvailable {
                station_id: station_id.into().trim().to_string(),
            },
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Station the vehicle is docked at, `None` while IN_USE.
    pub fn current_station_id(&self) -> Option<&str> {
        match &self.state {
            VehicleState::DockedAvailable { station_id }
            | VehicleState::DockedReserved { station_id, .. } => Some(station_id),
            VehicleState::InUse { .. } => None,
        }
    }

    pub fn active_reservation_id(&self) -> Option<&str> {
        match &self.state {
            VehicleState::DockedReserved { reservation_id, .. } => Some(reservation_id),
            _ => None,
        }
    }

    pub fn reservation_owner_user_id(&self) -> Option<&str> {
        match &self.state {
            VehicleState::DockedReserved { owner_user_id, .. } => Some(owner_user_id),
            _ => None,
        }
    }

    pub fn active_rental_id(&self) -> Option<&str> {
        match &self.state {
            VehicleState::InUse { rental_id } => Some(rental_id),
            _ => None,
        }
    }

    // ── Transitions ────────────────────────────────────────────

    /// Force the vehicle to DOCKED_AVAILABLE at `station_id`, dropping
    /// any reservation or rental. Used when repairing stale state and
    /// when seeding.
    pub fn dock_at(&mut self, station_id: impl Into<String>) {
        self.state = VehicleState::DockedAvailable {
            station_id: station_id.into().trim().to_string(),
        };
    }

    /// DOCKED_AVAILABLE → DOCKED_RESERVED, keeping the station.
    pub fn reserve(
        &mut self,
        reservation_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> DomainResult<()> {
        match &self.state {
            VehicleState::DockedAvailable { station_id } => {
                self.state = VehicleState::DockedReserved {
                    station_id: station_id.clone(),
                    reservation_id: reservation_id.into().trim().to_string(),
                    owner_user_id: user_id.into().trim().to_string(),
                };
                Ok(())
            }
            VehicleState::DockedReserved { .. } => Err(DomainError::VehicleAlreadyReserved),
            VehicleState::InUse { .. } => Err(DomainError::VehicleInUse),
        }
    }

    /// DOCKED_RESERVED → DOCKED_AVAILABLE at the same station.
    /// No-op for the other states.
    pub fn clear_reservation(&mut self) {
        if let VehicleState::DockedReserved { station_id, .. } = &self.state {
            self.state = VehicleState::DockedAvailable {
                station_id: station_id.clone(),
            };
        }
    }

    /// DOCKED_AVAILABLE → IN_USE: the vehicle leaves its station.
    /// A reservation must be cleared (consumed or repaired) first.
    pub fn start_rental(&mut self, rental_id: impl Into<String>) -> DomainResult<()> {
        match &self.state {
            VehicleState::DockedAvailable { .. } => {
                self.state = VehicleState::InUse {
                    rental_id: rental_id.into().trim().to_string(),
                };
                Ok(())
            }
            VehicleState::DockedReserved { .. } => Err(DomainError::VehicleNotAvailable),
            VehicleState::InUse { .. } => Err(DomainError::VehicleInUse),
        }
    }

    /// IN_USE → DOCKED_AVAILABLE at `station_id`, closing the rental.
    pub fn end_rental_and_dock(&mut self, station_id: impl Into<String>) -> DomainResult<()> {
        match &self.state {
            VehicleState::InUse { .. } => {
                self.dock_at(station_id);
                Ok(())
            }
            _ => Err(DomainError::VehicleNotInUse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docked() -> Vehicle {
        Vehicle::docked_at("V001", "S01")
    }

    #[test]
    fn new_vehicle_is_docked_available() {
        let v = docked();
        assert_eq!(v.state().code(), "DOCKED_AVAILABLE");
        assert_eq!(v.current_station_id(), Some("S01"));
        assert_eq!(v.active_rental_id(), None);
        assert_eq!(v.active_reservation_id(), None);
    }

    #[test]
    fn reserve_keeps_station_and_records_owner() {
        let mut v = docked();
        v.reserve("RSV-1", "U1").unwrap();
        assert_eq!(v.state().code(), "DOCKED_RESERVED");
        assert_eq!(v.current_station_id(), Some("S01"));
        assert_eq!(v.active_reservation_id(), Some("RSV-1"));
        assert_eq!(v.reservation_owner_user_id(), Some("U1"));
    }

    #[test]
    fn reserve_twice_fails() {
        let mut v = docked();
        v.reserve("RSV-1", "U1").unwrap();
        assert_eq!(
            v.reserve("RSV-2", "U2"),
            Err(DomainError::VehicleAlreadyReserved)
        );
    }

    #[test]
    fn clear_reservation_restores_available_at_same_station() {
        let mut v = docked();
        v.reserve("RSV-1", "U1").unwrap();
        v.clear_reservation();
        assert_eq!(v.state().code(), "DOCKED_AVAILABLE");
        assert_eq!(v.current_station_id(), Some("S01"));
    }

    #[test]
    fn start_rental_leaves_the_station() {
        let mut v = docked();
        v.start_rental("R1").unwrap();
        assert_eq!(v.state().code(), "IN_USE");
        assert_eq!(v.current_station_id(), None);
        assert_eq!(v.active_rental_id(), Some("R1"));
    }

    #[test]
    fn start_rental_requires_available() {
        let mut v = docked();
        v.reserve("RSV-1", "U1").unwrap();
        assert_eq!(v.start_rental("R1"), Err(DomainError::VehicleNotAvailable));
    }

    #[test]
    fn end_rental_docks_at_destination() {
        let mut v = docked();
        v.start_rental("R1").unwrap();
        v.end_rental_and_dock("S02").unwrap();
        assert_eq!(v.state().code(), "DOCKED_AVAILABLE");
        assert_eq!(v.current_station_id(), Some("S02"));
        assert_eq!(v.active_rental_id(), None);
    }

    #[test]
    fn end_rental_on_docked_vehicle_fails() {
        let mut v = docked();
        assert_eq!(
            v.end_rental_and_dock("S02"),
            Err(DomainError::VehicleNotInUse)
        );
    }
}

//! Domain error taxonomy
//!
//! Every business failure in the station domain is one of these variants.
//! The `code()` string is what API clients see in the error body, so the
//! set of codes is part of the external contract — renaming one is a
//! breaking change.

use thiserror::Error;

/// Business failure codes for the station domain.
///
/// Transport concerns (HTTP statuses) live in the API layer; the domain
/// only ever reports one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ── Not found ──────────────────────────────────────────────
    #[error("station not found")]
    StationNotFound,
    #[error("vehicle not found")]
    VehicleNotFound,
    #[error("reservation not found")]
    ReservationNotFound,

    // ── Authorization ──────────────────────────────────────────
    /// The caller does not own the resource (e.g. cancel/unlock with a
    /// userId different from the reservation owner).
    #[error("not authorized")]
    NotAuthorized,

    // ── Station constraints ────────────────────────────────────
    /// The station has no free dock slot left for the vehicle.
    #[error("station is full")]
    StationFull,

    // ── Vehicle constraints / state ────────────────────────────
    /// The vehicle is not docked at the requested station.
    #[error("vehicle is not at the requested station")]
    VehicleNotAtStation,
    /// The vehicle is already out on a rental.
    #[error("vehicle is in use")]
    VehicleInUse,
    /// The vehicle is expected to be in use but is not (e.g. lock on a
    /// docked vehicle).
    #[error("vehicle is not in use")]
    VehicleNotInUse,
    /// Vehicle state incompatible with the requested operation
    /// (unlock without reservation needs DOCKED_AVAILABLE, unlock with
    /// reservation needs DOCKED_RESERVED).
    #[error("vehicle is not available")]
    VehicleNotAvailable,
    /// Reserve attempted on a vehicle that already carries a valid
    /// reservation.
    #[error("vehicle is already reserved")]
    VehicleAlreadyReserved,
    /// Idempotent lock check failed: the vehicle is docked, but at a
    /// different station, so this is not a retry of the same request.
    #[error("vehicle is already docked at another station")]
    VehicleAlreadyDockedElsewhere,
    /// The vehicle is in use under a different rentalId than the one in
    /// the request (two concurrent unlocks with distinct rentals).
    #[error("vehicle is in use by another rental")]
    VehicleInUseByOtherRental,

    // ── Reservation constraints / state ────────────────────────
    /// Reservation does not match the request: wrong station, wrong
    /// vehicle, not the vehicle's active reservation, or not ACTIVE.
    #[error("reservation does not match the request")]
    ReservationMismatch,
    /// The reservation was already consumed by a previous unlock and
    /// cannot be reused or canceled.
    #[error("reservation already consumed")]
    ReservationAlreadyConsumed,

    // ── Rental constraints ─────────────────────────────────────
    /// rentalId missing or inconsistent with the vehicle's active rental.
    #[error("rental does not match")]
    RentalMismatch,
}

impl DomainError {
    /// Stable wire code, serialized as `{"error": "<code>"}` by the API.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StationNotFound => "STATION_NOT_FOUND",
            Self::VehicleNotFound => "VEHICLE_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::StationFull => "STATION_FULL",
            Self::VehicleNotAtStation => "VEHICLE_NOT_AT_STATION",
            Self::VehicleInUse => "VEHICLE_IN_USE",
            Self::VehicleNotInUse => "VEHICLE_NOT_IN_USE",
            Self::VehicleNotAvailable => "VEHICLE_NOT_AVAILABLE",
            Self::VehicleAlreadyReserved => "VEHICLE_ALREADY_RESERVED",
            Self::VehicleAlreadyDockedElsewhere => "VEHICLE_ALREADY_DOCKED_ELSEWHERE",
            Self::VehicleInUseByOtherRental => "VEHICLE_IN_USE_BY_OTHER_RENTAL",
            Self::ReservationMismatch => "RESERVATION_MISMATCH",
            Self::ReservationAlreadyConsumed => "RESERVATION_ALREADY_CONSUMED",
            Self::RentalMismatch => "RENTAL_MISMATCH",
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        // Spot-check the contract codes clients and tests rely on.
        assert_eq!(DomainError::StationNotFound.code(), "STATION_NOT_FOUND");
        assert_eq!(
            DomainError::VehicleInUseByOtherRental.code(),
            "VEHICLE_IN_USE_BY_OTHER_RENTAL"
        );
        assert_eq!(
            DomainError::ReservationAlreadyConsumed.code(),
            "RESERVATION_ALREADY_CONSUMED"
        );
        assert_eq!(DomainError::RentalMismatch.code(), "RENTAL_MISMATCH");
    }
}

//! Station domain — entities, ports and the domain service.

pub mod dispatcher;
pub mod error;
pub mod reservation;
pub mod service;
pub mod station;
pub mod vehicle;

pub use dispatcher::VehicleCommandDispatcher;
pub use error::{DomainError, DomainResult};
pub use reservation::{Reservation, ReservationStatus, ReservationStore};
pub use service::{LockOutcome, StationService, UnlockOutcome};
pub use station::{Station, StationStore};
pub use vehicle::{Vehicle, VehicleState, VehicleStore};

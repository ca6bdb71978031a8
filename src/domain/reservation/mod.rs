//! Reservation entity and its persistence port

pub mod model;
pub mod store;

pub use model::{Reservation, ReservationStatus};
pub use store::ReservationStore;

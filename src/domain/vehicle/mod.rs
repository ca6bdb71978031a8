//! Vehicle entity, state machine and persistence port

pub mod model;
pub mod store;

pub use model::{Vehicle, VehicleState};
pub use store::VehicleStore;

//! Station entity and its persistence port

pub mod model;
pub mod store;

pub use model::Station;
pub use store::StationStore;

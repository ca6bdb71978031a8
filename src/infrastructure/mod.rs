//! Infrastructure adapters — in-memory stores, the per-vehicle lock
//! manager and the actuation command channel.

pub mod dispatcher;
pub mod lock;
pub mod memory;

pub use dispatcher::{
    ChannelCommandDispatcher, CommandChannelRegistry, SharedChannelRegistry, VehicleCommand,
};
pub use lock::{SharedVehicleLockManager, VehicleLockManager};
pub use memory::{
    seed_demo_data, InMemoryReservationStore, InMemoryStationStore, InMemoryVehicleStore,
};

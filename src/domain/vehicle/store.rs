//! Vehicle persistence port

use async_trait::async_trait;

use super::model::Vehicle;

/// Storage port for vehicles.
///
/// The store protects its own map; it does NOT serialize competing
/// mutations of the same vehicle. Every write for a given vehicle id
/// must happen inside the vehicle's lock scope (see
/// `infrastructure::lock::VehicleLockManager`).
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn find_by_id(&self, vehicle_id: &str) -> Option<Vehicle>;

    /// Insert-or-replace, keyed by the trimmed vehicle id.
    async fn upsert(&self, vehicle: Vehicle);

    /// All vehicles, sorted by id for deterministic listings.
    async fn find_all(&self) -> Vec<Vehicle>;

    /// Number of vehicles occupying a dock slot at `station_id`
    /// (DOCKED_AVAILABLE or DOCKED_RESERVED). Supports the station
    /// capacity check when docking.
    async fn count_docked_at(&self, station_id: &str) -> u32;
}

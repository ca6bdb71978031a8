//! Outbound port toward the fleet-control channel
//!
//! The domain service signals physical lock/unlock intents through this
//! port after committing a state transition. Delivery is best-effort:
//! implementations log failures and never propagate them back into the
//! domain — the persisted vehicle state is the source of truth and the
//! physical actuation is eventually consistent with it.

use async_trait::async_trait;

/// Relays physical lock/unlock commands to a vehicle's actuation channel.
#[async_trait]
pub trait VehicleCommandDispatcher: Send + Sync {
    /// Tell the vehicle to unlock and head toward the destination
    /// coordinates.
    async fn send_unlock_command(&self, vehicle_id: &str, dest_lat: f64, dest_lon: f64);

    /// Tell the vehicle to lock in place.
    async fn send_lock_command(&self, vehicle_id: &str);
}

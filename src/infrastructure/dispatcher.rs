//! Vehicle command channel — registry and dispatcher
//!
//! Carries physical lock/unlock intents from the domain to whatever is
//! actuating vehicles (a fleet gateway, a simulator, a test harness).
//! Channels are keyed by vehicle id: an actuation client subscribes a
//! bounded receiver for its vehicle, and the dispatcher publishes into
//! it with a bounded timeout. Delivery is best-effort; a slow, full or
//! missing channel is logged and never fails the domain operation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::dispatcher::VehicleCommandDispatcher;

/// Capacity of each per-vehicle command channel.
const CHANNEL_CAPACITY: usize = 16;

/// A physical command for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleCommand {
    /// Unlock and ride toward the destination coordinates.
    Unlock { dest_lat: f64, dest_lon: f64 },
    /// Lock in place.
    Lock,
}

/// Thread-safe registry of per-vehicle actuation channels.
pub struct CommandChannelRegistry {
    channels: DashMap<String, mpsc::Sender<VehicleCommand>>,
}

/// Shared, reference-counted channel registry
pub type SharedChannelRegistry = Arc<CommandChannelRegistry>;

impl CommandChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedChannelRegistry {
        Arc::new(Self::new())
    }

    /// Open the actuation channel for a vehicle, replacing any previous
    /// subscriber.
    pub fn subscribe(&self, vehicle_id: &str) -> mpsc::Receiver<VehicleCommand> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        info!(vehicle_id, "Actuation channel subscribed");
        self.channels.insert(vehicle_id.trim().to_string(), tx);
        rx
    }

    pub fn unsubscribe(&self, vehicle_id: &str) {
        if self.channels.remove(vehicle_id.trim()).is_some() {
            info!(vehicle_id, "Actuation channel unsubscribed");
        }
    }

    pub fn is_subscribed(&self, vehicle_id: &str) -> bool {
        self.channels.contains_key(vehicle_id.trim())
    }

    fn sender_for(&self, vehicle_id: &str) -> Option<mpsc::Sender<VehicleCommand>> {
        // Clone the sender out so no map guard is held across an await.
        self.channels.get(vehicle_id.trim()).map(|e| e.clone())
    }
}

impl Default for CommandChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatcher publishing into the channel registry.
pub struct ChannelCommandDispatcher {
    registry: SharedChannelRegistry,
    send_timeout: Duration,
}

impl ChannelCommandDispatcher {
    pub fn new(registry: SharedChannelRegistry, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    async fn publish(&self, vehicle_id: &str, command: VehicleCommand) {
        let Some(sender) = self.registry.sender_for(vehicle_id) else {
            debug!(vehicle_id, ?command, "No actuation channel, command dropped");
            return;
        };

        match sender.send_timeout(command, self.send_timeout).await {
            Ok(()) => debug!(vehicle_id, "Command delivered"),
            Err(mpsc::error::SendTimeoutError::Timeout(cmd)) => {
                warn!(vehicle_id, ?cmd, "Command delivery timed out, dropped");
            }
            Err(mpsc::error::SendTimeoutError::Closed(cmd)) => {
                warn!(vehicle_id, ?cmd, "Actuation channel closed, dropped");
                self.registry.unsubscribe(vehicle_id);
            }
        }
    }
}

#[async_trait]
impl VehicleCommandDispatcher for ChannelCommandDispatcher {
    async fn send_unlock_command(&self, vehicle_id: &str, dest_lat: f64, dest_lon: f64) {
        self.publish(vehicle_id, VehicleCommand::Unlock { dest_lat, dest_lon })
            .await;
    }

    async fn send_lock_command(&self, vehicle_id: &str) {
        self.publish(vehicle_id, VehicleCommand::Lock).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(registry: SharedChannelRegistry) -> ChannelCommandDispatcher {
        ChannelCommandDispatcher::new(registry, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn delivers_to_subscribed_channel() {
        let registry = CommandChannelRegistry::shared();
        let mut rx = registry.subscribe("V001");

        dispatcher(registry)
            .send_unlock_command("V001", 44.49, 11.34)
            .await;

        assert_eq!(
            rx.recv().await,
            Some(VehicleCommand::Unlock {
                dest_lat: 44.49,
                dest_lon: 11.34
            })
        );
    }

    #[tokio::test]
    async fn missing_channel_is_a_silent_drop() {
        let registry = CommandChannelRegistry::shared();
        // Must not block or error.
        dispatcher(registry).send_lock_command("V404").await;
    }

    #[tokio::test]
    async fn closed_channel_is_unsubscribed() {
        let registry = CommandChannelRegistry::shared();
        let rx = registry.subscribe("V001");
        drop(rx);

        dispatcher(registry.clone()).send_lock_command("V001").await;
        assert!(!registry.is_subscribed("V001"));
    }

    #[tokio::test]
    async fn full_channel_times_out_without_stalling() {
        let registry = CommandChannelRegistry::shared();
        let _rx = registry.subscribe("V001");
        let d = dispatcher(registry);

        let start = std::time::Instant::now();
        // One more than the channel holds, never drained.
        for _ in 0..=CHANNEL_CAPACITY {
            d.send_lock_command("V001").await;
        }
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}

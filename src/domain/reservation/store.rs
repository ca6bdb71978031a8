//! Reservation persistence port

use async_trait::async_trait;

use super::model::Reservation;

/// Storage port for reservations.
///
/// Reservations are never deleted here; terminal ones simply stay in
/// the store with their final status.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_by_id(&self, reservation_id: &str) -> Option<Reservation>;

    /// Insert-or-replace, keyed by the trimmed reservation id.
    async fn upsert(&self, reservation: Reservation);
}

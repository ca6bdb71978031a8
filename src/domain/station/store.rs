//! Station persistence port

use async_trait::async_trait;

use super::model::Station;

/// Storage port for stations.
///
/// Pure data holder: lookups return `None` on miss (never an error) and
/// `upsert` is insert-or-replace keyed by the trimmed station id, which
/// makes station creation idempotent. Business rules live in the domain
/// service, never here.
#[async_trait]
pub trait StationStore: Send + Sync {
    async fn find_by_id(&self, station_id: &str) -> Option<Station>;

    async fn upsert(&self, station: Station);

    /// All stations, sorted by id for deterministic listings.
    async fn find_all(&self) -> Vec<Station>;
}

//! In-memory store implementations
//!
//! DashMap-backed stores for development and testing. The maps protect
//! their own structure; serialization of competing writes to the same
//! vehicle is the domain service's job via the per-vehicle lock.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::reservation::{Reservation, ReservationStore};
use crate::domain::station::{Station, StationStore};
use crate::domain::vehicle::{Vehicle, VehicleStore};

fn normalize(id: &str) -> Option<&str> {
    let trimmed = id.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// In-memory station store
pub struct InMemoryStationStore {
    stations: DashMap<String, Station>,
}

impl InMemoryStationStore {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
        }
    }

    pub fn clear(&self) {
        self.stations.clear();
    }
}

impl Default for InMemoryStationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StationStore for InMemoryStationStore {
    async fn find_by_id(&self, station_id: &str) -> Option<Station> {
        let id = normalize(station_id)?;
        self.stations.get(id).map(|s| s.clone())
    }

    async fn upsert(&self, station: Station) {
        self.stations
            .insert(station.station_id().to_string(), station);
    }

    async fn find_all(&self) -> Vec<Station> {
        let mut all: Vec<Station> = self.stations.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.station_id().cmp(b.station_id()));
        all
    }
}

/// In-memory vehicle store
pub struct InMemoryVehicleStore {
    vehicles: DashMap<String, Vehicle>,
}

impl InMemoryVehicleStore {
    pub fn new() -> Self {
        Self {
            vehicles: DashMap::new(),
        }
    }

    pub fn clear(&self) {
        self.vehicles.clear();
    }
}

impl Default for InMemoryVehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleStore for InMemoryVehicleStore {
    async fn find_by_id(&self, vehicle_id: &str) -> Option<Vehicle> {
        let id = normalize(vehicle_id)?;
        self.vehicles.get(id).map(|v| v.clone())
    }

    async fn upsert(&self, vehicle: Vehicle) {
        self.vehicles
            .insert(vehicle.vehicle_id().to_string(), vehicle);
    }

    async fn find_all(&self) -> Vec<Vehicle> {
        let mut all: Vec<Vehicle> = self.vehicles.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.vehicle_id().cmp(b.vehicle_id()));
        all
    }

    async fn count_docked_at(&self, station_id: &str) -> u32 {
        let Some(id) = normalize(station_id) else {
            return 0;
        };
        self.vehicles
            .iter()
            .filter(|v| v.current_station_id() == Some(id))
            .count() as u32
    }
}

/// In-memory reservation store
pub struct InMemoryReservationStore {
    reservations: DashMap<String, Reservation>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
        }
    }

    pub fn clear(&self) {
        self.reservations.clear();
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn find_by_id(&self, reservation_id: &str) -> Option<Reservation> {
        let id = normalize(reservation_id)?;
        self.reservations.get(id).map(|r| r.clone())
    }

    async fn upsert(&self, reservation: Reservation) {
        self.reservations
            .insert(reservation.reservation_id().to_string(), reservation);
    }
}

/// Seed the demo fleet: stations S01–S05 around Bologna, vehicles
/// V001–V010 docked round-robin across them.
pub async fn seed_demo_data(stations: &InMemoryStationStore, vehicles: &InMemoryVehicleStore) {
    let demo_stations = [
        Station::new("S01", 44.4949, 11.3426), // Piazza Maggiore
        Station::new("S02", 44.5070, 11.3510), // Stazione Centrale
        Station::new("S03", 44.4795, 11.3300), // Stadio
        Station::new("S04", 44.5005, 11.3170), // Ospedale Maggiore
        Station::new("S05", 44.5170, 11.3235), // Fiera
    ];
    for station in demo_stations {
        stations.upsert(station).await;
    }

    for i in 1..=10u32 {
        let vehicle_id = format!("V{:03}", i);
        let station_id = format!("S{:02}", ((i - 1) % 5) + 1);
        vehicles.upsert(Vehicle::docked_at(vehicle_id, station_id)).await;
    }

    tracing::info!("Seeded demo data: 5 stations, 10 vehicles");
}

//! Station domain entity

/// A docking station.
///
/// Stations are small, effectively immutable records: an identifier,
/// the geo position used as unlock destination, and an optional dock
/// capacity. `capacity: None` means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    station_id: String,
    lat: f64,
    lon: f64,
    capacity: Option<u32>,
}

impl Station {
    pub fn new(station_id: impl Into<String>, lat: f64, lon: f64) -> Self {
        let station_id = station_id.into().trim().to_string();
        debug_assert!(!station_id.is_empty(), "stationId must not be blank");
        Self {
            station_id,
            lat,
            lon,
            capacity: None,
        }
    }

    /// Limit the number of dock slots at this station.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_trimmed() {
        let s = Station::new("  S01 ", 44.49, 11.34);
        assert_eq!(s.station_id(), "S01");
        assert_eq!(s.capacity(), None);
    }

    #[test]
    fn capacity_is_optional() {
        let s = Station::new("S02", 44.50, 11.35).with_capacity(4);
        assert_eq!(s.capacity(), Some(4));
    }
}

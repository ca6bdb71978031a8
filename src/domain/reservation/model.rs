//! Reservation domain entity

use chrono::{DateTime, Utc};

/// Reservation status.
///
/// CANCELED, CONSUMED and EXPIRED are terminal: once reached, the status
/// never changes again. Transitions are owned by the domain service and
/// expressed through the methods on [`Reservation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    /// Valid and usable for unlock.
    Active,
    /// Canceled by its owner (terminal).
    Canceled,
    /// Used by an unlock (terminal).
    Consumed,
    /// Past its TTL (terminal).
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Canceled => "CANCELED",
            Self::Consumed => "CONSUMED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hold on a specific vehicle at a specific station.
///
/// Identity fields are immutable after creation; only the status moves,
/// and only out of `Active`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    reservation_id: String,
    station_id: String,
    vehicle_id: String,
    user_id: String,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
    /// `None` means no TTL: the reservation never expires on its own.
    expires_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn new_active(
        reservation_id: impl Into<String>,
        station_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        user_id: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            reservation_id: reservation_id.into().trim().to_string(),
            station_id: station_id.into().trim().to_string(),
            vehicle_id: vehicle_id.into().trim().to_string(),
            user_id: user_id.into().trim().to_string(),
            status: ReservationStatus::Active,
            created_at,
            expires_at,
        }
    }

    pub fn reservation_id(&self) -> &str {
        &self.reservation_id
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// TTL check: true once `now` is past `expires_at`.
    pub fn is_past_ttl(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(deadline) if now > deadline)
    }

    /// Lazy expiry: ACTIVE and past TTL → EXPIRED. Returns true if the
    /// status changed (caller must persist).
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == ReservationStatus::Active && self.is_past_ttl(now) {
            self.status = ReservationStatus::Expired;
            return true;
        }
        false
    }

    /// ACTIVE → CANCELED. No-op from any terminal status.
    pub fn cancel(&mut self) {
        if self.status == ReservationStatus::Active {
            self.status = ReservationStatus::Canceled;
        }
    }

    /// ACTIVE → CONSUMED. No-op from any terminal status.
    pub fn consume(&mut self) {
        if self.status == ReservationStatus::Active {
            self.status = ReservationStatus::Consumed;
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != ReservationStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_in: Duration) -> Reservation {
        let now = Utc::now();
        Reservation::new_active("RSV-1", "S01", "V001", "U1", now, Some(now + expires_in))
    }

    #[test]
    fn new_reservation_is_active() {
        let r = sample(Duration::minutes(30));
        assert_eq!(r.status(), ReservationStatus::Active);
        assert!(!r.is_terminal());
        assert!(!r.is_past_ttl(Utc::now()));
    }

    #[test]
    fn expire_if_due_flips_active_past_ttl() {
        let mut r = sample(Duration::minutes(-5));
        assert!(r.expire_if_due(Utc::now()));
        assert_eq!(r.status(), ReservationStatus::Expired);
        // Second call reports no change.
        assert!(!r.expire_if_due(Utc::now()));
    }

    #[test]
    fn no_ttl_never_expires() {
        let mut r =
            Reservation::new_active("RSV-2", "S01", "V001", "U1", Utc::now(), None);
        assert!(!r.expire_if_due(Utc::now() + Duration::days(365)));
        assert_eq!(r.status(), ReservationStatus::Active);
    }

    #[test]
    fn terminal_statuses_are_frozen() {
        let mut r = sample(Duration::minutes(30));
        r.consume();
        assert_eq!(r.status(), ReservationStatus::Consumed);
        r.cancel();
        assert_eq!(r.status(), ReservationStatus::Consumed);
        assert!(!r.expire_if_due(Utc::now() + Duration::days(1)));
        assert_eq!(r.status(), ReservationStatus::Consumed);
    }

    #[test]
    fn cancel_from_active() {
        let mut r = sample(Duration::minutes(30));
        r.cancel();
        assert_eq!(r.status(), ReservationStatus::Canceled);
        assert!(r.is_terminal());
    }
}

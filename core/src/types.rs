//! Domain types for bookings and the service catalog.
//!
//! Identifiers are UUID newtypes, amounts are non-negative integer minor
//! units, and every persisted booking carries a [`Version`] for optimistic
//! concurrency control.

use crate::error::BookingError;
use crate::policy::CancellationDecision;
use crate::status::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (client or expert)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a catalog service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Creates a new random `ServiceId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ServiceId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Monetary amount in minor units
///
/// Never negative. Signed input from the outside world goes through
/// [`Money::try_from_signed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from minor units
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Validates a signed amount
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if `amount` is negative.
    pub fn try_from_signed(amount: i64) -> Result<Self, BookingError> {
        u64::try_from(amount)
            .map(Self)
            .map_err(|_| BookingError::Validation(format!("amount must not be negative (got {amount})")))
    }

    /// Returns the amount in minor units
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revision counter used for optimistic concurrency control
///
/// A freshly created booking is at [`Version::INITIAL`]; every successful
/// save moves it to [`Version::next`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Version of a booking that has just been created.
    pub const INITIAL: Self = Self(1);

    /// Create a new `Version` with the given value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Get the next version (current + 1).
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Outcome recorded on a booking when it is cancelled
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRecord {
    /// Whether the full price was charged
    pub chargeable: bool,
    /// Fee charged to the client
    pub fee: Money,
    /// Hours between cancellation and the scheduled start
    pub hours_remaining: f64,
    /// Optional reason given by the client
    pub reason: Option<String>,
    /// When the booking was cancelled
    pub cancelled_at: DateTime<Utc>,
}

impl CancellationRecord {
    /// Builds a record from a policy decision
    #[must_use]
    pub const fn from_decision(
        decision: &CancellationDecision,
        reason: Option<String>,
        cancelled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            chargeable: decision.chargeable,
            fee: decision.fee,
            hours_remaining: decision.hours_remaining,
            reason,
            cancelled_at,
        }
    }
}

/// A scheduled service between a client and an expert
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier
    pub id: BookingId,
    /// Client who requested the service
    pub client_id: UserId,
    /// Expert performing the service
    pub expert_id: UserId,
    /// Catalog service being booked
    pub service_id: ServiceId,
    /// When the appointment starts
    pub scheduled_start: DateTime<Utc>,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Amount owed for the service
    pub price: Money,
    /// Free-text notes from the client
    pub notes: Option<String>,
    /// Set once the booking is cancelled
    pub cancellation: Option<CancellationRecord>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// When the booking last changed
    pub updated_at: DateTime<Utc>,
    /// Revision for optimistic concurrency
    pub version: Version,
}

impl Booking {
    /// Creates a new booking in `pending`
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: BookingId,
        client_id: UserId,
        expert_id: UserId,
        service_id: ServiceId,
        scheduled_start: DateTime<Utc>,
        price: Money,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            expert_id,
            service_id,
            scheduled_start,
            status: BookingStatus::Pending,
            price,
            notes,
            cancellation: None,
            created_at,
            updated_at: created_at,
            version: Version::INITIAL,
        }
    }

    /// Fee charged at cancellation, if the booking was cancelled
    #[must_use]
    pub fn fee_charged(&self) -> Option<Money> {
        self.cancellation.as_ref().map(|record| record.fee)
    }
}

/// Service offered in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Unique identifier
    pub id: ServiceId,
    /// Display name
    pub name: String,
    /// What the service includes
    pub description: String,
    /// Price charged for one booking
    pub price: Money,
    /// Expected duration in minutes
    pub duration_minutes: u32,
    /// Whether new bookings are accepted
    pub active: bool,
}

impl Service {
    /// Creates a validated, active catalog entry
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if the name is blank or the
    /// duration is zero.
    pub fn new(
        id: ServiceId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        duration_minutes: u32,
    ) -> Result<Self, BookingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BookingError::Validation("service name cannot be empty".to_string()));
        }
        if duration_minutes == 0 {
            return Err(BookingError::Validation(
                "service duration must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            id,
            name,
            description: description.into(),
            price,
            duration_minutes,
            active: true,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn money_rejects_negative_amounts() {
        assert_eq!(Money::try_from_signed(180_000).unwrap(), Money::new(180_000));
        assert!(matches!(
            Money::try_from_signed(-1),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn money_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::new(220_000)).unwrap();
        assert_eq!(json, "220000");
    }

    #[test]
    fn new_booking_starts_pending_at_initial_version() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 8, 0, 0).unwrap();
        let booking = Booking::new(
            BookingId::new(),
            UserId::new(),
            UserId::new(),
            ServiceId::new(),
            now + chrono::Duration::hours(13),
            Money::new(180_000),
            None,
            now,
        );

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.version, Version::INITIAL);
        assert_eq!(booking.updated_at, now);
        assert_eq!(booking.fee_charged(), None);
    }

    #[test]
    fn service_requires_name_and_duration() {
        assert!(Service::new(ServiceId::new(), "  ", "", Money::ZERO, 60).is_err());
        assert!(Service::new(ServiceId::new(), "Deep clean", "", Money::ZERO, 0).is_err());

        let service =
            Service::new(ServiceId::new(), "Deep clean", "Kitchen and bath", Money::new(180_000), 240)
                .unwrap();
        assert!(service.active);
    }

    #[test]
    fn version_advances_by_one() {
        assert_eq!(Version::INITIAL.next(), Version::new(2));
    }
}

//! # Broom Fairy Testing
//!
//! Test doubles and helpers for the booking core.
//!
//! This crate provides:
//! - Deterministic clocks and a recording notifier ([`mocks`])
//! - In-memory repositories with real compare-and-swap semantics ([`in_memory`])
//! - A Given-When-Then builder for reducers ([`ReducerTest`])
//! - proptest strategies for domain types ([`properties`])
//!
//! The in-memory repositories double as the development storage backend of
//! the server.
//!
//! ## Example
//!
//! ```
//! use broom_fairy_core::environment::Clock;
//! use broom_fairy_testing::{test_clock, in_memory::InMemoryBookingRepository};
//!
//! let clock = test_clock();
//! assert_eq!(clock.now(), clock.now());
//!
//! let repository = InMemoryBookingRepository::new();
//! assert!(repository.is_empty());
//! ```

use broom_fairy_core::environment::{BookingNotifier, Clock};
use broom_fairy_core::notification::BookingNotification;
use chrono::{DateTime, Utc};

/// In-memory booking and catalog storage
pub mod in_memory;


/// Mock implementations of environment traits.
pub mod mocks {
    use super::{BookingNotification, BookingNotifier, Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    /// Clock pinned to an instant that tests can move by hand
    ///
    /// Clones share the same instant, so advancing one advances all of them.
    ///
    /// # Example
    ///
    /// ```
    /// use broom_fairy_testing::mocks::FixedClock;
    /// use broom_fairy_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = FixedClock::new(start);
    /// assert_eq!(clock.now(), clock.now());
    ///
    /// clock.advance(Duration::hours(2));
    /// assert_eq!(clock.now(), start + Duration::hours(2));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock to `time`
        pub fn set(&self, time: DateTime<Utc>) {
            if let Ok(mut current) = self.time.lock() {
                *current = time;
            }
        }

        /// Move the clock forward by `by`
        pub fn advance(&self, by: Duration) {
            if let Ok(mut current) = self.time.lock() {
                *current += by;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            match self.time.lock() {
                Ok(time) => *time,
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }

    /// Create a default fixed clock for tests (2025-05-02 08:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-05-02T08:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Notifier that keeps every published notification
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        published: Arc<Mutex<Vec<BookingNotification>>>,
    }

    impl RecordingNotifier {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of everything published so far, oldest first
        #[must_use]
        pub fn published(&self) -> Vec<BookingNotification> {
            match self.published.lock() {
                Ok(published) => published.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }
    }

    impl BookingNotifier for RecordingNotifier {
        fn publish(&self, notification: BookingNotification) {
            if let Ok(mut published) = self.published.lock() {
                published.push(notification);
            }
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use broom_fairy_core::status::BookingStatus;
    use broom_fairy_core::types::Money;
    use chrono::Duration;
    use proptest::prelude::*;

    /// Any booking status
    pub fn any_status() -> impl Strategy<Value = BookingStatus> {
        prop::sample::select(BookingStatus::ALL.to_vec())
    }

    /// Statuses with no outgoing transitions
    pub fn terminal_status() -> impl Strategy<Value = BookingStatus> {
        prop::sample::select(vec![BookingStatus::Completed, BookingStatus::Cancelled])
    }

    /// Prices up to 100 million minor units
    pub fn any_price() -> impl Strategy<Value = Money> {
        (0u64..100_000_000).prop_map(Money::new)
    }

    /// Lead time between now and a scheduled start, from a week in the past
    /// to a month ahead, in whole minutes
    pub fn lead_time() -> impl Strategy<Value = Duration> {
        (-10_080i64..43_200).prop_map(Duration::minutes)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RecordingNotifier, test_clock};
pub use reducer_test::ReducerTest;

#[cfg(test)]
mod tests {
    use super::*;
    use broom_fairy_core::notification::NotificationKind;
    use broom_fairy_core::status::BookingStatus;
    use broom_fairy_core::types::BookingId;

    #[test]
    fn fixed_clock_is_stable_until_advanced() {
        let clock = test_clock();
        let first = clock.now();
        assert_eq!(first, clock.now());

        let shared = clock.clone();
        shared.advance(chrono::Duration::minutes(30));
        assert_eq!(clock.now(), first + chrono::Duration::minutes(30));
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        let clock = test_clock();
        for kind in [NotificationKind::Created, NotificationKind::Cancelled] {
            notifier.publish(BookingNotification {
                kind,
                booking_id: BookingId::new(),
                status: BookingStatus::Pending,
                fee_charged: None,
                occurred_at: clock.now(),
            });
        }

        let kinds: Vec<_> = notifier.published().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Created, NotificationKind::Cancelled]);
    }
}

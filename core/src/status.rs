//! Booking status and the transition guard.
//!
//! The lifecycle is an explicit table: a status may only move along the
//! edges returned by [`BookingStatus::allowed_transitions`]. Everything else,
//! including staying in place, is rejected with
//! [`BookingError::InvalidTransition`].
//!
//! ```text
//! pending ──► confirmed ──► in_progress ──► completed
//!    │            │              │              ▲
//!    │            │              ▼              │
//!    │            │          disputed ──────────┘
//!    ▼            ▼              │
//! cancelled ◄─────┴──────────────┘
//! ```

use crate::error::BookingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested by a client, awaiting expert confirmation
    Pending,
    /// Accepted by the expert
    Confirmed,
    /// Service is underway
    InProgress,
    /// Service finished (terminal)
    Completed,
    /// Booking called off (terminal)
    Cancelled,
    /// Outcome contested by one of the parties
    Disputed,
}

impl BookingStatus {
    /// Every status, in lifecycle order
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Disputed,
    ];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses reachable in one step from `self`
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Disputed],
            Self::Disputed => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `self → next` is an edge of the transition table
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Validates `self → next`
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] when the edge is not in
    /// the table.
    pub fn transition_to(self, next: Self) -> Result<Self, BookingError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BookingError::InvalidTransition {
                current: self,
                requested: next,
            })
        }
    }
}

/// Validates a transition from `current` to `requested`
///
/// # Errors
///
/// Returns [`BookingError::InvalidTransition`] for any move not in the
/// transition table, self-transitions included.
pub fn guard(current: BookingStatus, requested: BookingStatus) -> Result<BookingStatus, BookingError> {
    current.transition_to(requested)
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BookingError::Validation(format!("unknown booking status: {s}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = BookingStatus> {
        prop::sample::select(BookingStatus::ALL.to_vec())
    }

    #[test]
    fn legal_table() {
        use BookingStatus::{Cancelled, Completed, Confirmed, Disputed, InProgress, Pending};
        let legal = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, InProgress),
            (Confirmed, Cancelled),
            (InProgress, Completed),
            (InProgress, Disputed),
            (Disputed, Completed),
            (Disputed, Cancelled),
        ];

        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    guard(from, to).is_ok(),
                    expected,
                    "{from} -> {to} should be {}",
                    if expected { "legal" } else { "illegal" }
                );
            }
        }
    }

    #[test]
    fn pending_cannot_skip_to_in_progress() {
        let err = guard(BookingStatus::Pending, BookingStatus::InProgress).unwrap_err();
        assert_eq!(
            err,
            BookingError::InvalidTransition {
                current: BookingStatus::Pending,
                requested: BookingStatus::InProgress,
            }
        );
    }

    #[test]
    fn disputed_cannot_go_back_to_confirmed() {
        assert!(guard(BookingStatus::Disputed, BookingStatus::Confirmed).is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Disputed.is_terminal());
    }

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        assert!("archived".parse::<BookingStatus>().is_err());
    }

    proptest! {
        #[test]
        fn self_transitions_are_rejected(status in any_status()) {
            let rejected = matches!(
                guard(status, status),
                Err(BookingError::InvalidTransition { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn terminal_statuses_reject_everything(
            terminal in prop::sample::select(vec![BookingStatus::Completed, BookingStatus::Cancelled]),
            requested in any_status(),
        ) {
            prop_assert!(guard(terminal, requested).is_err());
        }

        #[test]
        fn accepted_transitions_return_the_requested_status(
            from in any_status(),
            to in any_status(),
        ) {
            if let Ok(next) = guard(from, to) {
                prop_assert_eq!(next, to);
                prop_assert!(from.can_transition_to(to));
            }
        }
    }
}

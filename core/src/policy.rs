//! Cancellation-fee policy.
//!
//! Cancelling inside the free window costs the full price; cancelling at or
//! beyond it is free. The policy never reads a clock: `now` is always passed
//! in by the caller, so the same inputs always produce the same decision.

use crate::types::Money;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default free-cancellation window in hours
pub const DEFAULT_FREE_WINDOW_HOURS: u32 = 12;

/// Fee liability computed for a cancellation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationDecision {
    /// Whether the client owes the fee
    pub chargeable: bool,
    /// Amount owed: the full price when chargeable, zero otherwise
    pub fee: Money,
    /// Hours between `now` and the scheduled start; negative once started
    pub hours_remaining: f64,
}

/// Cancellation rule with a configurable free window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancellationPolicy {
    free_window: Duration,
}

impl CancellationPolicy {
    /// Policy with a free window of `hours`
    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        Self {
            free_window: Duration::hours(i64::from(hours)),
        }
    }

    /// Length of the free window
    #[must_use]
    pub const fn free_window(&self) -> Duration {
        self.free_window
    }

    /// Evaluates fee liability for cancelling at `now`
    ///
    /// Chargeable when strictly less than the free window remains. Exactly
    /// the window is free; a start time already in the past is chargeable.
    #[must_use]
    pub fn evaluate(
        &self,
        scheduled_start: DateTime<Utc>,
        now: DateTime<Utc>,
        price: Money,
    ) -> CancellationDecision {
        let remaining = scheduled_start.signed_duration_since(now);
        let chargeable = remaining < self.free_window;

        #[allow(clippy::cast_precision_loss)]
        let hours_remaining = remaining.num_milliseconds() as f64 / 3_600_000.0;

        CancellationDecision {
            chargeable,
            fee: if chargeable { price } else { Money::ZERO },
            hours_remaining,
        }
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::from_hours(DEFAULT_FREE_WINDOW_HOURS)
    }
}

//! Domain error taxonomy.
//!
//! Every failure a booking operation can report. None of them is fatal: the
//! request boundary turns each kind into a structured response.

use crate::status::BookingStatus;
use crate::types::{BookingId, ServiceId, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by booking operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    /// Booking does not exist
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// Catalog service does not exist or is inactive
    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    /// Requested status change is not in the transition table
    #[error("Invalid transition from {current} to {requested}")]
    InvalidTransition {
        /// Status the booking is in
        current: BookingStatus,
        /// Status that was requested
        requested: BookingStatus,
    },

    /// Booking was modified since it was loaded
    #[error("Version conflict for booking {booking_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Booking being saved
        booking_id: BookingId,
        /// Version the caller loaded
        expected: Version,
        /// Version currently stored
        actual: Version,
    },

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity with the same identifier already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Persistence backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BookingError {
    /// Stable machine-readable code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_both_statuses() {
        let err = BookingError::InvalidTransition {
            current: BookingStatus::Pending,
            requested: BookingStatus::InProgress,
        };
        assert_eq!(err.to_string(), "Invalid transition from pending to in_progress");
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[test]
    fn version_conflict_code() {
        let err = BookingError::VersionConflict {
            booking_id: BookingId::new(),
            expected: Version::new(1),
            actual: Version::new(2),
        };
        assert_eq!(err.code(), "VERSION_CONFLICT");
        assert!(err.to_string().contains("expected 1, found 2"));
    }
}

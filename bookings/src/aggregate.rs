//! Booking aggregate.
//!
//! Commands are validated against the status guard and the cancellation
//! policy, turned into events, and the events are applied to state. Every
//! applied event yields one effect that publishes a [`BookingNotification`].
//! Rejected commands leave the bookings untouched and set `last_error`.

use broom_fairy_core::environment::{BookingNotifier, Clock};
use broom_fairy_core::error::BookingError;
use broom_fairy_core::notification::{BookingNotification, NotificationKind};
use broom_fairy_core::policy::{CancellationDecision, CancellationPolicy};
use broom_fairy_core::status::{BookingStatus, guard};
use broom_fairy_core::types::{Booking, BookingId, CancellationRecord, Service, UserId};
use broom_fairy_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Longest accepted note, in characters
pub const MAX_NOTES_LEN: usize = 2_000;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the booking aggregate
#[derive(Clone, Debug, PartialEq)]
pub enum BookingAction {
    // Commands
    /// Request a new booking
    CreateBooking {
        /// Identifier for the new booking
        booking_id: BookingId,
        /// Client requesting the service
        client_id: UserId,
        /// Expert performing it
        expert_id: UserId,
        /// Catalog entry being booked; its price is copied onto the booking
        service: Service,
        /// Appointment start
        scheduled_start: DateTime<Utc>,
        /// Free-text notes
        notes: Option<String>,
    },

    /// Move a booking along its lifecycle (any target except `cancelled`)
    ChangeStatus {
        /// Booking to update
        booking_id: BookingId,
        /// Target status
        requested: BookingStatus,
    },

    /// Cancel a booking, charging the fee the policy decides
    CancelBooking {
        /// Booking to cancel
        booking_id: BookingId,
        /// Optional reason given by the client
        reason: Option<String>,
    },

    // Events
    /// Booking was created in `pending`
    BookingCreated {
        /// The new booking
        booking: Booking,
    },

    /// Booking moved between two non-cancelled statuses
    StatusChanged {
        /// Booking concerned
        booking_id: BookingId,
        /// Previous status
        from: BookingStatus,
        /// New status
        to: BookingStatus,
        /// When it changed
        changed_at: DateTime<Utc>,
    },

    /// Booking was cancelled
    BookingCancelled {
        /// Booking concerned
        booking_id: BookingId,
        /// Status before cancellation
        from: BookingStatus,
        /// Fee liability
        decision: CancellationDecision,
        /// Optional reason given by the client
        reason: Option<String>,
        /// When it was cancelled
        cancelled_at: DateTime<Utc>,
    },

    /// A command failed validation
    CommandRejected {
        /// Why
        error: BookingError,
    },
}

impl BookingAction {
    /// Booking the action targets, if any
    #[must_use]
    pub const fn booking_id(&self) -> Option<BookingId> {
        match self {
            Self::CreateBooking { booking_id, .. }
            | Self::ChangeStatus { booking_id, .. }
            | Self::CancelBooking { booking_id, .. }
            | Self::StatusChanged { booking_id, .. }
            | Self::BookingCancelled { booking_id, .. } => Some(*booking_id),
            Self::BookingCreated { booking } => Some(booking.id),
            Self::CommandRejected { .. } => None,
        }
    }

    /// Whether the action is a command (as opposed to an event)
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::CreateBooking { .. } | Self::ChangeStatus { .. } | Self::CancelBooking { .. }
        )
    }
}

// ============================================================================
// State
// ============================================================================

/// Bookings the reducer currently knows about
#[derive(Clone, Debug, Default)]
pub struct BookingState {
    /// Bookings by id
    pub bookings: HashMap<BookingId, Booking>,
    /// Error from the most recent rejected command
    pub last_error: Option<BookingError>,
    /// Decision from the most recent cancellation
    pub last_cancellation: Option<CancellationDecision>,
}

impl BookingState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding a single loaded booking
    #[must_use]
    pub fn with_booking(booking: Booking) -> Self {
        let mut state = Self::new();
        state.bookings.insert(booking.id, booking);
        state
    }

    /// Looks up a booking
    #[must_use]
    pub fn get(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.get(id)
    }

    /// Checks if a booking is known
    #[must_use]
    pub fn exists(&self, id: &BookingId) -> bool {
        self.bookings.contains_key(id)
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the booking aggregate
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Source of `now` for validation and the cancellation policy
    pub clock: Arc<dyn Clock>,
    /// Free-cancellation window
    pub policy: CancellationPolicy,
    /// Where notifications go once a change is saved
    pub notifier: Arc<dyn BookingNotifier>,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        policy: CancellationPolicy,
        notifier: Arc<dyn BookingNotifier>,
    ) -> Self {
        Self {
            clock,
            policy,
            notifier,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking aggregate
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates `CreateBooking`
    #[allow(clippy::too_many_arguments)]
    fn validate_create(
        state: &BookingState,
        booking_id: &BookingId,
        client_id: UserId,
        expert_id: UserId,
        service: &Service,
        scheduled_start: DateTime<Utc>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        if state.exists(booking_id) {
            return Err(BookingError::AlreadyExists(format!("booking {booking_id}")));
        }

        if !service.active {
            return Err(BookingError::ServiceNotFound(service.id));
        }

        if client_id == expert_id {
            return Err(BookingError::Validation(
                "client and expert must be different users".to_string(),
            ));
        }

        if scheduled_start <= now {
            return Err(BookingError::Validation(format!(
                "scheduled start {scheduled_start} must be in the future"
            )));
        }

        if notes.is_some_and(|notes| notes.chars().count() > MAX_NOTES_LEN) {
            return Err(BookingError::Validation(format!(
                "notes cannot exceed {MAX_NOTES_LEN} characters"
            )));
        }

        Ok(())
    }

    /// Validates `ChangeStatus` and returns the current status
    fn validate_change_status(
        state: &BookingState,
        booking_id: &BookingId,
        requested: BookingStatus,
    ) -> Result<BookingStatus, BookingError> {
        let booking = state
            .get(booking_id)
            .ok_or(BookingError::NotFound(*booking_id))?;

        guard(booking.status, requested)?;

        if requested == BookingStatus::Cancelled {
            return Err(BookingError::Validation(
                "use the cancel operation to cancel a booking".to_string(),
            ));
        }

        Ok(booking.status)
    }

    /// Validates `CancelBooking` and evaluates the fee
    fn validate_cancel(
        state: &BookingState,
        booking_id: &BookingId,
        env: &BookingEnvironment,
        now: DateTime<Utc>,
    ) -> Result<(BookingStatus, CancellationDecision), BookingError> {
        let booking = state
            .get(booking_id)
            .ok_or(BookingError::NotFound(*booking_id))?;

        guard(booking.status, BookingStatus::Cancelled)?;

        let decision = env.policy.evaluate(booking.scheduled_start, now, booking.price);
        Ok((booking.status, decision))
    }

    /// Applies an event to state and returns the notification it warrants
    fn apply_event(state: &mut BookingState, action: &BookingAction) -> Option<BookingNotification> {
        match action {
            BookingAction::BookingCreated { booking } => {
                state.bookings.insert(booking.id, booking.clone());
                state.last_error = None;
                Some(BookingNotification::for_booking(NotificationKind::Created, booking))
            },

            BookingAction::StatusChanged {
                booking_id,
                to,
                changed_at,
                ..
            } => {
                state.last_error = None;
                let booking = state.bookings.get_mut(booking_id)?;
                booking.status = *to;
                booking.updated_at = *changed_at;
                Some(BookingNotification::for_booking(NotificationKind::StatusChanged, booking))
            },

            BookingAction::BookingCancelled {
                booking_id,
                decision,
                reason,
                cancelled_at,
                ..
            } => {
                state.last_error = None;
                state.last_cancellation = Some(*decision);
                let booking = state.bookings.get_mut(booking_id)?;
                booking.status = BookingStatus::Cancelled;
                booking.cancellation = Some(CancellationRecord::from_decision(
                    decision,
                    reason.clone(),
                    *cancelled_at,
                ));
                booking.updated_at = *cancelled_at;
                Some(BookingNotification::for_booking(NotificationKind::Cancelled, booking))
            },

            BookingAction::CommandRejected { error } => {
                state.last_error = Some(error.clone());
                None
            },

            // Commands don't modify state
            BookingAction::CreateBooking { .. }
            | BookingAction::ChangeStatus { .. }
            | BookingAction::CancelBooking { .. } => None,
        }
    }

    fn reject(state: &mut BookingState, error: BookingError) -> SmallVec<[Effect; 4]> {
        tracing::debug!(error = %error, "Booking command rejected");
        Self::apply_event(state, &BookingAction::CommandRejected { error });
        SmallVec::new()
    }

    fn publish(env: &BookingEnvironment, notification: BookingNotification) -> Effect {
        let notifier = Arc::clone(&env.notifier);
        Effect::future(async move {
            notifier.publish(notification);
        })
    }

    fn apply_and_publish(
        state: &mut BookingState,
        event: &BookingAction,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect; 4]> {
        match Self::apply_event(state, event) {
            Some(notification) => smallvec![Self::publish(env, notification)],
            None => SmallVec::new(),
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect; 4]> {
        match action {
            BookingAction::CreateBooking {
                booking_id,
                client_id,
                expert_id,
                service,
                scheduled_start,
                notes,
            } => {
                let now = env.clock.now();
                if let Err(error) = Self::validate_create(
                    state,
                    &booking_id,
                    client_id,
                    expert_id,
                    &service,
                    scheduled_start,
                    notes.as_deref(),
                    now,
                ) {
                    return Self::reject(state, error);
                }

                let booking = Booking::new(
                    booking_id,
                    client_id,
                    expert_id,
                    service.id,
                    scheduled_start,
                    service.price,
                    notes,
                    now,
                );
                Self::apply_and_publish(state, &BookingAction::BookingCreated { booking }, env)
            },

            BookingAction::ChangeStatus {
                booking_id,
                requested,
            } => match Self::validate_change_status(state, &booking_id, requested) {
                Ok(from) => {
                    let event = BookingAction::StatusChanged {
                        booking_id,
                        from,
                        to: requested,
                        changed_at: env.clock.now(),
                    };
                    Self::apply_and_publish(state, &event, env)
                },
                Err(error) => Self::reject(state, error),
            },

            BookingAction::CancelBooking { booking_id, reason } => {
                let now = env.clock.now();
                match Self::validate_cancel(state, &booking_id, env, now) {
                    Ok((from, decision)) => {
                        let event = BookingAction::BookingCancelled {
                            booking_id,
                            from,
                            decision,
                            reason,
                            cancelled_at: now,
                        };
                        Self::apply_and_publish(state, &event, env)
                    },
                    Err(error) => Self::reject(state, error),
                }
            },

            // Events are applied as-is
            event @ (BookingAction::BookingCreated { .. }
            | BookingAction::StatusChanged { .. }
            | BookingAction::BookingCancelled { .. }
            | BookingAction::CommandRejected { .. }) => Self::apply_and_publish(state, &event, env),
        }
    }
}

//! # Broom Fairy Core
//!
//! Booking lifecycle for the Broom Fairy home-services marketplace.
//!
//! This crate is the functional core of the booking backend. It owns the
//! domain types, the status transition guard, the cancellation-fee policy and
//! the contracts the imperative shell must satisfy (persistence, clock,
//! notifications). Nothing in here performs I/O.
//!
//! ## Core Concepts
//!
//! - **Booking**: a scheduled service between a client and an expert
//! - **Status guard**: explicit transition table over [`status::BookingStatus`]
//! - **Cancellation policy**: pure fee evaluation from time-to-service
//! - **Reducer**: `(State, Action, Environment) → Effects`, the seam the
//!   booking aggregate plugs into
//! - **Effect**: descriptions of side effects, executed by the shell
//! - **Environment**: injected dependencies (clock, notifier)
//!
//! ## Example
//!
//! ```
//! use broom_fairy_core::policy::CancellationPolicy;
//! use broom_fairy_core::status::BookingStatus;
//! use broom_fairy_core::types::Money;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2025, 5, 2, 8, 0, 0).unwrap();
//! let decision = CancellationPolicy::default().evaluate(
//!     now + Duration::hours(5),
//!     now,
//!     Money::new(220_000),
//! );
//! assert!(decision.chargeable);
//! assert_eq!(decision.fee, Money::new(220_000));
//!
//! assert!(BookingStatus::Pending.transition_to(BookingStatus::InProgress).is_err());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Domain error taxonomy
pub mod error;

/// Booking notifications published after state changes
pub mod notification;

/// Cancellation-fee policy
pub mod policy;

/// Persistence contracts with optimistic concurrency
pub mod repository;

/// Booking status and its transition guard
pub mod status;

/// Identifiers, money, bookings and catalog entries
pub mod types;

/// Reducer module - the core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for BookingReducer {
    ///     type State = BookingState;
    ///     type Action = BookingAction;
    ///     type Environment = BookingEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut BookingState,
    ///         action: BookingAction,
    ///         env: &BookingEnvironment,
    ///     ) -> SmallVec<[Effect; 4]> {
    ///         match action {
    ///             BookingAction::CancelBooking { booking_id, reason } => {
    ///                 // Business logic here
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the shell.
/// They are values (not execution).
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed once the resulting state has been persisted.
    pub enum Effect {
        /// No-op effect
        None,

        /// Arbitrary async computation, run after the change is saved
        Future(Pin<Box<dyn Future<Output = ()> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl std::fmt::Debug for Effect {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl Effect {
        /// Wrap an async block as an effect
        #[must_use]
        pub fn future<F>(fut: F) -> Effect
        where
            F: Future<Output = ()> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies of the reducer are abstracted behind traits and
/// injected via the Environment parameter.
pub mod environment {
    use crate::notification::BookingNotification;
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// The cancellation policy never reads a clock itself; callers pass
    /// `clock.now()` in explicitly.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Sink for booking notifications
    ///
    /// Implementations must not block: publishing happens inside effects
    /// after the booking has been saved.
    pub trait BookingNotifier: Send + Sync {
        /// Publish a notification to interested subscribers
        fn publish(&self, notification: BookingNotification);
    }

    /// Notifier that drops everything
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoopNotifier;

    impl BookingNotifier for NoopNotifier {
        fn publish(&self, _notification: BookingNotification) {}
    }
}

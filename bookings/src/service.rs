//! Booking service: the imperative shell around the booking reducer.
//!
//! Each mutating operation:
//! 1. Loads the booking (or starts from empty state for creation)
//! 2. Runs the reducer with the command
//! 3. Returns the error if the command was rejected
//! 4. Saves with the version that was loaded
//! 5. Executes the effects (notifications)
//!
//! A `VersionConflict` from step 4 is returned as-is; callers retry with
//! fresh data.

use crate::aggregate::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
use crate::effects::run_effects;
use broom_fairy_core::effect::Effect;
use broom_fairy_core::environment::Clock;
use broom_fairy_core::error::BookingError;
use broom_fairy_core::policy::CancellationDecision;
use broom_fairy_core::reducer::Reducer;
use broom_fairy_core::repository::{BookingFilter, BookingRepository, RepositoryError, ServiceCatalog};
use broom_fairy_core::status::{BookingStatus, guard};
use broom_fairy_core::types::{Booking, BookingId, Money, Service, ServiceId, UserId};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Request to book a catalog service
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// Client requesting the service
    pub client_id: UserId,
    /// Expert performing it
    pub expert_id: UserId,
    /// Catalog entry
    pub service_id: ServiceId,
    /// Appointment start
    pub scheduled_start: DateTime<Utc>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to add a catalog service
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    /// Display name
    pub name: String,
    /// What the service includes
    #[serde(default)]
    pub description: String,
    /// Price in minor units; negative amounts are rejected
    pub price: i64,
    /// Expected duration in minutes
    pub duration_minutes: u32,
}

/// Result of a committed cancellation
#[derive(Clone, Debug, PartialEq)]
pub struct CancellationOutcome {
    /// Booking as saved
    pub booking: Booking,
    /// Fee liability that was applied
    pub decision: CancellationDecision,
}

/// Booking operations backed by a repository and a catalog
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<dyn ServiceCatalog>,
    reducer: BookingReducer,
    env: BookingEnvironment,
}

impl BookingService {
    /// Create a new booking service
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        catalog: Arc<dyn ServiceCatalog>,
        env: BookingEnvironment,
    ) -> Self {
        Self {
            bookings,
            catalog,
            reducer: BookingReducer::new(),
            env,
        }
    }

    /// Environment the reducer runs with
    #[must_use]
    pub const fn environment(&self) -> &BookingEnvironment {
        &self.env
    }

    /// Books an active catalog service
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ServiceNotFound`] for an unknown or inactive
    /// service, [`BookingError::Validation`] if the request is invalid, or
    /// [`BookingError::Storage`] on backend failure.
    pub async fn create_booking(&self, request: NewBooking) -> Result<Booking, BookingError> {
        let service = self.catalog.get_service(request.service_id).await?;

        let action = BookingAction::CreateBooking {
            booking_id: BookingId::new(),
            client_id: request.client_id,
            expert_id: request.expert_id,
            service,
            scheduled_start: request.scheduled_start,
            notes: request.notes,
        };

        let (booking, _) = self.process(BookingState::new(), action).await?;

        metrics::counter!("broom_fairy_bookings_created_total").increment(1);
        tracing::info!(
            booking_id = %booking.id,
            service_id = %booking.service_id,
            scheduled_start = %booking.scheduled_start,
            "Booking created"
        );

        Ok(booking)
    }

    /// Loads one booking
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] if there is no such booking.
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        Ok(self.bookings.load_booking(id).await?)
    }

    /// Lists bookings matching `filter`, soonest first
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] on backend failure.
    pub async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, BookingError> {
        Ok(self.bookings.list_bookings(filter).await?)
    }

    /// Moves a booking to `requested` (anything but `cancelled`)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidTransition`] if the guard rejects the
    /// move, [`BookingError::Validation`] for `cancelled`, or
    /// [`BookingError::VersionConflict`] if another writer saved first.
    pub async fn change_status(
        &self,
        id: BookingId,
        requested: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let state = self.load(id).await?;
        let from = state.get(&id).map(|booking| booking.status);

        let (booking, _) = self
            .process(
                state,
                BookingAction::ChangeStatus {
                    booking_id: id,
                    requested,
                },
            )
            .await?;

        metrics::counter!("broom_fairy_status_changes_total", "to" => requested.as_str()).increment(1);
        tracing::info!(
            booking_id = %id,
            from = ?from,
            to = %requested,
            version = %booking.version,
            "Booking status changed"
        );

        Ok(booking)
    }

    /// Fee the client would pay if they cancelled now, without cancelling
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] if there is no such booking, or
    /// [`BookingError::InvalidTransition`] if it can no longer be cancelled.
    pub async fn quote_cancellation(&self, id: BookingId) -> Result<CancellationDecision, BookingError> {
        let booking = self.bookings.load_booking(id).await?;
        guard(booking.status, BookingStatus::Cancelled)?;

        Ok(self
            .env
            .policy
            .evaluate(booking.scheduled_start, self.env.clock.now(), booking.price))
    }

    /// Cancels a booking, charging the fee the policy decides
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`], [`BookingError::InvalidTransition`]
    /// if the booking is not cancellable, or [`BookingError::VersionConflict`]
    /// if another writer saved first.
    pub async fn cancel_booking(
        &self,
        id: BookingId,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, BookingError> {
        let state = self.load(id).await?;

        let (booking, state) = self
            .process(state, BookingAction::CancelBooking { booking_id: id, reason })
            .await?;

        let decision = state.last_cancellation.ok_or_else(|| {
            BookingError::Storage(format!("cancellation of booking {id} produced no decision"))
        })?;

        metrics::counter!(
            "broom_fairy_cancellations_total",
            "chargeable" => if decision.chargeable { "true" } else { "false" }
        )
        .increment(1);
        metrics::counter!("broom_fairy_cancellation_fees_total").increment(decision.fee.amount());
        tracing::info!(
            booking_id = %id,
            chargeable = decision.chargeable,
            fee = %decision.fee,
            hours_remaining = decision.hours_remaining,
            "Booking cancelled"
        );

        Ok(CancellationOutcome { booking, decision })
    }

    /// Lists the catalog, by name
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] on backend failure.
    pub async fn list_services(&self) -> Result<Vec<Service>, BookingError> {
        Ok(self.catalog.list_services().await?)
    }

    /// Loads one catalog entry
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ServiceNotFound`] if there is no such service.
    pub async fn get_service(&self, id: ServiceId) -> Result<Service, BookingError> {
        Ok(self.catalog.get_service(id).await?)
    }

    /// Adds a catalog entry
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a negative price, blank name
    /// or zero duration.
    pub async fn add_service(&self, request: NewService) -> Result<Service, BookingError> {
        let price = Money::try_from_signed(request.price)?;
        let service = Service::new(
            ServiceId::new(),
            request.name,
            request.description,
            price,
            request.duration_minutes,
        )?;

        self.catalog.insert_service(service.clone()).await?;
        tracing::info!(service_id = %service.id, name = %service.name, "Service added");

        Ok(service)
    }

    async fn load(&self, id: BookingId) -> Result<BookingState, BookingError> {
        let booking = self.bookings.load_booking(id).await?;
        Ok(BookingState::with_booking(booking))
    }

    /// Commits `action`, then runs its effects
    async fn process(
        &self,
        state: BookingState,
        action: BookingAction,
    ) -> Result<(Booking, BookingState), BookingError> {
        let (booking, state, effects) = self.commit(state, action).await?;
        run_effects(effects).await;
        Ok((booking, state))
    }

    /// Reduces one action and persists the booking it touched
    async fn commit(
        &self,
        mut state: BookingState,
        action: BookingAction,
    ) -> Result<(Booking, BookingState, Vec<Effect>), BookingError> {
        let target = action.booking_id();
        let loaded_version = target.and_then(|id| state.get(&id)).map(|booking| booking.version);

        let effects = self.reducer.reduce(&mut state, action, &self.env);

        if let Some(error) = state.last_error.take() {
            return Err(error);
        }

        let id = target.ok_or_else(|| BookingError::Validation("action does not target a booking".to_string()))?;
        let mut booking = state.get(&id).cloned().ok_or(BookingError::NotFound(id))?;

        match loaded_version {
            None => self.bookings.insert_booking(booking.clone()).await?,
            Some(expected) => {
                booking.version = self
                    .bookings
                    .save_booking(booking.clone(), expected)
                    .await
                    .inspect_err(|error| {
                        if matches!(error, RepositoryError::VersionConflict { .. }) {
                            metrics::counter!("broom_fairy_version_conflicts_total").increment(1);
                            tracing::warn!(booking_id = %id, expected = %expected, "Version conflict on save");
                        }
                    })?;
            },
        }

        state.bookings.insert(id, booking.clone());
        Ok((booking, state, effects.into_vec()))
    }
}

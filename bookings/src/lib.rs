//! # Broom Fairy Bookings
//!
//! Booking lifecycle service for the Broom Fairy home-services marketplace.
//!
//! Clients book a catalog service with an expert, the expert confirms and
//! performs it, and clients may cancel under a fee policy: cancelling less
//! than 12 hours before the scheduled start costs the full price.
//!
//! ## Architecture
//!
//! - [`aggregate`]: the booking reducer (commands, events, validation)
//! - [`service`]: load, reduce, save with the loaded version, run effects
//! - [`effects`]: executes the effect descriptions the reducer returns
//! - [`api`] and [`server`]: the axum HTTP surface
//! - [`bootstrap`] and [`config`]: wiring from environment variables
//!
//! ## Example
//!
//! ```no_run
//! use broom_fairy_bookings::bootstrap::{Storage, build_state};
//! use broom_fairy_bookings::config::Config;
//! use broom_fairy_bookings::server::build_router;
//! use broom_fairy_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let storage = Storage::connect(&config.storage).await?;
//! let app = build_router(build_state(storage, Arc::new(SystemClock), &config.bookings));
//! let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod effects;
pub mod metrics;
pub mod notifier;
pub mod server;
pub mod service;

pub use aggregate::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
pub use config::Config;
pub use notifier::BroadcastNotifier;
pub use service::{BookingService, CancellationOutcome, NewBooking, NewService};

//! HTTP API endpoints.
//!
//! Every JSON endpoint answers with the `{ success, data }` envelope and
//! fails with `{ success: false, error, code }`.

pub mod bookings;
pub mod events;
pub mod services;

//! HTTP handlers that do not depend on booking state.

pub mod health;

pub use health::health_check;

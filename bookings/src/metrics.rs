//! Business metrics for the booking service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `broom_fairy_bookings_created_total` - Bookings created
//! - `broom_fairy_status_changes_total{to}` - Status changes by target status
//! - `broom_fairy_cancellations_total{chargeable}` - Cancellations by fee liability
//! - `broom_fairy_cancellation_fees_total` - Cancellation fees charged, in minor units
//! - `broom_fairy_version_conflicts_total` - Saves rejected by optimistic concurrency

use metrics::describe_counter;

/// Register descriptions for all business metrics.
///
/// Call once at startup, after the exporter is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "broom_fairy_bookings_created_total",
        "Total number of bookings created"
    );
    describe_counter!(
        "broom_fairy_status_changes_total",
        "Total number of booking status changes by target status"
    );
    describe_counter!(
        "broom_fairy_cancellations_total",
        "Total number of cancellations by whether a fee was charged"
    );
    describe_counter!(
        "broom_fairy_cancellation_fees_total",
        "Total cancellation fees charged in minor currency units"
    );
    describe_counter!(
        "broom_fairy_version_conflicts_total",
        "Total number of saves rejected because another writer saved first"
    );

    tracing::info!("Business metrics registered");
}

//! Business metrics for the booking workflow.
//!
//! # Exported Metrics
//!
//! - `booking_availability_queries_total{outcome}`
//! - `booking_client_searches_total`
//! - `booking_clients_created_total`
//! - `booking_reservations_total{outcome}`
//! - `booking_payments_total{status,outcome}`
//! - `booking_revenue_cents_total`

use crate::types::{Money, PaymentStatus};
use metrics::{counter, describe_counter};

/// Register the booking metric descriptions
///
/// Call once at start-up, after the recorder is installed.
pub fn register_booking_metrics() {
    describe_counter!(
        "booking_availability_queries_total",
        "Availability queries by outcome (success, failure)"
    );
    describe_counter!(
        "booking_client_searches_total",
        "Client directory searches issued after the quiet period"
    );
    describe_counter!(
        "booking_clients_created_total",
        "Clients created during booking"
    );
    describe_counter!(
        "booking_reservations_total",
        "Reservation creations by outcome (success, failure)"
    );
    describe_counter!(
        "booking_payments_total",
        "Payments by canonical status and outcome"
    );
    describe_counter!(
        "booking_revenue_cents_total",
        "Amount of recorded payments in cents"
    );

    tracing::info!("Booking metrics registered");
}

/// Booking metrics recorder
pub struct BookingMetrics;

impl BookingMetrics {
    /// Record an availability query
    pub fn record_availability_query(outcome: &'static str) {
        counter!("booking_availability_queries_total", "outcome" => outcome).increment(1);
    }

    /// Record a client search
    pub fn record_client_search() {
        counter!("booking_client_searches_total").increment(1);
    }

    /// Record a created client
    pub fn record_client_created() {
        counter!("booking_clients_created_total").increment(1);
    }

    /// Record a reservation creation
    pub fn record_reservation(outcome: &'static str) {
        counter!("booking_reservations_total", "outcome" => outcome).increment(1);
    }

    /// Record a payment
    pub fn record_payment(status: PaymentStatus, outcome: &'static str) {
        counter!(
            "booking_payments_total",
            "status" => status.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Add a recorded payment to revenue
    pub fn record_revenue(amount: Money) {
        if let Ok(cents) = u64::try_from(amount.cents()) {
            counter!("booking_revenue_cents_total").increment(cents);
        }
    }
}

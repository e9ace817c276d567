//! Payment status validator.
//!
//! Normalizes what the clerk typed into the vocabulary the payment API
//! accepts and checks the amount against the remaining balance.

use crate::environment::PaymentService;
use crate::error::BookingError;
use crate::metrics::BookingMetrics;
use crate::types::{Money, PaymentRecord, PaymentRequest, PaymentStatus, ReservationId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default maximum length of the payment method text
pub const DEFAULT_METHOD_MAX_LEN: usize = 50;

/// Map a free-form status label to the canonical status
///
/// Canonical values pass through. Known synonyms are mapped; anything else
/// is treated as `complete`.
#[must_use]
pub fn normalize_status(input: &str) -> PaymentStatus {
    let label = input.trim().to_lowercase();
    match label.as_str() {
        "complete" | "complet" | "complète" | "completee" | "complétée" | "total" | "totale"
        | "paye" | "payé" | "paid" | "full" => PaymentStatus::Complete,
        "partielle" | "partiel" | "partial" | "acompte" | "avance" | "deposit" => {
            PaymentStatus::Partielle
        },
        _ => {
            tracing::warn!(status = %input, "Unrecognized payment status, recorded as complete");
            PaymentStatus::Complete
        },
    }
}

/// Truncate the payment method to at most `max_len` characters
#[must_use]
pub fn normalize_method(input: &str, max_len: usize) -> String {
    input.chars().take(max_len).collect()
}

/// `total - already_paid`, not clamped
///
/// A negative balance means the reservation was overpaid.
#[must_use]
pub fn remaining_balance(total: Money, already_paid: Money) -> Money {
    total - already_paid
}

/// How much of a reservation is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    /// Nothing paid
    Unpaid,
    /// Some but not all of the total paid
    PartiallyPaid,
    /// Total paid (or more)
    FullyPaid,
}

impl Settlement {
    /// Classify `paid` against `total`
    #[must_use]
    pub fn classify(total: Money, paid: Money) -> Self {
        if !paid.is_positive() {
            Self::Unpaid
        } else if paid >= total {
            Self::FullyPaid
        } else {
            Self::PartiallyPaid
        }
    }
}

/// Payment form as filled in by the clerk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    /// Amount typed; ignored when the status is complete
    pub amount: Money,
    /// Payment date, today when left empty
    pub date: Option<NaiveDate>,
    /// Payment method (cash, card, transfer…)
    pub method: String,
    /// Status label
    pub status: String,
}

/// Validated payment, ready to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Amount to record
    pub amount: Money,
    /// Payment date
    pub date: NaiveDate,
    /// Truncated payment method
    pub method: String,
    /// Canonical status
    pub status: PaymentStatus,
}

impl PaymentInput {
    /// Request to record this payment for `reservation_id`
    #[must_use]
    pub fn request_for(&self, reservation_id: ReservationId) -> PaymentRequest {
        PaymentRequest {
            reservation_id,
            amount: self.amount,
            date: self.date,
            method: self.method.clone(),
            status: self.status,
        }
    }
}

/// Validate a payment form against the remaining balance
///
/// For a complete payment the amount is overwritten with `remaining`.
///
/// # Errors
///
/// Returns [`BookingError::InvalidAmount`] if the amount is not positive,
/// or if a partial payment exceeds the remaining balance.
pub fn prepare(
    form: &PaymentForm,
    remaining: Money,
    today: NaiveDate,
    method_max_len: usize,
) -> Result<PaymentInput, BookingError> {
    let status = normalize_status(&form.status);
    let amount = match status {
        PaymentStatus::Complete => remaining,
        PaymentStatus::Partielle => form.amount,
    };

    if !amount.is_positive() {
        return Err(BookingError::InvalidAmount {
            amount,
            reason: "amount must be greater than zero".into(),
        });
    }

    if status == PaymentStatus::Partielle && amount > remaining {
        return Err(BookingError::InvalidAmount {
            amount,
            reason: format!("partial payment exceeds the remaining balance of {remaining}"),
        });
    }

    Ok(PaymentInput {
        amount,
        date: form.date.unwrap_or(today),
        method: normalize_method(&form.method, method_max_len),
        status,
    })
}

/// Record `input` for `reservation_id`
///
/// # Errors
///
/// Returns [`BookingError::PaymentCreation`] naming the reservation that is
/// left without payment.
pub async fn record(
    service: Arc<dyn PaymentService>,
    reservation_id: ReservationId,
    input: PaymentInput,
) -> Result<PaymentRecord, BookingError> {
    let status = input.status;
    match service.create_payment(input.request_for(reservation_id)).await {
        Ok(payment) => {
            BookingMetrics::record_payment(status, "success");
            BookingMetrics::record_revenue(payment.amount);
            tracing::info!(
                reservation_id = %reservation_id,
                payment_id = %payment.id,
                amount = %payment.amount,
                "Payment recorded"
            );
            Ok(payment)
        },
        Err(source) => {
            BookingMetrics::record_payment(status, "failure");
            tracing::error!(
                reservation_id = %reservation_id,
                error = %source,
                "Payment failed, reservation left unpaid"
            );
            Err(BookingError::PaymentCreation {
                reservation_id,
                source,
            })
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
    }

    fn form(amount: i64, status: &str) -> PaymentForm {
        PaymentForm {
            amount: Money::from_units(amount),
            date: None,
            method: "Espèces".into(),
            status: status.into(),
        }
    }

    #[test]
    fn synonyms_map_to_canonical_status() {
        assert_eq!(normalize_status("acompte"), PaymentStatus::Partielle);
        assert_eq!(normalize_status("total"), PaymentStatus::Complete);
        assert_eq!(normalize_status("complete"), PaymentStatus::Complete);
        assert_eq!(normalize_status("  Partiel "), PaymentStatus::Partielle);
        assert_eq!(normalize_status("???"), PaymentStatus::Complete);
    }

    #[test]
    fn method_is_truncated_on_characters() {
        let long = "é".repeat(60);
        let method = normalize_method(&long, DEFAULT_METHOD_MAX_LEN);
        assert_eq!(method.chars().count(), 50);
        assert_eq!(normalize_method("Carte", DEFAULT_METHOD_MAX_LEN), "Carte");
    }

    #[test]
    fn remaining_balance_is_not_clamped() {
        assert_eq!(
            remaining_balance(Money::from_units(600), Money::from_units(700)),
            Money::from_units(-100)
        );
    }

    #[test]
    fn complete_payment_is_forced_to_remaining_balance() {
        let input = prepare(&form(150, "complete"), Money::from_units(600), today(), 50).unwrap();

        assert_eq!(input.amount, Money::from_units(600));
        assert_eq!(input.status, PaymentStatus::Complete);
        assert_eq!(input.date, today());
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let zero = prepare(&form(0, "acompte"), Money::from_units(600), today(), 50);
        assert!(matches!(zero, Err(BookingError::InvalidAmount { .. })));

        let nothing_left = prepare(&form(100, "complete"), Money::ZERO, today(), 50);
        assert!(matches!(nothing_left, Err(BookingError::InvalidAmount { .. })));
    }

    #[test]
    fn partial_overpayment_is_rejected() {
        let result = prepare(&form(700, "partielle"), Money::from_units(600), today(), 50);
        assert!(matches!(result, Err(BookingError::InvalidAmount { .. })));

        let deposit = prepare(&form(200, "partielle"), Money::from_units(600), today(), 50).unwrap();
        assert_eq!(deposit.amount, Money::from_units(200));
    }

    #[test]
    fn settlement_classification() {
        let total = Money::from_units(600);
        assert_eq!(Settlement::classify(total, Money::ZERO), Settlement::Unpaid);
        assert_eq!(Settlement::classify(total, Money::from_units(200)), Settlement::PartiallyPaid);
        assert_eq!(Settlement::classify(total, total), Settlement::FullyPaid);
        assert_eq!(Settlement::classify(total, Money::from_units(650)), Settlement::FullyPaid);
    }
}

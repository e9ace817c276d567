//! Error types for the booking workflow.

use crate::types::{Money, ReservationId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Errors reported by the hotel API collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never got a response (connection refused, DNS, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// Request timed out in the transport
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Response body did not match any known shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the API rejected the request as invalid (4xx)
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Client form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientField {
    /// Family name
    FamilyName,
    /// Given name
    GivenName,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Identity-document number
    Document,
}

impl fmt::Display for ClientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FamilyName => "family name",
            Self::GivenName => "given name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Document => "identity document",
        })
    }
}

/// Validation failure of one client field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Offending field
    pub field: ClientField,
    /// What is wrong with it
    pub message: String,
}

impl FieldError {
    /// Creates a field error
    #[must_use]
    pub fn new(field: ClientField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Booking workflow errors
///
/// Validation variants are raised before any collaborator call; the others
/// wrap the collaborator failure of the step that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Departure is not after arrival
    #[error("invalid date range: {end} is not after {start}")]
    InvalidRange {
        /// Arrival
        start: NaiveDate,
        /// Departure
        end: NaiveDate,
    },

    /// One of the dates is missing
    #[error("both arrival and departure dates are required")]
    MissingDate,

    /// No room selected
    #[error("select at least one room")]
    EmptySelection,

    /// Payment amount rejected
    #[error("invalid payment amount {amount}: {reason}")]
    InvalidAmount {
        /// Amount submitted
        amount: Money,
        /// Why it was rejected
        reason: String,
    },

    /// Client form has invalid fields
    #[error("invalid client: {}", FieldErrors(.0))]
    ClientValidation(Vec<FieldError>),

    /// Submission attempted before a client was resolved
    #[error("no client selected for the reservation")]
    MissingClient,

    /// Room catalog failed
    #[error("availability query failed: {0}")]
    AvailabilityQuery(#[source] ApiError),

    /// Client directory search failed
    #[error("client search failed: {0}")]
    ClientSearch(#[source] ApiError),

    /// Client directory refused or failed to create the client
    #[error("client creation failed: {0}")]
    ClientCreation(#[source] ApiError),

    /// Reservation could not be created; nothing was persisted
    #[error("reservation creation failed: {0}")]
    ReservationCreation(#[source] ApiError),

    /// Reservation exists but its payment could not be recorded
    #[error("payment failed for reservation #{reservation_id}: {source}")]
    PaymentCreation {
        /// The reservation left without payment
        reservation_id: ReservationId,
        /// Underlying failure
        source: ApiError,
    },
}

impl BookingError {
    /// Whether the error was detected locally, before any collaborator call
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::MissingDate
                | Self::EmptySelection
                | Self::InvalidAmount { .. }
                | Self::ClientValidation(_)
                | Self::MissingClient
        )
    }

    /// Reservation persisted without a payment, if that is what happened
    #[must_use]
    pub const fn dangling_reservation(&self) -> Option<ReservationId> {
        match self {
            Self::PaymentCreation { reservation_id, .. } => Some(*reservation_id),
            _ => None,
        }
    }
}

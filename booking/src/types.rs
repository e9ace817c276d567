//! Domain types for the booking workflow.
//!
//! Identifiers, money, room and client records, and the request/record pairs
//! exchanged with the hotel API collaborators.

use crate::dates::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[doc = concat!("Create a `", stringify!($name), "` from the API's numeric key")]
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Numeric key as used by the API
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a room
    RoomId
);
numeric_id!(
    /// Identifier of a client
    ClientId
);
numeric_id!(
    /// Identifier of a persisted reservation
    ReservationId
);
numeric_id!(
    /// Identifier of a persisted payment
    PaymentId
);

// ============================================================================
// Money
// ============================================================================

/// Amount of money in cents
///
/// Signed so that a remaining balance can go negative on overpayment.
/// Arithmetic saturates at the `i64` bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates money from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates money from whole currency units
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Gets the amount in cents
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Multiplies by a count (nights, quantity)
    #[must_use]
    pub fn times(self, count: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(count)))
    }

    /// Whether the amount is strictly positive
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is strictly negative
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Amount as a decimal number of currency units (API payloads)
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // hotel amounts stay far below 2^52 cents
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// Room status as reported by the room catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// Bookable
    Available,
    /// Occupied by a guest
    Occupied,
    /// Under maintenance or cleaning
    OutOfService,
    /// Any other status label
    Other(String),
}

impl RoomStatus {
    /// Whether the room may be offered for booking
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Room as returned by the room catalog, already normalized
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room ID
    pub id: RoomId,
    /// Room number shown to the clerk
    pub number: String,
    /// Room-type name
    pub room_type: String,
    /// Nightly price, if the catalog quoted one
    pub nightly_price: Option<Money>,
    /// Base price of the room type, if known
    pub base_price: Option<Money>,
    /// Number of guests
    pub capacity: u32,
    /// Private (as opposed to shared) room
    pub private: bool,
    /// Availability status
    pub status: RoomStatus,
}

/// A room available for booking in a given date range
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomOffer {
    /// Room ID
    pub id: RoomId,
    /// Room number shown to the clerk
    pub number: String,
    /// Room-type name
    pub room_type: String,
    /// Nightly price
    pub nightly_price: Money,
    /// Number of guests
    pub capacity: u32,
    /// Private (as opposed to shared) room
    pub private: bool,
    /// Availability status
    pub status: RoomStatus,
}

/// Room line of a reservation request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedRoom {
    /// Room ID
    pub room_id: RoomId,
    /// Quantity booked
    pub quantity: u32,
}

// ============================================================================
// Clients
// ============================================================================

/// Editable client fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFields {
    /// Family name
    pub family_name: String,
    /// Given name
    pub given_name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Identity-document number
    pub document: String,
}

impl ClientFields {
    /// "Given Family" display name
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name.trim(), self.family_name.trim())
            .trim()
            .to_string()
    }
}

/// A client that has an identifier in the client directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client ID
    pub id: ClientId,
    /// Contact and identity fields
    pub fields: ClientFields,
}

// ============================================================================
// Reservations and payments
// ============================================================================

/// Canonical payment status accepted by the payment API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Fully paid
    Complete,
    /// Partially paid (deposit)
    Partielle,
}

impl PaymentStatus {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partielle => "partielle",
        }
    }

    /// Reservation status implied by this payment status
    #[must_use]
    pub const fn reservation_status(self) -> ReservationStatus {
        match self {
            Self::Complete => ReservationStatus::Confirmee,
            Self::Partielle => ReservationStatus::EnAttente,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation status sent with a new reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Confirmed (paid in full)
    Confirmee,
    /// Pending (deposit only)
    EnAttente,
}

impl ReservationStatus {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmee => "confirmee",
            Self::EnAttente => "en_attente",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation to persist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Client the reservation belongs to
    pub client_id: ClientId,
    /// Rooms and quantities
    pub rooms: Vec<ReservedRoom>,
    /// Stay
    pub range: DateRange,
    /// Initial status
    pub status: ReservationStatus,
}

/// Reservation as persisted by the reservation service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Reservation ID
    pub id: ReservationId,
    /// Client ID
    pub client_id: ClientId,
    /// Rooms and quantities
    pub rooms: Vec<ReservedRoom>,
    /// Stay
    pub range: DateRange,
    /// Status label as stored
    pub status: String,
    /// Night count, when the service echoes it
    pub nights: Option<u32>,
    /// Total price, when the service echoes it
    pub total: Option<Money>,
}

/// Payment to persist for a reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Reservation being paid
    pub reservation_id: ReservationId,
    /// Amount paid
    pub amount: Money,
    /// Payment date
    pub date: NaiveDate,
    /// Payment method, already truncated
    pub method: String,
    /// Canonical status
    pub status: PaymentStatus,
}

/// Payment as persisted by the payment service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment ID
    pub id: PaymentId,
    /// Reservation paid
    pub reservation_id: ReservationId,
    /// Amount paid
    pub amount: Money,
    /// Payment date
    pub date: NaiveDate,
    /// Payment method
    pub method: String,
    /// Canonical status
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_display_handles_sign_and_cents() {
        assert_eq!(Money::from_units(1400).to_string(), "1400.00");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
    }

    #[test]
    fn money_arithmetic() {
        let total: Money = [Money::from_units(600), Money::from_units(800)].into_iter().sum();
        assert_eq!(total, Money::from_units(1400));
        assert_eq!(Money::from_units(120).times(5), Money::from_units(600));
        assert!((Money::from_units(100) - Money::from_units(150)).is_negative());
    }

    #[test]
    fn money_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(i64::MAX);
        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + Money::from_units(1), huge);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_units(1), Money::from_cents(i64::MIN));
        let total: Money = [huge, huge].into_iter().sum();
        assert_eq!(total, huge);
    }

    #[test]
    fn payment_status_drives_reservation_status() {
        assert_eq!(PaymentStatus::Complete.reservation_status(), ReservationStatus::Confirmee);
        assert_eq!(PaymentStatus::Partielle.reservation_status().as_str(), "en_attente");
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let fields = ClientFields {
            given_name: "Amina".into(),
            ..ClientFields::default()
        };
        assert_eq!(fields.full_name(), "Amina");
    }
}

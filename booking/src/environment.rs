//! Collaborators and environment of the booking workflow.
//!
//! The workflow reaches the hotel API only through the four traits below.
//! They are object safe so the environment can hold them as `Arc<dyn …>`,
//! built once at start-up and handed to the reducer.

use crate::config::WorkflowConfig;
use crate::dates::DateRange;
use crate::error::ApiError;
use crate::types::{
    Client, ClientFields, PaymentRecord, PaymentRequest, ReservationRecord, ReservationRequest,
    RoomRecord,
};
use frontdesk_core::environment::Clock;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Result of a collaborator call
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by collaborator calls
pub type ApiFuture<T> = BoxFuture<'static, ApiResult<T>>;

/// Room catalog
pub trait RoomCatalog: Send + Sync {
    /// Rooms with no reservation overlapping `range`
    ///
    /// # Errors
    ///
    /// Returns error on transport or server failure.
    fn find_available_rooms(&self, range: DateRange) -> ApiFuture<Vec<RoomRecord>>;
}

/// Client directory
pub trait ClientDirectory: Send + Sync {
    /// Clients partially matching `term` on name, email, phone or document
    ///
    /// # Errors
    ///
    /// Returns error on transport or server failure.
    fn search_clients(&self, term: String) -> ApiFuture<Vec<Client>>;

    /// Create a client and return it with its new identifier
    ///
    /// # Errors
    ///
    /// Returns error if the directory rejects the client (duplicate, invalid)
    /// or on transport failure.
    fn create_client(&self, fields: ClientFields) -> ApiFuture<Client>;
}

/// Reservation persistence
pub trait ReservationService: Send + Sync {
    /// Persist a reservation
    ///
    /// # Errors
    ///
    /// Returns error if the reservation is rejected or on transport failure.
    fn create_reservation(&self, request: ReservationRequest) -> ApiFuture<ReservationRecord>;
}

/// Payment persistence
pub trait PaymentService: Send + Sync {
    /// Persist a payment for an existing reservation
    ///
    /// # Errors
    ///
    /// Returns error if the payment is rejected or on transport failure.
    fn create_payment(&self, request: PaymentRequest) -> ApiFuture<PaymentRecord>;
}

/// Everything the booking reducer needs from the outside world
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock (payment date, logs)
    pub clock: Arc<dyn Clock>,
    /// Room catalog
    pub rooms: Arc<dyn RoomCatalog>,
    /// Client directory
    pub clients: Arc<dyn ClientDirectory>,
    /// Reservation persistence
    pub reservations: Arc<dyn ReservationService>,
    /// Payment persistence
    pub payments: Arc<dyn PaymentService>,
    /// Workflow tuning
    pub config: WorkflowConfig,
}

impl BookingEnvironment {
    /// Environment backed by one adapter implementing every collaborator
    /// (the REST client or the in-memory hotel)
    #[must_use]
    pub fn from_hotel<H>(hotel: Arc<H>, clock: Arc<dyn Clock>, config: WorkflowConfig) -> Self
    where
        H: RoomCatalog + ClientDirectory + ReservationService + PaymentService + 'static,
    {
        Self {
            clock,
            rooms: Arc::clone(&hotel) as Arc<dyn RoomCatalog>,
            clients: Arc::clone(&hotel) as Arc<dyn ClientDirectory>,
            reservations: Arc::clone(&hotel) as Arc<dyn ReservationService>,
            payments: hotel,
            config,
        }
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

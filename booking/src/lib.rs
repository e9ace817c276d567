//! # Frontdesk Booking
//!
//! Reservation booking workflow for a hotel front desk.
//!
//! A clerk picks dates, chooses rooms from what is available, finds or
//! creates the client, and records a payment. The workflow is a reducer
//! ([`BookingReducer`]) over [`BookingState`]; every call to the hotel
//! back office goes through the collaborator traits in [`environment`] and
//! comes back as an action.
//!
//! ## Modules
//!
//! - [`dates`]: night counting and validated date ranges
//! - [`availability`]: available room offers for the active range
//! - [`selection`]: selected rooms, quantities and totals
//! - [`client`]: client search with quiet period, client form
//! - [`payment`]: payment status and amount validation
//! - [`workflow`]: the booking state machine
//! - [`api`]: REST adapter for the hotel back office
//! - [`mocks`]: in-memory hotel for tests and the demo
//!
//! ## Example
//!
//! ```ignore
//! let hotel = Arc::new(InMemoryHotel::seeded());
//! let env = BookingEnvironment::from_hotel(hotel, Arc::new(SystemClock), config.workflow);
//! let store = Store::new(BookingState::new(), BookingReducer::new(), env);
//!
//! store.send(BookingAction::SearchRooms { start, end }).await?;
//! ```

pub mod api;
pub mod availability;
pub mod client;
pub mod config;
pub mod dates;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod mocks;
pub mod payment;
pub mod selection;
pub mod types;
pub mod workflow;

pub use api::HttpHotelApi;
pub use config::{ApiConfig, Config, ObservabilityConfig, WorkflowConfig};
pub use dates::DateRange;
pub use environment::{
    BookingEnvironment, ClientDirectory, PaymentService, ReservationService, RoomCatalog,
};
pub use error::{ApiError, BookingError};
pub use metrics::register_booking_metrics;
pub use mocks::InMemoryHotel;
pub use payment::{PaymentForm, Settlement};
pub use types::{Client, ClientFields, Money, PaymentStatus, RoomId, RoomOffer};
pub use workflow::{BookingAction, BookingPhase, BookingReducer, BookingState, Confirmation};

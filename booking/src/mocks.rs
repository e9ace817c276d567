//! In-memory hotel for tests and the demo.
//!
//! Implements every collaborator trait over seeded rooms and clients.
//! Availability is computed from reservation overlap. Each operation can be
//! made to fail or to respond late, and calls are counted.

use crate::dates::DateRange;
use crate::environment::{
    ApiFuture, ClientDirectory, PaymentService, ReservationService, RoomCatalog,
};
use crate::error::ApiError;
use crate::types::{
    Client, ClientFields, ClientId, Money, PaymentId, PaymentRecord, PaymentRequest,
    ReservationId, ReservationRecord, ReservationRequest, RoomId, RoomRecord, RoomStatus,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Collaborator operation, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `find_available_rooms`
    FindAvailableRooms,
    /// `search_clients`
    SearchClients,
    /// `create_client`
    CreateClient,
    /// `create_reservation`
    CreateReservation,
    /// `create_payment`
    CreatePayment,
}

#[derive(Debug, Default)]
struct Hotel {
    rooms: Vec<RoomRecord>,
    clients: Vec<Client>,
    reservations: Vec<ReservationRecord>,
    payments: Vec<PaymentRecord>,
    next_id: i64,
    failing: HashSet<Operation>,
    latency: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
}

impl Hotel {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory hotel
#[derive(Debug, Clone, Default)]
pub struct InMemoryHotel {
    inner: Arc<Mutex<Hotel>>,
}

impl InMemoryHotel {
    /// Empty hotel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Small hotel with a few rooms and two clients
    #[must_use]
    pub fn seeded() -> Self {
        let hotel = Self::new();
        for room in [
            room(1, "101", "Simple", Some(80), 1, true, RoomStatus::Available),
            room(2, "102", "Double", Some(120), 2, true, RoomStatus::Available),
            room(3, "201", "Suite", None, 4, true, RoomStatus::Available),
            room(4, "202", "Dortoir", Some(35), 6, false, RoomStatus::Available),
            room(5, "203", "Double", Some(120), 2, true, RoomStatus::OutOfService),
        ] {
            hotel.add_room(room);
        }
        hotel.add_client(ClientFields {
            family_name: "Benali".into(),
            given_name: "Amina".into(),
            email: "amina.benali@example.com".into(),
            phone: "+212 600 112 233".into(),
            document: "AB123456".into(),
        });
        hotel.add_client(ClientFields {
            family_name: "Martin".into(),
            given_name: "Louis".into(),
            email: "louis.martin@example.com".into(),
            phone: "+33 6 12 34 56 78".into(),
            document: "FR998877".into(),
        });
        hotel
    }

    fn lock(&self) -> MutexGuard<'_, Hotel> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a room to the catalog
    pub fn add_room(&self, room: RoomRecord) {
        let mut hotel = self.lock();
        hotel.next_id = hotel.next_id.max(room.id.get());
        hotel.rooms.push(room);
    }

    /// Add a client to the directory
    pub fn add_client(&self, fields: ClientFields) -> Client {
        let mut hotel = self.lock();
        let client = Client {
            id: ClientId::new(hotel.next_id()),
            fields,
        };
        hotel.clients.push(client.clone());
        client
    }

    /// Make `operation` fail until [`InMemoryHotel::recover`]
    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    /// Stop failing `operation`
    pub fn recover(&self, operation: Operation) {
        self.lock().failing.remove(&operation);
    }

    /// Delay every response of `operation`
    pub fn set_latency(&self, operation: Operation, latency: Duration) {
        self.lock().latency.insert(operation, latency);
    }

    /// Number of calls made to `operation`
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Persisted reservations
    #[must_use]
    pub fn reservations(&self) -> Vec<ReservationRecord> {
        self.lock().reservations.clone()
    }

    /// Persisted payments
    #[must_use]
    pub fn payments(&self) -> Vec<PaymentRecord> {
        self.lock().payments.clone()
    }

    /// Clients in the directory
    #[must_use]
    pub fn clients(&self) -> Vec<Client> {
        self.lock().clients.clone()
    }

    /// Count the call; report its latency, or the injected failure
    fn begin(&self, operation: Operation) -> (Option<Duration>, Result<(), ApiError>) {
        let mut hotel = self.lock();
        *hotel.calls.entry(operation).or_default() += 1;
        let latency = hotel.latency.get(&operation).copied();
        let outcome = if hotel.failing.contains(&operation) {
            Err(ApiError::Status {
                status: 503,
                message: format!("{operation:?} unavailable"),
            })
        } else {
            Ok(())
        };
        (latency, outcome)
    }

    fn respond<T, F>(&self, operation: Operation, handler: F) -> ApiFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Hotel) -> Result<T, ApiError> + Send + 'static,
    {
        let (latency, outcome) = self.begin(operation);
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            outcome?;
            let mut hotel = inner.lock().unwrap_or_else(PoisonError::into_inner);
            handler(&mut hotel)
        })
    }
}

/// Room record for seeding
#[must_use]
pub fn room(
    id: i64,
    number: &str,
    room_type: &str,
    nightly_price: Option<i64>,
    capacity: u32,
    private: bool,
    status: RoomStatus,
) -> RoomRecord {
    RoomRecord {
        id: RoomId::new(id),
        number: number.to_string(),
        room_type: room_type.to_string(),
        nightly_price: nightly_price.map(Money::from_units),
        base_price: Some(Money::from_units(150)),
        capacity,
        private,
        status,
    }
}

fn matches_term(client: &Client, term: &str) -> bool {
    let term = term.to_lowercase();
    let fields = &client.fields;
    [
        &fields.family_name,
        &fields.given_name,
        &fields.email,
        &fields.phone,
        &fields.document,
    ]
    .iter()
    .any(|value| value.to_lowercase().contains(&term))
}

impl RoomCatalog for InMemoryHotel {
    fn find_available_rooms(&self, range: DateRange) -> ApiFuture<Vec<RoomRecord>> {
        self.respond(Operation::FindAvailableRooms, move |hotel| {
            let booked: HashSet<RoomId> = hotel
                .reservations
                .iter()
                .filter(|reservation| reservation.range.overlaps(&range))
                .flat_map(|reservation| reservation.rooms.iter().map(|line| line.room_id))
                .collect();

            Ok(hotel
                .rooms
                .iter()
                .filter(|room| !booked.contains(&room.id))
                .cloned()
                .collect())
        })
    }
}

impl ClientDirectory for InMemoryHotel {
    fn search_clients(&self, term: String) -> ApiFuture<Vec<Client>> {
        self.respond(Operation::SearchClients, move |hotel| {
            Ok(hotel
                .clients
                .iter()
                .filter(|client| matches_term(client, &term))
                .cloned()
                .collect())
        })
    }

    fn create_client(&self, fields: ClientFields) -> ApiFuture<Client> {
        self.respond(Operation::CreateClient, move |hotel| {
            let duplicate = hotel.clients.iter().any(|client| {
                client.fields.email.eq_ignore_ascii_case(&fields.email)
                    || client.fields.document == fields.document
            });
            if duplicate {
                return Err(ApiError::Status {
                    status: 409,
                    message: "client already exists".into(),
                });
            }

            let client = Client {
                id: ClientId::new(hotel.next_id()),
                fields,
            };
            hotel.clients.push(client.clone());
            Ok(client)
        })
    }
}

impl ReservationService for InMemoryHotel {
    fn create_reservation(&self, request: ReservationRequest) -> ApiFuture<ReservationRecord> {
        self.respond(Operation::CreateReservation, move |hotel| {
            if !hotel.clients.iter().any(|client| client.id == request.client_id) {
                return Err(ApiError::Status {
                    status: 422,
                    message: format!("unknown client {}", request.client_id),
                });
            }

            let clash = hotel.reservations.iter().any(|existing| {
                existing.range.overlaps(&request.range)
                    && existing
                        .rooms
                        .iter()
                        .any(|line| request.rooms.iter().any(|r| r.room_id == line.room_id))
            });
            if clash {
                return Err(ApiError::Status {
                    status: 409,
                    message: "room already booked for these dates".into(),
                });
            }

            let reservation = ReservationRecord {
                id: ReservationId::new(hotel.next_id()),
                client_id: request.client_id,
                rooms: request.rooms,
                range: request.range,
                status: request.status.as_str().to_string(),
                nights: Some(request.range.nights()),
                total: None,
            };
            hotel.reservations.push(reservation.clone());
            Ok(reservation)
        })
    }
}

impl PaymentService for InMemoryHotel {
    fn create_payment(&self, request: PaymentRequest) -> ApiFuture<PaymentRecord> {
        self.respond(Operation::CreatePayment, move |hotel| {
            if !hotel
                .reservations
                .iter()
                .any(|reservation| reservation.id == request.reservation_id)
            {
                return Err(ApiError::Status {
                    status: 404,
                    message: format!("reservation {} not found", request.reservation_id),
                });
            }

            let payment = PaymentRecord {
                id: PaymentId::new(hotel.next_id()),
                reservation_id: request.reservation_id,
                amount: request.amount,
                date: request.date,
                method: request.method,
                status: request.status,
            };
            hotel.payments.push(payment.clone());
            Ok(payment)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::{ReservationStatus, ReservedRoom};
    use chrono::NaiveDate;

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 10, start).unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, end).unwrap(),
        )
        .unwrap()
    }

    fn book(hotel: &InMemoryHotel, room_id: i64, stay: DateRange) -> ApiFuture<ReservationRecord> {
        let client = hotel.clients()[0].id;
        hotel.create_reservation(ReservationRequest {
            client_id: client,
            rooms: vec![ReservedRoom {
                room_id: RoomId::new(room_id),
                quantity: 1,
            }],
            range: stay,
            status: ReservationStatus::Confirmee,
        })
    }

    #[tokio::test]
    async fn booked_rooms_disappear_for_overlapping_dates() {
        let hotel = InMemoryHotel::seeded();
        book(&hotel, 2, range(15, 20)).await.unwrap();

        let overlapping = hotel.find_available_rooms(range(18, 22)).await.unwrap();
        assert!(overlapping.iter().all(|room| room.id != RoomId::new(2)));

        let after = hotel.find_available_rooms(range(20, 22)).await.unwrap();
        assert!(after.iter().any(|room| room.id == RoomId::new(2)));
    }

    #[tokio::test]
    async fn double_booking_is_rejected() {
        let hotel = InMemoryHotel::seeded();
        book(&hotel, 1, range(15, 20)).await.unwrap();

        let error = book(&hotel, 1, range(19, 21)).await.unwrap_err();
        assert!(error.is_rejection());
    }

    #[tokio::test]
    async fn search_matches_any_field() {
        let hotel = InMemoryHotel::seeded();

        assert_eq!(hotel.search_clients("bena".into()).await.unwrap().len(), 1);
        assert_eq!(hotel.search_clients("FR9988".into()).await.unwrap().len(), 1);
        assert_eq!(hotel.search_clients("example.com".into()).await.unwrap().len(), 2);
        assert!(hotel.search_clients("zz".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_is_counted_and_recoverable() {
        let hotel = InMemoryHotel::seeded();
        hotel.fail(Operation::SearchClients);

        assert!(hotel.search_clients("ben".into()).await.is_err());
        hotel.recover(Operation::SearchClients);
        assert!(hotel.search_clients("ben".into()).await.is_ok());
        assert_eq!(hotel.calls(Operation::SearchClients), 2);
    }

    #[tokio::test]
    async fn duplicate_client_is_refused() {
        let hotel = InMemoryHotel::seeded();
        let mut fields = hotel.clients()[0].fields.clone();
        fields.email = "AMINA.BENALI@example.com".into();

        let error = hotel.create_client(fields).await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Status {
                status: 409,
                message: "client already exists".into()
            }
        );
    }
}

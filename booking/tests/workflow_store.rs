//! Booking workflow driven through the store

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use chrono::NaiveDate;
use frontdesk_booking::config::WorkflowConfig;
use frontdesk_booking::mocks::{InMemoryHotel, Operation};
use frontdesk_booking::{
    BookingAction, BookingEnvironment, BookingPhase, BookingReducer, BookingState, Money,
    PaymentForm, RoomId, Settlement,
};
use frontdesk_runtime::Store;
use frontdesk_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

const WAIT: Duration = Duration::from_secs(5);

fn october(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
}

fn store_for(hotel: &InMemoryHotel) -> BookingStore {
    let env = BookingEnvironment::from_hotel(
        Arc::new(hotel.clone()),
        Arc::new(test_clock()),
        WorkflowConfig::default(),
    );
    Store::new(BookingState::new(), BookingReducer::new(), env)
}

async fn search(store: &BookingStore, start: u32, end: u32) -> BookingAction {
    store
        .send_and_wait_for(
            BookingAction::SearchRooms { start: Some(october(start)), end: Some(october(end)) },
            |a| matches!(a, BookingAction::RoomsLoaded { .. } | BookingAction::AvailabilityFailed { .. }),
            WAIT,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn booking_from_search_to_confirmation() {
    let hotel = InMemoryHotel::seeded();
    let store = store_for(&hotel);

    search(&store, 15, 20).await;
    store.send(BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await.unwrap();
    store.send(BookingAction::ToggleRoom { room_id: RoomId::new(1) }).await.unwrap();
    store
        .send(BookingAction::SetQuantity { room_id: RoomId::new(1), quantity: 2 })
        .await
        .unwrap();
    assert_eq!(store.state(BookingState::total).await, Money::from_units(1400));
    store.send(BookingAction::ConfirmRooms).await.unwrap();

    let client = hotel.clients()[1].clone();
    store.send(BookingAction::SelectClient { client }).await.unwrap();
    store.send(BookingAction::SubmitClient).await.unwrap();
    assert_eq!(store.state(|s| s.phase).await, BookingPhase::AwaitingPayment);

    let done = store
        .send_and_wait_for(
            BookingAction::SubmitPayment {
                form: PaymentForm {
                    amount: Money::from_units(400),
                    date: None,
                    method: "Virement".into(),
                    status: "partiel".into(),
                },
            },
            |a| matches!(a, BookingAction::PaymentRecorded { .. } | BookingAction::PaymentFailed { .. }),
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(done, BookingAction::PaymentRecorded { .. }));

    let confirmation = store.state(|s| s.confirmation.clone()).await.unwrap();
    assert_eq!(confirmation.total, Money::from_units(1400));
    assert_eq!(confirmation.remaining, Money::from_units(1000));
    assert_eq!(confirmation.settlement, Settlement::PartiallyPaid);
    assert_eq!(confirmation.client.fields.family_name, "Martin");
    assert_eq!(hotel.reservations()[0].rooms.len(), 2);

    store.shutdown(WAIT).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn typing_quickly_issues_one_search() {
    let hotel = InMemoryHotel::seeded();
    let store = store_for(&hotel);
    store
        .send_and_wait_for(
            BookingAction::SearchRooms { start: Some(october(15)), end: Some(october(20)) },
            |a| matches!(a, BookingAction::RoomsLoaded { .. }),
            WAIT,
        )
        .await
        .unwrap();
    store.send(BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await.unwrap();
    store.send(BookingAction::ConfirmRooms).await.unwrap();

    let mut actions = store.subscribe_actions();
    for term in ["b", "be", "ben", "mart"] {
        store
            .send(BookingAction::ClientSearchChanged { term: term.into() })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let (term, clients) = tokio::time::timeout(WAIT, async {
        loop {
            if let Ok(BookingAction::ClientsFound { term, clients, .. }) = actions.recv().await {
                return (term, clients);
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(term, "mart");
    assert_eq!(clients.len(), 1);
    assert_eq!(hotel.calls(Operation::SearchClients), 1);
    assert_eq!(store.state(|s| s.client.mode().candidates().len()).await, 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_rooms_load_discards_them() {
    let hotel = InMemoryHotel::seeded();
    hotel.set_latency(Operation::FindAvailableRooms, Duration::from_millis(500));
    let store = store_for(&hotel);

    let mut loading = store
        .send(BookingAction::SearchRooms { start: Some(october(15)), end: Some(october(20)) })
        .await
        .unwrap();
    store.send(BookingAction::Cancel).await.unwrap();
    loading.wait_with_timeout(WAIT).await.unwrap();

    let (phase, session, offers) = store
        .state(|s| (s.phase, s.session, s.availability.offers().len()))
        .await;
    assert_eq!(phase, BookingPhase::Searching);
    assert_eq!(session, 1);
    assert_eq!(offers, 0);
}

#[tokio::test]
async fn failed_payment_is_retried_without_a_second_reservation() {
    let hotel = InMemoryHotel::seeded();
    hotel.fail(Operation::CreatePayment);
    let store = store_for(&hotel);

    search(&store, 15, 20).await;
    store.send(BookingAction::ToggleRoom { room_id: RoomId::new(4) }).await.unwrap();
    store.send(BookingAction::ConfirmRooms).await.unwrap();
    let client = hotel.clients()[0].clone();
    store.send(BookingAction::SelectClient { client }).await.unwrap();
    store.send(BookingAction::SubmitClient).await.unwrap();

    let pay = || BookingAction::SubmitPayment {
        form: PaymentForm {
            amount: Money::ZERO,
            date: None,
            method: "Espèces".into(),
            status: "complete".into(),
        },
    };
    let finished =
        |a: &BookingAction| matches!(a, BookingAction::PaymentRecorded { .. } | BookingAction::PaymentFailed { .. });

    let failed = store.send_and_wait_for(pay(), finished, WAIT).await.unwrap();
    let BookingAction::PaymentFailed { error, .. } = failed else {
        unreachable!("payment should fail first");
    };
    let reservation_id = hotel.reservations()[0].id;
    assert_eq!(error.dangling_reservation(), Some(reservation_id));
    assert_eq!(store.state(|s| s.phase).await, BookingPhase::Failed);

    hotel.recover(Operation::CreatePayment);
    store.send(BookingAction::Retry).await.unwrap();
    let recorded = store.send_and_wait_for(pay(), finished, WAIT).await.unwrap();
    assert!(matches!(recorded, BookingAction::PaymentRecorded { .. }));

    assert_eq!(hotel.reservations().len(), 1);
    assert_eq!(hotel.payments()[0].reservation_id, reservation_id);
    assert_eq!(hotel.payments()[0].amount, Money::from_units(175));
    assert_eq!(store.state(|s| s.phase).await, BookingPhase::Confirmed);
}

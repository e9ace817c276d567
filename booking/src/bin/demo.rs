//! Front desk demo
//!
//! Walks one booking from date search to payment through the store.
//!
//! # Running
//!
//! ```bash
//! cargo run --bin demo            # in-memory hotel
//! cargo run --bin demo -- --remote # hotel API at HOTEL_API_URL
//! ```

use anyhow::{Context, bail};
use chrono::Days;
use frontdesk_booking::{
    BookingAction, BookingEnvironment, BookingPhase, BookingReducer, BookingState, ClientFields,
    Config, HttpHotelApi, InMemoryHotel, Money, PaymentForm, register_booking_metrics,
};
use frontdesk_core::environment::{Clock, SystemClock};
use frontdesk_runtime::Store;
use frontdesk_runtime::metrics::MetricsServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.observability.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info,frontdesk_booking=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = MetricsServer::new(SocketAddr::from((
        [0, 0, 0, 0],
        config.observability.metrics_port,
    )));
    metrics.start()?;
    register_booking_metrics();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let today = clock.today();
    let env = if std::env::args().any(|arg| arg == "--remote") {
        let api = HttpHotelApi::new(&config.api)?;
        tracing::info!(base_url = api.base_url(), "Booking against the hotel API");
        BookingEnvironment::from_hotel(Arc::new(api), clock, config.workflow.clone())
    } else {
        tracing::info!("Booking against the in-memory hotel");
        BookingEnvironment::from_hotel(Arc::new(InMemoryHotel::seeded()), clock, config.workflow.clone())
    };

    let store = Store::new(BookingState::new(), BookingReducer::new(), env);
    let wait = config.api.timeout() + config.workflow.client_search_debounce() + Duration::from_secs(1);

    println!("=== Front desk booking ===\n");

    // Dates
    let start = today.checked_add_days(Days::new(14)).context("arrival out of range")?;
    let end = start.checked_add_days(Days::new(5)).context("departure out of range")?;
    println!(">>> Searching rooms from {start} to {end}");
    let loaded = store
        .send_and_wait_for(
            BookingAction::SearchRooms { start: Some(start), end: Some(end) },
            |a| matches!(a, BookingAction::RoomsLoaded { .. } | BookingAction::AvailabilityFailed { .. }),
            wait,
        )
        .await?;
    if let BookingAction::AvailabilityFailed { error, .. } = loaded {
        bail!(error);
    }

    let offers = store.state(|s| s.availability.offers().to_vec()).await;
    if offers.is_empty() {
        bail!("no room available from {start} to {end}");
    }
    for offer in &offers {
        println!(
            "    room {} ({}, {} guests): {} / night",
            offer.number, offer.room_type, offer.capacity, offer.nightly_price
        );
    }

    // Rooms
    let mut picks = offers.iter().take(2);
    if let Some(first) = picks.next() {
        store.send(BookingAction::ToggleRoom { room_id: first.id }).await?;
    }
    if let Some(second) = picks.next() {
        store.send(BookingAction::ToggleRoom { room_id: second.id }).await?;
        store
            .send(BookingAction::SetQuantity { room_id: second.id, quantity: 2 })
            .await?;
    }
    store.send(BookingAction::ConfirmRooms).await?;
    let total = store.state(BookingState::total).await;
    println!("\n>>> Rooms confirmed, total {total}");

    // Client
    println!("\n>>> Searching client \"ben\"");
    store
        .send_and_wait_for(
            BookingAction::ClientSearchChanged { term: "ben".into() },
            |a| matches!(a, BookingAction::ClientsFound { .. } | BookingAction::ClientSearchFailed { .. }),
            wait,
        )
        .await?;

    let candidate = store
        .state(|s| s.client.mode().candidates().first().cloned())
        .await;
    if let Some(client) = candidate {
        println!("    found {} (#{})", client.fields.full_name(), client.id);
        store.send(BookingAction::SelectClient { client }).await?;
        store.send(BookingAction::SubmitClient).await?;
    } else {
        println!("    no match, creating the client");
        store.send(BookingAction::NewClient).await?;
        store
            .send(BookingAction::EditClient {
                fields: ClientFields {
                    family_name: "Benali".into(),
                    given_name: "Amina".into(),
                    email: "amina.benali@example.com".into(),
                    phone: "+212 600 112 233".into(),
                    document: "AB123456".into(),
                },
            })
            .await?;
        store
            .send_and_wait_for(
                BookingAction::SubmitClient,
                |a| matches!(a, BookingAction::ClientCreated { .. } | BookingAction::ClientCreationFailed { .. }),
                wait,
            )
            .await?;
    }

    let phase = store.state(|s| s.phase).await;
    if phase != BookingPhase::AwaitingPayment {
        let error = store.state(|s| s.last_error.clone()).await;
        bail!("client not resolved: {error:?}");
    }

    // Payment
    let deposit = Money::from_cents(total.cents() / 2);
    println!("\n>>> Paying a deposit of {deposit}");
    store
        .send_and_wait_for(
            BookingAction::SubmitPayment {
                form: PaymentForm {
                    amount: deposit,
                    date: None,
                    method: "Carte bancaire".into(),
                    status: "acompte".into(),
                },
            },
            |a| {
                matches!(
                    a,
                    BookingAction::PaymentRecorded { .. }
                        | BookingAction::PaymentFailed { .. }
                        | BookingAction::ReservationFailed { .. }
                )
            },
            wait,
        )
        .await?;

    let (confirmation, error) = store
        .state(|s| (s.confirmation.clone(), s.last_error.clone()))
        .await;
    match (confirmation, error) {
        (Some(confirmation), _) => {
            println!("\n=== Reservation #{} ===", confirmation.reservation_id());
            println!("  client:    {}", confirmation.client.fields.full_name());
            println!("  stay:      {} ({} nights)", confirmation.reservation.range, confirmation.nights);
            for room in &confirmation.rooms {
                println!(
                    "  room {} x{}: {}",
                    room.offer.number,
                    room.quantity,
                    room.subtotal(confirmation.nights)
                );
            }
            println!("  total:     {}", confirmation.total);
            println!("  paid:      {} ({})", confirmation.paid, confirmation.payment.status.as_str());
            println!("  remaining: {}", confirmation.remaining);
            println!("  status:    {}", confirmation.reservation.status);
        },
        (None, Some(error)) => println!("\n!!! Booking failed: {error}"),
        (None, None) => println!("\n!!! Booking did not complete"),
    }

    if let Some(rendered) = metrics.render() {
        println!("\n=== Metrics ===");
        rendered
            .lines()
            .filter(|line| line.starts_with("booking_") || line.starts_with("store_actions"))
            .for_each(|line| println!("  {line}"));
    }

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

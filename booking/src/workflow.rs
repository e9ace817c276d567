//! Booking orchestrator.
//!
//! Drives a reservation from date search to confirmation:
//!
//! 1. `Searching`: the clerk submits arrival and departure dates
//! 2. `Selecting`: available rooms are shown, the clerk picks rooms and quantities
//! 3. `ResolvingClient`: an existing client is found or a new one created
//! 4. `AwaitingPayment`: the payment form is filled in
//! 5. `Submitting`: the reservation, then its payment, are persisted
//! 6. `Confirmed` or `Failed`
//!
//! Every collaborator response carries the session it was issued in. `Cancel`
//! starts a new session, so responses that arrive afterwards are dropped.

use crate::availability::{self, Availability, Delivery};
use crate::client::{self, ClientResolver, Submission};
use crate::dates::DateRange;
use crate::environment::{BookingEnvironment, ReservationService};
use crate::error::BookingError;
use crate::metrics::BookingMetrics;
use crate::payment::{self, PaymentForm, PaymentInput, Settlement};
use crate::selection::{RoomSelection, SelectedRoom, Toggle};
use crate::types::{
    Client, ClientFields, Money, PaymentRecord, PaymentStatus, ReservationId, ReservationRecord,
    ReservationRequest, ReservedRoom, RoomId, RoomOffer,
};
use chrono::NaiveDate;
use frontdesk_core::{SmallVec, async_effect, delay, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Step of the booking workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingPhase {
    /// Choosing dates
    Searching,
    /// Choosing rooms for the active date range
    Selecting,
    /// Finding or creating the client
    ResolvingClient,
    /// Rooms and client fixed, payment form shown
    AwaitingPayment,
    /// Reservation and payment calls in flight
    Submitting,
    /// Reservation and payment persisted
    Confirmed,
    /// Last submission failed; may retry
    Failed,
}

/// Everything needed to persist a reservation
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDraft {
    /// Stay
    pub range: DateRange,
    /// Selected rooms, at least one
    pub rooms: Vec<SelectedRoom>,
    /// Resolved client
    pub client: Client,
}

impl ReservationDraft {
    /// Night count of the stay
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.range.nights()
    }

    /// Sum of room subtotals
    #[must_use]
    pub fn total(&self) -> Money {
        let nights = self.nights();
        self.rooms.iter().map(|room| room.subtotal(nights)).sum()
    }

    /// Reservation request; its status follows the payment status
    #[must_use]
    pub fn request(&self, payment_status: PaymentStatus) -> ReservationRequest {
        ReservationRequest {
            client_id: self.client.id,
            rooms: self
                .rooms
                .iter()
                .map(|room| ReservedRoom {
                    room_id: room.offer.id,
                    quantity: room.quantity,
                })
                .collect(),
            range: self.range,
            status: payment_status.reservation_status(),
        }
    }
}

/// Receipt of a persisted booking
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    /// Reservation as persisted
    pub reservation: ReservationRecord,
    /// Client of the reservation
    pub client: Client,
    /// Booked rooms with quantities and prices
    pub rooms: Vec<SelectedRoom>,
    /// Payment as persisted
    pub payment: PaymentRecord,
    /// Night count (echoed by the API, or computed locally)
    pub nights: u32,
    /// Total price (echoed by the API, or computed locally)
    pub total: Money,
    /// Everything paid so far
    pub paid: Money,
    /// `total - paid`; negative when overpaid
    pub remaining: Money,
    /// Paid state
    pub settlement: Settlement,
}

impl Confirmation {
    fn build(
        draft: ReservationDraft,
        reservation: ReservationRecord,
        payment: PaymentRecord,
        already_paid: Money,
    ) -> Self {
        let nights = reservation.nights.unwrap_or_else(|| draft.nights());
        let total = reservation.total.unwrap_or_else(|| draft.total());
        let paid = already_paid + payment.amount;
        let remaining = payment::remaining_balance(total, paid);

        Self {
            reservation,
            client: draft.client,
            rooms: draft.rooms,
            payment,
            nights,
            total,
            paid,
            remaining,
            settlement: Settlement::classify(total, paid),
        }
    }

    /// Reservation identifier
    #[must_use]
    pub const fn reservation_id(&self) -> ReservationId {
        self.reservation.id
    }

    /// More was paid than the total
    #[must_use]
    pub const fn is_overpaid(&self) -> bool {
        self.remaining.is_negative()
    }
}

/// State of one booking at the front desk
#[derive(Debug, Clone, PartialEq)]
pub struct BookingState {
    /// Current step
    pub phase: BookingPhase,
    /// Bumped by `Cancel`; responses from older sessions are dropped
    pub session: u64,
    /// Offers for the active date range
    pub availability: Availability,
    /// Chosen rooms
    pub selection: RoomSelection,
    /// Client search, form and resolved client
    pub client: ClientResolver,
    /// Paid before this submission (zero for a new reservation)
    pub already_paid: Money,
    /// Payment being submitted
    pub payment: Option<PaymentInput>,
    /// Reservation persisted in this session whose payment is not recorded yet
    pub pending_reservation: Option<ReservationRecord>,
    /// Receipt, once confirmed
    pub confirmation: Option<Confirmation>,
    /// Last error, for display
    pub last_error: Option<BookingError>,
}

impl BookingState {
    /// Fresh booking
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: BookingPhase::Searching,
            session: 0,
            availability: Availability::new(),
            selection: RoomSelection::new(),
            client: ClientResolver::new(),
            already_paid: Money::ZERO,
            payment: None,
            pending_reservation: None,
            confirmation: None,
            last_error: None,
        }
    }

    /// Active date range
    #[must_use]
    pub const fn range(&self) -> Option<DateRange> {
        self.availability.active_range()
    }

    /// Night count of the active range
    #[must_use]
    pub fn nights(&self) -> Option<u32> {
        self.range().map(|range| range.nights())
    }

    /// Grand total of the selection for the active range
    #[must_use]
    pub fn total(&self) -> Money {
        self.nights()
            .map_or(Money::ZERO, |nights| self.selection.grand_total(nights))
    }

    /// What is left to pay
    #[must_use]
    pub fn remaining_balance(&self) -> Money {
        payment::remaining_balance(self.total(), self.already_paid)
    }

    /// Assemble the reservation draft
    ///
    /// # Errors
    ///
    /// - [`BookingError::MissingDate`] without an active date range
    /// - [`BookingError::EmptySelection`] without a selected room
    /// - [`BookingError::MissingClient`] without a resolved client
    pub fn draft(&self) -> Result<ReservationDraft, BookingError> {
        let range = self.range().ok_or(BookingError::MissingDate)?;
        self.selection.ensure_not_empty()?;
        let client = self
            .client
            .resolved()
            .cloned()
            .ok_or(BookingError::MissingClient)?;

        Ok(ReservationDraft {
            range,
            rooms: self.selection.iter().cloned().collect(),
            client,
        })
    }

    /// Check the draft and the payment form before submission
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition: draft errors (see
    /// [`BookingState::draft`]) then [`BookingError::InvalidAmount`].
    pub fn validate_payment(
        &self,
        form: &PaymentForm,
        today: NaiveDate,
        method_max_len: usize,
    ) -> Result<(ReservationDraft, PaymentInput), BookingError> {
        let draft = self.draft()?;
        let input = payment::prepare(form, self.remaining_balance(), today, method_max_len)?;
        Ok((draft, input))
    }

    fn enter(&mut self, phase: BookingPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "Booking phase changed");
            self.phase = phase;
        }
    }

    const fn is_current(&self, session: u64) -> bool {
        self.session == session
    }
}

impl Default for BookingState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions of the booking workflow
#[derive(Clone, Debug)]
pub enum BookingAction {
    // Commands
    /// Search rooms for the given dates
    SearchRooms {
        /// Arrival
        start: Option<NaiveDate>,
        /// Departure
        end: Option<NaiveDate>,
    },

    /// Select or unselect an offered room
    ToggleRoom {
        /// Room
        room_id: RoomId,
    },

    /// Change the quantity of a selected room
    SetQuantity {
        /// Room
        room_id: RoomId,
        /// New quantity
        quantity: u32,
    },

    /// Done choosing rooms
    ConfirmRooms,

    /// Client search term edited
    ClientSearchChanged {
        /// Term as typed
        term: String,
    },

    /// Quiet period after a keystroke elapsed
    ClientSearchDue {
        /// Session of the keystroke
        session: u64,
        /// Search generation of the keystroke
        generation: u64,
    },

    /// Pick a search candidate
    SelectClient {
        /// Candidate
        client: Client,
    },

    /// Fill in a new client instead
    NewClient,

    /// Client form fields edited
    EditClient {
        /// Field values
        fields: ClientFields,
    },

    /// Submit the client form
    SubmitClient,

    /// Submit the payment form
    SubmitPayment {
        /// Form values
        form: PaymentForm,
    },

    /// Go back to the payment form after a failure
    Retry,

    /// Drop everything and start over with new dates
    Cancel,

    // Events
    /// Offers arrived for a range
    RoomsLoaded {
        /// Session of the query
        session: u64,
        /// Range queried
        range: DateRange,
        /// Offered rooms
        offers: Vec<RoomOffer>,
    },

    /// Availability query failed
    AvailabilityFailed {
        /// Session of the query
        session: u64,
        /// Range queried
        range: DateRange,
        /// Failure
        error: BookingError,
    },

    /// Search candidates arrived
    ClientsFound {
        /// Session of the query
        session: u64,
        /// Term searched
        term: String,
        /// Candidates
        clients: Vec<Client>,
    },

    /// Client search failed
    ClientSearchFailed {
        /// Session of the query
        session: u64,
        /// Term searched
        term: String,
        /// Failure
        error: BookingError,
    },

    /// New client created
    ClientCreated {
        /// Session of the call
        session: u64,
        /// Client with its identifier
        client: Client,
    },

    /// Client creation failed
    ClientCreationFailed {
        /// Session of the call
        session: u64,
        /// Failure
        error: BookingError,
    },

    /// Reservation persisted
    ReservationCreated {
        /// Session of the call
        session: u64,
        /// Persisted reservation
        reservation: ReservationRecord,
    },

    /// Reservation creation failed; nothing persisted
    ReservationFailed {
        /// Session of the call
        session: u64,
        /// Failure
        error: BookingError,
    },

    /// Payment persisted
    PaymentRecorded {
        /// Session of the call
        session: u64,
        /// Persisted payment
        payment: PaymentRecord,
    },

    /// Payment creation failed; the reservation exists
    PaymentFailed {
        /// Session of the call
        session: u64,
        /// Failure, naming the reservation
        error: BookingError,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn search_rooms(
        state: &mut BookingState,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if !matches!(state.phase, BookingPhase::Searching | BookingPhase::Selecting) {
            tracing::warn!(phase = ?state.phase, "Date search ignored outside room selection");
            return SmallVec::new();
        }

        let range = match DateRange::from_bounds(start, end) {
            Ok(range) => range,
            Err(error) => {
                tracing::debug!(error = %error, "Date search rejected");
                state.last_error = Some(error);
                return SmallVec::new();
            },
        };

        if state.range() != Some(range) && !state.selection.is_empty() {
            tracing::debug!(%range, "Dates changed, selection cleared");
            state.selection.clear();
        }

        state.availability.begin(range);
        state.last_error = None;
        state.enter(BookingPhase::Selecting);

        let catalog = Arc::clone(&env.rooms);
        let session = state.session;
        smallvec![async_effect! {
            Some(match availability::query(catalog, range).await {
                Ok(offers) => BookingAction::RoomsLoaded { session, range, offers },
                Err(error) => BookingAction::AvailabilityFailed { session, range, error },
            })
        }]
    }

    fn rooms_loaded(
        state: &mut BookingState,
        session: u64,
        range: DateRange,
        result: Result<Vec<RoomOffer>, BookingError>,
    ) {
        if !state.is_current(session) || state.phase != BookingPhase::Selecting {
            tracing::debug!(%range, "Availability response from an earlier session dropped");
            return;
        }

        let failure = result.as_ref().err().cloned();
        if state.availability.deliver(range, result) == Delivery::Stale {
            tracing::debug!(%range, "Availability response for superseded dates dropped");
            return;
        }

        // A failed reload keeps the selection; only fresh offers prune it
        if failure.is_none() {
            let availability = &state.availability;
            state.selection.retain(|room_id| availability.offer(room_id).is_some());
        }
        state.last_error = failure;
    }

    fn toggle_room(state: &mut BookingState, room_id: RoomId) {
        if state.phase != BookingPhase::Selecting {
            tracing::warn!(phase = ?state.phase, "Room toggle ignored outside room selection");
            return;
        }

        let Some(offer) = state.availability.offer(room_id) else {
            tracing::debug!(room = %room_id, "Toggle on a room that is not offered");
            return;
        };

        match state.selection.toggle(offer) {
            Toggle::Added => tracing::debug!(room = %room_id, "Room selected"),
            Toggle::Removed => tracing::debug!(room = %room_id, "Room unselected"),
            Toggle::Ignored => tracing::debug!(room = %room_id, "Room not bookable"),
        }
    }

    fn set_quantity(state: &mut BookingState, room_id: RoomId, quantity: u32) {
        if state.phase != BookingPhase::Selecting {
            tracing::warn!(phase = ?state.phase, "Quantity change ignored outside room selection");
            return;
        }

        if !state.selection.set_quantity(room_id, quantity) {
            tracing::debug!(room = %room_id, quantity, "Quantity change ignored");
        }
    }

    fn confirm_rooms(state: &mut BookingState) {
        if state.phase != BookingPhase::Selecting {
            tracing::warn!(phase = ?state.phase, "Room confirmation ignored outside room selection");
            return;
        }

        match state.selection.ensure_not_empty() {
            Ok(()) => {
                state.last_error = None;
                state.enter(BookingPhase::ResolvingClient);
            },
            Err(error) => state.last_error = Some(error),
        }
    }

    fn client_search_changed(
        state: &mut BookingState,
        term: String,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.phase != BookingPhase::ResolvingClient {
            tracing::warn!(phase = ?state.phase, "Client search ignored outside client resolution");
            return SmallVec::new();
        }

        match state.client.set_term(term, env.config.client_search_min_chars) {
            Some(generation) => smallvec![delay! {
                duration: env.config.client_search_debounce(),
                action: BookingAction::ClientSearchDue {
                    session: state.session,
                    generation,
                }
            }],
            None => SmallVec::new(),
        }
    }

    fn client_search_due(
        state: &mut BookingState,
        session: u64,
        generation: u64,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if !state.is_current(session) || state.phase != BookingPhase::ResolvingClient {
            return SmallVec::new();
        }

        let Some(term) = state
            .client
            .search_due(generation, env.config.client_search_min_chars)
        else {
            tracing::trace!(generation, "Search superseded by a newer keystroke");
            return SmallVec::new();
        };

        let directory = Arc::clone(&env.clients);
        smallvec![async_effect! {
            Some(match client::search(directory, term.clone()).await {
                Ok(clients) => BookingAction::ClientsFound { session, term, clients },
                Err(error) => BookingAction::ClientSearchFailed { session, term, error },
            })
        }]
    }

    fn submit_client(
        state: &mut BookingState,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.phase != BookingPhase::ResolvingClient {
            tracing::warn!(phase = ?state.phase, "Client submission ignored outside client resolution");
            return SmallVec::new();
        }

        match state.client.submit() {
            Submission::Invalid(errors) => {
                tracing::debug!(errors = errors.len(), "Client form invalid");
                state.last_error = Some(BookingError::ClientValidation(errors));
                SmallVec::new()
            },
            Submission::Reuse(client) => {
                tracing::debug!(client_id = %client.id, "Existing client bound");
                state.last_error = None;
                state.enter(BookingPhase::AwaitingPayment);
                SmallVec::new()
            },
            Submission::Create(fields) => {
                state.last_error = None;
                let directory = Arc::clone(&env.clients);
                let session = state.session;
                smallvec![async_effect! {
                    Some(match client::create(directory, fields).await {
                        Ok(client) => BookingAction::ClientCreated { session, client },
                        Err(error) => BookingAction::ClientCreationFailed { session, error },
                    })
                }]
            },
            Submission::Ignored => {
                tracing::warn!("Client submission ignored");
                SmallVec::new()
            },
        }
    }

    fn submit_payment(
        state: &mut BookingState,
        form: &PaymentForm,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.phase != BookingPhase::AwaitingPayment {
            tracing::warn!(phase = ?state.phase, "Payment submission ignored");
            return SmallVec::new();
        }

        let (draft, input) = match state.validate_payment(
            form,
            env.clock.today(),
            env.config.payment_method_max_len,
        ) {
            Ok(valid) => valid,
            Err(error) => {
                tracing::debug!(error = %error, "Payment form rejected");
                state.last_error = Some(error);
                return SmallVec::new();
            },
        };

        state.payment = Some(input.clone());
        state.last_error = None;
        state.enter(BookingPhase::Submitting);

        let session = state.session;
        if let Some(reservation) = &state.pending_reservation {
            tracing::info!(
                reservation_id = %reservation.id,
                "Retrying payment for existing reservation"
            );
            return smallvec![record_payment_effect(env, session, reservation.id, input)];
        }

        let request = draft.request(input.status);
        let service = Arc::clone(&env.reservations);
        smallvec![async_effect! {
            Some(match create_reservation(service, request).await {
                Ok(reservation) => BookingAction::ReservationCreated { session, reservation },
                Err(error) => BookingAction::ReservationFailed { session, error },
            })
        }]
    }

    fn reservation_created(
        state: &mut BookingState,
        session: u64,
        reservation: ReservationRecord,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if !state.is_current(session) || state.phase != BookingPhase::Submitting {
            tracing::warn!(
                reservation_id = %reservation.id,
                "Reservation created for an abandoned booking"
            );
            return SmallVec::new();
        }

        let Some(input) = state.payment.clone() else {
            tracing::error!(reservation_id = %reservation.id, "No payment to record");
            state.pending_reservation = Some(reservation);
            state.enter(BookingPhase::Failed);
            return SmallVec::new();
        };

        let reservation_id = reservation.id;
        state.pending_reservation = Some(reservation);
        smallvec![record_payment_effect(env, session, reservation_id, input)]
    }

    fn payment_recorded(state: &mut BookingState, session: u64, payment: PaymentRecord) {
        if !state.is_current(session) || state.phase != BookingPhase::Submitting {
            tracing::warn!(payment_id = %payment.id, "Payment recorded for an abandoned booking");
            return;
        }

        let draft = match state.draft() {
            Ok(draft) => draft,
            Err(error) => {
                tracing::error!(
                    payment_id = %payment.id,
                    error = %error,
                    "Payment recorded for an incomplete booking"
                );
                state.last_error = Some(error);
                state.enter(BookingPhase::Failed);
                return;
            },
        };
        let Some(reservation) = state.pending_reservation.take() else {
            tracing::error!(payment_id = %payment.id, "Payment recorded without a reservation");
            state.enter(BookingPhase::Failed);
            return;
        };

        let confirmation = Confirmation::build(draft, reservation, payment, state.already_paid);
        tracing::info!(
            reservation_id = %confirmation.reservation_id(),
            total = %confirmation.total,
            paid = %confirmation.paid,
            settlement = ?confirmation.settlement,
            "Booking confirmed"
        );
        if confirmation.is_overpaid() {
            tracing::warn!(remaining = %confirmation.remaining, "Reservation overpaid");
        }

        state.already_paid = confirmation.paid;
        state.confirmation = Some(confirmation);
        state.last_error = None;
        state.enter(BookingPhase::Confirmed);
    }

    fn submission_failed(state: &mut BookingState, session: u64, error: BookingError) {
        if !state.is_current(session) || state.phase != BookingPhase::Submitting {
            tracing::debug!(error = %error, "Failure from an abandoned booking dropped");
            return;
        }

        if let Some(reservation_id) = error.dangling_reservation() {
            tracing::warn!(%reservation_id, "Reservation left without payment");
        }
        state.last_error = Some(error);
        state.enter(BookingPhase::Failed);
    }

    fn cancel(state: &mut BookingState) {
        if state.phase == BookingPhase::Submitting {
            tracing::warn!("Cancel ignored while a submission is in flight");
            return;
        }

        if let Some(reservation) = &state.pending_reservation {
            tracing::warn!(
                reservation_id = %reservation.id,
                "Booking abandoned with an unpaid reservation"
            );
        }

        let session = state.session + 1;
        *state = BookingState {
            session,
            ..BookingState::new()
        };
        tracing::debug!(session, "Booking restarted");
    }
}

/// Persist a reservation
async fn create_reservation(
    service: Arc<dyn ReservationService>,
    request: ReservationRequest,
) -> Result<ReservationRecord, BookingError> {
    match service.create_reservation(request).await {
        Ok(reservation) => {
            BookingMetrics::record_reservation("success");
            tracing::info!(reservation_id = %reservation.id, "Reservation created");
            Ok(reservation)
        },
        Err(error) => {
            BookingMetrics::record_reservation("failure");
            tracing::warn!(error = %error, "Reservation creation failed");
            Err(BookingError::ReservationCreation(error))
        },
    }
}

fn record_payment_effect(
    env: &BookingEnvironment,
    session: u64,
    reservation_id: ReservationId,
    input: PaymentInput,
) -> Effect<BookingAction> {
    let service = Arc::clone(&env.payments);
    async_effect! {
        Some(match payment::record(service, reservation_id, input).await {
            Ok(payment) => BookingAction::PaymentRecorded { session, payment },
            Err(error) => BookingAction::PaymentFailed { session, error },
        })
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::SearchRooms { start, end } => {
                return Self::search_rooms(state, start, end, env);
            },
            BookingAction::RoomsLoaded { session, range, offers } => {
                Self::rooms_loaded(state, session, range, Ok(offers));
            },
            BookingAction::AvailabilityFailed { session, range, error } => {
                Self::rooms_loaded(state, session, range, Err(error));
            },
            BookingAction::ToggleRoom { room_id } => Self::toggle_room(state, room_id),
            BookingAction::SetQuantity { room_id, quantity } => {
                Self::set_quantity(state, room_id, quantity);
            },
            BookingAction::ConfirmRooms => Self::confirm_rooms(state),
            BookingAction::ClientSearchChanged { term } => {
                return Self::client_search_changed(state, term, env);
            },
            BookingAction::ClientSearchDue { session, generation } => {
                return Self::client_search_due(state, session, generation, env);
            },
            BookingAction::ClientsFound { session, term, clients } => {
                if state.is_current(session) && state.client.deliver_results(&term, clients) {
                    tracing::debug!(%term, "Client candidates shown");
                } else {
                    tracing::debug!(%term, "Client results for an outdated term dropped");
                }
            },
            BookingAction::ClientSearchFailed { session, term, error } => {
                if state.is_current(session) && state.client.search_failed(&term) {
                    state.last_error = Some(error);
                }
            },
            BookingAction::SelectClient { client } => {
                if state.phase == BookingPhase::ResolvingClient {
                    tracing::debug!(client_id = %client.id, "Client candidate picked");
                    state.client.select(client);
                } else {
                    tracing::warn!(phase = ?state.phase, "Client pick ignored");
                }
            },
            BookingAction::NewClient => {
                if state.phase == BookingPhase::ResolvingClient {
                    state.client.start_new();
                } else {
                    tracing::warn!(phase = ?state.phase, "New client ignored");
                }
            },
            BookingAction::EditClient { fields } => {
                if state.phase != BookingPhase::ResolvingClient || !state.client.edit(fields) {
                    tracing::debug!("Client edit ignored");
                }
            },
            BookingAction::SubmitClient => return Self::submit_client(state, env),
            BookingAction::ClientCreated { session, client } => {
                if state.is_current(session) && state.client.created(client) {
                    state.last_error = None;
                    state.enter(BookingPhase::AwaitingPayment);
                } else {
                    tracing::warn!("Client created for an abandoned booking");
                }
            },
            BookingAction::ClientCreationFailed { session, error } => {
                if state.is_current(session) && state.client.creation_failed() {
                    state.last_error = Some(error);
                }
            },
            BookingAction::SubmitPayment { form } => {
                return Self::submit_payment(state, &form, env);
            },
            BookingAction::ReservationCreated { session, reservation } => {
                return Self::reservation_created(state, session, reservation, env);
            },
            BookingAction::ReservationFailed { session, error }
            | BookingAction::PaymentFailed { session, error } => {
                Self::submission_failed(state, session, error);
            },
            BookingAction::PaymentRecorded { session, payment } => {
                Self::payment_recorded(state, session, payment);
            },
            BookingAction::Retry => {
                if state.phase == BookingPhase::Failed {
                    state.last_error = None;
                    state.enter(BookingPhase::AwaitingPayment);
                } else {
                    tracing::warn!(phase = ?state.phase, "Retry ignored");
                }
            },
            BookingAction::Cancel => Self::cancel(state),
        }

        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::config::WorkflowConfig;
    use crate::environment::ApiFuture;
    use crate::mocks::{InMemoryHotel, Operation};
    use crate::types::{ClientId, ReservationStatus};
    use frontdesk_core::environment::Clock;
    use frontdesk_testing::{ReducerTest, assertions, resolve_effects, test_clock};
    use std::collections::VecDeque;

    fn october(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
    }

    fn environment(hotel: &InMemoryHotel) -> BookingEnvironment {
        BookingEnvironment::from_hotel(
            Arc::new(hotel.clone()),
            Arc::new(test_clock()),
            WorkflowConfig::default(),
        )
    }

    fn search(start: u32, end: u32) -> BookingAction {
        BookingAction::SearchRooms {
            start: Some(october(start)),
            end: Some(october(end)),
        }
    }

    fn pay(amount: i64, status: &str) -> BookingAction {
        BookingAction::SubmitPayment {
            form: PaymentForm {
                amount: Money::from_units(amount),
                date: None,
                method: "Espèces".into(),
                status: status.into(),
            },
        }
    }

    fn resolving_client() -> BookingState {
        BookingState {
            phase: BookingPhase::ResolvingClient,
            ..BookingState::new()
        }
    }

    /// Reduce `action` and every action its effects feed back, until quiet
    async fn drive(state: &mut BookingState, env: &BookingEnvironment, action: BookingAction) {
        let reducer = BookingReducer::new();
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let effects = reducer.reduce(state, action, env);
            queue.extend(resolve_effects(effects).await);
        }
    }

    /// Room 102 (120/night) for 15 → 20 October, first seeded client bound
    async fn ready_for_payment(hotel: &InMemoryHotel, env: &BookingEnvironment) -> BookingState {
        let mut state = BookingState::new();
        drive(&mut state, env, search(15, 20)).await;
        drive(&mut state, env, BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await;
        drive(&mut state, env, BookingAction::ConfirmRooms).await;

        let client = hotel.clients()[0].clone();
        drive(&mut state, env, BookingAction::SelectClient { client }).await;
        drive(&mut state, env, BookingAction::SubmitClient).await;

        assert_eq!(state.phase, BookingPhase::AwaitingPayment);
        assert_eq!(state.total(), Money::from_units(600));
        state
    }

    struct FixedReservation(i64);

    impl ReservationService for FixedReservation {
        fn create_reservation(&self, request: ReservationRequest) -> ApiFuture<ReservationRecord> {
            let id = ReservationId::new(self.0);
            Box::pin(async move {
                Ok(ReservationRecord {
                    id,
                    client_id: request.client_id,
                    rooms: request.rooms,
                    range: request.range,
                    status: request.status.as_str().to_string(),
                    nights: None,
                    total: None,
                })
            })
        }
    }

    // ========================================================================
    // Dates and rooms
    // ========================================================================

    #[test]
    fn search_starts_a_query() {
        let hotel = InMemoryHotel::seeded();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(BookingState::new())
            .when_action(search(15, 20))
            .then_state(|state| {
                assert_eq!(state.phase, BookingPhase::Selecting);
                assert_eq!(state.nights(), Some(5));
                assert!(state.availability.is_loading());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn invalid_dates_issue_no_query() {
        let hotel = InMemoryHotel::seeded();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(BookingState::new())
            .when_action(search(20, 20))
            .then_state(|state| {
                assert_eq!(state.phase, BookingPhase::Searching);
                assert!(matches!(state.last_error, Some(BookingError::InvalidRange { .. })));
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(BookingState::new())
            .when_action(BookingAction::SearchRooms { start: Some(october(15)), end: None })
            .then_state(|state| assert_eq!(state.last_error, Some(BookingError::MissingDate)))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn two_rooms_for_five_nights() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = BookingState::new();

        drive(&mut state, &env, search(15, 20)).await;
        assert!(!state.availability.is_loading());
        assert_eq!(state.availability.offers().len(), 4);

        drive(&mut state, &env, BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await;
        drive(&mut state, &env, BookingAction::ToggleRoom { room_id: RoomId::new(1) }).await;
        drive(
            &mut state,
            &env,
            BookingAction::SetQuantity { room_id: RoomId::new(1), quantity: 2 },
        )
        .await;

        assert_eq!(state.total(), Money::from_units(1400));
    }

    #[tokio::test]
    async fn room_that_is_not_offered_cannot_be_selected() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = BookingState::new();

        drive(&mut state, &env, search(15, 20)).await;
        drive(&mut state, &env, BookingAction::ToggleRoom { room_id: RoomId::new(5) }).await;

        assert!(state.selection.is_empty());
    }

    #[tokio::test]
    async fn changing_dates_clears_the_selection() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = BookingState::new();

        drive(&mut state, &env, search(15, 20)).await;
        drive(&mut state, &env, BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await;
        drive(&mut state, &env, search(15, 20)).await;
        assert!(state.selection.contains(RoomId::new(2)));

        drive(&mut state, &env, search(16, 18)).await;
        assert!(state.selection.is_empty());
        assert_eq!(state.nights(), Some(2));
    }

    #[tokio::test]
    async fn failed_reload_keeps_the_selection() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = BookingState::new();

        drive(&mut state, &env, search(15, 20)).await;
        drive(&mut state, &env, BookingAction::ToggleRoom { room_id: RoomId::new(2) }).await;

        hotel.fail(Operation::FindAvailableRooms);
        drive(&mut state, &env, search(15, 20)).await;

        assert!(matches!(state.last_error, Some(BookingError::AvailabilityQuery(_))));
        assert!(state.selection.contains(RoomId::new(2)));
        assert_eq!(state.total(), Money::from_units(600));
    }

    #[tokio::test]
    async fn late_response_for_older_dates_is_dropped() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = BookingState::new();

        let first = reducer.reduce(&mut state, search(15, 20), &env);
        let second = reducer.reduce(&mut state, search(16, 18), &env);

        let newer = resolve_effects(second).await;
        let older = resolve_effects(first).await;
        for action in newer.into_iter().chain(older) {
            reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.nights(), Some(2));
        assert_eq!(state.availability.offers().len(), 4);

        let stale_range = DateRange::new(october(15), october(20)).unwrap();
        reducer.reduce(
            &mut state,
            BookingAction::RoomsLoaded { session: 0, range: stale_range, offers: Vec::new() },
            &env,
        );
        assert_eq!(state.availability.offers().len(), 4);
    }

    #[tokio::test]
    async fn availability_failure_is_shown() {
        let hotel = InMemoryHotel::seeded();
        hotel.fail(Operation::FindAvailableRooms);
        let env = environment(&hotel);
        let mut state = BookingState::new();

        drive(&mut state, &env, search(15, 20)).await;

        assert_eq!(state.phase, BookingPhase::Selecting);
        assert!(matches!(state.last_error, Some(BookingError::AvailabilityQuery(_))));
        assert!(state.availability.error().is_some());
        assert!(!state.availability.is_empty_result());
    }

    #[test]
    fn empty_selection_cannot_be_confirmed() {
        let hotel = InMemoryHotel::seeded();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(BookingState::new())
            .when_action(search(15, 20))
            .when_action(BookingAction::ConfirmRooms)
            .then_state(|state| {
                assert_eq!(state.phase, BookingPhase::Selecting);
                assert_eq!(state.last_error, Some(BookingError::EmptySelection));
            })
            .run();
    }

    // ========================================================================
    // Client
    // ========================================================================

    #[test]
    fn one_character_is_too_short_to_search() {
        let hotel = InMemoryHotel::seeded();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(resolving_client())
            .when_action(BookingAction::ClientSearchChanged { term: "a".into() })
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(BookingReducer::new())
            .with_env(environment(&hotel))
            .given_state(resolving_client())
            .when_action(BookingAction::ClientSearchChanged { term: "ab".into() })
            .then_effects(assertions::assert_has_delay_effect)
            .run();
    }

    #[tokio::test]
    async fn only_the_last_keystroke_searches() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = resolving_client();

        let first = reducer.reduce(
            &mut state,
            BookingAction::ClientSearchChanged { term: "ben".into() },
            &env,
        );
        let second = reducer.reduce(
            &mut state,
            BookingAction::ClientSearchChanged { term: "bena".into() },
            &env,
        );

        for due in resolve_effects(first).await {
            assertions::assert_no_effects(&reducer.reduce(&mut state, due, &env));
        }
        for due in resolve_effects(second).await {
            drive(&mut state, &env, due).await;
        }

        assert_eq!(hotel.calls(Operation::SearchClients), 1);
        assert_eq!(state.client.mode().candidates().len(), 1);
        assert_eq!(state.client.mode().candidates()[0].fields.family_name, "Benali");
    }

    #[tokio::test]
    async fn new_client_is_created_before_payment() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = resolving_client();

        drive(&mut state, &env, BookingAction::NewClient).await;
        drive(
            &mut state,
            &env,
            BookingAction::EditClient {
                fields: ClientFields {
                    family_name: "Haddad".into(),
                    given_name: "Sami".into(),
                    email: "sami@example.com".into(),
                    phone: "0611223344".into(),
                    document: "K9876543".into(),
                },
            },
        )
        .await;
        drive(&mut state, &env, BookingAction::SubmitClient).await;

        assert_eq!(state.phase, BookingPhase::AwaitingPayment);
        assert_eq!(hotel.calls(Operation::CreateClient), 1);
        let resolved = state.client.resolved().unwrap();
        assert_eq!(resolved.fields.family_name, "Haddad");
        assert!(hotel.clients().iter().any(|client| client.id == resolved.id));
    }

    #[tokio::test]
    async fn invalid_client_form_is_not_sent() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = resolving_client();

        drive(&mut state, &env, BookingAction::NewClient).await;
        drive(
            &mut state,
            &env,
            BookingAction::EditClient {
                fields: ClientFields {
                    family_name: "Haddad".into(),
                    email: "not-an-email".into(),
                    document: "K98".into(),
                    ..ClientFields::default()
                },
            },
        )
        .await;
        drive(&mut state, &env, BookingAction::SubmitClient).await;

        assert_eq!(state.phase, BookingPhase::ResolvingClient);
        assert_eq!(hotel.calls(Operation::CreateClient), 0);
        let Some(BookingError::ClientValidation(errors)) = &state.last_error else {
            unreachable!("expected a validation error, got {:?}", state.last_error);
        };
        assert_eq!(errors.len(), 4);
    }

    #[tokio::test]
    async fn duplicate_client_keeps_the_form_open() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = resolving_client();
        let existing = hotel.clients()[0].fields.clone();

        drive(&mut state, &env, BookingAction::NewClient).await;
        drive(&mut state, &env, BookingAction::EditClient { fields: existing }).await;
        drive(&mut state, &env, BookingAction::SubmitClient).await;

        assert_eq!(state.phase, BookingPhase::ResolvingClient);
        assert!(matches!(state.last_error, Some(BookingError::ClientCreation(_))));
        assert!(state.client.resolved().is_none());
    }

    // ========================================================================
    // Payment and submission
    // ========================================================================

    #[tokio::test]
    async fn complete_payment_covers_the_remaining_balance() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;

        drive(&mut state, &env, pay(150, "complete")).await;

        assert_eq!(state.phase, BookingPhase::Confirmed);
        let confirmation = state.confirmation.as_ref().unwrap();
        assert_eq!(confirmation.payment.amount, Money::from_units(600));
        assert_eq!(confirmation.payment.date, test_clock().today());
        assert_eq!(confirmation.nights, 5);
        assert_eq!(confirmation.total, Money::from_units(600));
        assert_eq!(confirmation.remaining, Money::ZERO);
        assert_eq!(confirmation.settlement, Settlement::FullyPaid);
        assert_eq!(
            confirmation.reservation.status,
            ReservationStatus::Confirmee.as_str()
        );
    }

    #[tokio::test]
    async fn deposit_leaves_the_reservation_pending() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;

        drive(&mut state, &env, pay(200, "acompte")).await;

        let confirmation = state.confirmation.as_ref().unwrap();
        assert_eq!(confirmation.payment.status, PaymentStatus::Partielle);
        assert_eq!(confirmation.remaining, Money::from_units(400));
        assert_eq!(confirmation.settlement, Settlement::PartiallyPaid);
        assert_eq!(
            hotel.reservations()[0].status,
            ReservationStatus::EnAttente.as_str()
        );
    }

    #[tokio::test]
    async fn empty_selection_never_creates_a_reservation() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = BookingState::new();
        drive(&mut state, &env, search(15, 20)).await;
        state.phase = BookingPhase::AwaitingPayment;

        drive(&mut state, &env, pay(100, "partielle")).await;

        assert_eq!(state.phase, BookingPhase::AwaitingPayment);
        assert_eq!(state.last_error, Some(BookingError::EmptySelection));
        assert_eq!(hotel.calls(Operation::CreateReservation), 0);
    }

    #[tokio::test]
    async fn non_positive_amount_records_nothing() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;

        for amount in [0, -50] {
            drive(&mut state, &env, pay(amount, "partielle")).await;
            assert!(matches!(state.last_error, Some(BookingError::InvalidAmount { .. })));
        }
        drive(&mut state, &env, pay(700, "partielle")).await;
        assert!(matches!(state.last_error, Some(BookingError::InvalidAmount { .. })));

        assert_eq!(state.phase, BookingPhase::AwaitingPayment);
        assert_eq!(hotel.calls(Operation::CreateReservation), 0);
        assert_eq!(hotel.calls(Operation::CreatePayment), 0);
    }

    #[tokio::test]
    async fn payment_failure_names_the_reservation() {
        let hotel = InMemoryHotel::seeded();
        hotel.fail(Operation::CreatePayment);
        let mut env = environment(&hotel);
        env.reservations = Arc::new(FixedReservation(42));
        let mut state = ready_for_payment(&hotel, &env).await;

        drive(&mut state, &env, pay(600, "complete")).await;

        assert_eq!(state.phase, BookingPhase::Failed);
        let error = state.last_error.clone().unwrap();
        assert_eq!(error.dangling_reservation(), Some(ReservationId::new(42)));
        assert!(
            error
                .to_string()
                .starts_with("payment failed for reservation #42")
        );
        assert_eq!(
            state.pending_reservation.as_ref().map(|reservation| reservation.id),
            Some(ReservationId::new(42))
        );
    }

    #[tokio::test]
    async fn retry_after_payment_failure_only_records_the_payment() {
        let hotel = InMemoryHotel::seeded();
        hotel.fail(Operation::CreatePayment);
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;

        drive(&mut state, &env, pay(600, "complete")).await;
        assert_eq!(state.phase, BookingPhase::Failed);

        hotel.recover(Operation::CreatePayment);
        drive(&mut state, &env, BookingAction::Retry).await;
        assert_eq!(state.phase, BookingPhase::AwaitingPayment);
        drive(&mut state, &env, pay(600, "complete")).await;

        assert_eq!(state.phase, BookingPhase::Confirmed);
        assert_eq!(hotel.calls(Operation::CreateReservation), 1);
        assert_eq!(hotel.calls(Operation::CreatePayment), 2);
        assert_eq!(hotel.reservations().len(), 1);
        assert_eq!(hotel.payments().len(), 1);
        assert!(state.pending_reservation.is_none());
    }

    #[tokio::test]
    async fn reservation_failure_persists_nothing() {
        let hotel = InMemoryHotel::seeded();
        hotel.fail(Operation::CreateReservation);
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;

        drive(&mut state, &env, pay(600, "complete")).await;

        assert_eq!(state.phase, BookingPhase::Failed);
        let error = state.last_error.clone().unwrap();
        assert!(matches!(error, BookingError::ReservationCreation(_)));
        assert_eq!(error.dangling_reservation(), None);
        assert_eq!(hotel.calls(Operation::CreatePayment), 0);

        hotel.recover(Operation::CreateReservation);
        drive(&mut state, &env, BookingAction::Retry).await;
        drive(&mut state, &env, pay(600, "complete")).await;
        assert_eq!(state.phase, BookingPhase::Confirmed);
        assert_eq!(hotel.calls(Operation::CreateReservation), 2);
    }

    #[tokio::test]
    async fn payment_for_an_incomplete_booking_keeps_the_reservation() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = ready_for_payment(&hotel, &env).await;

        let effects = reducer.reduce(&mut state, pay(600, "complete"), &env);
        let mut created = resolve_effects(effects).await;
        assert_eq!(created.len(), 1);
        let effects = reducer.reduce(&mut state, created.remove(0), &env);
        let mut recorded = resolve_effects(effects).await;
        assert_eq!(recorded.len(), 1);

        state.selection = RoomSelection::new();
        reducer.reduce(&mut state, recorded.remove(0), &env);

        assert_eq!(state.phase, BookingPhase::Failed);
        assert_eq!(state.last_error, Some(BookingError::EmptySelection));
        assert!(state.pending_reservation.is_some());
        assert!(state.confirmation.is_none());

        drive(&mut state, &env, BookingAction::Cancel).await;
        assert_eq!(state.phase, BookingPhase::Searching);
    }

    #[tokio::test]
    async fn second_submission_while_in_flight_is_ignored() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = ready_for_payment(&hotel, &env).await;

        let first = reducer.reduce(&mut state, pay(600, "complete"), &env);
        assert_eq!(state.phase, BookingPhase::Submitting);
        let second = reducer.reduce(&mut state, pay(600, "complete"), &env);
        assertions::assert_no_effects(&second);

        for action in resolve_effects(first).await {
            drive(&mut state, &env, action).await;
        }
        assert_eq!(hotel.calls(Operation::CreateReservation), 1);
        assert_eq!(state.phase, BookingPhase::Confirmed);
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    #[tokio::test]
    async fn cancel_drops_responses_from_the_abandoned_booking() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = BookingState::new();

        let pending = reducer.reduce(&mut state, search(15, 20), &env);
        reducer.reduce(&mut state, BookingAction::Cancel, &env);
        assert_eq!(state.session, 1);
        assert_eq!(state.phase, BookingPhase::Searching);

        for action in resolve_effects(pending).await {
            reducer.reduce(&mut state, action, &env);
        }
        assert_eq!(state.range(), None);
        assert!(state.availability.offers().is_empty());
    }

    #[tokio::test]
    async fn cancel_is_ignored_while_submitting() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let reducer = BookingReducer::new();
        let mut state = ready_for_payment(&hotel, &env).await;

        let pending = reducer.reduce(&mut state, pay(600, "complete"), &env);
        reducer.reduce(&mut state, BookingAction::Cancel, &env);
        assert_eq!(state.session, 0);

        for action in resolve_effects(pending).await {
            drive(&mut state, &env, action).await;
        }
        assert_eq!(state.phase, BookingPhase::Confirmed);
    }

    #[tokio::test]
    async fn cancel_after_confirmation_starts_over() {
        let hotel = InMemoryHotel::seeded();
        let env = environment(&hotel);
        let mut state = ready_for_payment(&hotel, &env).await;
        drive(&mut state, &env, pay(600, "complete")).await;

        drive(&mut state, &env, BookingAction::Cancel).await;

        assert_eq!(state.session, 1);
        assert_eq!(state.phase, BookingPhase::Searching);
        assert!(state.confirmation.is_none());
        assert!(state.selection.is_empty());
        assert!(state.client.resolved().is_none());

        // The booked room is gone for overlapping dates
        drive(&mut state, &env, search(18, 22)).await;
        assert!(state.availability.offer(RoomId::new(2)).is_none());
        assert_eq!(hotel.reservations()[0].client_id, ClientId::new(6));
    }
}

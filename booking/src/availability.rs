//! Availability query: which rooms can be offered for a date range.
//!
//! The query itself is a single collaborator call. The [`Availability`]
//! tracker remembers which range is active so a late response for an older
//! range is dropped (last query wins, judged by range, not arrival order).

use crate::dates::DateRange;
use crate::environment::RoomCatalog;
use crate::error::BookingError;
use crate::metrics::BookingMetrics;
use crate::types::{Money, RoomId, RoomOffer, RoomRecord};
use std::sync::Arc;

/// Turn catalog records into offers
///
/// Rooms whose status is not available are dropped. A missing nightly price
/// falls back to the room type's base price, then to zero.
#[must_use]
pub fn offers_from_records(records: Vec<RoomRecord>) -> Vec<RoomOffer> {
    records
        .into_iter()
        .filter(|record| {
            let keep = record.status.is_available();
            if !keep {
                tracing::trace!(room = %record.id, status = ?record.status, "Room not offered");
            }
            keep
        })
        .map(|record| RoomOffer {
            nightly_price: record
                .nightly_price
                .or(record.base_price)
                .unwrap_or(Money::ZERO),
            id: record.id,
            number: record.number,
            room_type: record.room_type,
            capacity: record.capacity,
            private: record.private,
            status: record.status,
        })
        .collect()
}

/// Ask the catalog for the rooms available in `range`
///
/// # Errors
///
/// Returns [`BookingError::AvailabilityQuery`] carrying the collaborator
/// failure.
pub async fn query(
    catalog: Arc<dyn RoomCatalog>,
    range: DateRange,
) -> Result<Vec<RoomOffer>, BookingError> {
    match catalog.find_available_rooms(range).await {
        Ok(records) => {
            let offers = offers_from_records(records);
            BookingMetrics::record_availability_query("success");
            tracing::debug!(%range, offers = offers.len(), "Availability loaded");
            Ok(offers)
        },
        Err(error) => {
            BookingMetrics::record_availability_query("failure");
            tracing::warn!(%range, error = %error, "Availability query failed");
            Err(BookingError::AvailabilityQuery(error))
        },
    }
}

/// Outcome of handing a query response to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The response was for the active range and is now shown
    Applied,
    /// The response was for a superseded range and was dropped
    Stale,
}

/// Offers for the active date range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Availability {
    active: Option<DateRange>,
    offers: Vec<RoomOffer>,
    loading: bool,
    error: Option<BookingError>,
}

impl Availability {
    /// Empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query for `range`; previous offers are cleared
    pub fn begin(&mut self, range: DateRange) {
        self.active = Some(range);
        self.offers.clear();
        self.loading = true;
        self.error = None;
    }

    /// Deliver a response for `range`
    pub fn deliver(
        &mut self,
        range: DateRange,
        result: Result<Vec<RoomOffer>, BookingError>,
    ) -> Delivery {
        if self.active != Some(range) {
            return Delivery::Stale;
        }

        self.loading = false;
        match result {
            Ok(offers) => {
                self.offers = offers;
                self.error = None;
            },
            Err(error) => {
                self.offers.clear();
                self.error = Some(error);
            },
        }
        Delivery::Applied
    }

    /// Range currently queried or shown
    #[must_use]
    pub const fn active_range(&self) -> Option<DateRange> {
        self.active
    }

    /// Offers for the active range
    #[must_use]
    pub fn offers(&self) -> &[RoomOffer] {
        &self.offers
    }

    /// Offer for a room, if it is currently offered
    #[must_use]
    pub fn offer(&self, room_id: RoomId) -> Option<&RoomOffer> {
        self.offers.iter().find(|offer| offer.id == room_id)
    }

    /// A query is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Loaded with no room to offer (empty state, not an error)
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        !self.loading && self.error.is_none() && self.active.is_some() && self.offers.is_empty()
    }

    /// Failure of the last query for the active range
    #[must_use]
    pub const fn error(&self) -> Option<&BookingError> {
        self.error.as_ref()
    }
}

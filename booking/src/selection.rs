//! Room selection: chosen rooms, quantities and totals.

use crate::error::BookingError;
use crate::types::{Money, ReservedRoom, RoomId, RoomOffer};
use std::collections::BTreeMap;

/// An offered room the clerk picked, with its quantity
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRoom {
    /// The offer as it was when picked
    pub offer: RoomOffer,
    /// Quantity, at least 1
    pub quantity: u32,
}

impl SelectedRoom {
    /// `nightly price × nights × quantity`
    #[must_use]
    pub fn subtotal(&self, nights: u32) -> Money {
        self.offer.nightly_price.times(nights).times(self.quantity)
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Room added with quantity 1
    Added,
    /// Room removed along with its quantity
    Removed,
    /// Room not bookable, nothing changed
    Ignored,
}

/// Selected rooms keyed by room ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomSelection {
    rooms: BTreeMap<RoomId, SelectedRoom>,
}

impl RoomSelection {
    /// Empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the room, or unselect it if already selected
    ///
    /// Rooms that are not available are inert.
    pub fn toggle(&mut self, offer: &RoomOffer) -> Toggle {
        if !offer.status.is_available() {
            return Toggle::Ignored;
        }

        if self.rooms.remove(&offer.id).is_some() {
            Toggle::Removed
        } else {
            self.rooms.insert(
                offer.id,
                SelectedRoom {
                    offer: offer.clone(),
                    quantity: 1,
                },
            );
            Toggle::Added
        }
    }

    /// Overwrite the quantity of a selected room
    ///
    /// Returns `false` (and changes nothing) for a quantity below 1 or a room
    /// that is not selected.
    pub fn set_quantity(&mut self, room_id: RoomId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.rooms.get_mut(&room_id) {
            Some(selected) => {
                selected.quantity = quantity;
                true
            },
            None => false,
        }
    }

    /// Keep only the rooms `keep` accepts
    pub fn retain(&mut self, mut keep: impl FnMut(RoomId) -> bool) {
        self.rooms.retain(|id, _| keep(*id));
    }

    /// Drop every selected room
    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    /// Whether the room is selected
    #[must_use]
    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains_key(&room_id)
    }

    /// Quantity of a selected room
    #[must_use]
    pub fn quantity(&self, room_id: RoomId) -> Option<u32> {
        self.rooms.get(&room_id).map(|selected| selected.quantity)
    }

    /// Selected rooms, by room ID
    pub fn iter(&self) -> impl Iterator<Item = &SelectedRoom> {
        self.rooms.values()
    }

    /// Number of distinct rooms selected
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// No room selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Sum of the subtotals
    #[must_use]
    pub fn grand_total(&self, nights: u32) -> Money {
        self.iter().map(|selected| selected.subtotal(nights)).sum()
    }

    /// Room lines for a reservation request
    #[must_use]
    pub fn reserved_rooms(&self) -> Vec<ReservedRoom> {
        self.iter()
            .map(|selected| ReservedRoom {
                room_id: selected.offer.id,
                quantity: selected.quantity,
            })
            .collect()
    }

    /// Precondition for moving on
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::EmptySelection`] if no room is selected.
    pub fn ensure_not_empty(&self) -> Result<(), BookingError> {
        if self.is_empty() {
            Err(BookingError::EmptySelection)
        } else {
            Ok(())
        }
    }
}

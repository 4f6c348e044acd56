// libs/booking-cell/src/services/availability.rs
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailableSlots, BookingError, BookingStatus, TimeSlot};
use crate::repository::BookingRepository;
use crate::services::conflict::slot_conflicts_with;
use crate::slots::{day_slots, slot_end_label};

/// Pure read-side queries over a room's day grid. Only `active` bookings
/// occupy slots; cancelled and expired ones never block anything.
pub struct AvailabilityService {
    repository: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }

    /// The 48 canonical slots of `date`, each marked booked when it
    /// overlaps any active booking for the room.
    pub async fn available_slots(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailableSlots, BookingError> {
        debug!("Computing available slots for room {} on {}", room_id, date);

        let bookings = self
            .repository
            .find(room_id, date, BookingStatus::Active)
            .await?;

        let mut slots = day_slots();
        for slot in &mut slots {
            for booking in &bookings {
                if slot_conflicts_with(slot, booking)? {
                    slot.is_booked = true;
                    break;
                }
            }
        }

        Ok(AvailableSlots {
            date,
            time_slots: slots,
        })
    }

    /// Whether every requested slot is free of active bookings. A repository
    /// failure propagates as an error, which callers must treat as "not
    /// available" - never the other way around.
    pub async fn is_range_available(
        &self,
        room_id: Uuid,
        date: NaiveDate,
        slot_starts: &[String],
    ) -> Result<bool, BookingError> {
        let bookings = self
            .repository
            .find(room_id, date, BookingStatus::Active)
            .await?;

        for start in slot_starts {
            let slot = TimeSlot {
                start: start.clone(),
                end: slot_end_label(start)?,
                is_booked: false,
            };

            for booking in &bookings {
                if slot_conflicts_with(&slot, booking)? {
                    debug!(
                        "Slot {} on {} conflicts with booking {}",
                        start, date, booking.id
                    );
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}

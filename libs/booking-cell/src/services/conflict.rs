// libs/booking-cell/src/services/conflict.rs
//
// Overlap detection on a single day's minute axis. Half-open intervals:
// a slot that ends exactly where a booking starts does not conflict.

use crate::models::{Booking, BookingError, TimeSlot};
use crate::slots::{time_to_minutes, MINUTES_PER_DAY};

/// Check whether two labelled time ranges overlap. An end label of "00:00"
/// paired with a later start means the range runs forward across midnight,
/// so that end is promoted to 24:00 before comparing. Zero-length ranges
/// never overlap anything.
pub fn ranges_overlap(
    a_start: &str,
    a_end: &str,
    b_start: &str,
    b_end: &str,
) -> Result<bool, BookingError> {
    let a_start = time_to_minutes(a_start)?;
    let a_end = promote_midnight_end(a_start, time_to_minutes(a_end)?);
    let b_start = time_to_minutes(b_start)?;
    let b_end = promote_midnight_end(b_start, time_to_minutes(b_end)?);

    if a_start >= a_end || b_start >= b_end {
        return Ok(false);
    }

    Ok(a_start < b_end && a_end > b_start)
}

/// Whether a canonical grid slot collides with a booking's range.
pub fn slot_conflicts_with(slot: &TimeSlot, booking: &Booking) -> Result<bool, BookingError> {
    ranges_overlap(
        &slot.start,
        &slot.end,
        &booking.start_time,
        &booking.end_time,
    )
}

fn promote_midnight_end(start: u32, end: u32) -> u32 {
    if end == 0 && start > 0 {
        MINUTES_PER_DAY
    } else {
        end
    }
}

// libs/booking-cell/src/slots.rs
//
// Slot arithmetic for the 30-minute booking grid. A day has exactly 48
// canonical slots covering [00:00, 24:00). End-of-day has two spellings:
// the grid walk wraps 23:30 to "00:00", while a persisted booking records
// "24:00" so that a midnight-crossing range stays distinguishable from a
// range starting at midnight.

use crate::models::{BookingError, TimeSlot};

pub const SLOT_MINUTES: u32 = 30;
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse "HH:MM" into minutes since midnight. Accepts the end-of-day
/// sentinel "24:00" (1440); everything else must be a plain wall-clock
/// label with hour 0-23 and minute 0-59.
pub fn time_to_minutes(t: &str) -> Result<u32, BookingError> {
    if t == "24:00" {
        return Ok(MINUTES_PER_DAY);
    }

    let mut parts = t.split(':');
    let (hour, minute) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), None) => (h, m),
        _ => return Err(BookingError::InvalidFormat(t.to_string())),
    };

    let hour: u32 = hour
        .parse()
        .map_err(|_| BookingError::InvalidFormat(t.to_string()))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| BookingError::InvalidFormat(t.to_string()))?;

    if hour > 23 || minute > 59 {
        return Err(BookingError::InvalidFormat(t.to_string()));
    }

    Ok(hour * 60 + minute)
}

/// End label of the slot starting at `start`, as the day grid spells it:
/// 30 minutes later, with 24:00 wrapping to "00:00".
pub fn slot_end_label(start: &str) -> Result<String, BookingError> {
    let minutes = (time_to_minutes(start)? + SLOT_MINUTES) % MINUTES_PER_DAY;
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// End label of the slot starting at `start`, as a booking records it:
/// 30 minutes later, with end-of-day spelled "24:00" rather than "00:00".
pub fn booking_end_label(start: &str) -> Result<String, BookingError> {
    let minutes = time_to_minutes(start)? + SLOT_MINUTES;
    if minutes % MINUTES_PER_DAY == 0 {
        return Ok("24:00".to_string());
    }
    let minutes = minutes % MINUTES_PER_DAY;
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// The 48 canonical slots of a day, in grid order, all unbooked.
pub fn day_slots() -> Vec<TimeSlot> {
    let mut slots = Vec::with_capacity(48);
    for hour in 0..24 {
        for minute in (0..60).step_by(SLOT_MINUTES as usize) {
            let start = format!("{:02}:{:02}", hour, minute);
            let end = format!(
                "{:02}:{:02}",
                (hour + (minute + SLOT_MINUTES) / 60) % 24,
                (minute + SLOT_MINUTES) % 60
            );
            slots.push(TimeSlot {
                start,
                end,
                is_booked: false,
            });
        }
    }
    slots
}

/// A booking request must be one unbroken block: each slot ends exactly
/// where the next one starts. Empty and single-slot requests pass
/// trivially; malformed labels fail the check.
pub fn are_consecutive(slot_starts: &[String]) -> bool {
    if slot_starts.len() <= 1 {
        return true;
    }

    slot_starts.windows(2).all(|pair| {
        matches!(slot_end_label(&pair[0]), Ok(end) if end == pair[1])
    })
}

/// An end-of-range boundary resolved onto a concrete day: `day_offset` is 0
/// for the booking's own date and 1 for the following day. This replaces
/// inferring a midnight crossing from sibling string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    pub day_offset: u8,
    pub minutes: u32,
}

impl DayBoundary {
    /// Position on a single extended minute axis (0..=1440).
    pub fn total_minutes(&self) -> u32 {
        self.day_offset as u32 * MINUTES_PER_DAY + self.minutes
    }
}

/// Resolve a booking's end label against its start label. "24:00" is
/// midnight of the following day. A "00:00" end with a later start is a
/// legacy spelling of the same midnight crossing; "00:00"-"00:00" is the
/// degenerate same-instant case and stays on the booking's own day.
pub fn resolve_end(start: &str, end: &str) -> Result<DayBoundary, BookingError> {
    let end_minutes = time_to_minutes(end)?;

    if end_minutes == MINUTES_PER_DAY {
        return Ok(DayBoundary {
            day_offset: 1,
            minutes: 0,
        });
    }

    if end_minutes == 0 {
        let start_minutes = time_to_minutes(start)?;
        if start_minutes > 0 {
            return Ok(DayBoundary {
                day_offset: 1,
                minutes: 0,
            });
        }
        return Ok(DayBoundary {
            day_offset: 0,
            minutes: 0,
        });
    }

    Ok(DayBoundary {
        day_offset: 0,
        minutes: end_minutes,
    })
}

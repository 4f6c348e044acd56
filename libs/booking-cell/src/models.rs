// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::slots;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    pub member_id: Uuid,
    pub date: NaiveDate,
    /// Slot-grid start label, "HH:MM".
    pub start_time: String,
    /// End label, "HH:MM"; "24:00" marks end of day. Rows written by older
    /// versions may carry "00:00" for a midnight-crossing booking instead.
    pub end_time: String,
    pub reason: String,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub attendees: Vec<BookingAttendee>,
}

impl Booking {
    /// The wall-clock instant at which this booking ends, resolving the
    /// "24:00"/"00:00" end-of-day sentinels onto the following calendar day.
    pub fn end_instant(&self) -> Result<NaiveDateTime, BookingError> {
        let boundary = slots::resolve_end(&self.start_time, &self.end_time)?;
        let date = self.date + chrono::Duration::days(boundary.day_offset as i64);
        let time = NaiveTime::from_hms_opt(boundary.minutes / 60, boundary.minutes % 60, 0)
            .ok_or_else(|| BookingError::InvalidFormat(self.end_time.clone()))?;
        Ok(date.and_time(time))
    }

    /// Display form of the booked range, e.g. "10:00-11:30".
    pub fn time_range(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    Cancelled,
    Expired,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Active => write!(f, "active"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Expired => write!(f, "expired"),
        }
    }
}

/// An invited attendee. Rows keep insertion order, which is the invitation
/// order and nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingAttendee {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: i64,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// REFERENCE DATA (owned by the member/room plumbing, read-only here)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub chat_user_id: i64,
    #[serde(default)]
    pub is_room_admin: bool,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub member_id: Uuid,
    pub date: NaiveDate,
    /// Ordered slot-start labels; must form one contiguous block.
    pub time_slots: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub attendees: Vec<AttendeeRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeRequest {
    pub user_id: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    #[serde(default)]
    pub cancel_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub time_slots: Vec<TimeSlot>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Cannot book more than {0} days in advance")]
    TooFarInAdvance(i64),

    #[error("Time slots must be consecutive")]
    NonContiguousSlots,

    #[error("Some time slots are already booked")]
    SlotConflict,

    #[error("Cancellation reason is required")]
    MissingReason,

    #[error("Booking not found")]
    NotFound,

    #[error("Repository error: {0}")]
    Repository(String),
}

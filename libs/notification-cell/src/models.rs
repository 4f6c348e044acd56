use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Cancel,
}

/// One outbound notification batch: attendees get the participant-facing
/// message, room-admins an admin-facing one, both rendered from the context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Chat user ids of the attendees, in invitation order.
    pub user_ids: Vec<i64>,
    /// Chat user ids of members holding the room-admin capability.
    pub admin_ids: Vec<i64>,
    pub context: NotificationContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContext {
    pub date: NaiveDate,
    /// Display range, e.g. "10:00-11:30".
    pub time_range: String,
    pub room_name: String,
    pub organizer_name: String,
    pub reason: String,
    pub attendee_names: Vec<String>,
    pub cancel_reason: Option<String>,
}

impl NotificationContext {
    pub fn meeting_time(&self) -> String {
        format!("{} {}", self.date, self.time_range)
    }
}

// libs/booking-cell/src/repository.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Booking, BookingAttendee, BookingError, BookingStatus, Member, Room};

/// Persistence seam for the booking cell. The one shared mutable resource
/// is the booking table; everything reaches it through this trait, which is
/// injected explicitly rather than living in a process-wide global.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings for a room on a calendar day with the given status.
    async fn find(
        &self,
        room_id: Uuid,
        date: NaiveDate,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BookingError>;

    /// A single booking with its attendees, or None.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;

    /// All bookings in a given status, across rooms and days.
    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError>;

    async fn insert(&self, booking: &Booking) -> Result<(), BookingError>;

    async fn save(&self, booking: &Booking) -> Result<(), BookingError>;

    async fn insert_attendee(&self, attendee: &BookingAttendee) -> Result<(), BookingError>;

    async fn find_room(&self, room_id: Uuid) -> Result<Option<Room>, BookingError>;

    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>, BookingError>;

    /// Chat user ids of every member holding the room-admin capability.
    async fn room_admin_chat_ids(&self) -> Result<Vec<i64>, BookingError>;
}

/// Repository over the Supabase REST interface.
pub struct SupabaseBookingRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseBookingRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn fetch_rows(&self, path: &str) -> Result<Vec<Value>, BookingError> {
        self.client
            .request(Method::GET, path, None)
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))
    }

    fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, BookingError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| BookingError::Repository(format!("Failed to parse rows: {}", e)))
    }

    fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    async fn attendees_for(&self, booking_id: Uuid) -> Result<Vec<BookingAttendee>, BookingError> {
        let rows = self
            .fetch_rows(&format!(
                "/rest/v1/booking_users?booking_id=eq.{}&order=created_at.asc",
                booking_id
            ))
            .await?;
        Self::parse_rows(rows)
    }
}

#[async_trait]
impl BookingRepository for SupabaseBookingRepository {
    async fn find(
        &self,
        room_id: Uuid,
        date: NaiveDate,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?room_id=eq.{}&date=eq.{}&status=eq.{}&order=start_time.asc",
            room_id, date, status
        );
        let rows = self.fetch_rows(&path).await?;
        Self::parse_rows(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        let rows = self
            .fetch_rows(&format!("/rest/v1/bookings?id=eq.{}", id))
            .await?;
        let mut bookings: Vec<Booking> = Self::parse_rows(rows)?;

        match bookings.pop() {
            Some(mut booking) => {
                booking.attendees = self.attendees_for(booking.id).await?;
                Ok(Some(booking))
            }
            None => Ok(None),
        }
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError> {
        let rows = self
            .fetch_rows(&format!("/rest/v1/bookings?status=eq.{}", status))
            .await?;
        Self::parse_rows(rows)
    }

    async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
        debug!("Inserting booking {}", booking.id);

        let body = json!({
            "id": booking.id,
            "room_id": booking.room_id,
            "member_id": booking.member_id,
            "date": booking.date,
            "start_time": booking.start_time,
            "end_time": booking.end_time,
            "reason": booking.reason,
            "cancel_reason": booking.cancel_reason,
            "status": booking.status,
            "created_at": booking.created_at,
            "updated_at": booking.updated_at,
        });

        let rows: Vec<Value> = self
            .client
            .request_with_headers(
                Method::POST,
                "/rest/v1/bookings",
                Some(body),
                Some(Self::return_representation()),
            )
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;

        if rows.is_empty() {
            return Err(BookingError::Repository(
                "Booking insert returned no rows".to_string(),
            ));
        }

        Ok(())
    }

    async fn save(&self, booking: &Booking) -> Result<(), BookingError> {
        let body = json!({
            "status": booking.status,
            "cancel_reason": booking.cancel_reason,
            "updated_at": booking.updated_at,
        });

        let _rows: Vec<Value> = self
            .client
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/bookings?id=eq.{}", booking.id),
                Some(body),
                Some(Self::return_representation()),
            )
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;

        Ok(())
    }

    async fn insert_attendee(&self, attendee: &BookingAttendee) -> Result<(), BookingError> {
        let body = json!({
            "id": attendee.id,
            "booking_id": attendee.booking_id,
            "user_id": attendee.user_id,
            "nickname": attendee.nickname,
            "created_at": attendee.created_at,
        });

        let rows: Vec<Value> = self
            .client
            .request_with_headers(
                Method::POST,
                "/rest/v1/booking_users",
                Some(body),
                Some(Self::return_representation()),
            )
            .await
            .map_err(|e| BookingError::Repository(e.to_string()))?;

        if rows.is_empty() {
            return Err(BookingError::Repository(
                "Attendee insert returned no rows".to_string(),
            ));
        }

        Ok(())
    }

    async fn find_room(&self, room_id: Uuid) -> Result<Option<Room>, BookingError> {
        let rows = self
            .fetch_rows(&format!("/rest/v1/rooms?id=eq.{}", room_id))
            .await?;
        let mut rooms: Vec<Room> = Self::parse_rows(rows)?;
        Ok(rooms.pop())
    }

    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>, BookingError> {
        let rows = self
            .fetch_rows(&format!("/rest/v1/members?id=eq.{}", member_id))
            .await?;
        let mut members: Vec<Member> = Self::parse_rows(rows)?;
        Ok(members.pop())
    }

    async fn room_admin_chat_ids(&self) -> Result<Vec<i64>, BookingError> {
        let rows = self
            .fetch_rows("/rest/v1/members?is_room_admin=eq.true&select=chat_user_id")
            .await?;

        let ids = rows
            .iter()
            .filter_map(|row| row.get("chat_user_id").and_then(Value::as_i64))
            .collect();

        Ok(ids)
    }
}

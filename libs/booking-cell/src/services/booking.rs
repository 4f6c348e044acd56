// libs/booking-cell/src/services/booking.rs
use chrono::{Local, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use notification_cell::{Notification, NotificationContext, NotificationDispatcher, NotificationKind};

use crate::models::{
    Booking, BookingAttendee, BookingError, BookingStatus, CreateBookingRequest,
};
use crate::repository::BookingRepository;
use crate::services::availability::AvailabilityService;
use crate::slots::{are_consecutive, booking_end_label};

/// How far ahead a booking may be placed.
pub const MAX_ADVANCE_DAYS: i64 = 30;

/// Create/cancel side of the booking lifecycle. Both operations run inside
/// the request cycle; notification delivery is handed to a detached task so
/// the response never waits on the chat service.
pub struct BookingService {
    repository: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityService>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl BookingService {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        availability: Arc<AvailabilityService>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            availability,
            dispatcher,
        }
    }

    pub async fn create(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        debug!(
            "Creating booking for room {} on {} ({} slots)",
            request.room_id,
            request.date,
            request.time_slots.len()
        );

        let today = Local::now().date_naive();
        if request.date > today + chrono::Duration::days(MAX_ADVANCE_DAYS) {
            return Err(BookingError::TooFarInAdvance(MAX_ADVANCE_DAYS));
        }

        let last_slot = request
            .time_slots
            .last()
            .ok_or(BookingError::NonContiguousSlots)?;
        if !are_consecutive(&request.time_slots) {
            return Err(BookingError::NonContiguousSlots);
        }

        // Re-check against committed state. Two concurrent creates can still
        // both pass this and insert; the repository seam is where a
        // conditional insert would close that window.
        let available = self
            .availability
            .is_range_available(request.room_id, request.date, &request.time_slots)
            .await?;
        if !available {
            return Err(BookingError::SlotConflict);
        }

        let start_time = request.time_slots[0].clone();
        let end_time = booking_end_label(last_slot)?;

        let now = Utc::now();
        let mut booking = Booking {
            id: Uuid::new_v4(),
            room_id: request.room_id,
            member_id: request.member_id,
            date: request.date,
            start_time,
            end_time,
            reason: request.reason.clone(),
            cancel_reason: None,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
            attendees: Vec::new(),
        };

        self.repository.insert(&booking).await?;

        for attendee in &request.attendees {
            let record = BookingAttendee {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                user_id: attendee.user_id,
                nickname: attendee.nickname.clone(),
                created_at: Utc::now(),
            };
            self.repository.insert_attendee(&record).await?;
            booking.attendees.push(record);
        }

        info!(
            "Booking {} created: room {} on {} {}",
            booking.id,
            booking.room_id,
            booking.date,
            booking.time_range()
        );

        self.dispatch_notification(&booking, NotificationKind::Reminder, None)
            .await;

        Ok(booking)
    }

    pub async fn cancel(&self, id: Uuid, cancel_reason: &str) -> Result<(), BookingError> {
        let mut booking = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if cancel_reason.trim().is_empty() {
            return Err(BookingError::MissingReason);
        }

        if booking.status == BookingStatus::Cancelled {
            debug!("Booking {} already cancelled, nothing to do", id);
            return Ok(());
        }

        booking.status = BookingStatus::Cancelled;
        booking.cancel_reason = Some(cancel_reason.to_string());
        booking.updated_at = Utc::now();
        self.repository.save(&booking).await?;

        info!("Booking {} cancelled: {}", id, cancel_reason);

        if !booking.attendees.is_empty() {
            self.dispatch_notification(&booking, NotificationKind::Cancel, Some(cancel_reason))
                .await;
        }

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)
    }

    /// Assemble the notification context and hand delivery to a detached
    /// task. Lookup failures degrade the message, never the booking.
    async fn dispatch_notification(
        &self,
        booking: &Booking,
        kind: NotificationKind,
        cancel_reason: Option<&str>,
    ) {
        let room_name = match self.repository.find_room(booking.room_id).await {
            Ok(Some(room)) => room.name,
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Room lookup failed for notification: {}", e);
                String::new()
            }
        };

        let organizer_name = match self.repository.find_member(booking.member_id).await {
            Ok(Some(member)) => member.name,
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Organizer lookup failed for notification: {}", e);
                String::new()
            }
        };

        let admin_ids = match self.repository.room_admin_chat_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Room-admin lookup failed for notification: {}", e);
                Vec::new()
            }
        };

        let notification = Notification {
            kind,
            user_ids: booking.attendees.iter().map(|a| a.user_id).collect(),
            admin_ids,
            context: NotificationContext {
                date: booking.date,
                time_range: booking.time_range(),
                room_name,
                organizer_name,
                reason: booking.reason.clone(),
                attendee_names: booking.attendees.iter().map(|a| a.nickname.clone()).collect(),
                cancel_reason: cancel_reason.map(|r| r.to_string()),
            },
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.notify(notification).await;
        });
    }
}

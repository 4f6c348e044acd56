// Shared fixtures for booking-cell integration tests: an in-memory
// repository and a dispatcher that records what it would have sent.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use booking_cell::models::{Booking, BookingAttendee, BookingError, BookingStatus, Member, Room};
use booking_cell::repository::BookingRepository;
use booking_cell::{AvailabilityService, BookingService};
use notification_cell::{Notification, NotificationDispatcher};

#[derive(Default)]
pub struct InMemoryRepository {
    pub bookings: Mutex<Vec<Booking>>,
    pub attendees: Mutex<Vec<BookingAttendee>>,
    pub rooms: Mutex<Vec<Room>>,
    pub members: Mutex<Vec<Member>>,
    /// When set, every read fails with a repository error.
    pub fail_reads: AtomicBool,
    /// Ids for which save() fails, to exercise skip-and-continue paths.
    pub fail_save_for: Mutex<Vec<Uuid>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_reads(&self) -> Result<(), BookingError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(BookingError::Repository("simulated read failure".into()))
        } else {
            Ok(())
        }
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub fn statuses(&self) -> Vec<(Uuid, BookingStatus)> {
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .map(|b| (b.id, b.status))
            .collect()
    }
}

#[async_trait]
impl BookingRepository for InMemoryRepository {
    async fn find(
        &self,
        room_id: Uuid,
        date: NaiveDate,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BookingError> {
        self.check_reads()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.room_id == room_id && b.date == date && b.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        self.check_reads()?;
        let booking = self.booking(id).map(|mut b| {
            b.attendees = self
                .attendees
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.booking_id == id)
                .cloned()
                .collect();
            b
        });
        Ok(booking)
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError> {
        self.check_reads()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
        self.bookings.lock().unwrap().push(booking.clone());
        Ok(())
    }

    async fn save(&self, booking: &Booking) -> Result<(), BookingError> {
        if self.fail_save_for.lock().unwrap().contains(&booking.id) {
            return Err(BookingError::Repository("simulated save failure".into()));
        }
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(BookingError::Repository("no such booking".into())),
        }
    }

    async fn insert_attendee(&self, attendee: &BookingAttendee) -> Result<(), BookingError> {
        self.attendees.lock().unwrap().push(attendee.clone());
        Ok(())
    }

    async fn find_room(&self, room_id: Uuid) -> Result<Option<Room>, BookingError> {
        self.check_reads()?;
        Ok(self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == room_id)
            .cloned())
    }

    async fn find_member(&self, member_id: Uuid) -> Result<Option<Member>, BookingError> {
        self.check_reads()?;
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == member_id)
            .cloned())
    }

    async fn room_admin_chat_ids(&self) -> Result<Vec<i64>, BookingError> {
        self.check_reads()?;
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.is_room_admin)
            .map(|m| m.chat_user_id)
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    pub notifications: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivery runs on a detached task; poll until it lands.
    pub async fn wait_for(&self, count: usize) {
        for _ in 0..200 {
            if self.notifications.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {} notifications", count);
    }
}

pub struct TestHarness {
    pub repository: Arc<InMemoryRepository>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub availability: Arc<AvailabilityService>,
    pub bookings: Arc<BookingService>,
}

impl TestHarness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRepository::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let availability = Arc::new(AvailabilityService::new(
            repository.clone() as Arc<dyn BookingRepository>
        ));
        let bookings = Arc::new(BookingService::new(
            repository.clone() as Arc<dyn BookingRepository>,
            availability.clone(),
            dispatcher.clone() as Arc<dyn NotificationDispatcher>,
        ));
        Self {
            repository,
            dispatcher,
            availability,
            bookings,
        }
    }
}

pub fn make_booking(
    room_id: Uuid,
    date: NaiveDate,
    start: &str,
    end: &str,
    status: BookingStatus,
) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        room_id,
        member_id: Uuid::new_v4(),
        date,
        start_time: start.to_string(),
        end_time: end.to_string(),
        reason: "standup".to_string(),
        cancel_reason: None,
        status,
        created_at: now,
        updated_at: now,
        attendees: Vec::new(),
    }
}

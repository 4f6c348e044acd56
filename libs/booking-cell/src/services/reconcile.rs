// libs/booking-cell/src/services/reconcile.rs
//
// Keeps booking status consistent with wall-clock time. The periodic pass
// expires active bookings whose end instant has passed; the startup repair
// pass reverts bookings mis-expired by the old bare string comparison of
// end_time against the clock. Both passes are idempotent and skip over
// per-booking failures, relying on the next run to self-correct.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use crate::models::{BookingError, BookingStatus};
use crate::repository::BookingRepository;

pub struct ReconciliationService {
    repository: Arc<dyn BookingRepository>,
}

impl ReconciliationService {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }

    /// Expire every active booking whose end instant is strictly before
    /// `now`. Cancelled bookings are never touched. Returns how many
    /// bookings were transitioned.
    pub async fn reconcile_once(&self, now: NaiveDateTime) -> Result<usize, BookingError> {
        let bookings = self.repository.find_by_status(BookingStatus::Active).await?;

        let mut expired = 0;
        for mut booking in bookings {
            let end_instant = match booking.end_instant() {
                Ok(instant) => instant,
                Err(e) => {
                    warn!("Skipping booking {} with unreadable end time: {}", booking.id, e);
                    continue;
                }
            };

            if end_instant >= now {
                continue;
            }

            booking.status = BookingStatus::Expired;
            booking.updated_at = chrono::Utc::now();
            match self.repository.save(&booking).await {
                Ok(()) => {
                    debug!("Booking {} expired (ended {})", booking.id, end_instant);
                    expired += 1;
                }
                Err(e) => {
                    warn!("Failed to expire booking {}, will retry next pass: {}", booking.id, e);
                }
            }
        }

        if expired > 0 {
            info!("Reconciliation expired {} bookings", expired);
        }

        Ok(expired)
    }

    /// Revert expired bookings whose end instant has not actually passed.
    /// A correct reconciler makes this a permanent no-op; it exists for
    /// rows written under the old end-time comparison.
    pub async fn repair_once(&self, now: NaiveDateTime) -> Result<usize, BookingError> {
        let bookings = self
            .repository
            .find_by_status(BookingStatus::Expired)
            .await?;

        let mut repaired = 0;
        for mut booking in bookings {
            let end_instant = match booking.end_instant() {
                Ok(instant) => instant,
                Err(e) => {
                    warn!("Skipping booking {} with unreadable end time: {}", booking.id, e);
                    continue;
                }
            };

            if end_instant < now {
                continue;
            }

            booking.status = BookingStatus::Active;
            booking.updated_at = chrono::Utc::now();
            match self.repository.save(&booking).await {
                Ok(()) => {
                    info!("Booking {} repaired back to active (ends {})", booking.id, end_instant);
                    repaired += 1;
                }
                Err(e) => {
                    warn!("Failed to repair booking {}: {}", booking.id, e);
                }
            }
        }

        Ok(repaired)
    }
}

/// Background task running reconciliation passes strictly one at a time.
/// The first pass fires immediately, then every `interval`.
pub struct ReconcileWorker {
    service: Arc<ReconciliationService>,
    interval: Duration,
}

impl ReconcileWorker {
    pub fn new(service: Arc<ReconciliationService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub fn spawn(self) -> ReconcileHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = Local::now().naive_local();
                        if let Err(e) = self.service.reconcile_once(now).await {
                            error!("Reconciliation pass failed: {}", e);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Reconcile worker shutting down");
                        break;
                    }
                }
            }
        });

        ReconcileHandle { shutdown_tx, task }
    }
}

/// Owner handle for the reconcile task; dropping it without calling
/// [`ReconcileHandle::shutdown`] leaves the task running detached.
pub struct ReconcileHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcileHandle {
    /// Signal the worker and wait for the in-flight pass to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Reconcile worker task panicked: {}", e);
        }
    }
}

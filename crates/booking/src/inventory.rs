//! Seat allocation and release on a single schedule.

use common::ScheduleId;
use reservation_store::{ScheduleStore, StoreError};

use crate::error::{BookingError, Result};

/// The correctness-critical allocation algorithm.
///
/// All mutation goes through the store's conditional updates, so a check
/// and its increment are always one atomic step: two claims racing for
/// the last seat yield exactly one success and one `NoAvailability`.
/// Seat numbers are claim ordinals — dense, monotonic, and never
/// reassigned by a release.
pub struct SeatInventory<S: ScheduleStore> {
    store: S,
}

impl<S: ScheduleStore> SeatInventory<S> {
    /// Creates a new inventory backed by the given schedule store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Claims one seat and returns its number.
    #[tracing::instrument(skip(self))]
    pub async fn claim(&self, schedule_id: ScheduleId) -> Result<u32> {
        match self.store.claim_seat(schedule_id).await {
            Ok(seat_number) => {
                metrics::counter!("seats_claimed_total").increment(1);
                tracing::debug!(%schedule_id, seat_number, "seat claimed");
                Ok(seat_number)
            }
            Err(StoreError::SoldOut { schedule_id }) => {
                metrics::counter!("claims_sold_out_total").increment(1);
                Err(BookingError::NoAvailability(schedule_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Releases one previously claimed seat.
    #[tracing::instrument(skip(self))]
    pub async fn release(&self, schedule_id: ScheduleId) -> Result<()> {
        match self.store.release_seat(schedule_id).await {
            Ok(()) => {
                metrics::counter!("seats_released_total").increment(1);
                Ok(())
            }
            Err(StoreError::ReleaseUnderflow { schedule_id }) => {
                // A double release. Surface it loudly; swallowing it
                // would hide a seat-accounting bug.
                tracing::error!(%schedule_id, "seat release underflow");
                Err(BookingError::ReleaseUnderflow(schedule_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Seats still available on the schedule.
    pub async fn available_seats(&self, schedule_id: ScheduleId) -> Result<u32> {
        let schedule = self
            .store
            .find_schedule_by_id(schedule_id)
            .await?
            .ok_or(BookingError::Store(StoreError::ScheduleNotFound(
                schedule_id,
            )))?;
        Ok(schedule.available_seats())
    }
}

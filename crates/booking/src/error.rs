//! Engine error taxonomy.

use common::{AgencyCode, CabCode, DateParseError, ScheduleId, StopCode, TravelDate, TripId};
use reservation_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the booking engine.
///
/// Sold-out and not-found are ordinary outcomes the caller is expected
/// to match on, not faults. `PersistenceFailed` is the one transient
/// variant: the caller may retry the whole booking from scratch.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The trip id does not resolve to a route.
    #[error("route not found: {0}")]
    RouteNotFound(TripId),

    /// No stop is registered under the given code.
    #[error("no stop registered with code {0}")]
    StopNotFound(StopCode),

    /// No cab is registered under the given code.
    #[error("no cab registered with code {0}")]
    CabNotFound(CabCode),

    /// No agency is registered under the given code.
    #[error("no agency registered with code {0}")]
    AgencyNotFound(AgencyCode),

    /// No schedule exists for the trip on the given date.
    #[error("no schedule for trip {trip_id} on {travel_date}")]
    ScheduleNotFound {
        trip_id: TripId,
        travel_date: TravelDate,
    },

    /// A route was requested with identical endpoints.
    #[error("invalid route: source and destination are both {0}")]
    InvalidRoute(StopCode),

    /// A stop with this code already exists.
    #[error("stop {0} is already registered")]
    DuplicateStop(StopCode),

    /// An agency with this code already exists.
    #[error("agency {0} is already registered")]
    DuplicateAgency(AgencyCode),

    /// A cab with this code already exists.
    #[error("cab {0} is already registered")]
    DuplicateCab(CabCode),

    /// Every seat on the schedule is claimed.
    #[error("no seats available on schedule {0}")]
    NoAvailability(ScheduleId),

    /// A release was attempted with no seats claimed. A caller bug.
    #[error("seat release underflow on schedule {0}")]
    ReleaseUnderflow(ScheduleId),

    /// The caller-supplied date string could not be normalized.
    #[error("invalid travel date: {0}")]
    InvalidDate(#[from] DateParseError),

    /// The seat was claimed but the ticket could not be persisted; the
    /// claim has been compensated and the booking may be retried.
    #[error("ticket could not be persisted: {0}")]
    PersistenceFailed(#[source] StoreError),

    /// Any other storage-layer failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, BookingError>;

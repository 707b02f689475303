use common::{ScheduleId, TicketId, TripId};
use thiserror::Error;

/// Errors that can occur when interacting with the reservation stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced trip does not exist.
    #[error("trip not found: {0}")]
    TripNotFound(TripId),

    /// The referenced schedule does not exist.
    #[error("schedule not found: {0}")]
    ScheduleNotFound(ScheduleId),

    /// The referenced ticket does not exist.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// A claim was attempted on a schedule with no seats left.
    /// A business outcome, not a fault: callers are expected to match on it.
    #[error("schedule {schedule_id} is sold out")]
    SoldOut { schedule_id: ScheduleId },

    /// A release was attempted on a schedule with no seats claimed.
    /// Indicates a caller bug (e.g. a double release).
    #[error("release underflow on schedule {schedule_id}: no seats are claimed")]
    ReleaseUnderflow { schedule_id: ScheduleId },

    /// An insert collided with an existing row's code.
    #[error("duplicate {entity} with code {code}")]
    DuplicateEntity { entity: &'static str, code: String },

    /// The store is temporarily unable to serve requests.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true for faults that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Database(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

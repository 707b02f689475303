//! Shared value types for the reservation engine.
//!
//! Identifiers come in two flavors: UUID-backed ids minted by the engine
//! (trips, schedules, tickets, passengers) and human-assigned string codes
//! (stops, cabs, agencies). Both are newtypes so they cannot be mixed up
//! at call sites.

pub mod codes;
pub mod date;
pub mod fare;
pub mod ids;

pub use codes::{AgencyCode, CabCode, StopCode};
pub use date::{DateParseError, TravelDate};
pub use fare::Fare;
pub use ids::{PassengerId, ScheduleId, TicketId, TripId};

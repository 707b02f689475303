//! Storage layer for the reservation engine.
//!
//! Everything concurrency-critical lives behind the traits in this crate:
//! schedule find-or-create is a single atomic step, and seat claims and
//! releases are conditional updates, never read-modify-write sequences.
//! Two implementations are provided: an in-memory store for tests and
//! embedding, and a PostgreSQL store.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryReservationStore;
pub use postgres::PostgresReservationStore;
pub use records::{Agency, Cab, Stop, Ticket, Trip, TripSchedule};
pub use store::{CatalogStore, ScheduleStore, TicketStore, TicketStream};

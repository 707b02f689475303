use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use common::{AgencyCode, CabCode, PassengerId, ScheduleId, StopCode, TicketId, TravelDate, TripId};

use crate::records::{Agency, Cab, Stop, Ticket, Trip, TripSchedule};
use crate::Result;

/// A stream of tickets in issuance order.
pub type TicketStream = Pin<Box<dyn Stream<Item = Result<Ticket>> + Send>>;

/// Storage for the static catalog: stops, agencies, cabs, and trips.
///
/// Catalog rows are created by agency management and are read-only to the
/// booking path. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a stop. Fails with `DuplicateEntity` if the code is taken.
    async fn insert_stop(&self, stop: Stop) -> Result<()>;

    /// Looks up a stop by code.
    async fn find_stop(&self, code: &StopCode) -> Result<Option<Stop>>;

    /// Returns all stops, ordered by code.
    async fn list_stops(&self) -> Result<Vec<Stop>>;

    /// Inserts an agency. Fails with `DuplicateEntity` if the code is taken.
    async fn insert_agency(&self, agency: Agency) -> Result<()>;

    /// Looks up an agency by code.
    async fn find_agency(&self, code: &AgencyCode) -> Result<Option<Agency>>;

    /// Inserts a cab. Fails with `DuplicateEntity` if the code is taken.
    async fn insert_cab(&self, cab: Cab) -> Result<()>;

    /// Looks up a cab by code.
    async fn find_cab(&self, code: &CabCode) -> Result<Option<Cab>>;

    /// Inserts both directions of a route pair atomically.
    ///
    /// Either both trips become visible or neither does; a half-created
    /// pair must never be observable.
    async fn insert_trip_pair(&self, outbound: Trip, inbound: Trip) -> Result<()>;

    /// Looks up a trip by id.
    async fn find_trip(&self, id: TripId) -> Result<Option<Trip>>;

    /// Returns all directed trips from `source` to `dest`.
    ///
    /// Order is unspecified but stable for a given catalog snapshot.
    async fn find_trips_between(&self, source: &StopCode, dest: &StopCode) -> Result<Vec<Trip>>;

    /// Returns all trips operated by an agency.
    async fn find_trips_by_agency(&self, agency: &AgencyCode) -> Result<Vec<Trip>>;
}

/// Storage for dated schedules and their seat counters.
///
/// This is the serialization point for all seat-state mutation. Claims
/// and releases on a schedule are conditional updates performed as one
/// atomic step; claims on different schedules never block one another.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Returns the schedule for `(trip_id, travel_date)`, creating it
    /// with the given capacity and zero claimed seats if absent.
    ///
    /// Find-or-create is a single atomic step: exactly one schedule row
    /// ends up persisted per key no matter how many callers race, and
    /// losers transparently receive the winner's row. The capacity of an
    /// existing row is left untouched (it was frozen at creation).
    async fn get_or_create(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
        capacity: u32,
    ) -> Result<TripSchedule>;

    /// Looks up the schedule for `(trip_id, travel_date)` without
    /// creating it.
    async fn find_schedule(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
    ) -> Result<Option<TripSchedule>>;

    /// Looks up a schedule by id.
    async fn find_schedule_by_id(&self, id: ScheduleId) -> Result<Option<TripSchedule>>;

    /// Claims one seat: atomically checks `seats_claimed < capacity` and
    /// increments, returning the pre-increment claim count as the seat
    /// number. Fails with `SoldOut` when the schedule is full and
    /// `ScheduleNotFound` when the id does not resolve.
    async fn claim_seat(&self, id: ScheduleId) -> Result<u32>;

    /// Releases one seat: atomically decrements `seats_claimed`, failing
    /// with `ReleaseUnderflow` if nothing is claimed.
    async fn release_seat(&self, id: ScheduleId) -> Result<()>;
}

/// Append-only storage for issued tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Appends a ticket. Tickets are immutable once appended.
    async fn append_ticket(&self, ticket: Ticket) -> Result<Ticket>;

    /// Looks up a ticket by id.
    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// Returns all tickets held by a passenger, in issuance order.
    async fn find_tickets_by_passenger(&self, passenger: PassengerId) -> Result<Vec<Ticket>>;

    /// Returns all tickets issued against a schedule, in issuance order.
    async fn find_tickets_by_schedule(&self, schedule: ScheduleId) -> Result<Vec<Ticket>>;

    /// Streams every ticket in issuance order, for audit.
    async fn stream_all_tickets(&self) -> Result<TicketStream>;
}

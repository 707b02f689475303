use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{AgencyCode, CabCode, PassengerId, ScheduleId, StopCode, TicketId, TravelDate, TripId};

use crate::{
    records::{Agency, Cab, Stop, Ticket, Trip, TripSchedule},
    store::{CatalogStore, ScheduleStore, TicketStore, TicketStream},
    Result, StoreError,
};

/// One schedule's live state.
///
/// The claim counter sits behind its own mutex so that claims and
/// releases serialize per schedule; bookings on unrelated schedules
/// never contend with each other.
#[derive(Debug)]
struct ScheduleSlot {
    id: ScheduleId,
    trip_id: TripId,
    travel_date: TravelDate,
    capacity: u32,
    seats_claimed: Mutex<u32>,
}

impl ScheduleSlot {
    fn snapshot(&self) -> TripSchedule {
        TripSchedule {
            id: self.id,
            trip_id: self.trip_id,
            travel_date: self.travel_date,
            capacity: self.capacity,
            seats_claimed: *self.seats_claimed.lock().unwrap(),
        }
    }
}

#[derive(Default)]
struct ScheduleMap {
    by_key: HashMap<(TripId, TravelDate), Arc<ScheduleSlot>>,
    by_id: HashMap<ScheduleId, Arc<ScheduleSlot>>,
}

#[derive(Default)]
struct TicketShelf {
    tickets: Vec<Ticket>,
    fail_on_append: bool,
}

/// In-memory store implementation for testing and embedding.
///
/// Implements all three store traits over the same shared state and
/// provides the same guarantees as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    stops: Arc<RwLock<HashMap<StopCode, Stop>>>,
    agencies: Arc<RwLock<HashMap<AgencyCode, Agency>>>,
    cabs: Arc<RwLock<HashMap<CabCode, Cab>>>,
    trips: Arc<RwLock<HashMap<TripId, Trip>>>,
    schedules: Arc<RwLock<ScheduleMap>>,
    tickets: Arc<RwLock<TicketShelf>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of schedule rows that exist.
    pub async fn schedule_count(&self) -> usize {
        self.schedules.read().await.by_id.len()
    }

    /// Returns the number of tickets appended.
    pub async fn ticket_count(&self) -> usize {
        self.tickets.read().await.tickets.len()
    }

    /// Configures the store to fail ticket appends, for exercising the
    /// engine's compensation path.
    pub async fn set_fail_on_ticket_append(&self, fail: bool) {
        self.tickets.write().await.fail_on_append = fail;
    }
}

#[async_trait]
impl CatalogStore for InMemoryReservationStore {
    async fn insert_stop(&self, stop: Stop) -> Result<()> {
        let mut stops = self.stops.write().await;
        if stops.contains_key(&stop.code) {
            return Err(StoreError::DuplicateEntity {
                entity: "stop",
                code: stop.code.to_string(),
            });
        }
        stops.insert(stop.code.clone(), stop);
        Ok(())
    }

    async fn find_stop(&self, code: &StopCode) -> Result<Option<Stop>> {
        Ok(self.stops.read().await.get(code).cloned())
    }

    async fn list_stops(&self) -> Result<Vec<Stop>> {
        let stops = self.stops.read().await;
        let mut all: Vec<_> = stops.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }

    async fn insert_agency(&self, agency: Agency) -> Result<()> {
        let mut agencies = self.agencies.write().await;
        if agencies.contains_key(&agency.code) {
            return Err(StoreError::DuplicateEntity {
                entity: "agency",
                code: agency.code.to_string(),
            });
        }
        agencies.insert(agency.code.clone(), agency);
        Ok(())
    }

    async fn find_agency(&self, code: &AgencyCode) -> Result<Option<Agency>> {
        Ok(self.agencies.read().await.get(code).cloned())
    }

    async fn insert_cab(&self, cab: Cab) -> Result<()> {
        let mut cabs = self.cabs.write().await;
        if cabs.contains_key(&cab.code) {
            return Err(StoreError::DuplicateEntity {
                entity: "cab",
                code: cab.code.to_string(),
            });
        }
        cabs.insert(cab.code.clone(), cab);
        Ok(())
    }

    async fn find_cab(&self, code: &CabCode) -> Result<Option<Cab>> {
        Ok(self.cabs.read().await.get(code).cloned())
    }

    async fn insert_trip_pair(&self, outbound: Trip, inbound: Trip) -> Result<()> {
        // Single write lock covers both inserts, so the pair appears
        // all-or-nothing to readers.
        let mut trips = self.trips.write().await;
        trips.insert(outbound.id, outbound);
        trips.insert(inbound.id, inbound);
        Ok(())
    }

    async fn find_trip(&self, id: TripId) -> Result<Option<Trip>> {
        Ok(self.trips.read().await.get(&id).cloned())
    }

    async fn find_trips_between(&self, source: &StopCode, dest: &StopCode) -> Result<Vec<Trip>> {
        let trips = self.trips.read().await;
        let mut matching: Vec<_> = trips
            .values()
            .filter(|t| &t.source_stop == source && &t.dest_stop == dest)
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; sort for a stable answer.
        matching.sort_by_key(|t| t.id.as_uuid());
        Ok(matching)
    }

    async fn find_trips_by_agency(&self, agency: &AgencyCode) -> Result<Vec<Trip>> {
        let trips = self.trips.read().await;
        let mut matching: Vec<_> = trips
            .values()
            .filter(|t| &t.agency == agency)
            .cloned()
            .collect();
        matching.sort_by_key(|t| t.id.as_uuid());
        Ok(matching)
    }
}

#[async_trait]
impl ScheduleStore for InMemoryReservationStore {
    async fn get_or_create(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
        capacity: u32,
    ) -> Result<TripSchedule> {
        // The map write lock makes find-or-create one atomic step:
        // concurrent creators for the same key serialize here and the
        // losers observe the winner's slot.
        let mut schedules = self.schedules.write().await;
        if let Some(slot) = schedules.by_key.get(&(trip_id, travel_date)) {
            return Ok(slot.snapshot());
        }

        let fresh = TripSchedule::fresh(trip_id, travel_date, capacity);
        let slot = Arc::new(ScheduleSlot {
            id: fresh.id,
            trip_id,
            travel_date,
            capacity,
            seats_claimed: Mutex::new(0),
        });
        schedules.by_key.insert((trip_id, travel_date), Arc::clone(&slot));
        schedules.by_id.insert(fresh.id, slot);
        tracing::debug!(%trip_id, %travel_date, capacity, "schedule created");
        Ok(fresh)
    }

    async fn find_schedule(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
    ) -> Result<Option<TripSchedule>> {
        let schedules = self.schedules.read().await;
        Ok(schedules
            .by_key
            .get(&(trip_id, travel_date))
            .map(|slot| slot.snapshot()))
    }

    async fn find_schedule_by_id(&self, id: ScheduleId) -> Result<Option<TripSchedule>> {
        let schedules = self.schedules.read().await;
        Ok(schedules.by_id.get(&id).map(|slot| slot.snapshot()))
    }

    async fn claim_seat(&self, id: ScheduleId) -> Result<u32> {
        let slot = {
            let schedules = self.schedules.read().await;
            schedules
                .by_id
                .get(&id)
                .cloned()
                .ok_or(StoreError::ScheduleNotFound(id))?
        };

        // Check-and-increment under the slot's own lock; this is the
        // atomic step that makes oversell impossible.
        let mut claimed = slot.seats_claimed.lock().unwrap();
        if *claimed >= slot.capacity {
            return Err(StoreError::SoldOut { schedule_id: id });
        }
        let seat_number = *claimed;
        *claimed += 1;
        Ok(seat_number)
    }

    async fn release_seat(&self, id: ScheduleId) -> Result<()> {
        let slot = {
            let schedules = self.schedules.read().await;
            schedules
                .by_id
                .get(&id)
                .cloned()
                .ok_or(StoreError::ScheduleNotFound(id))?
        };

        let mut claimed = slot.seats_claimed.lock().unwrap();
        if *claimed == 0 {
            return Err(StoreError::ReleaseUnderflow { schedule_id: id });
        }
        *claimed -= 1;
        Ok(())
    }
}

#[async_trait]
impl TicketStore for InMemoryReservationStore {
    async fn append_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        let mut shelf = self.tickets.write().await;
        if shelf.fail_on_append {
            return Err(StoreError::Unavailable(
                "ticket append rejected by test hook".to_string(),
            ));
        }
        shelf.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let shelf = self.tickets.read().await;
        Ok(shelf.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tickets_by_passenger(&self, passenger: PassengerId) -> Result<Vec<Ticket>> {
        let shelf = self.tickets.read().await;
        Ok(shelf
            .tickets
            .iter()
            .filter(|t| t.passenger == passenger)
            .cloned()
            .collect())
    }

    async fn find_tickets_by_schedule(&self, schedule: ScheduleId) -> Result<Vec<Ticket>> {
        let shelf = self.tickets.read().await;
        Ok(shelf
            .tickets
            .iter()
            .filter(|t| t.schedule_id == schedule)
            .cloned()
            .collect())
    }

    async fn stream_all_tickets(&self) -> Result<TicketStream> {
        use futures_util::stream;

        let shelf = self.tickets.read().await;
        let all: Vec<Result<Ticket>> = shelf.tickets.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(all)))
    }
}

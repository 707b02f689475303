//! Booking orchestration: resolve schedule → claim seat → issue ticket.

use serde::{Deserialize, Serialize};

use common::{PassengerId, ScheduleId, StopCode, TravelDate, TripId};
use reservation_store::{CatalogStore, ScheduleStore, Ticket, TicketStore, Trip, TripSchedule};

use crate::catalog::RouteCatalog;
use crate::config::EngineConfig;
use crate::error::{BookingError, Result};
use crate::inventory::SeatInventory;
use crate::ledger::TicketLedger;

/// One route's availability on a queried date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripAvailability {
    /// The directed route.
    pub trip: Trip,

    /// Seats open on the queried date. Full capacity when no schedule
    /// exists yet — nothing has been claimed on an untouched date.
    pub available_seats: u32,
}

/// Orchestrates a reservation as one logical unit of work.
///
/// A booking runs resolve → claim → issue. The first two steps are each
/// atomic at their own layer, so the only partial-failure window is a
/// ticket write failing after its seat was claimed; the engine closes it
/// by releasing the claimed seat before surfacing the failure.
pub struct BookingEngine<C, S, T>
where
    C: CatalogStore,
    S: ScheduleStore + Clone,
    T: TicketStore,
{
    catalog: RouteCatalog<C>,
    schedules: S,
    inventory: SeatInventory<S>,
    ledger: TicketLedger<T>,
    config: EngineConfig,
}

impl<C, S, T> BookingEngine<C, S, T>
where
    C: CatalogStore,
    S: ScheduleStore + Clone,
    T: TicketStore,
{
    /// Creates an engine with default configuration.
    pub fn new(catalog_store: C, schedule_store: S, ticket_store: T) -> Self {
        Self::with_config(
            catalog_store,
            schedule_store,
            ticket_store,
            EngineConfig::default(),
        )
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(
        catalog_store: C,
        schedule_store: S,
        ticket_store: T,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog: RouteCatalog::new(catalog_store),
            inventory: SeatInventory::new(schedule_store.clone()),
            schedules: schedule_store,
            ledger: TicketLedger::new(ticket_store),
            config,
        }
    }

    /// Returns the route catalog.
    pub fn catalog(&self) -> &RouteCatalog<C> {
        &self.catalog
    }

    /// Returns the seat inventory.
    pub fn inventory(&self) -> &SeatInventory<S> {
        &self.inventory
    }

    /// Returns the ticket ledger.
    pub fn ledger(&self) -> &TicketLedger<T> {
        &self.ledger
    }

    /// Books one seat on the trip's schedule for the given date,
    /// creating the schedule if this is the first reservation for it.
    ///
    /// On `NoAvailability` no side effect remains. If the ticket cannot
    /// be persisted after the seat was claimed, the claim is released
    /// (retried per config) and `PersistenceFailed` is returned; the
    /// caller may retry the whole booking from scratch.
    #[tracing::instrument(skip(self))]
    pub async fn book_ticket(
        &self,
        trip_id: TripId,
        travel_date: &str,
        passenger: PassengerId,
    ) -> Result<Ticket> {
        metrics::counter!("booking_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let travel_date = TravelDate::parse(travel_date)?;

        // Resolve the route; capacity is frozen from its cab at schedule
        // creation and never re-read afterwards.
        let trip = self.catalog.route(trip_id).await?;
        let cab = self.catalog.cab(&trip.cab).await?;

        let schedule = self
            .schedules
            .get_or_create(trip_id, travel_date, cab.capacity)
            .await?;

        let seat_number = self.inventory.claim(schedule.id).await?;

        let ticket = Ticket::issue(&schedule, seat_number, passenger);
        match self.ledger.record(ticket).await {
            Ok(ticket) => {
                metrics::counter!("bookings_issued_total").increment(1);
                metrics::histogram!("booking_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(
                    schedule_id = %schedule.id,
                    seat_number,
                    "ticket issued"
                );
                Ok(ticket)
            }
            Err(e) => {
                tracing::warn!(
                    schedule_id = %schedule.id,
                    error = %e,
                    "ticket persistence failed; releasing claimed seat"
                );
                self.release_claimed_seat(schedule.id).await;
                metrics::counter!("bookings_failed_total").increment(1);
                Err(match e {
                    BookingError::Store(store_err) => BookingError::PersistenceFailed(store_err),
                    other => other,
                })
            }
        }
    }

    /// Availability of every route between two stops on a date.
    ///
    /// Read-only: never creates schedule rows. A route whose schedule
    /// does not exist yet reports its cab's full capacity.
    #[tracing::instrument(skip(self))]
    pub async fn availability(
        &self,
        source: &StopCode,
        dest: &StopCode,
        travel_date: &str,
    ) -> Result<Vec<TripAvailability>> {
        let travel_date = TravelDate::parse(travel_date)?;
        let trips = self.catalog.routes_between(source, dest).await?;

        let mut results = Vec::with_capacity(trips.len());
        for trip in trips {
            let available_seats = match self.schedules.find_schedule(trip.id, travel_date).await? {
                Some(schedule) => schedule.available_seats(),
                None => self.catalog.cab(&trip.cab).await?.capacity,
            };
            results.push(TripAvailability {
                trip,
                available_seats,
            });
        }
        Ok(results)
    }

    /// The schedule for a trip on a date, without creating it.
    pub async fn schedule(&self, trip_id: TripId, travel_date: &str) -> Result<TripSchedule> {
        let travel_date = TravelDate::parse(travel_date)?;
        self.catalog.route(trip_id).await?;
        self.schedules
            .find_schedule(trip_id, travel_date)
            .await?
            .ok_or(BookingError::ScheduleNotFound {
                trip_id,
                travel_date,
            })
    }

    /// Compensating release after a failed ticket write. Transient
    /// failures are retried per config; an underflow means the seat was
    /// already released and is only logged (inside the inventory).
    async fn release_claimed_seat(&self, schedule_id: ScheduleId) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.inventory.release(schedule_id).await {
                Ok(()) => {
                    tracing::info!(%schedule_id, attempt, "compensating release applied");
                    return;
                }
                Err(BookingError::ReleaseUnderflow(_)) => return,
                Err(BookingError::Store(e))
                    if e.is_transient() && attempt <= self.config.release_retry_attempts =>
                {
                    metrics::counter!("seat_release_retries_total").increment(1);
                    tracing::warn!(
                        %schedule_id,
                        attempt,
                        error = %e,
                        "compensating release failed; retrying"
                    );
                    tokio::time::sleep(self.config.release_retry_delay).await;
                }
                Err(e) => {
                    metrics::counter!("seat_release_failures_total").increment(1);
                    tracing::error!(
                        %schedule_id,
                        error = %e,
                        "compensating release gave up; seat count may overstate claims"
                    );
                    return;
                }
            }
        }
    }
}

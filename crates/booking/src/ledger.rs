//! Append-only ledger of issued tickets.

use common::{PassengerId, ScheduleId, TicketId};
use reservation_store::{StoreError, Ticket, TicketStore, TicketStream};

use crate::error::{BookingError, Result};

/// Record of every issued ticket, used for audit and reporting.
///
/// Tickets reference their schedule by id, never by embedding, so the
/// ledger never needs updating when seat counts move.
pub struct TicketLedger<T: TicketStore> {
    store: T,
}

impl<T: TicketStore> TicketLedger<T> {
    /// Creates a new ledger backed by the given ticket store.
    pub fn new(store: T) -> Self {
        Self { store }
    }

    /// Appends a ticket to the ledger.
    #[tracing::instrument(skip(self, ticket), fields(ticket_id = %ticket.id))]
    pub async fn record(&self, ticket: Ticket) -> Result<Ticket> {
        Ok(self.store.append_ticket(ticket).await?)
    }

    /// Looks up a ticket by id.
    pub async fn ticket(&self, id: TicketId) -> Result<Ticket> {
        self.store
            .find_ticket(id)
            .await?
            .ok_or(BookingError::Store(StoreError::TicketNotFound(id)))
    }

    /// Returns all tickets held by a passenger, in issuance order.
    pub async fn tickets_for_passenger(&self, passenger: PassengerId) -> Result<Vec<Ticket>> {
        Ok(self.store.find_tickets_by_passenger(passenger).await?)
    }

    /// Returns all tickets issued against a schedule, in issuance order.
    pub async fn tickets_for_schedule(&self, schedule: ScheduleId) -> Result<Vec<Ticket>> {
        Ok(self.store.find_tickets_by_schedule(schedule).await?)
    }

    /// Seat numbers occupied on a schedule, sorted ascending.
    pub async fn occupied_seats(&self, schedule: ScheduleId) -> Result<Vec<u32>> {
        let mut seats: Vec<u32> = self
            .store
            .find_tickets_by_schedule(schedule)
            .await?
            .into_iter()
            .map(|t| t.seat_number)
            .collect();
        seats.sort_unstable();
        Ok(seats)
    }

    /// Streams every ticket ever issued, in issuance order.
    pub async fn audit_stream(&self) -> Result<TicketStream> {
        Ok(self.store.stream_all_tickets().await?)
    }
}

//! Persisted record types.
//!
//! Records reference each other by id or code, never by embedding, so a
//! row can be updated without rewriting its referrers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{
    AgencyCode, CabCode, Fare, PassengerId, ScheduleId, StopCode, TicketId, TravelDate, TripId,
};

/// A boarding point. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    /// Stable, unique code.
    pub code: StopCode,

    /// Human-readable name.
    pub name: String,

    /// Free-form description.
    pub detail: String,
}

impl Stop {
    /// Creates a new stop.
    pub fn new(code: impl Into<StopCode>, name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// A transport agency operating routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    /// Stable, unique code.
    pub code: AgencyCode,

    /// Agency name.
    pub name: String,

    /// Free-form description.
    pub details: String,
}

impl Agency {
    /// Creates a new agency.
    pub fn new(
        code: impl Into<AgencyCode>,
        name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            details: details.into(),
        }
    }
}

/// A vehicle in an agency's fleet. Its capacity seeds every schedule
/// created for trips it operates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cab {
    /// Stable, unique code.
    pub code: CabCode,

    /// Seat capacity.
    pub capacity: u32,

    /// Make/model description.
    pub make: String,

    /// Owning agency.
    pub agency: AgencyCode,
}

impl Cab {
    /// Creates a new cab.
    pub fn new(
        code: impl Into<CabCode>,
        capacity: u32,
        make: impl Into<String>,
        agency: impl Into<AgencyCode>,
    ) -> Self {
        Self {
            code: code.into(),
            capacity,
            make: make.into(),
            agency: agency.into(),
        }
    }
}

/// A directed route between two stops, operated by one cab of one agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique trip identifier.
    pub id: TripId,

    /// Departure stop.
    pub source_stop: StopCode,

    /// Arrival stop. Always distinct from `source_stop`.
    pub dest_stop: StopCode,

    /// Operating agency.
    pub agency: AgencyCode,

    /// Operating cab, the capacity source for schedules.
    pub cab: CabCode,

    /// Fare charged per seat.
    pub fare: Fare,

    /// Journey duration in minutes.
    pub journey_minutes: u32,
}

impl Trip {
    /// Creates a new trip with a freshly minted id.
    pub fn new(
        source_stop: impl Into<StopCode>,
        dest_stop: impl Into<StopCode>,
        agency: impl Into<AgencyCode>,
        cab: impl Into<CabCode>,
        fare: Fare,
        journey_minutes: u32,
    ) -> Self {
        Self {
            id: TripId::new(),
            source_stop: source_stop.into(),
            dest_stop: dest_stop.into(),
            agency: agency.into(),
            cab: cab.into(),
            fare,
            journey_minutes,
        }
    }

    /// Returns the same route with the endpoints swapped, under a new id.
    pub fn reversed(&self) -> Self {
        Self {
            id: TripId::new(),
            source_stop: self.dest_stop.clone(),
            dest_stop: self.source_stop.clone(),
            agency: self.agency.clone(),
            cab: self.cab.clone(),
            fare: self.fare,
            journey_minutes: self.journey_minutes,
        }
    }
}

/// A dated instance of a trip with live seat state.
///
/// Capacity is copied from the trip's cab when the schedule is created
/// and frozen; later cab edits do not reach existing schedules.
/// Invariant: `0 <= seats_claimed <= capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSchedule {
    /// Unique schedule identifier.
    pub id: ScheduleId,

    /// The trip this schedule instantiates.
    pub trip_id: TripId,

    /// The calendar date this schedule runs on.
    pub travel_date: TravelDate,

    /// Total seats, frozen at creation.
    pub capacity: u32,

    /// Seats currently claimed.
    pub seats_claimed: u32,
}

impl TripSchedule {
    /// Creates a fresh schedule with no seats claimed.
    pub fn fresh(trip_id: TripId, travel_date: TravelDate, capacity: u32) -> Self {
        Self {
            id: ScheduleId::new(),
            trip_id,
            travel_date,
            capacity,
            seats_claimed: 0,
        }
    }

    /// Seats still available. Derived, never stored, so it cannot drift
    /// from the claim count.
    pub fn available_seats(&self) -> u32 {
        self.capacity - self.seats_claimed
    }
}

/// An issued ticket. Append-only: never mutated after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: TicketId,

    /// The schedule the seat was claimed on, by id.
    pub schedule_id: ScheduleId,

    /// The traveler the seat belongs to.
    pub passenger: PassengerId,

    /// Assigned seat number: the claim ordinal at issuance time.
    pub seat_number: u32,

    /// Journey date, copied from the schedule at issuance.
    pub travel_date: TravelDate,

    /// Whether the ticket can be cancelled. Always false: cancellation
    /// is out of scope.
    pub cancellable: bool,

    /// When the ticket was issued.
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    /// Issues a ticket for a claimed seat on the given schedule.
    pub fn issue(schedule: &TripSchedule, seat_number: u32, passenger: PassengerId) -> Self {
        Self {
            id: TicketId::new(),
            schedule_id: schedule.id,
            passenger,
            seat_number,
            travel_date: schedule.travel_date,
            cancellable: false,
            issued_at: Utc::now(),
        }
    }
}

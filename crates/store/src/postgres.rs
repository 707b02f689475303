use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use common::{
    AgencyCode, CabCode, Fare, PassengerId, ScheduleId, StopCode, TicketId, TravelDate, TripId,
};

use crate::{
    records::{Agency, Cab, Stop, Ticket, Trip, TripSchedule},
    store::{CatalogStore, ScheduleStore, TicketStore, TicketStream},
    Result, StoreError,
};

/// PostgreSQL-backed store implementation.
///
/// Seat claims and releases are conditional `UPDATE` statements and the
/// schedule upsert rides on the `(trip_id, travel_date)` unique
/// constraint, so every guarantee the engine needs is enforced by the
/// database itself rather than by reading rows into memory and writing
/// them back.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_stop(row: PgRow) -> Result<Stop> {
        Ok(Stop {
            code: StopCode::new(row.try_get::<String, _>("code")?),
            name: row.try_get("name")?,
            detail: row.try_get("detail")?,
        })
    }

    fn row_to_agency(row: PgRow) -> Result<Agency> {
        Ok(Agency {
            code: AgencyCode::new(row.try_get::<String, _>("code")?),
            name: row.try_get("name")?,
            details: row.try_get("details")?,
        })
    }

    fn row_to_cab(row: PgRow) -> Result<Cab> {
        Ok(Cab {
            code: CabCode::new(row.try_get::<String, _>("code")?),
            capacity: row.try_get::<i32, _>("capacity")? as u32,
            make: row.try_get("make")?,
            agency: AgencyCode::new(row.try_get::<String, _>("agency_code")?),
        })
    }

    fn row_to_trip(row: PgRow) -> Result<Trip> {
        Ok(Trip {
            id: TripId::from_uuid(row.try_get::<Uuid, _>("id")?),
            source_stop: StopCode::new(row.try_get::<String, _>("source_stop")?),
            dest_stop: StopCode::new(row.try_get::<String, _>("dest_stop")?),
            agency: AgencyCode::new(row.try_get::<String, _>("agency_code")?),
            cab: CabCode::new(row.try_get::<String, _>("cab_code")?),
            fare: Fare::from_cents(row.try_get::<i64, _>("fare_cents")?),
            journey_minutes: row.try_get::<i32, _>("journey_minutes")? as u32,
        })
    }

    fn row_to_schedule(row: PgRow) -> Result<TripSchedule> {
        Ok(TripSchedule {
            id: ScheduleId::from_uuid(row.try_get::<Uuid, _>("id")?),
            trip_id: TripId::from_uuid(row.try_get::<Uuid, _>("trip_id")?),
            travel_date: TravelDate::from_naive(row.try_get("travel_date")?),
            capacity: row.try_get::<i32, _>("capacity")? as u32,
            seats_claimed: row.try_get::<i32, _>("seats_claimed")? as u32,
        })
    }

    fn row_to_ticket(row: PgRow) -> Result<Ticket> {
        Ok(Ticket {
            id: TicketId::from_uuid(row.try_get::<Uuid, _>("id")?),
            schedule_id: ScheduleId::from_uuid(row.try_get::<Uuid, _>("schedule_id")?),
            passenger: PassengerId::from_uuid(row.try_get::<Uuid, _>("passenger_id")?),
            seat_number: row.try_get::<i32, _>("seat_number")? as u32,
            travel_date: TravelDate::from_naive(row.try_get("travel_date")?),
            cancellable: row.try_get("cancellable")?,
            issued_at: row.try_get("issued_at")?,
        })
    }

    async fn schedule_exists(&self, id: ScheduleId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM trip_schedules WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

/// Maps a unique-constraint violation to a typed duplicate error.
fn map_duplicate(e: sqlx::Error, entity: &'static str, code: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::DuplicateEntity {
            entity,
            code: code.to_string(),
        };
    }
    StoreError::Database(e)
}

#[async_trait]
impl CatalogStore for PostgresReservationStore {
    async fn insert_stop(&self, stop: Stop) -> Result<()> {
        sqlx::query("INSERT INTO stops (code, name, detail) VALUES ($1, $2, $3)")
            .bind(stop.code.as_str())
            .bind(&stop.name)
            .bind(&stop.detail)
            .execute(&self.pool)
            .await
            .map_err(|e| map_duplicate(e, "stop", stop.code.as_str()))?;
        Ok(())
    }

    async fn find_stop(&self, code: &StopCode) -> Result<Option<Stop>> {
        let row = sqlx::query("SELECT code, name, detail FROM stops WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_stop).transpose()
    }

    async fn list_stops(&self) -> Result<Vec<Stop>> {
        let rows = sqlx::query("SELECT code, name, detail FROM stops ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_stop).collect()
    }

    async fn insert_agency(&self, agency: Agency) -> Result<()> {
        sqlx::query("INSERT INTO agencies (code, name, details) VALUES ($1, $2, $3)")
            .bind(agency.code.as_str())
            .bind(&agency.name)
            .bind(&agency.details)
            .execute(&self.pool)
            .await
            .map_err(|e| map_duplicate(e, "agency", agency.code.as_str()))?;
        Ok(())
    }

    async fn find_agency(&self, code: &AgencyCode) -> Result<Option<Agency>> {
        let row = sqlx::query("SELECT code, name, details FROM agencies WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_agency).transpose()
    }

    async fn insert_cab(&self, cab: Cab) -> Result<()> {
        sqlx::query("INSERT INTO cabs (code, capacity, make, agency_code) VALUES ($1, $2, $3, $4)")
            .bind(cab.code.as_str())
            .bind(cab.capacity as i32)
            .bind(&cab.make)
            .bind(cab.agency.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_duplicate(e, "cab", cab.code.as_str()))?;
        Ok(())
    }

    async fn find_cab(&self, code: &CabCode) -> Result<Option<Cab>> {
        let row = sqlx::query("SELECT code, capacity, make, agency_code FROM cabs WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_cab).transpose()
    }

    async fn insert_trip_pair(&self, outbound: Trip, inbound: Trip) -> Result<()> {
        // One transaction for both rows: a half-created pair can never
        // be observed, even if the second insert fails.
        let mut tx = self.pool.begin().await?;

        for trip in [&outbound, &inbound] {
            sqlx::query(
                r#"
                INSERT INTO trips (id, source_stop, dest_stop, agency_code, cab_code, fare_cents, journey_minutes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(trip.id.as_uuid())
            .bind(trip.source_stop.as_str())
            .bind(trip.dest_stop.as_str())
            .bind(trip.agency.as_str())
            .bind(trip.cab.as_str())
            .bind(trip.fare.cents())
            .bind(trip.journey_minutes as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_trip(&self, id: TripId) -> Result<Option<Trip>> {
        let row = sqlx::query(
            "SELECT id, source_stop, dest_stop, agency_code, cab_code, fare_cents, journey_minutes \
             FROM trips WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_trip).transpose()
    }

    async fn find_trips_between(&self, source: &StopCode, dest: &StopCode) -> Result<Vec<Trip>> {
        let rows = sqlx::query(
            "SELECT id, source_stop, dest_stop, agency_code, cab_code, fare_cents, journey_minutes \
             FROM trips WHERE source_stop = $1 AND dest_stop = $2 ORDER BY id",
        )
        .bind(source.as_str())
        .bind(dest.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_trip).collect()
    }

    async fn find_trips_by_agency(&self, agency: &AgencyCode) -> Result<Vec<Trip>> {
        let rows = sqlx::query(
            "SELECT id, source_stop, dest_stop, agency_code, cab_code, fare_cents, journey_minutes \
             FROM trips WHERE agency_code = $1 ORDER BY id",
        )
        .bind(agency.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_trip).collect()
    }
}

#[async_trait]
impl ScheduleStore for PostgresReservationStore {
    async fn get_or_create(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
        capacity: u32,
    ) -> Result<TripSchedule> {
        // The unique (trip_id, travel_date) constraint turns concurrent
        // creators into one winner; everyone re-reads the surviving row.
        sqlx::query(
            r#"
            INSERT INTO trip_schedules (id, trip_id, travel_date, capacity, seats_claimed)
            VALUES ($1, $2, $3, $4, 0)
            ON CONFLICT (trip_id, travel_date) DO NOTHING
            "#,
        )
        .bind(ScheduleId::new().as_uuid())
        .bind(trip_id.as_uuid())
        .bind(travel_date.as_naive())
        .bind(capacity as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return StoreError::TripNotFound(trip_id);
            }
            StoreError::Database(e)
        })?;

        let row = sqlx::query(
            "SELECT id, trip_id, travel_date, capacity, seats_claimed \
             FROM trip_schedules WHERE trip_id = $1 AND travel_date = $2",
        )
        .bind(trip_id.as_uuid())
        .bind(travel_date.as_naive())
        .fetch_one(&self.pool)
        .await?;

        let schedule = Self::row_to_schedule(row)?;
        tracing::debug!(%trip_id, %travel_date, schedule_id = %schedule.id, "schedule resolved");
        Ok(schedule)
    }

    async fn find_schedule(
        &self,
        trip_id: TripId,
        travel_date: TravelDate,
    ) -> Result<Option<TripSchedule>> {
        let row = sqlx::query(
            "SELECT id, trip_id, travel_date, capacity, seats_claimed \
             FROM trip_schedules WHERE trip_id = $1 AND travel_date = $2",
        )
        .bind(trip_id.as_uuid())
        .bind(travel_date.as_naive())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_schedule).transpose()
    }

    async fn find_schedule_by_id(&self, id: ScheduleId) -> Result<Option<TripSchedule>> {
        let row = sqlx::query(
            "SELECT id, trip_id, travel_date, capacity, seats_claimed \
             FROM trip_schedules WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_schedule).transpose()
    }

    async fn claim_seat(&self, id: ScheduleId) -> Result<u32> {
        // Conditional update: the WHERE clause is the oversell guard and
        // the increment happens in the same statement, so two claims on
        // the last seat can never both succeed. RETURNING sees the
        // post-update value; subtracting one recovers the claim ordinal.
        let row = sqlx::query(
            r#"
            UPDATE trip_schedules
            SET seats_claimed = seats_claimed + 1
            WHERE id = $1 AND seats_claimed < capacity
            RETURNING seats_claimed - 1 AS seat_number
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get::<i32, _>("seat_number")? as u32),
            None => {
                if self.schedule_exists(id).await? {
                    Err(StoreError::SoldOut { schedule_id: id })
                } else {
                    Err(StoreError::ScheduleNotFound(id))
                }
            }
        }
    }

    async fn release_seat(&self, id: ScheduleId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE trip_schedules
            SET seats_claimed = seats_claimed - 1
            WHERE id = $1 AND seats_claimed > 0
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.schedule_exists(id).await? {
                return Err(StoreError::ReleaseUnderflow { schedule_id: id });
            }
            return Err(StoreError::ScheduleNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for PostgresReservationStore {
    async fn append_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        sqlx::query(
            r#"
            INSERT INTO tickets (id, schedule_id, passenger_id, seat_number, travel_date, cancellable, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.schedule_id.as_uuid())
        .bind(ticket.passenger.as_uuid())
        .bind(ticket.seat_number as i32)
        .bind(ticket.travel_date.as_naive())
        .bind(ticket.cancellable)
        .bind(ticket.issued_at)
        .execute(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(
            "SELECT id, schedule_id, passenger_id, seat_number, travel_date, cancellable, issued_at \
             FROM tickets WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_ticket).transpose()
    }

    async fn find_tickets_by_passenger(&self, passenger: PassengerId) -> Result<Vec<Ticket>> {
        let rows = sqlx::query(
            "SELECT id, schedule_id, passenger_id, seat_number, travel_date, cancellable, issued_at \
             FROM tickets WHERE passenger_id = $1 ORDER BY issued_at, id",
        )
        .bind(passenger.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_ticket).collect()
    }

    async fn find_tickets_by_schedule(&self, schedule: ScheduleId) -> Result<Vec<Ticket>> {
        let rows = sqlx::query(
            "SELECT id, schedule_id, passenger_id, seat_number, travel_date, cancellable, issued_at \
             FROM tickets WHERE schedule_id = $1 ORDER BY issued_at, id",
        )
        .bind(schedule.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_ticket).collect()
    }

    async fn stream_all_tickets(&self) -> Result<TicketStream> {
        use futures_util::stream;

        let rows = sqlx::query(
            "SELECT id, schedule_id, passenger_id, seat_number, travel_date, cancellable, issued_at \
             FROM tickets ORDER BY issued_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let tickets: Vec<Result<Ticket>> = rows.into_iter().map(Self::row_to_ticket).collect();
        Ok(Box::pin(stream::iter(tickets)))
    }
}

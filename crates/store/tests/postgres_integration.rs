//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and are ignored by
//! default so the suite stays runnable without Docker. On a machine
//! with a Docker daemon:
//!
//! ```bash
//! cargo test -p reservation-store --test postgres_integration -- --ignored
//! ```

use std::sync::Arc;

use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use common::{AgencyCode, CabCode, Fare, PassengerId, StopCode, TravelDate, TripId};
use reservation_store::{
    Agency, Cab, CatalogStore, PostgresReservationStore, ScheduleStore, Stop, StoreError, Ticket,
    TicketStore, Trip,
};

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Connects to the shared container and resets all tables.
async fn fresh_store() -> PostgresReservationStore {
    let info = get_container_info().await;
    let pool = PgPool::connect(&info.connection_string).await.unwrap();
    let store = PostgresReservationStore::new(pool);
    store.run_migrations().await.unwrap();

    sqlx::query("TRUNCATE tickets, trip_schedules, trips, cabs, agencies, stops")
        .execute(store.pool())
        .await
        .unwrap();
    store
}

fn date(s: &str) -> TravelDate {
    TravelDate::parse(s).unwrap()
}

/// Seeds one BLR→MYS route pair and returns the outbound trip id.
async fn seed_route(store: &PostgresReservationStore, capacity: u32) -> TripId {
    store
        .insert_stop(Stop::new("BLR", "Bangalore", "Majestic terminal"))
        .await
        .unwrap();
    store.insert_stop(Stop::new("MYS", "Mysore", "")).await.unwrap();
    store
        .insert_agency(Agency::new("AG-1", "Karnataka Travels", ""))
        .await
        .unwrap();
    store
        .insert_cab(Cab::new("KA-01", capacity, "Volvo 9400", "AG-1"))
        .await
        .unwrap();

    let outbound = Trip::new("BLR", "MYS", "AG-1", "KA-01", Fare::from_cents(2500), 180);
    let inbound = outbound.reversed();
    let outbound_id = outbound.id;
    store.insert_trip_pair(outbound, inbound).await.unwrap();
    outbound_id
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn catalog_roundtrip_and_duplicates() {
    let store = fresh_store().await;

    store
        .insert_stop(Stop::new("BLR", "Bangalore", "Majestic terminal"))
        .await
        .unwrap();
    let found = store.find_stop(&StopCode::new("BLR")).await.unwrap().unwrap();
    assert_eq!(found.name, "Bangalore");

    let duplicate = store.insert_stop(Stop::new("BLR", "Again", "")).await;
    assert!(matches!(
        duplicate,
        Err(StoreError::DuplicateEntity { entity: "stop", .. })
    ));

    store.insert_stop(Stop::new("MYS", "Mysore", "")).await.unwrap();
    let all = store.list_stops().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].code.as_str(), "BLR");
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn trip_pair_is_visible_in_both_directions() {
    let store = fresh_store().await;
    seed_route(&store, 40).await;

    let forward = store
        .find_trips_between(&StopCode::new("BLR"), &StopCode::new("MYS"))
        .await
        .unwrap();
    let backward = store
        .find_trips_between(&StopCode::new("MYS"), &StopCode::new("BLR"))
        .await
        .unwrap();
    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 1);
    assert_eq!(forward[0].cab, CabCode::new("KA-01"));
    assert_eq!(backward[0].agency, AgencyCode::new("AG-1"));
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn schedule_upsert_keeps_one_row_per_key() {
    let store = fresh_store().await;
    let trip_id = seed_route(&store, 40).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.get_or_create(trip_id, date("2024-06-01"), 40).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    let first = ids[0];
    assert!(ids.iter().all(|id| *id == first));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trip_schedules")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn schedule_creation_for_unknown_trip_fails() {
    let store = fresh_store().await;
    let result = store
        .get_or_create(TripId::new(), date("2024-06-01"), 40)
        .await;
    assert!(matches!(result, Err(StoreError::TripNotFound(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn conditional_claims_never_oversell() {
    let store = fresh_store().await;
    let trip_id = seed_route(&store, 2).await;
    let schedule = store
        .get_or_create(trip_id, date("2024-06-01"), 2)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let id = schedule.id;
        handles.push(tokio::spawn(async move { store.claim_seat(id).await }));
    }

    let mut seats = Vec::new();
    let mut sold_out = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(seat) => seats.push(seat),
            Err(StoreError::SoldOut { .. }) => sold_out += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    seats.sort_unstable();
    assert_eq!(seats, vec![0, 1]);
    assert_eq!(sold_out, 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn release_is_guarded_against_underflow() {
    let store = fresh_store().await;
    let trip_id = seed_route(&store, 2).await;
    let schedule = store
        .get_or_create(trip_id, date("2024-06-01"), 2)
        .await
        .unwrap();

    store.claim_seat(schedule.id).await.unwrap();
    store.release_seat(schedule.id).await.unwrap();

    let result = store.release_seat(schedule.id).await;
    assert!(matches!(result, Err(StoreError::ReleaseUnderflow { .. })));
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn tickets_append_and_filter() {
    let store = fresh_store().await;
    let trip_id = seed_route(&store, 10).await;
    let schedule = store
        .get_or_create(trip_id, date("2024-06-01"), 10)
        .await
        .unwrap();

    let passenger = PassengerId::new();
    store
        .append_ticket(Ticket::issue(&schedule, 0, passenger))
        .await
        .unwrap();
    store
        .append_ticket(Ticket::issue(&schedule, 1, PassengerId::new()))
        .await
        .unwrap();

    let theirs = store.find_tickets_by_passenger(passenger).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].seat_number, 0);

    let on_schedule = store.find_tickets_by_schedule(schedule.id).await.unwrap();
    assert_eq!(on_schedule.len(), 2);
    assert_eq!(on_schedule[0].travel_date, date("2024-06-01"));
}

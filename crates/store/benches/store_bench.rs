use criterion::{criterion_group, criterion_main, Criterion};

use common::{TravelDate, TripId};
use reservation_store::{InMemoryReservationStore, ScheduleStore};

fn date() -> TravelDate {
    TravelDate::parse("2024-06-01").unwrap()
}

fn bench_get_or_create_existing(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryReservationStore::new();
    let trip_id = TripId::new();
    rt.block_on(async {
        store.get_or_create(trip_id, date(), 40).await.unwrap();
    });

    c.bench_function("store/get_or_create_existing", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.get_or_create(trip_id, date(), 40).await.unwrap();
            });
        });
    });
}

fn bench_claim_release_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryReservationStore::new();
    let schedule = rt.block_on(async {
        store
            .get_or_create(TripId::new(), date(), u32::MAX)
            .await
            .unwrap()
    });

    c.bench_function("store/claim_release_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.claim_seat(schedule.id).await.unwrap();
                store.release_seat(schedule.id).await.unwrap();
            });
        });
    });
}

fn bench_contended_claims(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("store/contended_claims_4x16", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryReservationStore::new();
                let schedule = store
                    .get_or_create(TripId::new(), date(), 64)
                    .await
                    .unwrap();

                let mut handles = Vec::new();
                for _ in 0..4 {
                    let store = store.clone();
                    let id = schedule.id;
                    handles.push(tokio::spawn(async move {
                        for _ in 0..16 {
                            store.claim_seat(id).await.unwrap();
                        }
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_get_or_create_existing,
    bench_claim_release_cycle,
    bench_contended_claims
);
criterion_main!(benches);

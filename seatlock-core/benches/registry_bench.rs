use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use seatlock_core::types::SeatId;
use seatlock_core::{Registry, RegistryConfig};
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("tokio runtime")
}

fn bench_lock_release_cycle(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let registry = Registry::new(RegistryConfig::default()).unwrap();

    c.bench_function("lock_release_cycle", |b| {
        b.iter(|| {
            registry.lock(SeatId(1), "alice").unwrap();
            registry.release(SeatId(1), "alice").unwrap();
        })
    });
}

fn bench_book_all_seats(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let mut group = c.benchmark_group("book_all_seats");

    for seat_count in [10u32, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("seats", seat_count),
            &seat_count,
            |b, &count| {
                b.iter(|| {
                    let registry =
                        Registry::new(RegistryConfig::new(count, Duration::from_secs(60))).unwrap();
                    for seat in registry.seat_ids() {
                        registry.lock(seat, "agent").unwrap();
                        registry.confirm(seat, "agent").unwrap();
                    }
                    black_box(registry.stats().booked)
                })
            },
        );
    }

    group.finish();
}

fn bench_contended_lock(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();
    let registry = Registry::new(RegistryConfig::default()).unwrap();
    registry.lock(SeatId(1), "holder").unwrap();

    c.bench_function("lock_already_locked", |b| {
        b.iter(|| black_box(registry.lock(SeatId(1), "challenger").is_err()))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let rt = runtime();
    let _guard = rt.enter();

    c.bench_function("sweep_1000_lapsed", |b| {
        b.iter(|| {
            let config = RegistryConfig::new(1000, Duration::from_secs(60));
            let registry = Registry::new(config).unwrap();
            for seat in registry.seat_ids() {
                registry.lock_for(seat, "agent", Duration::from_millis(1)).unwrap();
            }
            std::thread::sleep(Duration::from_millis(2));
            black_box(registry.sweep_expired())
        })
    });
}

criterion_group!(
    benches,
    bench_lock_release_cycle,
    bench_book_all_seats,
    bench_contended_lock,
    bench_sweep
);
criterion_main!(benches);

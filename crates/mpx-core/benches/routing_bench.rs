//! Criterion benchmarks for the per-event routing path.
//!
//! Every physical motion event goes through `route_pointer_motion`, so its
//! cost bounds how many events per second a compositor can feed the registry.
//!
//! Run with:
//! ```bash
//! cargo bench --package mpx-core --bench routing_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mpx_core::{Device, DeviceId, DeviceKind, GrabMode, ManagerOptions, Rect, SeatManager};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// Creates a manager with `n` seats, each fed by one pointer `mouse{i}`.
///
/// Display: 1920×1080, so unconstrained motion is clamped on every event.
fn build_manager_with_n_seats(n: usize) -> (SeatManager, Vec<DeviceId>) {
    let mut manager = SeatManager::with_options(ManagerOptions {
        display_bounds: Some(Rect::new(0, 0, 1920, 1080)),
        ..ManagerOptions::default()
    });
    let mut devices = Vec::with_capacity(n);

    for i in 0..n {
        let seat = if i == 0 {
            manager.default_seat_id()
        } else {
            manager
                .create_seat(format!("seat{i}"))
                .expect("seat names are unique")
        };
        let id = DeviceId::new(format!("mouse{i}"));
        manager
            .register_device(Device::new(id.clone(), "bench mouse", DeviceKind::Pointer))
            .expect("device ids are unique");
        manager
            .assign_device(&id, seat)
            .expect("seat and device exist");
        devices.push(id);
    }

    (manager, devices)
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_route_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_pointer_motion");

    for seats in [1usize, 4, 16] {
        let (mut manager, devices) = build_manager_with_n_seats(seats);
        let last = devices[seats - 1].clone();
        group.bench_with_input(BenchmarkId::new("free", seats), &last, |b, device| {
            b.iter(|| {
                manager
                    .route_pointer_motion(black_box(device), black_box(3.0), black_box(-2.0))
                    .expect("device is assigned")
            })
        });
    }

    group.finish();
}

fn bench_route_motion_locked(c: &mut Criterion) {
    let (mut manager, devices) = build_manager_with_n_seats(4);
    let seat = manager.default_seat_id();
    manager
        .request_pointer_grab(seat, "bench", GrabMode::PointerLock)
        .expect("seat is ungrabbed");

    c.bench_function("route_pointer_motion/locked", |b| {
        b.iter(|| {
            manager
                .route_pointer_motion(black_box(&devices[0]), black_box(1.0), black_box(1.0))
                .expect("device is assigned")
        })
    });
}

fn bench_grab_cycle(c: &mut Criterion) {
    let (mut manager, _) = build_manager_with_n_seats(4);
    let seat = manager.default_seat_id();

    c.bench_function("grab_request_release", |b| {
        b.iter(|| {
            manager
                .request_pointer_grab(seat, "bench", GrabMode::PointerConfine)
                .expect("seat is ungrabbed");
            manager.release_pointer_grab(seat).expect("seat is grabbed")
        })
    });
}

criterion_group!(
    benches,
    bench_route_motion,
    bench_route_motion_locked,
    bench_grab_cycle
);
criterion_main!(benches);

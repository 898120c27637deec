use bevy::prelude::*;
use bikelane_story::narrative::Mode;
use bikelane_story::simulation::traffic::{bike_target_x, steer_bike, TrafficConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Steps a crowded street of bikes past the default parked cars.
fn bench_bike_step(c: &mut Criterion) {
    let config = TrafficConfig::default();
    let mut rng = StdRng::seed_from_u64(42);
    let parked: Vec<Vec2> = [11.0, -11.0]
        .iter()
        .flat_map(|&x| (0..5).map(move |i| Vec2::new(x, -20.0 - i as f32 * 35.0)))
        .collect();
    let mut bikes: Vec<(f32, f32, f32, f32)> = (0..1_000)
        .map(|i| {
            let lane = if i % 2 == 0 { 11.0 } else { -11.0 };
            let direction = if lane > 0.0 { -1.0 } else { 1.0 };
            let speed = direction * 0.2 * (1.0 + rng.gen::<f32>() * 0.25);
            (lane, lane, rng.gen_range(-250.0..50.0), speed)
        })
        .collect();

    c.bench_function("bike_step_1000", |b| {
        b.iter(|| {
            for (lane, x, z, speed) in bikes.iter_mut() {
                *z = config.corridor.advance(*z, *speed);
                let target = bike_target_x(Mode::Problem, *lane, *z, &parked, &config);
                let (next, roll) = steer_bike(*x, target, *speed, &config);
                *x = next;
                black_box(roll);
            }
        })
    });
}

criterion_group!(benches, bench_bike_step);
criterion_main!(benches);

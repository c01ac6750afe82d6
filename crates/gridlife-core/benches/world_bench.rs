use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use gridlife_core::{SimulationConfig, WorldState};
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn bench_world_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    let samples: usize = env_or("GL_BENCH_SAMPLES", 30).max(10);
    group.sample_size(samples);
    group.warm_up_time(Duration::from_secs(env_or("GL_BENCH_WARMUP_SECS", 2)));
    group.measurement_time(Duration::from_secs(env_or("GL_BENCH_MEASURE_SECS", 10)));
    // Epochs per bench iteration.
    let steps: usize = env_or("GL_BENCH_STEPS", 32).max(1);
    let populations: Vec<usize> = std::env::var("GL_BENCH_AGENTS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![200_usize, 2_000, 10_000]);

    for &population in &populations {
        group.bench_function(format!("steps{steps}_agents{population}"), |b| {
            b.iter_batched(
                || {
                    let config = SimulationConfig {
                        size: 300,
                        population,
                        food_units: population * 4,
                        rng_seed: Some(0xBEEF),
                        history_capacity: 1,
                        ..SimulationConfig::default()
                    };
                    let mut world = WorldState::new(config).expect("world");
                    world.populate().expect("populate");
                    world
                },
                |mut world| {
                    for _ in 0..steps {
                        world.step().expect("step");
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_world_steps);
criterion_main!(benches);

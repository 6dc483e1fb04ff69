use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use civitas::core::config::SimulationConfig;
use civitas::simulation::World;

fn town(population: usize) -> World {
    let config = SimulationConfig { initial_population: population, seed: 7, ..SimulationConfig::default() };
    let mut world = World::from_config(config).expect("default config is valid");
    world.found_town();
    world.populate();
    world
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for population in [100usize, 1000, 5000] {
        let mut world = town(population);
        group.bench_with_input(BenchmarkId::from_parameter(population), &population, |b, _| {
            b.iter(|| black_box(world.tick(1.0).len()))
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let world = town(2000);
    c.bench_function("society_stats_2000", |b| b.iter(|| black_box(world.collect_stats())));
}

criterion_group!(benches, bench_tick, bench_stats);
criterion_main!(benches);

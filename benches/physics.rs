//! Benchmarks for pennant flag simulation.

use criterion::{criterion_group, criterion_main, Criterion};
use pennant::*;

fn bench_default_flag(c: &mut Criterion) {
    c.bench_function("flag_default_60_steps", |b| {
        b.iter(|| {
            let mut flag: FlagSimulation<f32> = FlagSimulation::from_config(&FlagConfig::default(), None);
            flag.set_wind(Vec3::new(6.0, 0.0, 2.0));
            for _ in 0..60 {
                flag.simulate(1.0 / 60.0);
            }
            flag.cloth().positions()
        });
    });
}

fn bench_cloth_simulation(c: &mut Criterion) {
    c.bench_function("cloth_40x40_60_steps", |b| {
        b.iter(|| {
            let mut cloth: ClothMesh<f32> = ClothMesh::new(&ClothConfig::new(4.0, 4.0, 1.0, 0.1));
            let config = SolverConfig::new()
                .with_wind(Vec3::new(0.0, 0.0, 3.0))
                .with_iterations(4);
            for _ in 0..60 {
                cloth.simulate(1.0 / 60.0, &config);
            }
            cloth.positions()
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let mut flag: FlagSimulation<f32> = FlagSimulation::from_config(&FlagConfig::default(), None);
    flag.simulate(1.0 / 60.0);
    let mut buffer = vec![0.0f32; flag.cloth().particle_count() * 3];
    c.bench_function("flag_render_default", |b| {
        b.iter(|| flag.render(&mut buffer))
    });
}

criterion_group!(benches, bench_default_flag, bench_cloth_simulation, bench_render);
criterion_main!(benches);

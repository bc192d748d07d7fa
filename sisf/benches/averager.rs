use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use sisf::prelude::*;

// Deterministic pseudo-random coordinates in [0,edge)
fn coords(n: usize, seed: u64, edge: f64) -> Vec<Pos> {
    let mut s = seed;
    let mut next = move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (s >> 11) as f64 / (1u64 << 53) as f64 * edge
    };
    (0..n).map(|_| Pos::new(next(), next(), next())).collect()
}

fn make_traj(nfr: usize, nat: usize, edge: f64) -> Trajectory {
    let frames = (0..nfr).map(|f| (f as i64, coords(nat, f as u64 + 1, edge)));
    Trajectory::from_frames(frames, CubicBox::new(edge).unwrap()).unwrap()
}

fn sisf_benchmark(c: &mut Criterion) {
    let shell = KShell::new(WaveVectorMagnitudes::default());
    let disp = Array2::from_shape_fn((10000, 3), |(i, j)| ((i * 3 + j) % 17) as f64 * 0.1 - 0.8);

    c.bench_function("amplitude 10k", |b| {
        b.iter(|| shell.amplitude(black_box(disp.view()), 20.0))
    });

    let trj = make_traj(100, 1000, 20.0);
    c.bench_function("multi_origin serial", |b| {
        let params = CorrelationParams::default().with_parallelism(Parallelism::Serial);
        b.iter(|| multi_origin(black_box(&trj), &params).unwrap())
    });

    c.bench_function("multi_origin parallel", |b| {
        let params = CorrelationParams::default();
        b.iter(|| multi_origin(black_box(&trj), &params).unwrap())
    });
}

criterion_group! {
    name = averager;
    config = Criterion::default().sample_size(20).warm_up_time(Duration::from_secs(3));
    targets = sisf_benchmark
}
criterion_main!(averager);

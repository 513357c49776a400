//! Step-time benchmarks: one full step (rule phase + homing + commit) across
//! population sizes, sequential against rayon-parallel phases.

use boidsim::{EngineSettings, ExecutionMode, FlockState, Parameters, StepEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

fn engine(n: usize, mode: ExecutionMode) -> StepEngine {
    let flock = FlockState::init(n, 100.0, 42).expect("valid flock");
    let params = Parameters {
        engine: EngineSettings { mode, threads: 0 },
        ..Parameters::default()
    };
    StepEngine::new(flock, params).expect("valid parameters")
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for n in [50usize, 200, 800, 2000] {
        for (label, mode) in [("sequential", ExecutionMode::Sequential), ("parallel", ExecutionMode::Parallel)] {
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                let mut e = engine(n, mode);
                b.iter(|| {
                    e.step();
                    black_box(e.flock().position(0));
                });
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_step
}

criterion_main!(benches);

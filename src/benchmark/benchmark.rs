use std::io::Write;
use std::time::Instant;

use tracing::{debug, warn};

use crate::configuration::error::ConfigurationError;
use crate::simulation::engine::StepEngine;
use crate::simulation::params::{EngineSettings, ExecutionMode, Parameters};
use crate::simulation::states::FlockState;

/// Step count when the caller gives none
pub const DEFAULT_ITERATIONS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub iterations: u64,
    pub elapsed_ms: u128, // whole milliseconds around the full run
}

/// Run `iterations` steps back to back and time the whole run
pub fn run_benchmark(engine: &mut StepEngine, iterations: u64) -> BenchmarkReport {
    let t0 = Instant::now();
    engine.run(iterations);
    let elapsed_ms = t0.elapsed().as_millis();

    debug!(iterations, elapsed_ms, "benchmark finished");
    BenchmarkReport { iterations, elapsed_ms }
}

/// Engine over a copy of `flock` with default rules and the given mode
fn make_engine(flock: &FlockState, mode: ExecutionMode) -> Result<StepEngine, ConfigurationError> {
    let params = Parameters {
        engine: EngineSettings { mode, threads: 0 },
        ..Parameters::default()
    };
    StepEngine::new(flock.clone(), params)
}

/// Per-step time, sequential vs parallel, across population sizes.
/// Writes CSV (`N,sequential_ms,parallel_ms`); paste into a spreadsheet to graph.
/// Sizes that cannot form a flock are skipped with a warning; any other
/// construction error ends the sweep.
pub fn bench_step_curve<W: Write>(out: &mut W, sizes: &[usize], seed: u64) -> anyhow::Result<()> {
    writeln!(out, "N,sequential_ms,parallel_ms")?;

    for &n in sizes {
        let flock = match FlockState::init(n, 100.0, seed) {
            Ok(flock) => flock,
            Err(e @ ConfigurationError::PopulationTooSmall { .. }) => {
                warn!(n, error = %e, "skipping population size");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // Small n: average over more steps to smooth noise
        let steps: u64 = if n <= 500 { 50 } else if n <= 2000 { 5 } else { 1 };

        let mut seq = make_engine(&flock, ExecutionMode::Sequential)?;
        let mut par = make_engine(&flock, ExecutionMode::Parallel)?;

        // Warm-up one step
        seq.step();
        par.step();

        let t0 = Instant::now();
        seq.run(steps);
        let ms_seq = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let t1 = Instant::now();
        par.run(steps);
        let ms_par = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        writeln!(out, "{},{:.6},{:.6}", n, ms_seq, ms_par)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_every_iteration() {
        let flock = FlockState::init(10, 100.0, 42).unwrap();
        let mut engine = StepEngine::new(flock, Parameters::default()).unwrap();
        let report = run_benchmark(&mut engine, 25);
        assert_eq!(report.iterations, 25);
        assert_eq!(engine.steps_taken(), 25);
    }

    #[test]
    fn curve_writes_one_row_per_valid_size() {
        let mut buf = Vec::new();
        bench_step_curve(&mut buf, &[1, 4, 8], 3).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "N,sequential_ms,parallel_ms");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("4,"));
        assert!(lines[2].starts_with("8,"));
    }

    #[test]
    fn curve_engines_carry_the_requested_mode() {
        let flock = FlockState::init(4, 100.0, 3).unwrap();
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let engine = make_engine(&flock, mode).unwrap();
            assert_eq!(engine.settings().mode, mode);
            assert_eq!(engine.flock(), &flock);
        }
    }

    #[test]
    fn curve_reports_sink_failures() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(bench_step_curve(&mut Closed, &[4], 3).is_err());
    }
}

//! Commit phase of the step
//!
//! Applies a full delta buffer to the flock: for every boid
//! `v += delta`, then `x += v`. Each boid's commit touches only its own row,
//! so the parallel variant is a plain rayon fan-out with no shared writes.

use rayon::prelude::*;

use super::params::ExecutionMode;
use super::states::{commit_boid, FlockState, NVec3};

/// Apply `deltas[i]` to boid `i` for every boid.
/// `deltas` must hold exactly one entry per boid.
pub fn commit_deltas(flock: &mut FlockState, deltas: &[NVec3], mode: ExecutionMode) {
    assert_eq!(
        flock.agent_count(),
        deltas.len(),
        "delta buffer length must match population"
    );

    match mode {
        ExecutionMode::Sequential => {
            for (i, dv) in deltas.iter().enumerate() {
                flock.apply_delta(i, *dv);
            }
        }
        ExecutionMode::Parallel => {
            flock
                .boids_mut()
                .par_iter_mut()
                .zip(deltas.par_iter())
                .for_each(|(b, dv)| commit_boid(b, *dv));
        }
    }
}

//! Flocking rules for the step engine
//!
//! Each rule is a pure function of a read-only snapshot of the flock and is
//! evaluated one axis at a time. There is no cross-axis coupling: separation
//! in particular tests the absolute difference on the axis being evaluated,
//! not the Euclidean distance.
//!
//! A `RuleSet` sums its rules per axis in registration order; the default set
//! is cohesion, separation, alignment.

use super::params::RuleParams;
use super::states::{Boid, NVec3};

/// One coordinate axis of `NVec3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A per-axis velocity contribution for boid `j`
pub trait FlockingRule {
    fn axis_delta(&self, flock: &[Boid], j: usize, axis: Axis) -> f64;

    /// Contribution on all three axes
    fn delta(&self, flock: &[Boid], j: usize) -> NVec3 {
        NVec3::new(
            self.axis_delta(flock, j, Axis::X),
            self.axis_delta(flock, j, Axis::Y),
            self.axis_delta(flock, j, Axis::Z),
        )
    }
}

/// Collection of rules summed into one delta per boid
pub struct RuleSet {
    rules: Vec<Box<dyn FlockingRule + Send + Sync>>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Cohesion, separation and alignment, in that order
    pub fn classic(params: &RuleParams) -> Self {
        Self::new()
            .with(Cohesion { divisor: params.cohesion_divisor })
            .with(Separation { threshold: params.separation_threshold })
            .with(Alignment { divisor: params.alignment_divisor })
    }

    /// Add a rule
    pub fn with<R>(mut self, rule: R) -> Self
    where
        R: FlockingRule + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sum of every rule's contribution for boid `j`, axis by axis
    pub fn delta(&self, flock: &[Boid], j: usize) -> NVec3 {
        let mut out = NVec3::zeros();
        for axis in Axis::ALL {
            let a = axis.index();
            for rule in &self.rules {
                out[a] += rule.axis_delta(flock, j, axis);
            }
        }
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::classic(&RuleParams::default())
    }
}

/// Pull toward the centroid of every other boid
#[derive(Debug, Clone, Copy)]
pub struct Cohesion {
    pub divisor: f64,
}

impl FlockingRule for Cohesion {
    fn axis_delta(&self, flock: &[Boid], j: usize, axis: Axis) -> f64 {
        let a = axis.index();
        let pc = mean_of_others(flock, j, |b| b.x[a]);
        (pc - flock[j].x[a]) / self.divisor
    }
}

/// Push away from boids closer than `threshold` on this axis
#[derive(Debug, Clone, Copy)]
pub struct Separation {
    pub threshold: f64,
}

impl FlockingRule for Separation {
    fn axis_delta(&self, flock: &[Boid], j: usize, axis: Axis) -> f64 {
        let a = axis.index();
        let xj = flock[j].x[a];

        let mut c = 0.0;
        for (i, other) in flock.iter().enumerate() {
            if i == j {
                continue;
            }
            let d = other.x[a] - xj;
            // strict: a neighbour exactly `threshold` away contributes nothing
            if d.abs() < self.threshold {
                c -= d;
            }
        }
        c
    }
}

/// Nudge velocity toward the mean velocity of every other boid
#[derive(Debug, Clone, Copy)]
pub struct Alignment {
    pub divisor: f64,
}

impl FlockingRule for Alignment {
    fn axis_delta(&self, flock: &[Boid], j: usize, axis: Axis) -> f64 {
        let a = axis.index();
        let pv = mean_of_others(flock, j, |b| b.v[a]);
        (pv - flock[j].v[a]) / self.divisor
    }
}

/// Mean of `f` over every boid except `j`. Requires `flock.len() >= 2`.
fn mean_of_others(flock: &[Boid], j: usize, f: impl Fn(&Boid) -> f64) -> f64 {
    let mut sum = 0.0;
    for (i, b) in flock.iter().enumerate() {
        if i != j {
            sum += f(b);
        }
    }
    sum / (flock.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boid(x: f64, y: f64, z: f64) -> Boid {
        Boid::at(NVec3::new(x, y, z))
    }

    #[test]
    fn cohesion_excludes_self_from_centroid() {
        let flock = [boid(0.0, 0.0, 0.0), boid(10.0, 0.0, 0.0), boid(20.0, 0.0, 0.0)];
        let rule = Cohesion { divisor: 100.0 };

        // others of boid 0 average to 15
        assert_eq!(rule.axis_delta(&flock, 0, Axis::X), 0.15);
        assert_eq!(rule.axis_delta(&flock, 1, Axis::X), 0.0);
        assert_eq!(rule.axis_delta(&flock, 0, Axis::Y), 0.0);
    }

    #[test]
    fn separation_is_axis_wise_and_strict() {
        let flock = [boid(0.0, 0.0, 0.0), boid(0.5, 1.0, 5.0)];
        let rule = Separation { threshold: 1.0 };

        // x within threshold, y exactly at threshold, z far away
        assert_eq!(rule.axis_delta(&flock, 0, Axis::X), -0.5);
        assert_eq!(rule.axis_delta(&flock, 1, Axis::X), 0.5);
        assert_eq!(rule.axis_delta(&flock, 0, Axis::Y), 0.0);
        assert_eq!(rule.axis_delta(&flock, 0, Axis::Z), 0.0);
    }

    #[test]
    fn separation_ignores_euclidean_distance() {
        // far apart in space, but aligned on x
        let flock = [boid(3.0, 0.0, 0.0), boid(3.25, 90.0, -90.0)];
        let rule = Separation { threshold: 1.0 };
        assert_eq!(rule.axis_delta(&flock, 0, Axis::X), -0.25);
    }

    #[test]
    fn alignment_reads_velocity_not_position() {
        let mut flock = [boid(0.0, 0.0, 0.0), boid(50.0, 50.0, 50.0)];
        flock[1].v = NVec3::new(8.0, -16.0, 0.0);
        let rule = Alignment { divisor: 8.0 };

        assert_eq!(rule.delta(&flock, 0), NVec3::new(1.0, -2.0, 0.0));
        assert_eq!(rule.delta(&flock, 1), NVec3::new(-1.0, 2.0, 0.0));
    }

    #[test]
    fn classic_set_sums_all_three_rules() {
        let mut flock = [boid(0.0, 0.0, 0.0), boid(0.5, 10.0, 0.0)];
        flock[1].v = NVec3::new(0.0, 0.0, 8.0);
        let set = RuleSet::classic(&RuleParams::default());
        assert_eq!(set.len(), 3);

        let d = set.delta(&flock, 0);
        let expected = NVec3::new(0.5 / 100.0 - 0.5, 10.0 / 100.0, 1.0);
        assert_eq!(d, expected);
    }

    #[test]
    fn empty_set_contributes_nothing() {
        let flock = [boid(0.0, 0.0, 0.0), boid(0.1, 0.1, 0.1)];
        let set = RuleSet::new();
        assert!(set.is_empty());
        assert_eq!(set.delta(&flock, 0), NVec3::zeros());
    }
}

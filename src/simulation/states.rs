//! Core state types for the flocking simulation.
//!
//! Defines the boid and flock state structs:
//! - `Boid` holds one agent's position and velocity as `NVec3`
//! - `FlockState` owns the fixed-size population and is the only place
//!   positions and velocities are stored between steps
//!
//! The population length is fixed at construction. `apply_delta` is the only
//! mutator; the engine calls it once per agent per step.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tracing::info;

use crate::configuration::error::ConfigurationError;
use super::params::{FlockParams, Placement};

pub type NVec3 = Vector3<f64>;

/// Smallest population the rules are defined for (cohesion and alignment
/// divide by `N - 1`)
pub const MIN_POPULATION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
}

impl Boid {
    /// Boid at rest at `x`
    pub fn at(x: NVec3) -> Self {
        Self { x, v: NVec3::zeros() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlockState {
    boids: Vec<Boid>,
}

impl FlockState {
    /// Random flock: uniform positions in `[0, spatial_scale)` per axis, zero velocity
    pub fn init(population_size: usize, spatial_scale: f64, seed: u64) -> Result<Self, ConfigurationError> {
        Self::init_with(&FlockParams {
            population: population_size,
            spatial_scale,
            seed,
            placement: Placement::Uniform,
        })
    }

    /// Random flock from full placement parameters
    pub fn init_with(params: &FlockParams) -> Result<Self, ConfigurationError> {
        params.validate()?;

        let mut rng = ChaCha12Rng::seed_from_u64(params.seed);
        let scale = params.spatial_scale;

        let boids: Vec<Boid> = (0..params.population)
            .map(|_| {
                // draw x, y, z in order so a seed fixes every coordinate
                let x = draw_coordinate(&mut rng, scale, params.placement);
                let y = draw_coordinate(&mut rng, scale, params.placement);
                let z = draw_coordinate(&mut rng, scale, params.placement);
                Boid::at(NVec3::new(x, y, z))
            })
            .collect();

        info!(
            population = params.population,
            spatial_scale = scale,
            seed = params.seed,
            placement = ?params.placement,
            "initialized flock"
        );

        Ok(Self { boids })
    }

    /// Flock from explicit boids. Rejects populations below two and
    /// non-finite components.
    pub fn from_boids(boids: Vec<Boid>) -> Result<Self, ConfigurationError> {
        if boids.len() < MIN_POPULATION {
            return Err(ConfigurationError::PopulationTooSmall { got: boids.len() });
        }
        if let Some(index) = boids.iter().position(|b| !is_finite_boid(b)) {
            return Err(ConfigurationError::NonFiniteState { index });
        }
        Ok(Self { boids })
    }

    pub fn agent_count(&self) -> usize {
        self.boids.len()
    }

    /// Position of agent `i`. Panics if `i >= agent_count()`.
    pub fn position(&self, i: usize) -> NVec3 {
        self.boids[i].x
    }

    /// Velocity of agent `i`. Panics if `i >= agent_count()`.
    pub fn velocity(&self, i: usize) -> NVec3 {
        self.boids[i].v
    }

    /// Read-only snapshot of the whole population
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Commit one agent's delta: `v += dv`, then `x += v` with the updated velocity
    pub fn apply_delta(&mut self, i: usize, dv: NVec3) {
        commit_boid(&mut self.boids[i], dv);
    }

    /// Mutable rows for the commit phase. Crate-private so the length stays fixed.
    pub(crate) fn boids_mut(&mut self) -> &mut [Boid] {
        &mut self.boids
    }

    /// Mean position of the population
    pub fn centroid(&self) -> NVec3 {
        let sum = self.boids.iter().fold(NVec3::zeros(), |acc, b| acc + b.x);
        sum / self.boids.len() as f64
    }

    /// True if no position or velocity component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.boids.iter().all(is_finite_boid)
    }
}

/// Velocity first, then position from the new velocity
#[inline]
pub(crate) fn commit_boid(b: &mut Boid, dv: NVec3) {
    b.v += dv;
    b.x += b.v;
}

fn is_finite_boid(b: &Boid) -> bool {
    b.x.iter().chain(b.v.iter()).all(|c| c.is_finite())
}

fn draw_coordinate(rng: &mut ChaCha12Rng, scale: f64, placement: Placement) -> f64 {
    match placement {
        Placement::Uniform => rng.random_range(0.0..scale),
        Placement::Lattice => {
            // ceil(scale) - 1 < scale, so every cell lies inside [0, scale)
            let cells = scale.ceil().max(1.0) as u64;
            rng.random_range(0..cells) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_places_boids_inside_scale_at_rest() {
        let flock = FlockState::init(64, 100.0, 7).unwrap();
        assert_eq!(flock.agent_count(), 64);
        for b in flock.boids() {
            assert!(b.x.iter().all(|&c| (0.0..100.0).contains(&c)));
            assert_eq!(b.v, NVec3::zeros());
        }
    }

    #[test]
    fn init_is_deterministic_per_seed() {
        let a = FlockState::init(10, 100.0, 42).unwrap();
        let b = FlockState::init(10, 100.0, 42).unwrap();
        let c = FlockState::init(10, 100.0, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn lattice_placement_uses_whole_numbers() {
        let params = FlockParams {
            population: 30,
            spatial_scale: 100.0,
            seed: 1,
            placement: Placement::Lattice,
        };
        let flock = FlockState::init_with(&params).unwrap();
        for b in flock.boids() {
            assert!(b.x.iter().all(|&c| c.fract() == 0.0 && (0.0..100.0).contains(&c)));
        }
    }

    #[test]
    fn init_rejects_bad_configuration() {
        assert!(matches!(
            FlockState::init(1, 100.0, 0),
            Err(ConfigurationError::PopulationTooSmall { got: 1 })
        ));
        assert!(matches!(
            FlockState::init(5, 0.0, 0),
            Err(ConfigurationError::InvalidSpatialScale { .. })
        ));
        assert!(matches!(
            FlockState::init(5, f64::NAN, 0),
            Err(ConfigurationError::InvalidSpatialScale { .. })
        ));
    }

    #[test]
    fn from_boids_rejects_non_finite() {
        let mut boids = vec![Boid::at(NVec3::zeros()); 3];
        boids[2].v.y = f64::INFINITY;
        assert!(matches!(
            FlockState::from_boids(boids),
            Err(ConfigurationError::NonFiniteState { index: 2 })
        ));
    }

    #[test]
    fn apply_delta_updates_velocity_then_position() {
        let mut flock = FlockState::from_boids(vec![
            Boid { x: NVec3::new(1.0, 2.0, 3.0), v: NVec3::new(0.5, 0.0, -1.0) },
            Boid::at(NVec3::zeros()),
        ])
        .unwrap();

        flock.apply_delta(0, NVec3::new(1.0, 1.0, 1.0));

        assert_eq!(flock.velocity(0), NVec3::new(1.5, 1.0, 0.0));
        assert_eq!(flock.position(0), NVec3::new(2.5, 3.0, 3.0));
        assert_eq!(flock.position(1), NVec3::zeros());
    }

    #[test]
    fn centroid_is_mean_position() {
        let flock = FlockState::from_boids(vec![
            Boid::at(NVec3::new(0.0, 0.0, 0.0)),
            Boid::at(NVec3::new(2.0, 4.0, 6.0)),
        ])
        .unwrap();
        assert_eq!(flock.centroid(), NVec3::new(1.0, 2.0, 3.0));
    }
}

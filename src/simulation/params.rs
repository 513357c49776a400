//! Numerical parameters for the simulation
//!
//! - `FlockParams`: population size, spatial scale, seed and placement
//! - `RuleParams`: divisors and threshold for cohesion, separation, alignment
//! - `HomingParams`: homing divisor, flip period and the two target points
//! - `EngineSettings`: sequential or rayon-parallel phases
//!
//! Defaults reproduce the classic terminal flock: 50 boids in a 100-unit cube.

use serde::Deserialize;

use crate::configuration::error::ConfigurationError;
use super::states::{NVec3, MIN_POPULATION};

pub const DEFAULT_POPULATION: usize = 50;
pub const DEFAULT_SPATIAL_SCALE: f64 = 100.0;
pub const DEFAULT_SEED: u64 = 42;

/// How initial positions are drawn
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    #[serde(rename = "uniform")] // continuous uniform in [0, S)
    Uniform,

    #[serde(rename = "lattice")] // whole numbers in [0, S)
    Lattice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlockParams {
    pub population: usize, // N, fixed for the lifetime of the flock
    pub spatial_scale: f64, // S, initial positions lie in [0, S)
    pub seed: u64, // deterministic seed
    pub placement: Placement,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            spatial_scale: DEFAULT_SPATIAL_SCALE,
            seed: DEFAULT_SEED,
            placement: Placement::Uniform,
        }
    }
}

impl FlockParams {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population < MIN_POPULATION {
            return Err(ConfigurationError::PopulationTooSmall { got: self.population });
        }
        if !(self.spatial_scale.is_finite() && self.spatial_scale > 0.0) {
            return Err(ConfigurationError::InvalidSpatialScale { got: self.spatial_scale });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleParams {
    pub cohesion_divisor: f64, // 100 -> move 1% of the way to the centroid of the others
    pub separation_threshold: f64, // per-axis distance below which neighbours push apart
    pub alignment_divisor: f64, // 8 -> close 1/8 of the gap to the mean velocity
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            cohesion_divisor: 100.0,
            separation_threshold: 1.0,
            alignment_divisor: 8.0,
        }
    }
}

impl RuleParams {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        nonzero_divisor("cohesion_divisor", self.cohesion_divisor)?;
        nonzero_divisor("alignment_divisor", self.alignment_divisor)?;
        if !(self.separation_threshold.is_finite() && self.separation_threshold >= 0.0) {
            return Err(ConfigurationError::InvalidRuleParameter {
                name: "separation_threshold",
                value: self.separation_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomingParams {
    pub divisor: f64, // 200 -> move 0.5% of the way to the target
    pub period: u64, // steps between sign flips
    pub positive_target: NVec3, // target while the sign is positive
    pub negative_target: NVec3, // target while the sign is negative
}

impl Default for HomingParams {
    fn default() -> Self {
        Self {
            divisor: 200.0,
            period: 200,
            positive_target: NVec3::new(40.0, 40.0, 40.0),
            negative_target: NVec3::new(60.0, 60.0, 60.0),
        }
    }
}

impl HomingParams {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        nonzero_divisor("homing.divisor", self.divisor)?;
        if self.period == 0 {
            return Err(ConfigurationError::InvalidRuleParameter { name: "homing.period", value: 0.0 });
        }
        for (name, target) in [
            ("homing.positive_target", self.positive_target),
            ("homing.negative_target", self.negative_target),
        ] {
            if let Some(&bad) = target.iter().find(|c| !c.is_finite()) {
                return Err(ConfigurationError::InvalidRuleParameter { name, value: bad });
            }
        }
        Ok(())
    }
}

/// Whether the two step phases fan out across rayon workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineSettings {
    pub mode: ExecutionMode,
    pub threads: usize, // 0 = rayon global pool
}

/// Everything a `StepEngine` needs besides the flock itself
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    pub rules: RuleParams,
    pub homing: HomingParams,
    pub engine: EngineSettings,
}

impl Parameters {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.rules.validate()?;
        self.homing.validate()
    }
}

fn nonzero_divisor(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value != 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidRuleParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FlockParams::default().validate().is_ok());
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let mut p = Parameters::default();
        p.rules.alignment_divisor = 0.0;
        assert_eq!(
            p.validate(),
            Err(ConfigurationError::InvalidRuleParameter { name: "alignment_divisor", value: 0.0 })
        );
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut p = Parameters::default();
        p.homing.period = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let mut p = Parameters::default();
        p.rules.separation_threshold = -1.0;
        assert!(p.validate().is_err());
    }
}

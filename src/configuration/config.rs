//! Configuration types for loading flock scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. Every section and field is optional; missing values fall back
//! to the classic terminal flock (50 boids, 100-unit cube, seed 42).
//!
//! - [`FlockConfig`]   – population, spatial scale, seed, placement
//! - [`RulesConfig`]   – cohesion / separation / alignment constants
//! - [`HomingConfig`]  – homing divisor, flip period, the two targets
//! - [`EngineConfig`]  – sequential or parallel phases, worker count
//! - [`ScenarioConfig`] – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! flock:
//!   population: 50
//!   spatial_scale: 100.0
//!   seed: 42
//!   placement: "uniform"    # or "lattice"
//!
//! rules:
//!   cohesion_divisor: 100.0
//!   separation_threshold: 1.0
//!   alignment_divisor: 8.0
//!
//! homing:
//!   divisor: 200.0
//!   period: 200
//!   positive_target: [40.0, 40.0, 40.0]
//!   negative_target: [60.0, 60.0, 60.0]
//!
//! engine:
//!   parallel: true
//!   threads: 0              # 0 -> rayon global pool
//! ```
//!
//! `Scenario::build` maps this into the runtime parameter structs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::simulation::params::{
    Placement, DEFAULT_POPULATION, DEFAULT_SEED, DEFAULT_SPATIAL_SCALE,
};

/// Initial population
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FlockConfig {
    pub population: usize, // number of boids, at least 2
    pub spatial_scale: f64, // initial positions lie in [0, spatial_scale)
    pub seed: u64, // deterministic seed to make runs reproducible
    pub placement: Placement, // continuous or whole-number initial positions
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            spatial_scale: DEFAULT_SPATIAL_SCALE,
            seed: DEFAULT_SEED,
            placement: Placement::Uniform,
        }
    }
}

/// Local rule constants. `None` keeps the default.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    pub cohesion_divisor: Option<f64>,
    pub separation_threshold: Option<f64>,
    pub alignment_divisor: Option<f64>,
}

/// Homing rule constants. `None` keeps the default.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HomingConfig {
    pub divisor: Option<f64>,
    pub period: Option<u64>,
    pub positive_target: Option<[f64; 3]>,
    pub negative_target: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub parallel: bool, // `true` - rayon fan-out per phase, `false` - plain loops
    pub threads: usize, // worker count for a dedicated pool, 0 uses the global pool
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallel: true, threads: 0 }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub flock: FlockConfig,
    pub rules: RulesConfig,
    pub homing: HomingConfig,
    pub engine: EngineConfig,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("failed to parse scenario YAML")
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_yaml::from_reader(reader).context("failed to parse scenario YAML")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scenario file {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("in scenario file {}", path.display()))
    }
}

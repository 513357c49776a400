//! Build fully-initialized flock scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - placement parameters (`FlockParams`)
//! - rule, homing and engine parameters (`Parameters`)
//! - the initial flock (`FlockState`, all boids at rest)
//!
//! `into_engine` turns the bundle into a ready-to-step `StepEngine`.

use crate::configuration::config::ScenarioConfig;
use crate::configuration::error::ConfigurationError;
use super::engine::StepEngine;
use super::params::{EngineSettings, ExecutionMode, FlockParams, HomingParams, Parameters, RuleParams};
use super::states::{FlockState, NVec3};

#[derive(Debug, Clone)]
pub struct Scenario {
    pub flock_params: FlockParams,
    pub parameters: Parameters,
    pub flock: FlockState,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigurationError> {
        // Flock: validated and seeded
        let flock_params = FlockParams {
            population: cfg.flock.population,
            spatial_scale: cfg.flock.spatial_scale,
            seed: cfg.flock.seed,
            placement: cfg.flock.placement,
        };
        let flock = FlockState::init_with(&flock_params)?;

        // Rules: overrides on top of the classic constants
        let defaults = RuleParams::default();
        let rules = RuleParams {
            cohesion_divisor: cfg.rules.cohesion_divisor.unwrap_or(defaults.cohesion_divisor),
            separation_threshold: cfg.rules.separation_threshold.unwrap_or(defaults.separation_threshold),
            alignment_divisor: cfg.rules.alignment_divisor.unwrap_or(defaults.alignment_divisor),
        };

        // Homing
        let defaults = HomingParams::default();
        let homing = HomingParams {
            divisor: cfg.homing.divisor.unwrap_or(defaults.divisor),
            period: cfg.homing.period.unwrap_or(defaults.period),
            positive_target: cfg.homing.positive_target.map(NVec3::from).unwrap_or(defaults.positive_target),
            negative_target: cfg.homing.negative_target.map(NVec3::from).unwrap_or(defaults.negative_target),
        };

        // Engine
        let engine = EngineSettings {
            mode: if cfg.engine.parallel { ExecutionMode::Parallel } else { ExecutionMode::Sequential },
            threads: cfg.engine.threads,
        };

        let parameters = Parameters { rules, homing, engine };
        parameters.validate()?;

        Ok(Self { flock_params, parameters, flock })
    }

    /// Force one execution mode regardless of the configuration
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.parameters.engine.mode = mode;
        self
    }

    pub fn into_engine(self) -> Result<StepEngine, ConfigurationError> {
        StepEngine::new(self.flock, self.parameters)
    }
}

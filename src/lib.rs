pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Boid, FlockState, NVec3};
pub use simulation::params::{EngineSettings, ExecutionMode, FlockParams, HomingParams, Parameters, Placement, RuleParams};
pub use simulation::rules::{Alignment, Axis, Cohesion, FlockingRule, RuleSet, Separation};
pub use simulation::homing::{homing_delta, Sign, SimulationContext};
pub use simulation::engine::{observe_fn, Control, FrameObserver, ObserveFn, StepEngine};
pub use simulation::integrator::commit_deltas;
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, FlockConfig, HomingConfig, RulesConfig, ScenarioConfig};
pub use configuration::error::ConfigurationError;

pub use visualization::ascii::{key_control, AsciiRenderer, TerminalLoop, TerminalSession};
#[cfg(feature = "viewer")]
pub use visualization::boids_vis3d::run_3d;

pub use benchmark::benchmark::{bench_step_curve, run_benchmark, BenchmarkReport, DEFAULT_ITERATIONS};

/// Random flock with zero velocities: positions uniform in `[0, spatial_scale)`
pub fn init_flock(population_size: usize, spatial_scale: f64, seed: u64) -> Result<FlockState, ConfigurationError> {
    FlockState::init(population_size, spatial_scale, seed)
}

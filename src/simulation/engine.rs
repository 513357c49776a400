//! Step engine: drives one synchronized flock update per call
//!
//! A step runs in two phases separated by a barrier:
//! 1. compute deltas: every boid's rule sum is written into the delta
//!    buffer from the committed flock, then the homing pull is added with the
//!    target returned by one `SimulationContext::advance`
//! 2. commit: every boid applies its own delta
//!
//! Phase 1 reads the flock and writes only the delta buffer, phase 2 writes
//! the flock and reads only the buffer. Both fan out across rayon workers
//! in `ExecutionMode::Parallel`; the join at the end of phase 1 is the
//! barrier. Each boid's delta is reduced sequentially inside its own task,
//! so sequential and parallel runs are bit-identical.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, trace};

use crate::configuration::error::ConfigurationError;
use super::homing::SimulationContext;
use super::integrator::commit_deltas;
use super::params::{EngineSettings, ExecutionMode, Parameters};
use super::rules::RuleSet;
use super::states::{Boid, FlockState, NVec3};

/// Returned by a frame observer between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Presentation boundary: sees the committed flock between steps and
/// decides whether another step runs
pub trait FrameObserver {
    fn observe(&mut self, flock: &FlockState) -> Control;
}

/// Observer backed by a closure, see [`observe_fn`]
pub struct ObserveFn<F>(F);

/// Wrap a closure as a `FrameObserver`
pub fn observe_fn<F>(f: F) -> ObserveFn<F>
where
    F: FnMut(&FlockState) -> Control,
{
    ObserveFn(f)
}

impl<F> FrameObserver for ObserveFn<F>
where
    F: FnMut(&FlockState) -> Control,
{
    fn observe(&mut self, flock: &FlockState) -> Control {
        (self.0)(flock)
    }
}

pub struct StepEngine {
    flock: FlockState,
    deltas: Vec<NVec3>, // one velocity adjustment per boid, rebuilt every step
    rules: RuleSet,
    context: SimulationContext,
    settings: EngineSettings,
    pool: Option<ThreadPool>, // dedicated workers when `threads > 0`
}

impl StepEngine {
    /// Engine with the classic rule set built from `params.rules`
    pub fn new(flock: FlockState, params: Parameters) -> Result<Self, ConfigurationError> {
        params.validate()?;
        let rules = RuleSet::classic(&params.rules);
        Self::with_rules(flock, rules, params)
    }

    /// Engine with a caller-supplied rule set. `params.rules` is not used.
    pub fn with_rules(flock: FlockState, rules: RuleSet, params: Parameters) -> Result<Self, ConfigurationError> {
        params.homing.validate()?;

        let pool = match (params.engine.mode, params.engine.threads) {
            (ExecutionMode::Parallel, n) if n > 0 => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ConfigurationError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        info!(
            population = flock.agent_count(),
            mode = ?params.engine.mode,
            threads = params.engine.threads,
            rules = rules.len(),
            "step engine ready"
        );

        Ok(Self {
            deltas: vec![NVec3::zeros(); flock.agent_count()],
            flock,
            rules,
            context: SimulationContext::new(params.homing),
            settings: params.engine,
            pool,
        })
    }

    /// Advance the whole flock by exactly one tick
    pub fn step(&mut self) {
        let mode = self.settings.mode;
        let rules = &self.rules;
        let flock = &mut self.flock;
        let deltas = &mut self.deltas;
        let context = &mut self.context;

        trace!(step = context.step(), "computing deltas");
        fan_out(self.pool.as_ref(), || compute_rule_deltas(rules, flock.boids(), deltas, mode));

        // homing: one target for the whole flock, one counter tick per step
        let target = context.advance();
        for (d, b) in deltas.iter_mut().zip(flock.boids()) {
            *d += context.homing_delta(b.x, target);
        }

        trace!(step = context.step(), "committing");
        fan_out(self.pool.as_ref(), || commit_deltas(flock, deltas, mode));
    }

    /// Run `steps` ticks back to back
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Show the flock to `observer`, step, repeat until it answers `Stop`.
    /// Returns the number of steps taken.
    pub fn run_until<O>(&mut self, observer: &mut O) -> u64
    where
        O: FrameObserver + ?Sized,
    {
        let mut steps = 0;
        while observer.observe(&self.flock) == Control::Continue {
            self.step();
            steps += 1;
        }
        steps
    }

    pub fn flock(&self) -> &FlockState {
        &self.flock
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Delta buffer of the most recent step (zeros before the first step)
    pub fn deltas(&self) -> &[NVec3] {
        &self.deltas
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Steps taken since construction or the last `reset_homing`
    pub fn steps_taken(&self) -> u64 {
        self.context.step()
    }

    /// Restart the homing schedule without touching the flock
    pub fn reset_homing(&mut self) {
        self.context.reset();
    }

    /// Consume the engine and hand back the flock
    pub fn into_flock(self) -> FlockState {
        self.flock
    }
}

/// Rule phase: `out[j]` = rule sum for boid `j`, from the committed `boids`
pub fn compute_rule_deltas(rules: &RuleSet, boids: &[Boid], out: &mut [NVec3], mode: ExecutionMode) {
    match mode {
        ExecutionMode::Sequential => {
            for (j, d) in out.iter_mut().enumerate() {
                *d = rules.delta(boids, j);
            }
        }
        ExecutionMode::Parallel => {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(j, d)| *d = rules.delta(boids, j));
        }
    }
}

fn fan_out<F>(pool: Option<&ThreadPool>, f: F)
where
    F: FnOnce() + Send,
{
    match pool {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> FlockState {
        FlockState::from_boids(vec![
            Boid::at(NVec3::new(10.0, 20.0, 30.0)),
            Boid::at(NVec3::new(30.0, 20.5, 70.0)),
        ])
        .unwrap()
    }

    fn sequential() -> Parameters {
        Parameters {
            engine: EngineSettings { mode: ExecutionMode::Sequential, threads: 0 },
            ..Parameters::default()
        }
    }

    #[test]
    fn step_advances_homing_once() {
        let mut engine = StepEngine::new(pair(), sequential()).unwrap();
        engine.run(3);
        assert_eq!(engine.steps_taken(), 3);
    }

    #[test]
    fn first_step_matches_hand_computed_delta() {
        let mut engine = StepEngine::new(pair(), sequential()).unwrap();
        engine.step();

        // boid 0: cohesion toward boid 1, separation on y only, homing to 40
        let expected = NVec3::new(
            (30.0 - 10.0) / 100.0 + (40.0 - 10.0) / 200.0,
            (20.5 - 20.0) / 100.0 - 0.5 + (40.0 - 20.0) / 200.0,
            (70.0 - 30.0) / 100.0 + (40.0 - 30.0) / 200.0,
        );
        assert_eq!(engine.deltas()[0], expected);
        assert_eq!(engine.flock().velocity(0), expected);
        assert_eq!(engine.flock().position(0), NVec3::new(10.0, 20.0, 30.0) + expected);
    }

    #[test]
    fn run_until_stops_on_observer_signal() {
        let mut engine = StepEngine::new(pair(), sequential()).unwrap();
        let mut frames = 0;
        let taken = engine.run_until(&mut observe_fn(|_: &FlockState| {
            frames += 1;
            if frames > 5 { Control::Stop } else { Control::Continue }
        }));
        assert_eq!(taken, 5);
        assert_eq!(frames, 6);
        assert_eq!(engine.steps_taken(), 5);
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let flock = FlockState::init(40, 100.0, 9).unwrap();
        let mut global = StepEngine::new(flock.clone(), Parameters::default()).unwrap();
        let mut dedicated = StepEngine::new(
            flock,
            Parameters {
                engine: EngineSettings { mode: ExecutionMode::Parallel, threads: 3 },
                ..Parameters::default()
            },
        )
        .unwrap();
        global.run(25);
        dedicated.run(25);
        assert_eq!(global.flock(), dedicated.flock());
    }

    #[test]
    fn invalid_parameters_abort_construction() {
        let mut p = sequential();
        p.rules.cohesion_divisor = 0.0;
        assert!(StepEngine::new(pair(), p).is_err());
    }
}

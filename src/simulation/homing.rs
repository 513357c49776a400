//! Homing: a global pull toward a target that alternates between two points
//!
//! `SimulationContext` holds the process-wide state of the homing rule:
//! a step counter and a sign flag. The sign flips every `period` steps and
//! selects which of the two targets the flock is pulled toward. With the
//! default parameters steps 0..200 head for (40,40,40), 200..400 for
//! (60,60,60), 400..600 for (40,40,40) again, and so on.

use tracing::debug;

use super::params::HomingParams;
use super::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn flipped(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }
}

/// Sign before step 0. The flip at step 0 makes the first window positive.
const INITIAL_SIGN: Sign = Sign::Negative;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationContext {
    params: HomingParams,
    step: u64, // steps advanced so far
    sign: Sign, // selects the current target
}

impl SimulationContext {
    pub fn new(params: HomingParams) -> Self {
        Self {
            params,
            step: 0,
            sign: INITIAL_SIGN,
        }
    }

    /// Back to step 0 and the initial sign
    pub fn reset(&mut self) {
        self.step = 0;
        self.sign = INITIAL_SIGN;
    }

    /// Advance one step and return the target that applies to it.
    /// Flips the sign on multiples of the period, then increments the counter
    /// exactly once.
    pub fn advance(&mut self) -> NVec3 {
        if self.step % self.params.period == 0 {
            self.sign = self.sign.flipped();
            debug!(step = self.step, sign = ?self.sign, "homing target flipped");
        }
        let target = self.current_target();
        self.step += 1;
        target
    }

    /// Steps advanced so far
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn params(&self) -> &HomingParams {
        &self.params
    }

    /// Target selected by the current sign
    pub fn current_target(&self) -> NVec3 {
        match self.sign {
            Sign::Positive => self.params.positive_target,
            Sign::Negative => self.params.negative_target,
        }
    }

    /// Target that `advance` returns for step index `step`
    pub fn target_at(&self, step: u64) -> NVec3 {
        if (step / self.params.period) % 2 == 0 {
            self.params.positive_target
        } else {
            self.params.negative_target
        }
    }

    /// Homing contribution for a boid at `x`
    #[inline]
    pub fn homing_delta(&self, x: NVec3, target: NVec3) -> NVec3 {
        homing_delta(x, target, self.params.divisor)
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(HomingParams::default())
    }
}

/// `(target - x) / divisor` on every axis
#[inline]
pub fn homing_delta(x: NVec3, target: NVec3, divisor: f64) -> NVec3 {
    NVec3::new(
        (target.x - x.x) / divisor,
        (target.y - x.y) / divisor,
        (target.z - x.z) / divisor,
    )
}

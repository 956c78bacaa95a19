//! Run-level configuration of the decision cycle.

use mts_core::{Duration, Time};

use crate::{SimError, SimResult};

/// Configuration shared by every cycle of a run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleConfig {
    /// Simulation time of the first cycle.
    pub start_time: Time,

    /// Interval between decisions.  Each agent's plan covers exactly one
    /// step.  Default: 0.5 s.
    pub time_step: Duration,

    /// Master RNG seed for driver-parameter sampling.  The same seed always
    /// produces the same population.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses the global pool.
    /// Ignored without the `parallel` feature.
    pub num_threads: Option<usize>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            start_time:  Time::ZERO,
            time_step:   Duration(0.5),
            seed:        0,
            num_threads: None,
        }
    }
}

impl CycleConfig {
    /// Reject settings no cycle can run with.
    pub fn validate(&self) -> SimResult<()> {
        if !self.time_step.is_positive() || !self.time_step.is_finite() {
            return Err(SimError::Config(format!(
                "time step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if !self.start_time.0.is_finite() {
            return Err(SimError::Config("start time must be finite".into()));
        }
        if self.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Start time of cycle number `cycle`.
    #[inline]
    pub fn cycle_time(&self, cycle: u64) -> Time {
        self.start_time + self.time_step * cycle as f64
    }
}

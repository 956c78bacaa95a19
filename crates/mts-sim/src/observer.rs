//! Cycle observer trait for progress reporting and data collection.

use mts_core::{AgentId, Time};

use crate::AgentOutcome;

/// Aggregate of one decision cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CycleSummary {
    pub cycle:       u64,
    pub time:        Time,
    pub agents:      usize,
    /// Agents targeting a stop in front of a conflict.
    pub stopping:    usize,
    /// Agents whose acceleration a conflict bounded.
    pub constrained: usize,
}

/// Callbacks invoked by [`ApproachCycle::step`][crate::ApproachCycle::step].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: stop counter
///
/// ```rust,ignore
/// struct StopCounter(usize);
///
/// impl CycleObserver for StopCounter {
///     fn on_cycle_end(&mut self, summary: &CycleSummary) {
///         self.0 += summary.stopping;
///     }
/// }
/// ```
pub trait CycleObserver {
    /// Called before any agent is evaluated.
    fn on_cycle_start(&mut self, _cycle: u64, _time: Time) {}

    /// Called once per agent, in ascending `AgentId` order, after all agents
    /// have been evaluated.
    fn on_agent(&mut self, _agent: AgentId, _outcome: &AgentOutcome) {}

    /// Called at the end of each cycle.
    fn on_cycle_end(&mut self, _summary: &CycleSummary) {}
}

/// A [`CycleObserver`] that does nothing.
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}

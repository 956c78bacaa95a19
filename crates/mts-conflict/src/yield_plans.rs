//! `ConflictPlans`: one agent's memory of conflict decisions.
//!
//! Decisions are remembered across cycles for consistency: once an agent
//! starts yielding at a priority conflict it keeps doing so while the
//! decision is reaffirmed, even if the next cycle's numbers land slightly on
//! the other side of the threshold.  Entries that are not reaffirmed during
//! a cycle are dropped at the start of the next.

use mts_core::{AgentId, ConflictId, StopLineId, Time};

use crate::{ConflictError, ConflictResult};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "fx-hash")]
type Set<K> = rustc_hash::FxHashSet<K>;
#[cfg(not(feature = "fx-hash"))]
type Set<K> = std::collections::HashSet<K>;

/// Progress through an all-stop intersection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopPhase {
    /// Driving towards the stop line.
    Approach,
    /// Halted within the stop area, waiting for a turn.
    Yield,
    /// Allowed to cross.
    Run,
}

/// Per-agent decision memory.
///
/// Owned by exactly one agent and mutated only by that agent's own
/// conflict-approach evaluation.
#[derive(Clone, Debug, Default)]
pub struct ConflictPlans {
    /// conflict → agent yielded to
    yield_plans:   Map<ConflictId, AgentId>,
    /// conflicts whose yield plan was reaffirmed this cycle
    active_yields: Set<ConflictId>,
    stop_phases:   Map<StopLineId, StopPhase>,
    /// stop lines touched this cycle
    active_stops:  Set<StopLineId>,
    /// arrival time at the stop area per stop line
    arrivals:      Map<StopLineId, Time>,
    blocking:      bool,
}

impl ConflictPlans {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Yield plans ───────────────────────────────────────────────────────

    /// `true` if the plan at `conflict` names `agent`.
    #[inline]
    pub fn is_yield_plan(&self, conflict: ConflictId, agent: AgentId) -> bool {
        self.yield_plans.get(&conflict) == Some(&agent)
    }

    /// Agent currently yielded to at `conflict`, if any.
    #[inline]
    pub fn yield_plan(&self, conflict: ConflictId) -> Option<AgentId> {
        self.yield_plans.get(&conflict).copied()
    }

    /// Create or reaffirm the plan to yield to `agent` at `conflict`.
    pub fn set_yield_plan(&mut self, conflict: ConflictId, agent: AgentId) {
        if self.yield_plans.insert(conflict, agent) != Some(agent) {
            tracing::debug!(%conflict, %agent, "yield plan created");
        }
        self.active_yields.insert(conflict);
    }

    /// Drop every plan that was not reaffirmed since the previous call, then
    /// start a new cycle.  Stop phases and arrival times of stop lines that
    /// were not approached are dropped as well.
    pub fn clean(&mut self) {
        let active = &self.active_yields;
        self.yield_plans.retain(|conflict, agent| {
            let keep = active.contains(conflict);
            if !keep {
                tracing::debug!(%conflict, %agent, "yield plan abandoned");
            }
            keep
        });
        self.active_yields.clear();

        let active = &self.active_stops;
        self.stop_phases.retain(|line, _| active.contains(line));
        self.arrivals.retain(|line, _| active.contains(line));
        self.active_stops.clear();
    }

    #[inline]
    pub fn yield_plan_count(&self) -> usize {
        self.yield_plans.len()
    }

    // ── Blocking ──────────────────────────────────────────────────────────

    /// `true` while the ego occupies a crossing it does not have priority on.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    #[inline]
    pub(crate) fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    // ── Stop phases ───────────────────────────────────────────────────────

    #[inline]
    pub fn stop_phase(&self, stop_line: StopLineId) -> Option<StopPhase> {
        self.stop_phases.get(&stop_line).copied()
    }

    /// Start (or continue) approaching `stop_line`.
    pub fn set_stop_phase_approach(&mut self, stop_line: StopLineId) {
        self.stop_phases.entry(stop_line).or_insert(StopPhase::Approach);
        self.active_stops.insert(stop_line);
    }

    /// Halted at `stop_line` at `time`.
    ///
    /// # Errors
    ///
    /// `ConflictError::StopPhase` unless the line is being approached.
    pub fn set_stop_phase_yield(&mut self, stop_line: StopLineId, time: Time) -> ConflictResult<()> {
        match self.stop_phases.get(&stop_line) {
            Some(StopPhase::Approach) => {
                self.stop_phases.insert(stop_line, StopPhase::Yield);
                self.arrivals.insert(stop_line, time);
                self.active_stops.insert(stop_line);
                Ok(())
            }
            Some(StopPhase::Yield) => {
                self.active_stops.insert(stop_line);
                Ok(())
            }
            _ => Err(ConflictError::StopPhase {
                stop_line,
                reason: "yield phase set for a stop line that was not approached",
            }),
        }
    }

    /// Cleared to cross `stop_line`.
    ///
    /// # Errors
    ///
    /// `ConflictError::StopPhase` if the line was never approached.
    pub fn set_stop_phase_run(&mut self, stop_line: StopLineId) -> ConflictResult<()> {
        if !self.stop_phases.contains_key(&stop_line) {
            return Err(ConflictError::StopPhase {
                stop_line,
                reason: "run phase set for a stop line that was not approached",
            });
        }
        self.stop_phases.insert(stop_line, StopPhase::Run);
        self.active_stops.insert(stop_line);
        Ok(())
    }

    /// Time the ego halted within the stop area of `stop_line`.
    #[inline]
    pub fn arrival_time(&self, stop_line: StopLineId) -> Option<Time> {
        self.arrivals.get(&stop_line).copied()
    }
}

//! The `ApproachCycle` struct and its decision loop.

use mts_conflict::{
    ApproachDecision, CarFollowingModel, ConflictApproachEngine, ConflictError, ConflictPlans, EgoState, Idm,
};
use mts_core::{Acceleration, AgentId, Duration, Length, Parameters, Speed, Time};
use mts_plan::{OperationalPlan, Segments};

use crate::{AgentState, AgentStore, CycleConfig, CycleObserver, CycleSummary, Perception, SimError, SimResult};

/// One agent's result for one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentOutcome {
    pub agent:        AgentId,
    /// Bound from the conflicts ahead.
    pub decision:     ApproachDecision,
    /// Applied acceleration: car-following, conflicts, and traffic light
    /// combined.
    pub acceleration: Acceleration,
    /// Motion over the next time step along the agent's path.
    pub plan:         OperationalPlan,
}

// ── ApproachCycle ─────────────────────────────────────────────────────────────

/// The decision-cycle runner.
///
/// Each [`step`][Self::step]:
///
/// 1. **Check**: one perception per agent.
/// 2. **Decide** (optionally parallel with the `parallel` feature): every
///    agent evaluates its conflicts, mutating only its own
///    [`ConflictPlans`], and gets a one-step [`OperationalPlan`].
/// 3. **Report**: outcomes in ascending `AgentId` order to the observer.
///
/// Agent states are not advanced here; the caller integrates motion from the
/// returned plans and writes `agents.states` before the next step.
///
/// Create via [`CycleBuilder`][crate::CycleBuilder].
pub struct ApproachCycle<M: CarFollowingModel = Idm> {
    pub config: CycleConfig,

    /// Per-agent state, parameters, and decision memory.
    pub agents: AgentStore,

    /// Shared, immutable decision engine.
    pub engine: ConflictApproachEngine<M>,

    pub(crate) cycle: u64,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<M: CarFollowingModel> ApproachCycle<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Number of cycles completed.
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Start time of the next cycle.
    #[inline]
    pub fn time(&self) -> Time {
        self.config.cycle_time(self.cycle)
    }

    /// Decision memory of `agent`.
    pub fn conflict_plans(&self, agent: AgentId) -> SimResult<&ConflictPlans> {
        self.agents.conflict_plans(agent)
    }

    /// Run one decision cycle with `perceptions[i]` belonging to agent `i`.
    ///
    /// # Errors
    ///
    /// - `SimError::AgentCountMismatch` if there is not one perception per
    ///   agent; nothing is evaluated.
    /// - `SimError::Conflict` / `SimError::Plan` for the lowest agent whose
    ///   decision failed.  Every agent is still evaluated, so the other
    ///   agents' [`ConflictPlans`] hold this cycle's memory; the cycle
    ///   counter does not advance.
    pub fn step<O: CycleObserver>(
        &mut self,
        perceptions: &[Perception],
        observer:    &mut O,
    ) -> SimResult<Vec<AgentOutcome>> {
        if perceptions.len() != self.agents.count {
            return Err(SimError::AgentCountMismatch {
                expected: self.agents.count,
                got:      perceptions.len(),
                what:     "perceptions",
            });
        }
        let now = self.time();
        observer.on_cycle_start(self.cycle, now);

        let outcomes = self.decide(now, perceptions)?;

        let mut summary = CycleSummary {
            cycle:  self.cycle,
            time:   now,
            agents: outcomes.len(),
            ..Default::default()
        };
        for outcome in &outcomes {
            if outcome.decision.stop_for.is_some() {
                summary.stopping += 1;
            }
            if outcome.decision.is_constrained() {
                summary.constrained += 1;
            }
            observer.on_agent(outcome.agent, outcome);
        }
        tracing::info!(
            cycle = self.cycle,
            time = %now,
            agents = summary.agents,
            stopping = summary.stopping,
            "decision cycle complete"
        );
        observer.on_cycle_end(&summary);

        self.cycle += 1;
        Ok(outcomes)
    }

    // ── Decision phase ────────────────────────────────────────────────────

    /// Evaluate every agent.  With the `parallel` feature the agents run on
    /// Rayon's thread pool; the output order is ascending `AgentId` either
    /// way, and so is the choice of error to report.
    fn decide(&mut self, now: Time, perceptions: &[Perception]) -> SimResult<Vec<AgentOutcome>> {
        let results = self.decide_all(now, perceptions);
        results.into_iter().collect()
    }

    fn decide_all(&mut self, now: Time, perceptions: &[Perception]) -> Vec<SimResult<AgentOutcome>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let engine = &self.engine;
        let step   = self.config.time_step;
        let states = &self.agents.states;
        let params = &self.agents.params;
        let plans  = &mut self.agents.conflict_plans;

        #[cfg(not(feature = "parallel"))]
        {
            states
                .iter()
                .zip(params)
                .zip(plans.iter_mut())
                .zip(perceptions)
                .enumerate()
                .map(|(i, (((state, params), plans), perception))| {
                    decide_agent(engine, AgentId(i as u32), now, step, state, params, plans, perception)
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let run = || {
                states
                    .par_iter()
                    .zip(params.par_iter())
                    .zip(plans.par_iter_mut())
                    .zip(perceptions.par_iter())
                    .enumerate()
                    .map(|(i, (((state, params), plans), perception))| {
                        decide_agent(engine, AgentId(i as u32), now, step, state, params, plans, perception)
                    })
                    .collect()
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None       => run(),
            }
        }
    }
}

/// One agent's decision: conflict bound, car-following, and traffic light,
/// turned into a single-step plan.
#[allow(clippy::too_many_arguments)]
fn decide_agent<M: CarFollowingModel>(
    engine:     &ConflictApproachEngine<M>,
    agent:      AgentId,
    now:        Time,
    step:       Duration,
    state:      &AgentState,
    params:     &Parameters,
    plans:      &mut ConflictPlans,
    perception: &Perception,
) -> SimResult<AgentOutcome> {
    let failed = |source: ConflictError| SimError::Conflict { agent, source };

    let ego = EgoState {
        time:        now,
        speed:       state.speed,
        length:      state.length,
        speed_limit: state.speed_limit,
    };
    let decision = engine
        .approach_conflicts(params, &ego, &perception.conflicts, &perception.leaders, plans)
        .map_err(failed)?;

    let leaders: Vec<(Length, Speed)> = perception.leaders.iter().map(|l| (l.distance, l.speed)).collect();
    let mut acceleration = engine
        .model()
        .following_acceleration(params, state.speed, state.speed_limit, &leaders)
        .map_err(|e| failed(e.into()))?
        .min(decision.acceleration);
    if let Some((distance, color)) = perception.traffic_light {
        let light = engine.approach_traffic_light(params, &ego, distance, color).map_err(failed)?;
        acceleration = acceleration.min(light);
    }

    let plan = OperationalPlan::new(state.path.clone(), now, Segments::off(state.speed, step, acceleration))
        .map_err(|source| SimError::Plan { agent, source })?;
    tracing::trace!(%agent, %acceleration, stop_for = ?decision.stop_for, "agent decided");
    Ok(AgentOutcome { agent, decision, acceleration, plan })
}

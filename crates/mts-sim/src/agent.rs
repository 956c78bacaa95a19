//! Per-agent state and the per-cycle perception snapshot.

use mts_conflict::{Conflict, ConflictPlans, Leader, TrafficLightColor};
use mts_core::{AgentId, Length, Parameters, Polyline, Speed};

use crate::{SimError, SimResult};

/// Kinematic state of one agent at the start of a cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    /// Path ahead of the agent's front.
    pub path:        Polyline,
    pub speed:       Speed,
    pub length:      Length,
    pub speed_limit: Speed,
}

/// What one agent perceives this cycle.
///
/// Captured for all agents before the decision phase and read-only during it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Perception {
    /// Upcoming conflicts, nearest first.
    pub conflicts:     Vec<Conflict>,
    /// Agents ahead in the own lane, nearest first.
    pub leaders:       Vec<Leader>,
    /// Nearest traffic light ahead, if any.
    pub traffic_light: Option<(Length, TrafficLightColor)>,
}

/// Structure-of-Arrays storage for all agents.
///
/// Every `Vec` has exactly `count` elements and `AgentId` is the index into
/// all of them:
///
/// ```ignore
/// let plans = &store.conflict_plans[agent.index()];
/// ```
///
/// `states` is written by whatever integrates motion between cycles; the
/// decision cycle only reads it.  `conflict_plans` is written only by the
/// owning agent's decision.
#[derive(Debug)]
pub struct AgentStore {
    pub count:          usize,
    pub states:         Vec<AgentState>,
    pub params:         Vec<Parameters>,
    pub conflict_plans: Vec<ConflictPlans>,
}

impl AgentStore {
    /// Assemble a store, with empty decision memory for every agent.
    pub fn new(states: Vec<AgentState>, params: Vec<Parameters>) -> SimResult<Self> {
        let count = states.len();
        if params.len() != count {
            return Err(SimError::AgentCountMismatch {
                expected: count,
                got:      params.len(),
                what:     "driver parameters",
            });
        }
        let conflict_plans = (0..count).map(|_| ConflictPlans::new()).collect();
        Ok(Self { count, states, params, conflict_plans })
    }

    /// Iterate agent IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.count as u32).map(AgentId)
    }

    pub fn state(&self, agent: AgentId) -> SimResult<&AgentState> {
        self.states.get(agent.index()).ok_or(SimError::UnknownAgent(agent))
    }

    pub fn state_mut(&mut self, agent: AgentId) -> SimResult<&mut AgentState> {
        self.states.get_mut(agent.index()).ok_or(SimError::UnknownAgent(agent))
    }

    pub fn conflict_plans(&self, agent: AgentId) -> SimResult<&ConflictPlans> {
        self.conflict_plans.get(agent.index()).ok_or(SimError::UnknownAgent(agent))
    }
}

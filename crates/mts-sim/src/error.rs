use mts_conflict::ConflictError;
use mts_core::{AgentId, CoreError};
use mts_plan::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cycle configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("no agent {0} in this cycle")]
    UnknownAgent(AgentId),

    #[error("driver parameters: {0}")]
    Parameter(#[from] CoreError),

    /// The agent's decision was aborted; other agents are unaffected but the
    /// cycle reports the first failure.
    #[error("conflict approach failed for {agent}: {source}")]
    Conflict {
        agent:  AgentId,
        #[source]
        source: ConflictError,
    },

    #[error("plan construction failed for {agent}: {source}")]
    Plan {
        agent:  AgentId,
        #[source]
        source: PlanError,
    },
}

pub type SimResult<T> = Result<T, SimError>;

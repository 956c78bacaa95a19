//! Plan-subsystem error type.
//!
//! Three classes of failure are kept apart so callers can react correctly:
//!
//! - [`PlanError::Validity`]: a query outside the plan's time or distance
//!   window, or a point that cannot be projected onto the path.  Recoverable:
//!   the agent's control loop typically requests a new plan.
//! - [`PlanError::Defect`]: a builder was asked for an internally
//!   inconsistent plan (e.g. a closed-form solve dividing by zero speed).
//!   Unrecoverable: the caller must fail fast rather than drive on a wrong
//!   plan.
//! - [`PlanError::Internal`]: an invariant of the plan itself was broken
//!   while answering a query (projection indexing outside the path).

use mts_core::CoreError;
use thiserror::Error;

/// Errors produced by `mts-plan`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("plan query out of range: {0}")]
    Validity(String),

    #[error("inconsistent plan construction: {0}")]
    Defect(String),

    #[error("internal plan failure: {0}")]
    Internal(String),

    #[error("path geometry: {0}")]
    Geometry(#[from] CoreError),
}

impl PlanError {
    /// `true` for errors an agent may recover from by replanning.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlanError::Validity(_))
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

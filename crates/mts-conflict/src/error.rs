//! Conflict-subsystem error type.

use mts_core::{ConflictId, CoreError, Length, StopLineId};
use thiserror::Error;

/// Errors produced while approaching conflicts.
///
/// Every variant aborts the current agent's decision cycle; none is
/// defaulted to a guessed acceleration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConflictError {
    #[error("parameter lookup failed: {0}")]
    Parameter(#[from] CoreError),

    /// A priority rule this engine does not know.  Fatal configuration
    /// defect for the agent's cycle.
    #[error("unsupported conflict rule `{0}`")]
    UnsupportedRule(String),

    #[error("stop-controlled conflict {0} has no stop line")]
    MissingStopLine(ConflictId),

    #[error("conflict snapshot is not ordered by distance")]
    UnsortedSnapshot,

    /// Free-acceleration anticipation exceeded its iteration cap.
    #[error("anticipation did not cover {distance} within {steps} steps")]
    NoConvergence { distance: Length, steps: usize },

    #[error("stop phase for {stop_line}: {reason}")]
    StopPhase { stop_line: StopLineId, reason: &'static str },
}

pub type ConflictResult<T> = Result<T, ConflictError>;

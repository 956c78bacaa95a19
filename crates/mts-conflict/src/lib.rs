//! `mts-conflict`: how an agent approaches merges, crossings, and splits.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                            |
//! |--------------------|---------------------------------------------------------------------|
//! | [`anticipation`]   | `AnticipationInfo`: closed-form and integrated time-to-distance    |
//! | [`car_following`]  | `CarFollowingModel` trait, `Idm`, `follow_single_leader`, `stop`    |
//! | [`conflict`]       | read-only snapshot types: `Conflict`, `ConflictingAgent`, `Leader`  |
//! | [`yield_plans`]    | `ConflictPlans`: per-agent yield and stop-phase memory             |
//! | [`engine`]         | `ConflictApproachEngine<M>`: the per-cycle decision                |
//! | [`error`]          | `ConflictError`, `ConflictResult<T>`                                |
//!
//! # Design notes
//!
//! The engine is shared and immutable; everything that varies per agent is
//! passed in.  Each call reads a snapshot captured before the decision phase
//! and writes only the agent's own [`ConflictPlans`], so many agents can be
//! evaluated in parallel as long as every agent owns its plans exclusively.
//!
//! Priority rules are a closed enum matched exhaustively.  Unknown rule names
//! are rejected when parsed (`"yield".parse::<ConflictRule>()` works,
//! `"roundabout"` is an error) instead of falling back to a guess.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | `FxHashMap` instead of `HashMap` inside `ConflictPlans`    |
//! | `serde`   | `Serialize`/`Deserialize` on snapshot and decision types   |

pub mod anticipation;
pub mod car_following;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod yield_plans;


pub use anticipation::{
    AnticipationInfo, anticipate_movement, anticipate_movement_free_acceleration,
    anticipate_movement_speed_limited,
};
pub use car_following::{CarFollowingModel, Idm};
pub use conflict::{Conflict, ConflictOverlap, ConflictRule, ConflictType, ConflictingAgent, Leader};
pub use engine::{ApproachDecision, ConflictApproachEngine, EgoState, TrafficLightColor};
pub use error::{ConflictError, ConflictResult};
pub use yield_plans::{ConflictPlans, StopPhase};

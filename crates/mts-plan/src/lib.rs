//! `mts-plan`: kinematic trajectories for individual agents.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`segment`]   | `Segment`: constant acceleration over a bounded duration        |
//! | [`segments`]  | `Segments`: continuity-preserving chain of segments             |
//! | [`plan`]      | `OperationalPlan`: segments bound to a path, queryable by time  |
//! | [`builder`]   | `constant_speed`, `gradual_acceleration`, `maximum_acceleration`, `stop`, `stand_still` |
//! | [`error`]     | `PlanError`, `PlanResult<T>`                                     |
//!
//! # Plan lifecycle
//!
//! Plans are immutable values.  Each decision cycle an agent builds a fresh
//! plan with one of the [`builder`] functions, queries it every tick
//! (`location_at`, `speed_at`, `time_at_distance`, ...) and drops it when
//! the next plan supersedes it.
//!
//! ```rust,ignore
//! let path = Polyline::from_xy(&[(0.0, 0.0), (200.0, 0.0)])?;
//! let plan = builder::stop(path, Time::ZERO, Speed(20.0), Acceleration(-2.0))?;
//! assert_eq!(plan.total_length(), Length(100.0)); // stops half way
//! ```
//!
//! # Failure classes
//!
//! Queries outside a plan's window are [`PlanError::Validity`] and let the
//! caller replan.  Builders that cannot produce a consistent plan return
//! [`PlanError::Defect`], which callers treat as fatal.

pub mod builder;
pub mod error;
pub mod plan;
pub mod segment;
pub mod segments;

#[cfg(test)]
mod tests;

pub use error::{PlanError, PlanResult};
pub use plan::OperationalPlan;
pub use segment::Segment;
pub use segments::Segments;

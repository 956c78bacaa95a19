//! `mts-core`: foundational types for the `rust_mts` microscopic traffic
//! simulator.
//!
//! This crate is a dependency of every other `mts-*` crate.  It intentionally
//! has no `mts-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`units`]    | `Length`, `Duration`, `Speed`, `Acceleration`, `Time`      |
//! | [`ids`]      | `AgentId`, `ConflictId`, `StopLineId`                      |
//! | [`geometry`] | `Point2`, `DirectedPoint`, `Polyline`                      |
//! | [`math`]     | `solve_quadratic`                                          |
//! | [`params`]   | `ParameterType`, `ParameterLookup`, `Parameters`           |
//! | [`rng`]      | `AgentRng` (per-agent, explicitly seeded)                  |
//! | [`error`]    | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geometry;
pub mod ids;
pub mod math;
pub mod params;
pub mod rng;
pub mod units;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geometry::{DirectedPoint, Point2, Polyline};
pub use ids::{AgentId, ConflictId, StopLineId};
pub use params::{ParameterLookup, ParameterOverride, ParameterType, Parameters};
pub use rng::AgentRng;
pub use units::{Acceleration, Duration, Length, Speed, Time};

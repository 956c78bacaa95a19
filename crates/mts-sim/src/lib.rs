//! `mts-sim`: decision-cycle driver for the rust_mts traffic simulator.
//!
//! # Decision cycle
//!
//! ```text
//! for every cycle:
//!   1. Perceive   the caller captures one read-only Perception per agent
//!                 (conflicts, leaders, traffic light).
//!   2. Decide     every agent runs ConflictApproachEngine::approach_conflicts
//!                 against its own perception, mutating only its own
//!                 ConflictPlans (parallel with the `parallel` feature).
//!   3. Plan       the bounded acceleration becomes a one-step
//!                 OperationalPlan along the agent's path.
//!   4. Report     outcomes in ascending AgentId order to the observer.
//! ```
//!
//! Motion integration is left to the caller, which reads each plan and
//! writes `AgentStore::states` before the next cycle.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the decision phase on Rayon's thread pool.        |
//! | `fx-hash`  | FxHash maps in the per-agent yield memory.             |
//! | `serde`    | Serialize/Deserialize on `CycleConfig` and value types |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mts_sim::{CycleBuilder, CycleConfig, NoopObserver, Perception};
//!
//! let mut cycle = CycleBuilder::new(CycleConfig::default(), states).build()?;
//! let perceptions = vec![Perception::default(); cycle.agents.count];
//! let outcomes = cycle.step(&perceptions, &mut NoopObserver)?;
//! ```

pub mod agent;
pub mod builder;
pub mod config;
pub mod cycle;
pub mod error;
pub mod observer;
pub mod population;


pub use agent::{AgentState, AgentStore, Perception};
pub use builder::CycleBuilder;
pub use config::CycleConfig;
pub use cycle::{AgentOutcome, ApproachCycle};
pub use error::{SimError, SimResult};
pub use observer::{CycleObserver, CycleSummary, NoopObserver};
pub use population::{DriverPopulation, Variation};

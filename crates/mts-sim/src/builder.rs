//! Fluent builder for constructing an [`ApproachCycle`].

use mts_conflict::{CarFollowingModel, ConflictApproachEngine, Idm};
use mts_core::Parameters;

use crate::{AgentState, AgentStore, ApproachCycle, CycleConfig, DriverPopulation, SimError, SimResult};

/// Fluent builder for [`ApproachCycle<M>`].
///
/// # Required inputs
///
/// - [`CycleConfig`]: start time, time step, seed, thread count
/// - `Vec<AgentState>`: one initial state per agent; the index is the
///   agent's `AgentId`
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                         |
/// |-------------------|-------------------------------------------------|
/// | `.parameters(v)`  | sampled from the population                     |
/// | `.population(p)`  | `DriverPopulation::default()` (no variation)    |
/// | `.engine(e)`      | `ConflictApproachEngine::<Idm>::default()`      |
///
/// # Example
///
/// ```rust,ignore
/// let population = DriverPopulation::default()
///     .vary(ParameterType::DesiredHeadway, 0.2, 0.8, 2.0)?;
/// let mut cycle = CycleBuilder::new(config, states)
///     .population(population)
///     .build()?;
/// let outcomes = cycle.step(&perceptions, &mut NoopObserver)?;
/// ```
pub struct CycleBuilder<M: CarFollowingModel = Idm> {
    config:     CycleConfig,
    states:     Vec<AgentState>,
    parameters: Option<Vec<Parameters>>,
    population: Option<DriverPopulation>,
    engine:     ConflictApproachEngine<M>,
}

impl CycleBuilder<Idm> {
    /// Create a builder with all required inputs.
    pub fn new(config: CycleConfig, states: Vec<AgentState>) -> Self {
        Self {
            config,
            states,
            parameters: None,
            population: None,
            engine:     ConflictApproachEngine::default(),
        }
    }
}

impl<M: CarFollowingModel> CycleBuilder<M> {
    /// Supply explicit per-agent parameters (must be length `agent_count`).
    /// Takes precedence over [`population`](Self::population).
    pub fn parameters(mut self, parameters: Vec<Parameters>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sample per-agent parameters from `population` using the config seed.
    pub fn population(mut self, population: DriverPopulation) -> Self {
        self.population = Some(population);
        self
    }

    /// Use a different decision engine, e.g. with another car-following
    /// model.
    pub fn engine<N: CarFollowingModel>(self, engine: ConflictApproachEngine<N>) -> CycleBuilder<N> {
        CycleBuilder {
            config:     self.config,
            states:     self.states,
            parameters: self.parameters,
            population: self.population,
            engine,
        }
    }

    /// Validate inputs, resolve parameters, and return a ready-to-run
    /// [`ApproachCycle`].
    pub fn build(self) -> SimResult<ApproachCycle<M>> {
        self.config.validate()?;
        let agent_count = self.states.len();

        // ── Resolve per-agent parameters ──────────────────────────────────
        let params = match self.parameters {
            Some(p) => {
                if p.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      p.len(),
                        what:     "driver parameters",
                    });
                }
                for params in &p {
                    params.validate()?;
                }
                p
            }
            None => self
                .population
                .unwrap_or_default()
                .sample_all(agent_count, self.config.seed)?,
        };

        let agents = AgentStore::new(self.states, params)?;
        tracing::debug!(agents = agent_count, seed = self.config.seed, "decision cycle built");

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(ApproachCycle {
            config: self.config,
            agents,
            engine: self.engine,
            cycle:  0,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

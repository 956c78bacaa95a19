//! Driver-parameter variation across a population.
//!
//! Each agent's parameters are drawn from its own [`AgentRng`], seeded from
//! the run seed and the agent's ID, so a population is reproducible no
//! matter how agents are later distributed over threads.

use mts_core::{AgentId, AgentRng, ParameterLookup, ParameterType, Parameters};

use crate::{SimError, SimResult};

/// A normally distributed deviation of one parameter around its base value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Variation {
    pub parameter: ParameterType,
    pub std_dev:   f64,
    /// Samples are clamped to `[min, max]`.
    pub min:       f64,
    pub max:       f64,
}

/// Base parameters plus per-parameter variation.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverPopulation {
    base:       Parameters,
    variations: Vec<Variation>,
}

impl Default for DriverPopulation {
    /// Every driver identical, at the default parameter values.
    fn default() -> Self {
        Self::new(Parameters::with_defaults())
    }
}

impl DriverPopulation {
    pub fn new(base: Parameters) -> Self {
        Self { base, variations: Vec::new() }
    }

    /// Vary `parameter` with `std_dev` around its base value, clamped to
    /// `[min, max]`.  A later call for the same parameter replaces the
    /// earlier one.
    pub fn vary(mut self, parameter: ParameterType, std_dev: f64, min: f64, max: f64) -> SimResult<Self> {
        if !(std_dev >= 0.0 && std_dev.is_finite()) || !(min <= max) {
            return Err(SimError::Config(format!(
                "invalid variation of {parameter}: std_dev {std_dev}, range [{min}, {max}]"
            )));
        }
        self.variations.retain(|v| v.parameter != parameter);
        self.variations.push(Variation { parameter, std_dev, min, max });
        Ok(self)
    }

    #[inline]
    pub fn base(&self) -> &Parameters {
        &self.base
    }

    #[inline]
    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    /// Draw one driver's parameters from `rng`.
    ///
    /// # Errors
    ///
    /// `SimError::Parameter` if a varied parameter has no base value or a
    /// sample violates the parameter's constraint.
    pub fn sample(&self, rng: &mut AgentRng) -> SimResult<Parameters> {
        let mut params = self.base.clone();
        for v in &self.variations {
            let mean = self.base.parameter(v.parameter)?;
            params.set(v.parameter, rng.truncated_normal(mean, v.std_dev, v.min, v.max))?;
        }
        Ok(params)
    }

    /// Parameters for `count` agents, agent `i` sampled from
    /// `AgentRng::new(seed, AgentId(i))`.
    pub fn sample_all(&self, count: usize, seed: u64) -> SimResult<Vec<Parameters>> {
        (0..count)
            .map(|i| self.sample(&mut AgentRng::new(seed, AgentId(i as u32))))
            .collect()
    }
}

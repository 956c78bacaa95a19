//! Behavioural parameters and the lookup abstraction used to read them.
//!
//! Decision code never holds parameter values directly; it asks a
//! [`ParameterLookup`] each cycle.  Lookups may fail with
//! [`CoreError::ParameterUndefined`], which callers propagate with `?`.
//!
//! [`ParameterOverride`] layers one substituted value over another lookup
//! without mutating it, e.g. to stop in front of a conflict with the conflict
//! stopping distance in place of the regular car-following stopping distance.

use std::collections::HashMap;
use std::fmt;

use crate::{Acceleration, CoreError, CoreResult, Duration, Length, Speed};

/// Every parameter the kinematic and conflict models read.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParameterType {
    /// Maximum (desired) acceleration `a` [m/s²].
    MaxAcceleration,
    /// Comfortable deceleration `b` [m/s²], positive.
    ComfortDeceleration,
    /// Critical deceleration `bCrit` [m/s²], positive.
    CriticalDeceleration,
    /// Deceleration accepted to stop for a yellow light [m/s²], positive.
    YellowDeceleration,
    /// Stopping distance to a standing leader `s0` [m].
    StopDistance,
    /// Stopping distance in front of a conflict `s0conf` [m].
    ConflictStopDistance,
    /// Desired time headway `T` [s].
    DesiredHeadway,
    /// Safety multiplier on estimated conflict times, `>= 1`.
    TimeFactor,
    /// Additive minimum gap on estimated conflict times [s].
    MinGap,
    /// Area before a stop line in which an agent counts as arrived [m].
    StopArea,
    /// Speed-limit adherence factor (desired speed = factor · limit).
    SpeedLimitAdherence,
    /// Free-road exponent of the intelligent driver model.
    IdmDelta,
}

impl ParameterType {
    /// All parameter types, in declaration order.
    pub const ALL: [ParameterType; 12] = [
        ParameterType::MaxAcceleration,
        ParameterType::ComfortDeceleration,
        ParameterType::CriticalDeceleration,
        ParameterType::YellowDeceleration,
        ParameterType::StopDistance,
        ParameterType::ConflictStopDistance,
        ParameterType::DesiredHeadway,
        ParameterType::TimeFactor,
        ParameterType::MinGap,
        ParameterType::StopArea,
        ParameterType::SpeedLimitAdherence,
        ParameterType::IdmDelta,
    ];

    /// Short identifier used in logs and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterType::MaxAcceleration      => "a",
            ParameterType::ComfortDeceleration  => "b",
            ParameterType::CriticalDeceleration => "bCrit",
            ParameterType::YellowDeceleration   => "bYellow",
            ParameterType::StopDistance         => "s0",
            ParameterType::ConflictStopDistance => "s0conf",
            ParameterType::DesiredHeadway       => "T",
            ParameterType::TimeFactor           => "timeFactor",
            ParameterType::MinGap               => "minGap",
            ParameterType::StopArea             => "stopArea",
            ParameterType::SpeedLimitAdherence  => "fSpeed",
            ParameterType::IdmDelta             => "delta",
        }
    }

    /// Default value in SI units.
    pub fn default_value(self) -> f64 {
        match self {
            ParameterType::MaxAcceleration      => 1.25,
            ParameterType::ComfortDeceleration  => 2.09,
            ParameterType::CriticalDeceleration => 3.5,
            ParameterType::YellowDeceleration   => 3.5,
            ParameterType::StopDistance         => 3.0,
            ParameterType::ConflictStopDistance => 1.5,
            ParameterType::DesiredHeadway       => 1.2,
            ParameterType::TimeFactor           => 1.25,
            ParameterType::MinGap               => 1e-6,
            ParameterType::StopArea             => 4.0,
            ParameterType::SpeedLimitAdherence  => 1.0,
            ParameterType::IdmDelta             => 4.0,
        }
    }

    /// Check `value` against this parameter's constraint.
    pub fn validate(self, value: f64) -> CoreResult<()> {
        let (ok, constraint) = match self {
            ParameterType::TimeFactor => (value >= 1.0, "at least one"),
            _ => (value > 0.0, "positive"),
        };
        if ok && value.is_finite() {
            Ok(())
        } else {
            Err(CoreError::ParameterOutOfBounds { parameter: self, value, constraint })
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ParameterLookup ───────────────────────────────────────────────────────────

/// Read access to behavioural parameters.
///
/// Only [`parameter`][Self::parameter] is required; the typed helpers wrap
/// the raw SI value in its unit.
pub trait ParameterLookup: Send + Sync {
    /// Raw SI value of `ty`, or `CoreError::ParameterUndefined`.
    fn parameter(&self, ty: ParameterType) -> CoreResult<f64>;

    fn length(&self, ty: ParameterType) -> CoreResult<Length> {
        self.parameter(ty).map(Length)
    }

    fn duration(&self, ty: ParameterType) -> CoreResult<Duration> {
        self.parameter(ty).map(Duration)
    }

    fn speed(&self, ty: ParameterType) -> CoreResult<Speed> {
        self.parameter(ty).map(Speed)
    }

    fn acceleration(&self, ty: ParameterType) -> CoreResult<Acceleration> {
        self.parameter(ty).map(Acceleration)
    }

    fn factor(&self, ty: ParameterType) -> CoreResult<f64> {
        self.parameter(ty)
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// A validated map of parameter values.
///
/// `Parameters::new()` is empty (every lookup fails);
/// [`Parameters::with_defaults`] fills in every [`ParameterType`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    values: HashMap<ParameterType, f64>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every parameter at its default value.
    pub fn with_defaults() -> Self {
        let values = ParameterType::ALL
            .iter()
            .map(|&ty| (ty, ty.default_value()))
            .collect();
        Self { values }
    }

    /// Set `ty` to `value` after checking its constraint.
    pub fn set(&mut self, ty: ParameterType, value: f64) -> CoreResult<()> {
        ty.validate(value)?;
        self.values.insert(ty, value);
        Ok(())
    }

    /// Builder-style [`set`][Self::set].
    pub fn with(mut self, ty: ParameterType, value: f64) -> CoreResult<Self> {
        self.set(ty, value)?;
        Ok(self)
    }

    /// Remove `ty`; later lookups fail with `ParameterUndefined`.
    pub fn remove(&mut self, ty: ParameterType) -> Option<f64> {
        self.values.remove(&ty)
    }

    #[inline]
    pub fn contains(&self, ty: ParameterType) -> bool {
        self.values.contains_key(&ty)
    }

    /// Validate every stored value, e.g. after deserialising a config file.
    pub fn validate(&self) -> CoreResult<()> {
        self.values.iter().try_for_each(|(&ty, &v)| ty.validate(v))
    }
}

impl ParameterLookup for Parameters {
    fn parameter(&self, ty: ParameterType) -> CoreResult<f64> {
        self.values
            .get(&ty)
            .copied()
            .ok_or(CoreError::ParameterUndefined(ty))
    }
}

// ── ParameterOverride ─────────────────────────────────────────────────────────

/// A lookup that answers one parameter from `value` and defers everything
/// else to `base`.
pub struct ParameterOverride<'a> {
    base:  &'a dyn ParameterLookup,
    ty:    ParameterType,
    value: f64,
}

impl<'a> ParameterOverride<'a> {
    pub fn new(base: &'a dyn ParameterLookup, ty: ParameterType, value: f64) -> Self {
        Self { base, ty, value }
    }
}

impl ParameterLookup for ParameterOverride<'_> {
    fn parameter(&self, ty: ParameterType) -> CoreResult<f64> {
        if ty == self.ty {
            Ok(self.value)
        } else {
            self.base.parameter(ty)
        }
    }
}

//! Projections of "how long until this distance is covered".

use mts_core::{Acceleration, Duration, Length, ParameterLookup, Speed};

use crate::car_following::CarFollowingModel;
use crate::{ConflictError, ConflictResult};

/// Iteration cap for [`anticipate_movement_free_acceleration`].
pub const MAX_INTEGRATION_STEPS: usize = 100_000;

/// Below this (m/s) the closing step of the integration is treated as
/// constant speed.
const CONSTANT_SPEED_EPS: f64 = 1e-6;

/// Outcome of a distance-to-time projection.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnticipationInfo {
    /// Time to cover the distance; [`Duration::INFINITE`] if never.
    pub duration:  Duration,
    /// Speed on arrival.
    pub end_speed: Speed,
}

impl AnticipationInfo {
    #[inline]
    pub const fn new(duration: Duration, end_speed: Speed) -> Self {
        Self { duration, end_speed }
    }

    /// Distance is never covered.
    pub const NEVER: AnticipationInfo = AnticipationInfo::new(Duration::INFINITE, Speed::ZERO);

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.duration.is_finite()
    }
}

/// Time to cover `distance` from `v0` under constant `acceleration`.
///
/// Negative distances are already covered.  If deceleration stops the
/// movement first the result is [`AnticipationInfo::NEVER`].
pub fn anticipate_movement(distance: Length, v0: Speed, acceleration: Acceleration) -> AnticipationInfo {
    anticipate_movement_speed_limited(distance, v0, acceleration, Speed(f64::INFINITY))
}

/// As [`anticipate_movement`], but speed is capped at `max_speed`: once the
/// cap is reached the rest of the distance is covered at constant speed.
/// Starting at or above the cap without braking cruises at the cap.
pub fn anticipate_movement_speed_limited(
    distance:     Length,
    v0:           Speed,
    acceleration: Acceleration,
    max_speed:    Speed,
) -> AnticipationInfo {
    if distance.is_negative() {
        return AnticipationInfo::new(Duration::ZERO, v0);
    }
    if !acceleration.is_negative() && v0 >= max_speed {
        // already at (or over) the cap: cruise at the cap
        if max_speed.is_positive() {
            return AnticipationInfo::new(distance / max_speed, max_speed);
        }
        return AnticipationInfo::NEVER;
    }
    if acceleration.is_zero() {
        if v0.is_positive() {
            return AnticipationInfo::new(distance / v0, v0);
        }
        return AnticipationInfo::NEVER;
    }
    let (x, v, a) = (distance.si(), v0.si(), acceleration.si());
    let discriminant = v * v + 2.0 * a * x;
    if discriminant < 0.0 {
        // stops before covering the distance
        return AnticipationInfo::NEVER;
    }
    let t = Duration((discriminant.sqrt() - v) / a);
    let end_speed = v0 + acceleration * t;
    if end_speed <= max_speed || acceleration.is_negative() {
        return AnticipationInfo::new(t, end_speed);
    }
    // accelerate to the cap, then cruise
    let t1 = (max_speed - v0) / acceleration;
    let x1 = v0 * t1 + acceleration * t1 * t1 * 0.5;
    AnticipationInfo::new(t1 + (distance - x1) / max_speed, max_speed)
}

/// Time to cover `distance` from `v0` driving freely under `model`,
/// integrated with a fixed `time_step`.
///
/// # Errors
///
/// - `ConflictError::Parameter` if `model` cannot read its parameters.
/// - `ConflictError::NoConvergence` if the distance is not covered within
///   [`MAX_INTEGRATION_STEPS`], e.g. a model whose free acceleration is zero
///   at stand-still.
pub fn anticipate_movement_free_acceleration(
    distance:    Length,
    v0:          Speed,
    params:      &dyn ParameterLookup,
    model:       &dyn CarFollowingModel,
    speed_limit: Speed,
    time_step:   Duration,
) -> ConflictResult<AnticipationInfo> {
    if distance.is_negative() {
        return Ok(AnticipationInfo::new(Duration::ZERO, v0));
    }
    let dt = time_step;
    let mut covered = Length::ZERO;
    let mut speed = v0;
    let mut elapsed = Duration::ZERO;
    for _ in 0..MAX_INTEGRATION_STEPS {
        let a = model.free_acceleration(params, speed, speed_limit)?;
        let next = speed + a * dt;
        // speed never drops below zero; a step braking through zero ends at rest
        let step = if next.is_negative() {
            Length(0.5 * speed.si() * speed.si() / -a.si())
        } else {
            speed * dt + a * dt * dt * 0.5
        };
        let remaining = distance - covered;
        if step < remaining {
            covered += step;
            speed = next.max(Speed::ZERO);
            elapsed += dt;
            continue;
        }
        // closing step inside this time step
        let root = (2.0 * a.si() * remaining.si() + speed.si() * speed.si()).max(0.0).sqrt() - speed.si();
        if root.abs() < CONSTANT_SPEED_EPS || a.is_zero() {
            let in_step = if speed.is_positive() { remaining / speed } else { Duration::ZERO };
            return Ok(AnticipationInfo::new(elapsed + in_step, speed));
        }
        let in_step = Duration(root / a.si());
        return Ok(AnticipationInfo::new(elapsed + in_step, speed + a * in_step));
    }
    Err(ConflictError::NoConvergence { distance, steps: MAX_INTEGRATION_STEPS })
}

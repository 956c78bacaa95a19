//! Longitudinal car-following models.

use mts_core::{Acceleration, CoreResult, Length, ParameterLookup, ParameterType, Speed};

/// Headways below this (m) are clamped so the interaction term stays finite.
const MIN_HEADWAY_SI: f64 = 1e-3;

/// A longitudinal acceleration model.
///
/// Implementations must be `Send + Sync`: the cycle driver may evaluate many
/// agents in parallel against one shared model, with per-agent behaviour
/// coming only from the `params` each call receives.
pub trait CarFollowingModel: Send + Sync {
    /// Acceleration behind `leaders`, each given as `(headway, speed)` with
    /// the headway measured from the ego's front to the leader's rear.
    /// An empty slice yields free-road acceleration.
    fn following_acceleration(
        &self,
        params:      &dyn ParameterLookup,
        speed:       Speed,
        speed_limit: Speed,
        leaders:     &[(Length, Speed)],
    ) -> CoreResult<Acceleration>;

    /// Acceleration on an empty road.
    fn free_acceleration(
        &self,
        params:      &dyn ParameterLookup,
        speed:       Speed,
        speed_limit: Speed,
    ) -> CoreResult<Acceleration> {
        self.following_acceleration(params, speed, speed_limit, &[])
    }
}

/// The intelligent driver model.
///
/// ```text
/// a = a_max · (1 − (v/v0)^δ − (s*/s)²)
/// s* = s0 + v·T + v·Δv / (2·√(a_max·b))
/// ```
///
/// with `v0 = fSpeed · speed_limit`.  With several leaders the most
/// restrictive acceleration wins.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Idm;

impl Idm {
    fn desired_gap(params: &dyn ParameterLookup, speed: Speed, leader_speed: Speed) -> CoreResult<f64> {
        let a = params.acceleration(ParameterType::MaxAcceleration)?.si();
        let b = params.acceleration(ParameterType::ComfortDeceleration)?.si();
        let s0 = params.length(ParameterType::StopDistance)?.si();
        let t = params.duration(ParameterType::DesiredHeadway)?.si();
        let v = speed.si();
        let dv = v - leader_speed.si();
        Ok(s0 + (v * t + v * dv / (2.0 * (a * b).sqrt())).max(0.0))
    }
}

impl CarFollowingModel for Idm {
    fn following_acceleration(
        &self,
        params:      &dyn ParameterLookup,
        speed:       Speed,
        speed_limit: Speed,
        leaders:     &[(Length, Speed)],
    ) -> CoreResult<Acceleration> {
        let a = params.acceleration(ParameterType::MaxAcceleration)?.si();
        let delta = params.factor(ParameterType::IdmDelta)?;
        let v0 = speed_limit.si() * params.factor(ParameterType::SpeedLimitAdherence)?;
        let free = if v0 > 0.0 { 1.0 - (speed.si() / v0).powf(delta) } else { -1.0 };

        let mut acc = a * free;
        for &(headway, leader_speed) in leaders {
            let s = headway.si().max(MIN_HEADWAY_SI);
            let s_star = Self::desired_gap(params, speed, leader_speed)?;
            acc = acc.min(a * (free - (s_star / s).powi(2)));
        }
        Ok(Acceleration(acc))
    }
}

/// Acceleration behind a single leader.
pub fn follow_single_leader(
    model:        &dyn CarFollowingModel,
    params:       &dyn ParameterLookup,
    speed:        Speed,
    speed_limit:  Speed,
    distance:     Length,
    leader_speed: Speed,
) -> CoreResult<Acceleration> {
    model.following_acceleration(params, speed, speed_limit, &[(distance, leader_speed)])
}

/// Acceleration to stop at `distance`, modelled as following a stationary
/// virtual leader there.
pub fn stop(
    model:       &dyn CarFollowingModel,
    params:      &dyn ParameterLookup,
    speed:       Speed,
    speed_limit: Speed,
    distance:    Length,
) -> CoreResult<Acceleration> {
    follow_single_leader(model, params, speed, speed_limit, distance, Speed::ZERO)
}

//! Factory functions for common plan shapes.
//!
//! Every builder either returns an internally consistent [`OperationalPlan`]
//! or fails with [`PlanError::Defect`]; a degenerate closed-form solve is
//! never papered over.

use mts_core::math::solve_quadratic;
use mts_core::{Acceleration, Duration, Length, Polyline, Speed, Time};

use crate::{OperationalPlan, PlanError, PlanResult, Segments};

/// Drive the whole path at `speed`.
///
/// # Errors
///
/// `PlanError::Defect` if `speed` is not strictly positive and finite.
pub fn constant_speed(path: Polyline, start_time: Time, speed: Speed) -> PlanResult<OperationalPlan> {
    if !(speed.is_positive() && speed.is_finite()) {
        return Err(PlanError::Defect(format!(
            "constant-speed plan needs a positive speed, got {speed}"
        )));
    }
    let duration = path.length() / speed;
    OperationalPlan::new(path, start_time, Segments::off(speed, duration, Acceleration::ZERO))
}

/// Reach `end_speed` exactly at the end of the path with one constant
/// acceleration, if the bounds allow it.
///
/// When the required acceleration exceeds `max_acceleration` (or falls
/// below `max_deceleration`) the bound is used instead and the plan ends at
/// the path end without reaching `end_speed`.
pub fn gradual_acceleration(
    path: Polyline,
    start_time: Time,
    start_speed: Speed,
    end_speed: Speed,
    max_acceleration: Acceleration,
    max_deceleration: Acceleration,
) -> PlanResult<OperationalPlan> {
    check_bounds(max_acceleration, max_deceleration)?;
    if start_speed == end_speed {
        return constant_speed(path, start_time, start_speed);
    }
    let length = path.length();
    let sum = start_speed + end_speed;
    if !sum.is_positive() {
        return Err(PlanError::Defect(format!(
            "cannot cover {length} between {start_speed} and {end_speed}"
        )));
    }
    // t = 2x / (v0 + v1), a = (v1 - v0) / t
    let mut duration = length * 2.0 / sum;
    let mut acceleration = (end_speed - start_speed) / duration;
    if acceleration > max_acceleration || acceleration < max_deceleration {
        acceleration = acceleration.min(max_acceleration).max(max_deceleration);
        duration = first_positive_root(length, start_speed, acceleration)?;
    }
    OperationalPlan::new(path, start_time, Segments::off(start_speed, duration, acceleration))
}

/// Apply `max_acceleration` (or `max_deceleration`) until `end_speed` is
/// reached, then cruise the rest of the path at `end_speed`.
///
/// If `end_speed` is not reachable within the path the bound applies over the
/// whole path.  A stop that completes before the path end yields a plan that
/// ends at the stopping point.
pub fn maximum_acceleration(
    path: Polyline,
    start_time: Time,
    start_speed: Speed,
    end_speed: Speed,
    max_acceleration: Acceleration,
    max_deceleration: Acceleration,
) -> PlanResult<OperationalPlan> {
    check_bounds(max_acceleration, max_deceleration)?;
    if start_speed == end_speed {
        return constant_speed(path, start_time, start_speed);
    }
    let length = path.length();
    let a = if end_speed > start_speed { max_acceleration } else { max_deceleration };
    let t = (end_speed - start_speed) / a;
    let x = start_speed * t + a * t * t * 0.5;

    let segments = if x >= length {
        // end speed not reachable on this path
        Segments::off(start_speed, first_positive_root(length, start_speed, a)?, a)
    } else if end_speed.is_zero() {
        // OperationalPlan::new truncates the path to the stopping point
        Segments::off(start_speed, t, a)
    } else {
        Segments::off(start_speed, t, a).add((length - x) / end_speed, Acceleration::ZERO)
    };
    OperationalPlan::new(path, start_time, segments)
}

/// Brake at `deceleration` (either sign) to a stop, or over the whole path if
/// it is too short.
pub fn stop(
    path: Polyline,
    start_time: Time,
    start_speed: Speed,
    deceleration: Acceleration,
) -> PlanResult<OperationalPlan> {
    let b = deceleration.abs();
    maximum_acceleration(path, start_time, start_speed, Speed::ZERO, b, -b)
}

/// Wait at the start of `path` for `duration`, keeping its heading.
pub fn stand_still(path: Polyline, start_time: Time, duration: Duration) -> PlanResult<OperationalPlan> {
    if duration.is_negative() || !duration.is_finite() {
        return Err(PlanError::Defect(format!("invalid stand-still duration {duration}")));
    }
    OperationalPlan::new(path, start_time, Segments::stand_still(duration))
}

fn check_bounds(max_acceleration: Acceleration, max_deceleration: Acceleration) -> PlanResult<()> {
    if !max_acceleration.is_positive() || !max_deceleration.is_negative() {
        return Err(PlanError::Defect(format!(
            "acceleration bounds must be positive/negative, got {max_acceleration} / {max_deceleration}"
        )));
    }
    Ok(())
}

/// Earliest positive `t` with `½·a·t² + v0·t = length`.
fn first_positive_root(length: Length, v0: Speed, a: Acceleration) -> PlanResult<Duration> {
    solve_quadratic(0.5 * a.si(), v0.si(), -length.si())
        .into_iter()
        .find(|&t| t > 0.0)
        .map(Duration)
        .ok_or_else(|| {
            PlanError::Defect(format!("{length} is not reachable from {v0} at {a}"))
        })
}

//! A single constant-acceleration motion primitive.

use mts_core::math::solve_quadratic;
use mts_core::{Acceleration, Duration, Length, Speed};

use crate::{PlanError, PlanResult};

/// Constant acceleration over a bounded duration.
///
/// A stand-still segment has zero speed, distance, and acceleration at every
/// instant; it only occupies time.  Queries on a moving segment are defined
/// for elapsed time in `[0, duration]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    start_speed:  Speed,
    duration:     Duration,
    acceleration: Acceleration,
    stand_still:  bool,
}

impl Segment {
    /// A moving segment.  Callers normally go through [`Segments`][crate::Segments],
    /// which guarantees the speed never turns negative.
    pub(crate) fn moving(start_speed: Speed, duration: Duration, acceleration: Acceleration) -> Self {
        Self { start_speed, duration, acceleration, stand_still: false }
    }

    /// A segment at rest for `duration`.
    pub(crate) fn stand_still(duration: Duration) -> Self {
        Self {
            start_speed:  Speed::ZERO,
            duration,
            acceleration: Acceleration::ZERO,
            stand_still:  true,
        }
    }

    #[inline]
    pub fn start_speed(&self) -> Speed {
        self.start_speed
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn acceleration(&self) -> Acceleration {
        self.acceleration
    }

    #[inline]
    pub fn is_stand_still(&self) -> bool {
        self.stand_still
    }

    fn check(&self, t: Duration) -> PlanResult<()> {
        if t.si() < 0.0 || t > self.duration {
            return Err(PlanError::Validity(format!(
                "elapsed time {t} outside segment duration {}",
                self.duration
            )));
        }
        Ok(())
    }

    /// Speed after `t` has elapsed in this segment.
    pub fn speed(&self, t: Duration) -> PlanResult<Speed> {
        if self.stand_still {
            return Ok(Speed::ZERO);
        }
        self.check(t)?;
        Ok(self.start_speed + self.acceleration * t)
    }

    /// Distance covered after `t` has elapsed in this segment.
    pub fn distance(&self, t: Duration) -> PlanResult<Length> {
        if self.stand_still {
            return Ok(Length::ZERO);
        }
        self.check(t)?;
        Ok(self.start_speed * t + self.acceleration * t * t * 0.5)
    }

    /// Speed at the end of the segment.
    pub fn end_speed(&self) -> Speed {
        if self.stand_still {
            return Speed::ZERO;
        }
        self.start_speed + self.acceleration * self.duration
    }

    /// Distance covered over the whole segment.
    pub fn total_distance(&self) -> Length {
        if self.stand_still {
            return Length::ZERO;
        }
        let t = self.duration;
        self.start_speed * t + self.acceleration * t * t * 0.5
    }

    /// Elapsed time at which `distance` is reached, solving
    /// `½·a·t² + v0·t − d = 0` for the earliest root in `[0, duration]`.
    ///
    /// If no root falls in range (rounding at the segment boundary, or a
    /// distance the segment never covers) the full segment duration is
    /// returned.  Stand-still segments return zero.
    pub fn duration_at_distance(&self, distance: Length) -> Duration {
        if self.stand_still {
            return Duration::ZERO;
        }
        let roots = solve_quadratic(
            0.5 * self.acceleration.si(),
            self.start_speed.si(),
            -distance.si(),
        );
        match roots
            .into_iter()
            .find(|&t| t >= 0.0 && t <= self.duration.si())
        {
            Some(t) => Duration(t),
            None => {
                tracing::trace!(
                    %distance,
                    duration = %self.duration,
                    "no root within segment; using full segment duration"
                );
                self.duration
            }
        }
    }
}

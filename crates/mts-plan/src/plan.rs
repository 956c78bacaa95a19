//! `OperationalPlan`: a segment sequence bound to a path.

use mts_core::geometry::intersection_of_lines;
use mts_core::{Acceleration, DirectedPoint, Duration, Length, Polyline, Speed, Time};

use crate::{PlanError, PlanResult, Segment, Segments};
use crate::segments::DRIFTING_SPEED_SI;

/// Distance (m) below which a plan that also starts without speed or
/// acceleration collapses to stand-still.
const DRIFTING_LENGTH_SI: f64 = 1e-3;

/// Acceleration (m/s²) below which the first segment counts as drifting.
const DRIFTING_ACCELERATION_SI: f64 = 1e-3;

/// Slack for time and distance queries at the plan boundaries.
const QUERY_TOLERANCE: f64 = 1e-6;

/// Fraction slack when mapping traveled distance onto the path.
const FRACTION_TOLERANCE: f64 = 0.01;

/// Section-membership slack when projecting points onto the path.
const ON_SECTION_TOLERANCE: f64 = 2e-5;

/// Length of the orientation stub kept by stand-still plans.
const STUB_LENGTH: Length = Length(1.0);

/// A queryable trajectory: where the agent is, how fast it goes, and when it
/// reaches a distance or point, for any instant in `[start_time, end_time]`.
///
/// Motion never reverses within a plan, so distance → time queries have a
/// unique answer.  `total_length` is the smaller of the path length and the
/// distance the segments cover; when the segments run past the end of the
/// path the plan ends where the path ends.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperationalPlan {
    path:            Polyline,
    start_time:      Time,
    segments:        Segments,
    /// Offset of each segment's start from `start_time`.
    start_times:     Vec<Duration>,
    /// Distance covered before each segment starts.
    start_distances: Vec<Length>,
    total_duration:  Duration,
    total_length:    Length,
}

impl OperationalPlan {
    /// Bind `segments` to `path`, starting at `start_time`.
    ///
    /// # Errors
    ///
    /// `PlanError::Geometry` if the path cannot be truncated or replaced by
    /// an orientation stub.
    pub fn new(path: Polyline, start_time: Time, segments: Segments) -> PlanResult<Self> {
        let (start_times, start_distances) = scan(&segments);
        let seg_duration = segments.total_duration();
        let seg_distance = segments.total_distance();
        let first = segments.first();

        if seg_distance.si() <= DRIFTING_LENGTH_SI + QUERY_TOLERANCE
            && first.start_speed().si().abs() < DRIFTING_SPEED_SI
            && first.acceleration().si().abs() < DRIFTING_ACCELERATION_SI
        {
            return Self::collapsed(&path, start_time, seg_duration);
        }

        let path_length = path.length();
        if seg_distance.si() > 0.0 && path_length >= seg_distance {
            let path = path.truncate(seg_distance)?;
            return Ok(Self {
                path,
                start_time,
                segments,
                start_times,
                start_distances,
                total_duration: seg_duration,
                total_length: seg_distance,
            });
        }

        if seg_distance > path_length {
            // the plan ends where the path ends
            let i = start_distances
                .partition_point(|&d| d <= path_length)
                .saturating_sub(1);
            let remaining = path_length - start_distances[i];
            let total_duration = start_times[i] + segments.as_slice()[i].duration_at_distance(remaining);
            return Ok(Self {
                path,
                start_time,
                segments,
                start_times,
                start_distances,
                total_duration,
                total_length: path_length,
            });
        }

        // no distance covered, but the path is real
        let path = path.truncate(STUB_LENGTH.min(path_length))?;
        Ok(Self {
            path,
            start_time,
            segments,
            start_times,
            start_distances,
            total_duration: seg_duration,
            total_length: Length::ZERO,
        })
    }

    /// A stand-still plan on a short stub that only preserves the heading of
    /// `path`.
    fn collapsed(path: &Polyline, start_time: Time, duration: Duration) -> PlanResult<Self> {
        let stub = Polyline::straight(path.first(), path.start_heading(), STUB_LENGTH)?;
        let segments = Segments::stand_still(duration);
        let (start_times, start_distances) = scan(&segments);
        Ok(Self {
            path: stub,
            start_time,
            segments,
            start_times,
            start_distances,
            total_duration: duration,
            total_length: Length::ZERO,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn path(&self) -> &Polyline {
        &self.path
    }

    #[inline]
    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    #[inline]
    pub fn start_time(&self) -> Time {
        self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> Time {
        self.start_time + self.total_duration
    }

    #[inline]
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    #[inline]
    pub fn total_length(&self) -> Length {
        self.total_length
    }

    pub fn start_speed(&self) -> Speed {
        self.segments.start_speed()
    }

    /// Speed at `end_time`.
    pub fn end_speed(&self) -> Speed {
        self.speed_at(self.end_time()).unwrap_or_else(|_| self.segments.end_speed())
    }

    /// `true` when the plan covers no distance at all.
    pub fn is_stand_still(&self) -> bool {
        self.total_length.si() == 0.0 && self.segments.iter().all(Segment::is_stand_still)
    }

    /// Pose at `end_time`.
    pub fn end_location(&self) -> DirectedPoint {
        self.path.location_extended(self.total_length)
    }

    // ── Time queries ──────────────────────────────────────────────────────

    /// Elapsed time since `start_time`, checked against the plan window.
    fn elapsed(&self, time: Time) -> PlanResult<Duration> {
        let e = time.since(self.start_time);
        if e.si() < -QUERY_TOLERANCE || e.si() > self.total_duration.si() + QUERY_TOLERANCE {
            return Err(PlanError::Validity(format!(
                "{time} outside plan window [{}, {}]",
                self.start_time,
                self.end_time()
            )));
        }
        Ok(Duration(e.si().clamp(0.0, self.total_duration.si())))
    }

    /// Covering segment index and elapsed time within it.
    fn locate(&self, time: Time) -> PlanResult<(usize, Duration)> {
        let e = self.elapsed(time)?;
        let i = self
            .start_times
            .partition_point(|&s| s <= e)
            .saturating_sub(1)
            .min(self.segments.len() - 1);
        let segment = &self.segments.as_slice()[i];
        let mut dt = (e - self.start_times[i]).si().max(0.0);
        if dt > segment.duration().si() && dt - segment.duration().si() <= QUERY_TOLERANCE {
            dt = segment.duration().si();
        }
        Ok((i, Duration(dt)))
    }

    /// Speed at `time`.
    ///
    /// # Errors
    ///
    /// `PlanError::Validity` outside `[start_time, end_time]`.
    pub fn speed_at(&self, time: Time) -> PlanResult<Speed> {
        let (i, dt) = self.locate(time)?;
        self.segments.as_slice()[i].speed(dt)
    }

    /// Acceleration at `time`.
    pub fn acceleration_at(&self, time: Time) -> PlanResult<Acceleration> {
        let (i, _) = self.locate(time)?;
        Ok(self.segments.as_slice()[i].acceleration())
    }

    /// Distance covered between `start_time` and `time`.
    pub fn traveled_distance_at(&self, time: Time) -> PlanResult<Length> {
        let (i, dt) = self.locate(time)?;
        let d = self.start_distances[i] + self.segments.as_slice()[i].distance(dt)?;
        Ok(Length(d.si().clamp(0.0, self.total_length.si())))
    }

    /// Pose on the path at `time`.
    pub fn location_at(&self, time: Time) -> PlanResult<DirectedPoint> {
        let d = self.traveled_distance_at(time)?;
        let fraction = if self.total_length.si() > 0.0 {
            d / self.path.length()
        } else {
            0.0
        };
        Ok(self.path.location_fraction(fraction, FRACTION_TOLERANCE)?)
    }

    // ── Inverse queries ───────────────────────────────────────────────────

    /// Time at which `distance` along the plan is reached.
    ///
    /// # Errors
    ///
    /// `PlanError::Validity` unless `0 <= distance <= total_length`.
    pub fn time_at_distance(&self, distance: Length) -> PlanResult<Time> {
        let d = distance.si();
        if d < -QUERY_TOLERANCE || d > self.total_length.si() + QUERY_TOLERANCE {
            return Err(PlanError::Validity(format!(
                "distance {distance} outside plan length {}",
                self.total_length
            )));
        }
        let d = Length(d.clamp(0.0, self.total_length.si()));
        let last = self.segments.len() - 1;
        let i = self
            .segments
            .iter()
            .zip(&self.start_distances)
            .position(|(s, &start)| d <= start + s.total_distance())
            .unwrap_or(last);
        let dt = self.segments.as_slice()[i].duration_at_distance(d - self.start_distances[i]);
        Ok(self.start_time + self.start_times[i] + dt)
    }

    /// Time at which the lateral line through `point` is crossed.
    ///
    /// The point is projected perpendicular to its own heading onto the
    /// path.  With `upstream` set the first section is extended backwards and
    /// points before the path start map to distance zero.
    ///
    /// # Errors
    ///
    /// - `PlanError::Validity` if the point does not project onto the path
    ///   or lies beyond its end.
    /// - `PlanError::Internal` if a path section cannot be read back.
    pub fn time_at_point(&self, point: DirectedPoint, upstream: bool) -> PlanResult<Time> {
        let p1 = point.point();
        let p2 = point.lateral_point();
        let section = |i: usize| {
            self.path.segment(i).ok_or_else(|| {
                PlanError::Internal(format!("path section {i} out of bounds during projection"))
            })
        };

        if upstream {
            let (a, b) = section(0)?;
            let p = intersection_of_lines(a, b, p1, p2).ok_or_else(|| {
                PlanError::Validity(format!("{point} runs parallel to the path start"))
            })?;
            // signed distance along the first section
            let heading = a.heading_to(b);
            let along = (p.x - a.x) * heading.cos() + (p.y - a.y) * heading.sin();
            return self.time_at_distance(Length(along.max(0.0)));
        }

        let last = self.path.segment_count() - 1;
        let mut traveled = 0.0;
        for i in 0..=last {
            let (a, b) = section(i)?;
            let Some(p) = intersection_of_lines(a, b, p1, p2) else {
                traveled += a.distance(b);
                continue;
            };
            let on_section = a.distance(b) + ON_SECTION_TOLERANCE > a.distance(p).max(b.distance(p));
            if on_section || i == last {
                traveled += a.distance(p);
                if traveled > self.path.length().si() + QUERY_TOLERANCE {
                    return Err(PlanError::Validity(format!(
                        "{point} lies beyond the end of the plan path"
                    )));
                }
                return self.time_at_distance(Length(traveled));
            }
            traveled += a.distance(b);
        }
        Err(PlanError::Validity(format!("{point} does not project onto the plan path")))
    }
}

/// Cumulative start offsets of each segment.
fn scan(segments: &Segments) -> (Vec<Duration>, Vec<Length>) {
    let mut times = Vec::with_capacity(segments.len());
    let mut distances = Vec::with_capacity(segments.len());
    let (mut t, mut d) = (Duration::ZERO, Length::ZERO);
    for s in segments {
        times.push(t);
        distances.push(d);
        t += s.duration();
        d += s.total_distance();
    }
    (times, distances)
}

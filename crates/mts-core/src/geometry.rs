//! Planar geometry: points, directed points, and polylines.
//!
//! Coordinates are 2D Euclidean in metres.  A [`Polyline`] is the path an
//! operational plan moves along; headings are recovered from consecutive
//! vertices.

use std::fmt;

use crate::{CoreError, CoreResult, Length};

/// Vertices closer than this are merged when a polyline is built.
const MIN_VERTEX_SPACING: f64 = 1e-9;

/// Distances within this margin of a polyline's ends are accepted by
/// [`Polyline::extract`] and clamped.
const EXTRACT_TOLERANCE: f64 = 1e-6;

// ── Point2 ────────────────────────────────────────────────────────────────────

/// A point in the plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading (radians, counter-clockwise from +x) of the vector `self → to`.
    #[inline]
    pub fn heading_to(self, to: Point2) -> f64 {
        (to.y - self.y).atan2(to.x - self.x)
    }

    /// Linear interpolation; `t = 0` is `self`, `t = 1` is `to`.
    #[inline]
    pub fn lerp(self, to: Point2, t: f64) -> Point2 {
        Point2::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── DirectedPoint ─────────────────────────────────────────────────────────────

/// A point with a heading, e.g. the pose of an agent on its path.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectedPoint {
    pub x:       f64,
    pub y:       f64,
    /// Radians, counter-clockwise from +x.
    pub heading: f64,
}

impl DirectedPoint {
    #[inline]
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    #[inline]
    pub fn point(self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// A second point one metre to the left of `self`, perpendicular to its
    /// heading.  Together with `self` it spans the lateral line through the
    /// pose.
    #[inline]
    pub fn lateral_point(self) -> Point2 {
        Point2::new(self.x - self.heading.sin(), self.y + self.heading.cos())
    }
}

impl fmt::Display for DirectedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}) @ {:.4} rad", self.x, self.y, self.heading)
    }
}

/// Intersection of the infinite lines `a1-a2` and `b1-b2`, or `None` when
/// they are (nearly) parallel.
pub fn intersection_of_lines(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> Option<Point2> {
    let d = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if d.abs() < 1e-12 {
        return None;
    }
    let u = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / d;
    Some(a1.lerp(a2, u))
}

// ── Polyline ──────────────────────────────────────────────────────────────────

/// An ordered sequence of at least two distinct points with nonzero length.
///
/// Cumulative vertex distances are precomputed so that arc-length lookups are
/// a binary search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    points:     Vec<Point2>,
    /// `cumulative[i]` is the arc length from `points[0]` to `points[i]`.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Build a polyline, merging coincident consecutive vertices.
    ///
    /// # Errors
    ///
    /// `CoreError::InvalidPath` if fewer than two distinct points remain.
    pub fn new(points: Vec<Point2>) -> CoreResult<Self> {
        let mut kept: Vec<Point2> = Vec::with_capacity(points.len());
        for p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(CoreError::InvalidPath(format!("non-finite vertex {p}")));
            }
            match kept.last() {
                Some(&prev) if prev.distance(p) < MIN_VERTEX_SPACING => {}
                _ => kept.push(p),
            }
        }
        if kept.len() < 2 {
            return Err(CoreError::InvalidPath(
                "a path needs at least two distinct points".into(),
            ));
        }
        let mut cumulative = Vec::with_capacity(kept.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in kept.windows(2) {
            total += w[0].distance(w[1]);
            cumulative.push(total);
        }
        Ok(Self { points: kept, cumulative })
    }

    /// Convenience constructor from `(x, y)` pairs.
    pub fn from_xy(coords: &[(f64, f64)]) -> CoreResult<Self> {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// A straight line of `length` starting at `from` along `heading`.
    pub fn straight(from: Point2, heading: f64, length: Length) -> CoreResult<Self> {
        let to = Point2::new(
            from.x + heading.cos() * length.si(),
            from.y + heading.sin() * length.si(),
        );
        Self::new(vec![from, to])
    }

    #[inline]
    pub fn length(&self) -> Length {
        Length(*self.cumulative.last().unwrap_or(&0.0))
    }

    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[inline]
    pub fn first(&self) -> Point2 {
        self.points[0]
    }

    #[inline]
    pub fn last(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }

    /// Number of straight sections (`points().len() - 1`).
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// End points of straight section `i`, or `None` if out of range.
    #[inline]
    pub fn segment(&self, i: usize) -> Option<(Point2, Point2)> {
        Some((*self.points.get(i)?, *self.points.get(i + 1)?))
    }

    /// Arc length at vertex `i`, or `None` if out of range.
    #[inline]
    pub fn vertex_distance(&self, i: usize) -> Option<Length> {
        self.cumulative.get(i).map(|&d| Length(d))
    }

    /// Heading of the first section.
    #[inline]
    pub fn start_heading(&self) -> f64 {
        self.points[0].heading_to(self.points[1])
    }

    /// Location at arc length `distance`, extrapolating along the first or
    /// last section when `distance` lies outside `[0, length]`.
    pub fn location_extended(&self, distance: Length) -> DirectedPoint {
        let d = distance.si();
        let n = self.points.len();
        // section index whose start vertex is the last one at or before `d`
        let i = self
            .cumulative
            .partition_point(|&c| c <= d)
            .saturating_sub(1)
            .min(n - 2);
        let (a, b) = (self.points[i], self.points[i + 1]);
        let section = self.cumulative[i + 1] - self.cumulative[i];
        let t = (d - self.cumulative[i]) / section;
        let p = a.lerp(b, t);
        DirectedPoint::new(p.x, p.y, a.heading_to(b))
    }

    /// Location at `fraction` of the length.
    ///
    /// Fractions up to `tolerance` outside `[0, 1]` are clamped, absorbing
    /// floating accumulation in callers that derive the fraction from
    /// integrated distances.
    ///
    /// # Errors
    ///
    /// `CoreError::InvalidPath` if `fraction` is further out of range.
    pub fn location_fraction(&self, fraction: f64, tolerance: f64) -> CoreResult<DirectedPoint> {
        if !(-tolerance..=1.0 + tolerance).contains(&fraction) {
            return Err(CoreError::InvalidPath(format!(
                "fraction {fraction} outside [0, 1] (tolerance {tolerance})"
            )));
        }
        Ok(self.location_extended(self.length() * fraction.clamp(0.0, 1.0)))
    }

    /// Sub-path between arc lengths `start` and `end`.
    ///
    /// # Errors
    ///
    /// `CoreError::InvalidPath` unless `0 <= start < end <= length`.
    pub fn extract(&self, start: Length, end: Length) -> CoreResult<Polyline> {
        let len = self.length().si();
        let (s, e) = (start.si(), end.si());
        if s < -EXTRACT_TOLERANCE || e > len + EXTRACT_TOLERANCE || s >= e {
            return Err(CoreError::InvalidPath(format!(
                "cannot extract [{s}, {e}] from a path of length {len}"
            )));
        }
        let (s, e) = (s.max(0.0), e.min(len));
        let mut points = Vec::with_capacity(self.points.len());
        points.push(self.location_extended(Length(s)).point());
        for (p, &c) in self.points.iter().zip(&self.cumulative) {
            if c > s && c < e {
                points.push(*p);
            }
        }
        points.push(self.location_extended(Length(e)).point());
        Polyline::new(points)
    }

    /// The first `length` metres of the path.
    #[inline]
    pub fn truncate(&self, length: Length) -> CoreResult<Polyline> {
        self.extract(Length::ZERO, length)
    }
}

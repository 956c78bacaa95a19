//! Ordered, continuity-preserving chains of [`Segment`]s.

use mts_core::{Acceleration, Duration, Length, Speed};

use crate::Segment;

/// Speeds below this (m/s) with non-positive acceleration are treated as
/// stand-still, so round-off never accumulates into creeping motion.
pub const DRIFTING_SPEED_SI: f64 = 1e-3;

/// The motion of one planning horizon as consecutive constant-acceleration
/// segments.
///
/// # Invariants
///
/// - Never empty.
/// - `segment[i].start_speed() == segment[i - 1].end_speed()`, except that a
///   stand-still segment always starts at exactly zero.
/// - Speed never becomes negative: a decelerating segment that would cross
///   zero before its duration elapses is split into decelerate-to-zero plus
///   a stand-still remainder.
///
/// ```rust,ignore
/// let segments = Segments::off(Speed(10.0), Duration(2.0), Acceleration(-2.0))
///     .add(Duration(5.0), Acceleration(-2.0)); // stops after 3 s, then waits 2 s
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segments {
    segments: Vec<Segment>,
}

impl Segments {
    /// Start a sequence at speed `v0` with one segment of `acceleration`.
    pub fn off(v0: Speed, duration: Duration, acceleration: Acceleration) -> Self {
        let mut s = Self { segments: Vec::with_capacity(2) };
        s.append(v0, duration, acceleration);
        s
    }

    /// A single stand-still segment.
    pub fn stand_still(duration: Duration) -> Self {
        Self { segments: vec![Segment::stand_still(duration)] }
    }

    /// Builder-style [`push`][Self::push].
    #[must_use]
    pub fn add(mut self, duration: Duration, acceleration: Acceleration) -> Self {
        self.push(duration, acceleration);
        self
    }

    /// Append a segment starting at the current end speed.  Zero-length
    /// appends are ignored.
    pub fn push(&mut self, duration: Duration, acceleration: Acceleration) {
        if duration.si() <= 0.0 {
            return;
        }
        let v0 = self.end_speed();
        self.append(v0, duration, acceleration);
    }

    fn append(&mut self, v0: Speed, duration: Duration, acceleration: Acceleration) {
        debug_assert!(duration.si() >= 0.0, "negative segment duration {duration}");
        let a = acceleration.si();
        if v0.si() < DRIFTING_SPEED_SI && a <= 0.0 {
            self.push_stand_still(duration);
            return;
        }
        if a < 0.0 {
            let t_stop = v0.si() / -a;
            if t_stop < duration.si() {
                self.segments.push(Segment::moving(v0, Duration(t_stop), acceleration));
                self.push_stand_still(duration - Duration(t_stop));
                return;
            }
        }
        self.segments.push(Segment::moving(v0, duration, acceleration));
    }

    /// Adjacent stand-still segments are merged.
    fn push_stand_still(&mut self, duration: Duration) {
        match self.segments.last_mut() {
            Some(last) if last.is_stand_still() => {
                *last = Segment::stand_still(last.duration() + duration);
            }
            _ => self.segments.push(Segment::stand_still(duration)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Segment> {
        self.segments.get(i)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn first(&self) -> &Segment {
        &self.segments[0]
    }

    #[inline]
    pub fn last(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    pub fn start_speed(&self) -> Speed {
        self.first().start_speed()
    }

    pub fn end_speed(&self) -> Speed {
        self.last().end_speed()
    }

    /// Nominal duration of the whole sequence.
    pub fn total_duration(&self) -> Duration {
        self.segments
            .iter()
            .fold(Duration::ZERO, |acc, s| acc + s.duration())
    }

    /// Nominal distance of the whole sequence.
    pub fn total_distance(&self) -> Length {
        self.segments
            .iter()
            .fold(Length::ZERO, |acc, s| acc + s.total_distance())
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

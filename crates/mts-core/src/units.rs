//! Unit-tagged physical quantities.
//!
//! # Design
//!
//! Every quantity is a transparent `f64` newtype holding its value in SI
//! units (metre, second, metre/second, metre/second²).  The arithmetic
//! operators are only implemented where the result has a well-defined unit:
//!
//! | Expression                  | Result         |
//! |-----------------------------|----------------|
//! | `Speed * Duration`          | `Length`       |
//! | `Acceleration * Duration`   | `Speed`        |
//! | `Length / Speed`            | `Duration`     |
//! | `Length / Duration`         | `Speed`        |
//! | `Speed / Duration`          | `Acceleration` |
//! | `Time + Duration`           | `Time`         |
//! | `Time - Time`               | `Duration`     |
//!
//! Closed-form kinematics (quadratics, square roots) drop to raw SI values via
//! `.si()` and re-wrap the result, which keeps the solver code readable while
//! the public API stays unit-consistent.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Generate a scalar quantity wrapper with same-unit arithmetic.
macro_rules! quantity {
    ($(#[$attr:meta])* $vis:vis struct $name:ident, $unit:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub f64);

        impl $name {
            pub const ZERO: $name = $name(0.0);

            /// Largest finite value: the neutral element for `min` folds.
            pub const MAX: $name = $name(f64::MAX);

            /// The raw SI value.
            #[inline(always)]
            pub const fn si(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                $name(self.0.abs())
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                $name(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                $name(self.0.max(other.0))
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn is_zero(self) -> bool {
                self.0 == 0.0
            }

            #[inline]
            pub fn is_negative(self) -> bool {
                self.0 < 0.0
            }

            #[inline]
            pub fn is_positive(self) -> bool {
                self.0 > 0.0
            }
        }

        impl Add for $name {
            type Output = $name;
            #[inline]
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = $name;
            #[inline]
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: $name) {
                self.0 -= rhs.0;
            }
        }

        impl Neg for $name {
            type Output = $name;
            #[inline]
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            #[inline]
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        /// Dimensionless ratio of two quantities of the same unit.
        impl Div for $name {
            type Output = f64;
            #[inline]
            fn div(self, rhs: $name) -> f64 {
                self.0 / rhs.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.3} {}", self.0, $unit)
            }
        }
    };
}

quantity! {
    /// A distance along a path, in metres.
    pub struct Length, "m";
}

quantity! {
    /// A relative time span, in seconds.
    pub struct Duration, "s";
}

quantity! {
    /// A longitudinal speed, in metres per second.
    pub struct Speed, "m/s";
}

quantity! {
    /// A longitudinal acceleration, in metres per second squared.  Negative
    /// values decelerate.
    pub struct Acceleration, "m/s²";
}

impl Duration {
    /// Sentinel for "never", e.g. a distance that cannot be covered.
    pub const INFINITE: Duration = Duration(f64::INFINITY);
}

// ── Cross-unit products and quotients ─────────────────────────────────────────

impl Mul<Duration> for Speed {
    type Output = Length;
    #[inline]
    fn mul(self, rhs: Duration) -> Length {
        Length(self.0 * rhs.0)
    }
}

impl Mul<Duration> for Acceleration {
    type Output = Speed;
    #[inline]
    fn mul(self, rhs: Duration) -> Speed {
        Speed(self.0 * rhs.0)
    }
}

impl Div<Speed> for Length {
    type Output = Duration;
    #[inline]
    fn div(self, rhs: Speed) -> Duration {
        Duration(self.0 / rhs.0)
    }
}

impl Div<Duration> for Length {
    type Output = Speed;
    #[inline]
    fn div(self, rhs: Duration) -> Speed {
        Speed(self.0 / rhs.0)
    }
}

impl Div<Duration> for Speed {
    type Output = Acceleration;
    #[inline]
    fn div(self, rhs: Duration) -> Acceleration {
        Acceleration(self.0 / rhs.0)
    }
}

impl Div<Acceleration> for Speed {
    type Output = Duration;
    #[inline]
    fn div(self, rhs: Acceleration) -> Duration {
        Duration(self.0 / rhs.0)
    }
}

// ── Time ──────────────────────────────────────────────────────────────────────

/// An absolute simulation time, in seconds since the simulation epoch.
///
/// Kept distinct from [`Duration`] so that adding two absolute times is a
/// compile error.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    #[inline(always)]
    pub const fn si(self) -> f64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Time) -> Duration {
        Duration(self.0 - earlier.0)
    }
}

impl Add<Duration> for Time {
    type Output = Time;
    #[inline]
    fn add(self, rhs: Duration) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl Sub<Duration> for Time {
    type Output = Time;
    #[inline]
    fn sub(self, rhs: Duration) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl Sub for Time {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: Time) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

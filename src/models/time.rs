//! Saturating time scalar.
//!
//! Every duration and timestamp in the crate is a [`Time`]. Values are clamped
//! into `[-TIME_INF, TIME_INF]` on construction and after every arithmetic
//! operation, so an "infinite" delay is an absorbing value: adding anything to
//! it stays infinite instead of wrapping or panicking.
//!
//! Arithmetic is defined between two `Time`s and between a `Time` and a raw
//! `i64` on either side. Division (`/`) is floor division; use
//! [`Time::true_div`] for a floating-point ratio.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Magnitude reached by saturating arithmetic.
pub const TIME_INF: i64 = 2_000_000_000;

/// Saturating signed time value.
///
/// # Examples
///
/// ```
/// use u_rcpsp::models::Time;
///
/// assert_eq!(Time::new(2_000_000_001), Time::inf());
/// assert_eq!(Time::new(-3_000_000_000), -Time::inf());
/// assert_eq!(Time::inf() + 5, Time::inf());
/// assert_eq!(Time::new(7) / 2, 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Time(i64);

impl Time {
    /// Creates a time value, clamping `raw` into `[-TIME_INF, TIME_INF]`.
    #[inline]
    pub fn new(raw: i64) -> Self {
        Self(raw.clamp(-TIME_INF, TIME_INF))
    }

    /// Zero time.
    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Positive infinity sentinel.
    #[inline]
    pub const fn inf() -> Self {
        Self(TIME_INF)
    }

    /// Underlying integer value.
    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether the magnitude reached the sentinel.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self.0.abs() == TIME_INF
    }

    /// Floating-point ratio `self / other` (not clamped).
    pub fn true_div<T: Into<i64>>(self, other: T) -> f64 {
        self.0 as f64 / other.into() as f64
    }
}

/// Floor division that never panics: division by zero saturates by the
/// sign of the dividend.
fn floor_div(a: i64, b: i64) -> i64 {
    if b == 0 {
        return match a.signum() {
            1 => TIME_INF,
            -1 => -TIME_INF,
            _ => 0,
        };
    }
    match a.checked_div(b) {
        Some(q) if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) => q - 1,
        Some(q) => q,
        None => i64::MAX,
    }
}

macro_rules! impl_time_op {
    ($trait:ident, $method:ident, $op:path) => {
        impl $trait for Time {
            type Output = Time;

            #[inline]
            fn $method(self, rhs: Time) -> Time {
                Time::new($op(self.0, rhs.0))
            }
        }

        impl $trait<i64> for Time {
            type Output = Time;

            #[inline]
            fn $method(self, rhs: i64) -> Time {
                Time::new($op(self.0, rhs))
            }
        }

        impl $trait<Time> for i64 {
            type Output = Time;

            #[inline]
            fn $method(self, rhs: Time) -> Time {
                Time::new($op(self, rhs.0))
            }
        }
    };
}

impl_time_op!(Add, add, i64::saturating_add);
impl_time_op!(Sub, sub, i64::saturating_sub);
impl_time_op!(Mul, mul, i64::saturating_mul);
impl_time_op!(Div, div, floor_div);

impl AddAssign for Time {
    fn add_assign(&mut self, rhs: Time) {
        *self = *self + rhs;
    }
}

impl AddAssign<i64> for Time {
    fn add_assign(&mut self, rhs: i64) {
        *self = *self + rhs;
    }
}

impl SubAssign for Time {
    fn sub_assign(&mut self, rhs: Time) {
        *self = *self - rhs;
    }
}

impl Neg for Time {
    type Output = Time;

    fn neg(self) -> Time {
        Time(-self.0)
    }
}

impl Sum for Time {
    fn sum<I: Iterator<Item = Time>>(iter: I) -> Time {
        iter.fold(Time::zero(), Add::add)
    }
}

impl PartialEq<i64> for Time {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<Time> for i64 {
    fn eq(&self, other: &Time) -> bool {
        *self == other.0
    }
}

impl PartialOrd<i64> for Time {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialOrd<Time> for i64 {
    fn partial_cmp(&self, other: &Time) -> Option<Ordering> {
        self.partial_cmp(&other.0)
    }
}

impl From<i64> for Time {
    fn from(raw: i64) -> Self {
        Time::new(raw)
    }
}

impl From<Time> for i64 {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

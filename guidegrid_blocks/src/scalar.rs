// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Second-resolution time scalars used by the block timeline.

use core::ops::{Add, Mul, Neg, Sub};

/// A point in time, stored as whole seconds since the Unix epoch.
///
/// Guide data carries second resolution; integer seconds keep block
/// arithmetic exact and make quantization reproducible across rebuilds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Constructs a timestamp from whole seconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the timestamp as whole seconds since the Unix epoch.
    #[must_use]
    pub const fn as_unix_seconds(self) -> i64 {
        self.0
    }

    /// Rounds down to the nearest multiple of `span`, anchored at the epoch.
    ///
    /// Window-policy helper: hosts typically floor "now" to the half hour or
    /// hour before choosing a grid start. Non-positive spans are returned
    /// unchanged.
    #[must_use]
    pub const fn floor_to(self, span: TimeSpan) -> Self {
        let span = span.as_seconds();
        if span <= 0 {
            return self;
        }
        Self(self.0.div_euclid(span) * span)
    }
}

/// A signed duration in whole seconds; the difference type of [`Timestamp`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan(i64);

impl TimeSpan {
    /// The zero-length span.
    pub const ZERO: Self = Self(0);

    /// Constructs a span from whole seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Constructs a span from whole minutes.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    /// Constructs a span from whole hours.
    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * 3600)
    }

    /// Returns the span length in whole seconds.
    #[must_use]
    pub const fn as_seconds(self) -> i64 {
        self.0
    }

    /// Returns `true` if the span is shorter than zero seconds.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add<TimeSpan> for Timestamp {
    type Output = Self;

    fn add(self, rhs: TimeSpan) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<TimeSpan> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: TimeSpan) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for Timestamp {
    type Output = TimeSpan;

    fn sub(self, rhs: Self) -> TimeSpan {
        TimeSpan(self.0 - rhs.0)
    }
}

impl Add for TimeSpan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeSpan {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for TimeSpan {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for TimeSpan {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeSpan, Timestamp};

    #[test]
    fn timestamp_difference_and_offset() {
        let a = Timestamp::from_unix_seconds(600);
        let b = a + TimeSpan::from_minutes(5);
        assert_eq!(b.as_unix_seconds(), 900);
        assert_eq!(b - a, TimeSpan::from_seconds(300));
        assert_eq!(a - b, -TimeSpan::from_seconds(300));
        assert!((a - b).is_negative());
    }

    #[test]
    fn span_units_agree() {
        assert_eq!(TimeSpan::from_hours(1), TimeSpan::from_minutes(60));
        assert_eq!(TimeSpan::from_minutes(1), TimeSpan::from_seconds(60));
        assert_eq!(TimeSpan::from_minutes(5) * 3, TimeSpan::from_minutes(15));
    }

    #[test]
    fn floor_to_rounds_toward_negative_infinity() {
        let half_hour = TimeSpan::from_minutes(30);
        let t = Timestamp::from_unix_seconds(3599);
        assert_eq!(t.floor_to(half_hour).as_unix_seconds(), 1800);

        // Pre-epoch timestamps floor downwards, not toward zero.
        let t = Timestamp::from_unix_seconds(-1);
        assert_eq!(t.floor_to(half_hour).as_unix_seconds(), -1800);

        // Degenerate spans leave the value untouched.
        assert_eq!(t.floor_to(TimeSpan::ZERO), t);
    }
}

//! Implementation of the [TimeInternal] type

use core::{
    fmt::Display,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// A signed span or point of time, split in whole seconds and nanoseconds.
///
/// Every value produced by this type is normalized: the nanoseconds are
/// smaller than one second in magnitude, and when both parts are non-zero they
/// carry the same sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TimeInternal {
    pub seconds: i32,
    pub nanoseconds: i32,
}

impl TimeInternal {
    pub const ZERO: TimeInternal = TimeInternal {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Create a normalized time value from possibly unnormalized parts
    pub fn new(seconds: i32, nanoseconds: i32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
        .normalized()
    }

    pub fn from_nanos(nanos: i64) -> Self {
        let seconds = nanos / NANOS_PER_SECOND as i64;
        let nanoseconds = nanos % NANOS_PER_SECOND as i64;
        Self {
            seconds: seconds as i32,
            nanoseconds: nanoseconds as i32,
        }
    }

    /// The total number of nanoseconds
    pub fn nanos(&self) -> i64 {
        self.seconds as i64 * NANOS_PER_SECOND as i64 + self.nanoseconds as i64
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanoseconds == 0
    }

    pub fn abs(self) -> Self {
        if self.seconds < 0 || self.nanoseconds < 0 {
            -self
        } else {
            self
        }
    }

    /// Divide by two, rounding the nanoseconds toward zero
    pub fn halved(self) -> Self {
        Self {
            seconds: self.seconds / 2,
            nanoseconds: (self.nanoseconds + (self.seconds % 2) * NANOS_PER_SECOND) / 2,
        }
        .normalized()
    }

    /// Convert a 64-bit correction field value (nanoseconds scaled by 2^16).
    ///
    /// The magnitude is converted and the sign re-applied afterwards, so
    /// sub-nanosecond fractions are truncated toward zero for negative values
    /// as well.
    pub fn from_scaled_nanoseconds(scaled: i64) -> Self {
        let magnitude = (scaled.unsigned_abs() >> 16) as i64;
        let sign = if scaled < 0 { -1 } else { 1 };

        Self {
            seconds: (sign * (magnitude / NANOS_PER_SECOND as i64)) as i32,
            nanoseconds: (sign * (magnitude % NANOS_PER_SECOND as i64)) as i32,
        }
    }

    /// The value as nanoseconds scaled by 2^16, the unit of correction fields
    pub fn to_scaled_nanoseconds(&self) -> i64 {
        self.nanos().saturating_mul(1 << 16)
    }

    fn normalized(self) -> Self {
        let mut seconds = self
            .seconds
            .wrapping_add(self.nanoseconds / NANOS_PER_SECOND);
        let mut nanoseconds = self.nanoseconds % NANOS_PER_SECOND;

        if seconds > 0 && nanoseconds < 0 {
            seconds -= 1;
            nanoseconds += NANOS_PER_SECOND;
        } else if seconds < 0 && nanoseconds > 0 {
            seconds += 1;
            nanoseconds -= NANOS_PER_SECOND;
        }

        Self {
            seconds,
            nanoseconds,
        }
    }
}

impl Add for TimeInternal {
    type Output = TimeInternal;

    fn add(self, rhs: TimeInternal) -> Self::Output {
        // Both nanosecond parts are below one second, so their sum fits an i32
        Self {
            seconds: self.seconds.wrapping_add(rhs.seconds),
            nanoseconds: self.nanoseconds + rhs.nanoseconds,
        }
        .normalized()
    }
}

impl AddAssign for TimeInternal {
    fn add_assign(&mut self, rhs: TimeInternal) {
        *self = *self + rhs;
    }
}

impl Sub for TimeInternal {
    type Output = TimeInternal;

    fn sub(self, rhs: TimeInternal) -> Self::Output {
        Self {
            seconds: self.seconds.wrapping_sub(rhs.seconds),
            nanoseconds: self.nanoseconds - rhs.nanoseconds,
        }
        .normalized()
    }
}

impl SubAssign for TimeInternal {
    fn sub_assign(&mut self, rhs: TimeInternal) {
        *self = *self - rhs;
    }
}

impl Neg for TimeInternal {
    type Output = TimeInternal;

    fn neg(self) -> Self::Output {
        Self {
            seconds: self.seconds.wrapping_neg(),
            nanoseconds: -self.nanoseconds,
        }
    }
}

impl Display for TimeInternal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.seconds < 0 || self.nanoseconds < 0 {
            write!(
                f,
                "-{}.{:09}",
                self.seconds.unsigned_abs(),
                self.nanoseconds.unsigned_abs()
            )
        } else {
            write!(f, "{}.{:09}", self.seconds, self.nanoseconds)
        }
    }
}

/// A message interval, stored as the base-2 logarithm of the interval in
/// seconds, the way it travels in the logMessageInterval header field.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Interval(i8);

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval")
            .field("millis", &self.as_millis())
            .field("log_base_2", &self.0)
            .finish()
    }
}

impl Interval {
    pub const ONE_SECOND: Self = Self(0);
    pub const TWO_SECONDS: Self = Self(1);

    pub const fn from_log_2(log_2: i8) -> Self {
        Self(log_2)
    }

    pub fn as_log_2(self) -> i8 {
        self.0
    }

    /// The interval in whole milliseconds, saturating at `u32::MAX`
    pub fn as_millis(self) -> u32 {
        if self.0 >= 0 {
            let shift = (self.0 as u32).min(32);
            u32::try_from(1000u64 << shift).unwrap_or(u32::MAX)
        } else {
            1000u32 >> (self.0.unsigned_abs() as u32).min(31)
        }
    }

    pub fn as_core_duration(self) -> core::time::Duration {
        core::time::Duration::from_millis(self.as_millis() as u64)
    }
}

impl From<i8> for Interval {
    fn from(value: i8) -> Self {
        Self::from_log_2(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two() {
        assert_eq!(Interval::TWO_SECONDS.as_millis(), 2000)
    }

    #[test]
    fn fractional_intervals() {
        assert_eq!(Interval::from_log_2(-1).as_millis(), 500);
        assert_eq!(Interval::from_log_2(-3).as_millis(), 125);
        assert_eq!(Interval::from_log_2(-12).as_millis(), 0);
    }

    #[test]
    fn saturates() {
        assert_eq!(Interval::from_log_2(3).as_millis(), 8000);
        assert_eq!(Interval::from_log_2(40).as_millis(), u32::MAX);
    }
}

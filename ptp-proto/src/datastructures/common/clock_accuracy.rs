/// How accurate the underlying clock device is expected to be when not
/// synchronized.
///
/// Stored as the raw clockAccuracy byte. Lower values are more accurate, so
/// the derived ordering matches the ordering used when comparing masters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockAccuracy(pub u8);

impl ClockAccuracy {
    pub const NS25: Self = Self(0x20);
    pub const NS100: Self = Self(0x21);
    pub const NS250: Self = Self(0x22);
    pub const US1: Self = Self(0x23);
    pub const US2_5: Self = Self(0x24);
    pub const US10: Self = Self(0x25);
    pub const US25: Self = Self(0x26);
    pub const US100: Self = Self(0x27);
    pub const US250: Self = Self(0x28);
    pub const MS1: Self = Self(0x29);
    pub const MS2_5: Self = Self(0x2a);
    pub const MS10: Self = Self(0x2b);
    pub const MS25: Self = Self(0x2c);
    pub const MS100: Self = Self(0x2d);
    pub const MS250: Self = Self(0x2e);
    pub const S1: Self = Self(0x2f);
    pub const S10: Self = Self(0x30);
    pub const SGT10: Self = Self(0x31);
    pub const UNKNOWN: Self = Self(0xfe);

    pub fn to_primitive(self) -> u8 {
        self.0
    }

    pub fn from_primitive(value: u8) -> Self {
        Self(value)
    }
}

impl Default for ClockAccuracy {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_accurate_orders_first() {
        assert!(ClockAccuracy::NS25 < ClockAccuracy::MS1);
        assert!(ClockAccuracy::SGT10 < ClockAccuracy::UNKNOWN);
    }
}

use num_enum::{FromPrimitive, IntoPrimitive};

/// What the time values for a system are derived from
///
/// This enum encodes the root source of a system's time values. For most use
/// cases, the default `InternalOscillator` will suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TimeSource {
    AtomicClock = 0x10,
    Gnss = 0x20,
    TerrestrialRadio = 0x30,
    SerialTimeCode = 0x39,
    Ptp = 0x40,
    Ntp = 0x50,
    HandSet = 0x60,
    Other = 0x90,
    InternalOscillator = 0xa0,
    /// Reserved or profile specific value
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::InternalOscillator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_source_values() {
        for i in 0..=u8::MAX {
            let source = TimeSource::from_primitive(i);
            assert_eq!(u8::from(source), i);
        }

        assert_eq!(TimeSource::from_primitive(0xa0), TimeSource::InternalOscillator);
        assert_eq!(TimeSource::from_primitive(0xf5), TimeSource::Unknown(0xf5));
    }
}

use core::ops::{Deref, DerefMut};

use fixed::types::I48F16;

use crate::{
    datastructures::{field, field_mut, WireFormat, WireFormatError},
    time::TimeInternal,
};

/// Represents time intervals in nanoseconds, scaled by 2^16 on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeInterval(pub I48F16);

impl Deref for TimeInterval {
    type Target = I48F16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TimeInterval {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl WireFormat for TimeInterval {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        field_mut(buffer, 0, 8)?.copy_from_slice(&self.0.to_bits().to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self(I48F16::from_bits(i64::from_be_bytes(field(buffer, 0)?))))
    }
}

impl From<TimeInterval> for TimeInternal {
    fn from(interval: TimeInterval) -> Self {
        TimeInternal::from_scaled_nanoseconds(interval.0.to_bits())
    }
}

impl From<TimeInternal> for TimeInterval {
    fn from(time: TimeInternal) -> Self {
        TimeInterval(I48F16::from_bits(time.to_scaled_nanoseconds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_interval_wireformat() {
        let representations = [
            (
                [0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x80, 0x00u8],
                TimeInterval(I48F16::from_num(2.5f64)),
            ),
            (
                [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01u8],
                TimeInterval(I48F16::from_bits(1)),
            ),
            (
                [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00u8],
                TimeInterval(I48F16::from_num(-1.0f64)),
            ),
        ];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 8];
            object_representation
                .serialize(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data = TimeInterval::deserialize(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn to_internal_time() {
        let interval = TimeInterval(I48F16::from_num(-2.5f64));
        assert_eq!(TimeInternal::from(interval), TimeInternal::new(0, -2));

        let time = TimeInternal::new(0, 1234);
        assert_eq!(TimeInternal::from(TimeInterval::from(time)), time);
    }
}

use super::clock_accuracy::ClockAccuracy;
use crate::datastructures::{field, field_mut, WireFormat, WireFormatError};

/// Clock class advertised by a clock that can never become master
pub const SLAVE_ONLY_CLOCK_CLASS: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockQuality {
    pub clock_class: u8,
    pub clock_accuracy: ClockAccuracy,
    pub offset_scaled_log_variance: u16,
}

impl Default for ClockQuality {
    fn default() -> Self {
        Self {
            clock_class: 248,
            clock_accuracy: ClockAccuracy::UNKNOWN,
            offset_scaled_log_variance: 5000,
        }
    }
}

impl WireFormat for ClockQuality {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 4)?;
        buffer[0] = self.clock_class;
        buffer[1] = self.clock_accuracy.to_primitive();
        buffer[2..4].copy_from_slice(&self.offset_scaled_log_variance.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let [clock_class, accuracy, v0, v1] = field(buffer, 0)?;
        Ok(Self {
            clock_class,
            clock_accuracy: ClockAccuracy::from_primitive(accuracy),
            offset_scaled_log_variance: u16::from_be_bytes([v0, v1]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_quality_wireformat() {
        let representations = [
            (
                [0x7A, 0x2A, 0x12, 0x34u8],
                ClockQuality {
                    clock_class: 122,
                    clock_accuracy: ClockAccuracy::MS2_5,
                    offset_scaled_log_variance: 0x1234,
                },
            ),
            ([0xF8, 0xFE, 0x13, 0x88u8], ClockQuality::default()),
        ];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 4];
            object_representation
                .serialize(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data = ClockQuality::deserialize(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }
}

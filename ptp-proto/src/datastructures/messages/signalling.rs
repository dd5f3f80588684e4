use getset::CopyGetters;

use super::Header;
use crate::datastructures::{common::PortIdentity, field_mut, WireFormat, WireFormatError};

/// A signaling message without its TLVs, which are not interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SignalingMessage {
    pub(crate) header: Header,
    pub(crate) target_port_identity: PortIdentity,
}

impl SignalingMessage {
    pub(crate) fn content_size(&self) -> usize {
        10
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.target_port_identity
            .serialize(field_mut(buffer, 0, 10)?)
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        Ok(Self {
            header,
            target_port_identity: PortIdentity::deserialize(buffer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockIdentity;

    #[test]
    fn signaling_wireformat() {
        let representations = [(
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            SignalingMessage {
                header: Header::default(),
                target_port_identity: PortIdentity {
                    clock_identity: ClockIdentity([0xff; 8]),
                    port_number: 0xffff,
                },
            },
        )];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 10];
            object_representation
                .serialize_content(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data =
                SignalingMessage::deserialize_content(Header::default(), &byte_representation)
                    .unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }
}

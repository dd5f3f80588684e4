use getset::CopyGetters;
use num_enum::{FromPrimitive, IntoPrimitive};

use super::Header;
use crate::datastructures::{common::PortIdentity, field_mut, WireFormat, WireFormatError};

/// A management message without its TLV, which is not interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ManagementMessage {
    pub(crate) header: Header,
    pub(crate) target_port_identity: PortIdentity,
    pub(crate) starting_boundary_hops: u8,
    pub(crate) boundary_hops: u8,
    pub(crate) action: ManagementAction,
}

impl ManagementMessage {
    pub(crate) fn content_size(&self) -> usize {
        14
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 14)?;
        self.target_port_identity.serialize(&mut buffer[0..10])?;
        buffer[10] = self.starting_boundary_hops;
        buffer[11] = self.boundary_hops;
        buffer[12] = u8::from(self.action) & 0x0f;
        buffer[13] = 0;

        Ok(())
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        let buffer = buffer.get(0..14).ok_or(WireFormatError::BufferTooShort)?;
        Ok(Self {
            header,
            target_port_identity: PortIdentity::deserialize(&buffer[0..10])?,
            starting_boundary_hops: buffer[10],
            boundary_hops: buffer[11],
            action: ManagementAction::from_primitive(buffer[12] & 0x0f),
        })
    }
}

/// See: 15.4.1.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ManagementAction {
    Get = 0x0,
    Set = 0x1,
    Response = 0x2,
    Command = 0x3,
    Acknowledge = 0x4,
    #[num_enum(default)]
    Reserved = 0x5,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockIdentity;

    #[test]
    fn management_wireformat() {
        let representations = [
            (
                [
                    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x00, 0x01, 0x04, 0x03, 0x00,
                    0x00,
                ],
                ManagementMessage {
                    header: Header::default(),
                    target_port_identity: PortIdentity {
                        clock_identity: ClockIdentity([1, 2, 3, 4, 5, 6, 7, 8]),
                        port_number: 1,
                    },
                    starting_boundary_hops: 4,
                    boundary_hops: 3,
                    action: ManagementAction::Get,
                },
            ),
            (
                [
                    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x04,
                    0x00,
                ],
                ManagementMessage {
                    header: Header::default(),
                    target_port_identity: PortIdentity {
                        clock_identity: ClockIdentity([0xff; 8]),
                        port_number: 0xffff,
                    },
                    starting_boundary_hops: 0,
                    boundary_hops: 0,
                    action: ManagementAction::Acknowledge,
                },
            ),
        ];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 14];
            object_representation
                .serialize_content(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data =
                ManagementMessage::deserialize_content(Header::default(), &byte_representation)
                    .unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn reserved_actions() {
        assert_eq!(ManagementAction::from_primitive(0x9), ManagementAction::Reserved);
    }
}

use getset::CopyGetters;

use super::{control_field::ControlField, MessageType};
use crate::datastructures::{
    common::{PortIdentity, TimeInterval},
    field, field_mut, WireFormat, WireFormatError,
};

/// Length of the common message header
pub const HEADER_LENGTH: usize = 34;

/// Transport specific nibble used by the UDP/IPv4 mapping (annex D)
pub(crate) const TRANSPORT_SPECIFIC: u8 = 0x8;

/// Version of the protocol spoken by this implementation
pub const PTP_VERSION: u8 = 2;

/// Value of the log message interval field in messages where it has no meaning
pub(crate) const LOG_INTERVAL_UNUSED: i8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Header {
    pub(crate) transport_specific: u8,
    pub(crate) version: u8,
    pub(crate) domain_number: u8,
    pub(crate) alternate_master_flag: bool,
    pub(crate) two_step_flag: bool,
    pub(crate) unicast_flag: bool,
    pub(crate) ptp_profile_specific_1: bool,
    pub(crate) ptp_profile_specific_2: bool,
    pub(crate) security_flag: bool,
    pub(crate) leap61: bool,
    pub(crate) leap59: bool,
    pub(crate) current_utc_offset_valid: bool,
    pub(crate) ptp_timescale: bool,
    pub(crate) time_traceable: bool,
    pub(crate) frequency_traceable: bool,
    pub(crate) correction_field: TimeInterval,
    pub(crate) source_port_identity: PortIdentity,
    pub(crate) sequence_id: u16,
    pub(crate) log_message_interval: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializedHeader {
    pub header: Header,
    pub message_type: MessageType,
    pub message_length: u16,
}

impl Header {
    pub(crate) fn new() -> Self {
        Self {
            transport_specific: TRANSPORT_SPECIFIC,
            version: PTP_VERSION,
            domain_number: 0,
            alternate_master_flag: false,
            two_step_flag: false,
            unicast_flag: false,
            ptp_profile_specific_1: false,
            ptp_profile_specific_2: false,
            security_flag: false,
            leap61: false,
            leap59: false,
            current_utc_offset_valid: false,
            ptp_timescale: false,
            time_traceable: false,
            frequency_traceable: false,
            correction_field: TimeInterval::default(),
            source_port_identity: PortIdentity::default(),
            sequence_id: 0,
            log_message_interval: 0,
        }
    }

    pub fn wire_size(&self) -> usize {
        HEADER_LENGTH
    }

    fn flag_bytes(&self) -> [u8; 2] {
        let mut flags = [0u8; 2];
        flags[0] |= self.alternate_master_flag as u8;
        flags[0] |= (self.two_step_flag as u8) << 1;
        flags[0] |= (self.unicast_flag as u8) << 2;
        flags[0] |= (self.ptp_profile_specific_1 as u8) << 5;
        flags[0] |= (self.ptp_profile_specific_2 as u8) << 6;
        flags[0] |= (self.security_flag as u8) << 7;
        flags[1] |= self.leap61 as u8;
        flags[1] |= (self.leap59 as u8) << 1;
        flags[1] |= (self.current_utc_offset_valid as u8) << 2;
        flags[1] |= (self.ptp_timescale as u8) << 3;
        flags[1] |= (self.time_traceable as u8) << 4;
        flags[1] |= (self.frequency_traceable as u8) << 5;
        flags
    }

    /// Write the complete header
    pub fn serialize_header(
        &self,
        content_type: MessageType,
        content_length: usize,
        buffer: &mut [u8],
    ) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, HEADER_LENGTH)?;
        buffer[1] = self.version & 0x0f;
        buffer[4] = self.domain_number;
        buffer[5] = 0;
        buffer[6..8].copy_from_slice(&self.flag_bytes());
        buffer[16..20].fill(0);
        self.source_port_identity.serialize(&mut buffer[20..30])?;
        buffer[0] = self.transport_specific << 4;

        self.pack_dynamic_fields(content_type, content_length, buffer)
    }

    /// Write only the fields that change from message to message: message
    /// type, length, correction, sequence id, control field and log interval.
    ///
    /// Everything else is left as found in the buffer, which is expected to
    /// hold a header primed with [`Header::prime_template`].
    pub(crate) fn pack_dynamic_fields(
        &self,
        content_type: MessageType,
        content_length: usize,
        buffer: &mut [u8],
    ) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, HEADER_LENGTH)?;
        let length = (content_length + HEADER_LENGTH) as u16;

        buffer[0] = (buffer[0] & 0xf0) | (u8::from(content_type) & 0x0f);
        buffer[2..4].copy_from_slice(&length.to_be_bytes());
        self.correction_field.serialize(&mut buffer[8..16])?;
        buffer[30..32].copy_from_slice(&self.sequence_id.to_be_bytes());
        buffer[32] = ControlField::from(content_type).to_primitive();
        buffer[33] = self.log_message_interval as u8;

        Ok(())
    }

    /// Write the fields that stay the same for every message this port sends
    pub(crate) fn prime_template(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, HEADER_LENGTH)?;
        buffer.fill(0);
        buffer[0] = self.transport_specific << 4;
        buffer[1] = self.version & 0x0f;
        buffer[4] = self.domain_number;
        buffer[6..8].copy_from_slice(&self.flag_bytes());
        self.source_port_identity.serialize(&mut buffer[20..30])?;
        buffer[33] = LOG_INTERVAL_UNUSED as u8;
        Ok(())
    }

    pub fn deserialize_header(buffer: &[u8]) -> Result<DeserializedHeader, WireFormatError> {
        if buffer.len() < HEADER_LENGTH {
            return Err(WireFormatError::BufferTooShort);
        }

        Ok(DeserializedHeader {
            header: Self {
                transport_specific: buffer[0] >> 4,
                version: buffer[1] & 0x0f,
                domain_number: buffer[4],
                alternate_master_flag: (buffer[6] & (1 << 0)) > 0,
                two_step_flag: (buffer[6] & (1 << 1)) > 0,
                unicast_flag: (buffer[6] & (1 << 2)) > 0,
                ptp_profile_specific_1: (buffer[6] & (1 << 5)) > 0,
                ptp_profile_specific_2: (buffer[6] & (1 << 6)) > 0,
                security_flag: (buffer[6] & (1 << 7)) > 0,
                leap61: (buffer[7] & (1 << 0)) > 0,
                leap59: (buffer[7] & (1 << 1)) > 0,
                current_utc_offset_valid: (buffer[7] & (1 << 2)) > 0,
                ptp_timescale: (buffer[7] & (1 << 3)) > 0,
                time_traceable: (buffer[7] & (1 << 4)) > 0,
                frequency_traceable: (buffer[7] & (1 << 5)) > 0,
                correction_field: TimeInterval::deserialize(&buffer[8..16])?,
                source_port_identity: PortIdentity::deserialize(&buffer[20..30])?,
                sequence_id: u16::from_be_bytes(field(buffer, 30)?),
                log_message_interval: buffer[33] as i8,
            },
            message_type: (buffer[0] & 0x0f).try_into()?,
            message_length: u16::from_be_bytes(field(buffer, 2)?),
        })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use fixed::types::I48F16;

    use super::*;
    use crate::datastructures::common::ClockIdentity;

    #[test]
    fn flagfield_wireformat() {
        #[rustfmt::skip]
        let representations = [
            ([0x00, 0x00u8], Header::default()),
            ([0x01, 0x00u8], Header { alternate_master_flag: true, ..Default::default() }),
            ([0x02, 0x00u8], Header { two_step_flag: true, ..Default::default() }),
            ([0x04, 0x00u8], Header { unicast_flag: true, ..Default::default() }),
            ([0x20, 0x00u8], Header { ptp_profile_specific_1: true, ..Default::default() }),
            ([0x40, 0x00u8], Header { ptp_profile_specific_2: true, ..Default::default() }),
            ([0x80, 0x00u8], Header { security_flag: true, ..Default::default() }),
            ([0x00, 0x01u8], Header { leap61: true, ..Default::default() }),
            ([0x00, 0x02u8], Header { leap59: true, ..Default::default() }),
            ([0x00, 0x04u8], Header { current_utc_offset_valid: true, ..Default::default() }),
            ([0x00, 0x08u8], Header { ptp_timescale: true, ..Default::default() }),
            ([0x00, 0x10u8], Header { time_traceable: true, ..Default::default() }),
            ([0x00, 0x20u8], Header { frequency_traceable: true, ..Default::default() }),
        ];

        for (i, (byte_representation, flag_representation)) in
            representations.into_iter().enumerate()
        {
            // Test the serialization output
            let mut serialization_buffer = [0; 34];
            flag_representation
                .serialize_header(MessageType::Sync, 0, &mut serialization_buffer)
                .unwrap();
            assert_eq!(
                serialization_buffer[6..8],
                byte_representation,
                "The serialized flag field is not what it's supposed to for variant {}",
                i
            );

            // Test the deserialization output
            let deserialized_flag_field =
                Header::deserialize_header(&serialization_buffer).unwrap();
            assert_eq!(
                deserialized_flag_field.header, flag_representation,
                "The deserialized flag field is not what it's supposed to for variant {}",
                i
            );
        }
    }

    #[test]
    fn header_wireformat() {
        #[rustfmt::skip]
        let representations = [(
            [
                0x89, 0x02, 0x00, 0x36, 0xaa, 0x00, 0b0100_0101, 0b0010_1010,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x80, 0x00,
                0x00, 0x00, 0x00, 0x00,
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x55, 0x55,
                0xde, 0xad, 0x03, 0x16,
            ],
            DeserializedHeader {
                header: Header {
                    transport_specific: 0x8,
                    version: 2,
                    domain_number: 0xaa,
                    alternate_master_flag: true,
                    two_step_flag: false,
                    unicast_flag: true,
                    ptp_profile_specific_1: false,
                    ptp_profile_specific_2: true,
                    security_flag: false,
                    leap61: false,
                    leap59: true,
                    current_utc_offset_valid: false,
                    ptp_timescale: true,
                    time_traceable: false,
                    frequency_traceable: true,
                    correction_field: TimeInterval(I48F16::from_num(1.5f64)),
                    source_port_identity: PortIdentity {
                        clock_identity: ClockIdentity([0, 1, 2, 3, 4, 5, 6, 7]),
                        port_number: 0x5555,
                    },
                    sequence_id: 0xdead,
                    log_message_interval: 0x16,
                },
                message_type: MessageType::DelayResp,
                message_length: 0x36,
            },
        )];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 34];
            object_representation
                .header
                .serialize_header(
                    object_representation.message_type,
                    object_representation.message_length as usize
                        - object_representation.header.wire_size(),
                    &mut serialization_buffer,
                )
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data = Header::deserialize_header(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn dynamic_fields_leave_template_alone() {
        let template = Header {
            domain_number: 4,
            two_step_flag: true,
            source_port_identity: PortIdentity {
                clock_identity: ClockIdentity([9; 8]),
                port_number: 1,
            },
            ..Default::default()
        };

        let mut buffer = [0xffu8; 34];
        template.prime_template(&mut buffer).unwrap();
        assert_eq!(buffer[0], 0x80);
        assert_eq!(buffer[1], 0x02);
        assert_eq!(buffer[4], 4);
        assert_eq!(buffer[6], 0x02);
        assert_eq!(buffer[8..16], [0; 8]);
        assert_eq!(buffer[33], 0x7f);

        let dynamic = Header {
            sequence_id: 7,
            log_message_interval: -1,
            ..Default::default()
        };
        dynamic
            .pack_dynamic_fields(MessageType::FollowUp, 10, &mut buffer)
            .unwrap();

        let decoded = Header::deserialize_header(&buffer).unwrap();
        assert_eq!(decoded.message_type, MessageType::FollowUp);
        assert_eq!(decoded.message_length, 44);
        assert_eq!(decoded.header.sequence_id(), 7);
        assert_eq!(decoded.header.log_message_interval(), -1);
        assert_eq!(decoded.header.domain_number(), 4);
        assert!(decoded.header.two_step_flag());
        assert_eq!(
            decoded.header.source_port_identity(),
            template.source_port_identity
        );
        assert_eq!(buffer[32], 2);
    }
}

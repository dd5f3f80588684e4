use getset::CopyGetters;

use super::Header;
use crate::datastructures::{
    common::{PortIdentity, Timestamp},
    field_mut, WireFormat, WireFormatError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PDelayRespFollowUpMessage {
    pub(crate) header: Header,
    pub(crate) response_origin_timestamp: Timestamp,
    pub(crate) requesting_port_identity: PortIdentity,
}

impl PDelayRespFollowUpMessage {
    pub(crate) fn content_size(&self) -> usize {
        20
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 20)?;
        self.response_origin_timestamp
            .serialize(&mut buffer[0..10])?;
        self.requesting_port_identity
            .serialize(&mut buffer[10..20])
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        let buffer = buffer.get(0..20).ok_or(WireFormatError::BufferTooShort)?;
        Ok(Self {
            header,
            response_origin_timestamp: Timestamp::deserialize(&buffer[0..10])?,
            requesting_port_identity: PortIdentity::deserialize(&buffer[10..20])?,
        })
    }
}

use getset::CopyGetters;

use super::Header;
use crate::datastructures::{common::Timestamp, field_mut, WireFormat, WireFormatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PDelayReqMessage {
    pub(crate) header: Header,
    pub(crate) origin_timestamp: Timestamp,
}

impl PDelayReqMessage {
    /// The timestamp is followed by ten reserved bytes, so the request is as
    /// long as the response it triggers.
    pub(crate) fn content_size(&self) -> usize {
        20
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 20)?;
        self.origin_timestamp.serialize(&mut buffer[0..10])?;
        buffer[10..20].fill(0);
        Ok(())
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        let slice = buffer.get(0..10).ok_or(WireFormatError::BufferTooShort)?;

        Ok(Self {
            header,
            origin_timestamp: Timestamp::deserialize(slice)?,
        })
    }
}

use getset::CopyGetters;

use super::Header;
use crate::datastructures::{common::Timestamp, field_mut, WireFormat, WireFormatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct DelayReqMessage {
    pub(crate) header: Header,
    pub(crate) origin_timestamp: Timestamp,
}

impl DelayReqMessage {
    pub(crate) fn content_size(&self) -> usize {
        10
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.origin_timestamp.serialize(field_mut(buffer, 0, 10)?)
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        Ok(Self {
            header,
            origin_timestamp: Timestamp::deserialize(buffer)?,
        })
    }
}

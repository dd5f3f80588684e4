//! Ptp network messages

use num_enum::{IntoPrimitive, TryFromPrimitive};

mod announce;
mod control_field;
mod delay_req;
mod delay_resp;
mod follow_up;
mod header;
mod management;
mod message_builder;
mod p_delay_req;
mod p_delay_resp;
mod p_delay_resp_follow_up;
mod signalling;
mod sync;
mod template;

pub use announce::*;
pub use delay_req::*;
pub use delay_resp::*;
pub use follow_up::*;
pub use header::*;
pub use management::*;
pub use message_builder::*;
pub use p_delay_req::*;
pub use p_delay_resp::*;
pub use p_delay_resp_follow_up::*;
pub use signalling::*;
pub use sync::*;
pub use template::*;

use super::WireFormatError;

/// Largest datagram the engine sends or accepts
pub const MAX_DATA_LEN: usize = 255;

#[derive(Debug, Clone, Copy, TryFromPrimitive, IntoPrimitive, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Sync = 0x0,
    DelayReq = 0x1,
    PDelayReq = 0x2,
    PDelayResp = 0x3,
    FollowUp = 0x8,
    DelayResp = 0x9,
    PDelayRespFollowUp = 0xA,
    Announce = 0xB,
    Signaling = 0xC,
    Management = 0xD,
}

impl MessageType {
    /// The shortest datagram that can carry a message of this type
    pub const fn minimum_length(self) -> usize {
        match self {
            MessageType::Announce => 64,
            MessageType::Sync | MessageType::FollowUp | MessageType::DelayReq => 44,
            MessageType::PDelayReq
            | MessageType::DelayResp
            | MessageType::PDelayResp
            | MessageType::PDelayRespFollowUp => 54,
            MessageType::Management => 48,
            MessageType::Signaling => 44,
        }
    }

    /// Whether the message is sent on the event port and carries a timestamp
    pub const fn is_event(self) -> bool {
        matches!(
            self,
            MessageType::Sync
                | MessageType::DelayReq
                | MessageType::PDelayReq
                | MessageType::PDelayResp
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Sync(SyncMessage),
    DelayReq(DelayReqMessage),
    PDelayReq(PDelayReqMessage),
    PDelayResp(PDelayRespMessage),
    FollowUp(FollowUpMessage),
    DelayResp(DelayRespMessage),
    PDelayRespFollowUp(PDelayRespFollowUpMessage),
    Announce(AnnounceMessage),
    Signaling(SignalingMessage),
    Management(ManagementMessage),
}

impl Message {
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    pub fn header(&self) -> &Header {
        match self {
            Message::Sync(m) => &m.header,
            Message::DelayReq(m) => &m.header,
            Message::PDelayReq(m) => &m.header,
            Message::PDelayResp(m) => &m.header,
            Message::FollowUp(m) => &m.header,
            Message::DelayResp(m) => &m.header,
            Message::PDelayRespFollowUp(m) => &m.header,
            Message::Announce(m) => &m.header,
            Message::Signaling(m) => &m.header,
            Message::Management(m) => &m.header,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Sync(_) => MessageType::Sync,
            Message::DelayReq(_) => MessageType::DelayReq,
            Message::PDelayReq(_) => MessageType::PDelayReq,
            Message::PDelayResp(_) => MessageType::PDelayResp,
            Message::FollowUp(_) => MessageType::FollowUp,
            Message::DelayResp(_) => MessageType::DelayResp,
            Message::PDelayRespFollowUp(_) => MessageType::PDelayRespFollowUp,
            Message::Announce(_) => MessageType::Announce,
            Message::Signaling(_) => MessageType::Signaling,
            Message::Management(_) => MessageType::Management,
        }
    }

    /// The byte size on the wire of this message
    pub fn wire_size(&self) -> usize {
        self.header().wire_size() + self.content_size()
    }

    fn content_size(&self) -> usize {
        match self {
            Message::Sync(m) => m.content_size(),
            Message::DelayReq(m) => m.content_size(),
            Message::PDelayReq(m) => m.content_size(),
            Message::PDelayResp(m) => m.content_size(),
            Message::FollowUp(m) => m.content_size(),
            Message::DelayResp(m) => m.content_size(),
            Message::PDelayRespFollowUp(m) => m.content_size(),
            Message::Announce(m) => m.content_size(),
            Message::Signaling(m) => m.content_size(),
            Message::Management(m) => m.content_size(),
        }
    }

    fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = buffer
            .get_mut(HEADER_LENGTH..)
            .ok_or(WireFormatError::BufferTooShort)?;

        match self {
            Message::Sync(m) => m.serialize_content(buffer),
            Message::DelayReq(m) => m.serialize_content(buffer),
            Message::PDelayReq(m) => m.serialize_content(buffer),
            Message::PDelayResp(m) => m.serialize_content(buffer),
            Message::FollowUp(m) => m.serialize_content(buffer),
            Message::DelayResp(m) => m.serialize_content(buffer),
            Message::PDelayRespFollowUp(m) => m.serialize_content(buffer),
            Message::Announce(m) => m.serialize_content(buffer),
            Message::Signaling(m) => m.serialize_content(buffer),
            Message::Management(m) => m.serialize_content(buffer),
        }
    }

    /// Serializes the complete message into the PTP wire format.
    ///
    /// Returns the number of bytes used in the buffer.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize, WireFormatError> {
        self.header()
            .serialize_header(self.message_type(), self.content_size(), buffer)?;
        self.serialize_content(buffer)?;

        Ok(self.wire_size())
    }

    /// Write the message over a header template, touching only the fields
    /// owned by this message.
    ///
    /// Announce messages also own the time property flags of the header,
    /// every other kind clears them.
    pub(crate) fn pack(&self, buffer: &mut [u8]) -> Result<usize, WireFormatError> {
        self.header()
            .pack_dynamic_fields(self.message_type(), self.content_size(), buffer)?;

        buffer[7] = match self {
            Message::Announce(announce) => {
                let mut flags = [0u8; HEADER_LENGTH];
                announce
                    .header
                    .serialize_header(MessageType::Announce, 0, &mut flags)?;
                flags[7]
            }
            _ => 0,
        };

        self.serialize_content(buffer)?;

        Ok(self.wire_size())
    }

    /// Deserializes a message from the PTP wire format.
    ///
    /// A buffer shorter than the minimum length of the message type it claims
    /// to be is rejected with [`WireFormatError::Truncated`].
    pub fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let header_data = Header::deserialize_header(buffer)?;
        let message_type = header_data.message_type;

        let expected = message_type.minimum_length();
        if buffer.len() < expected {
            return Err(WireFormatError::Truncated {
                message_type,
                expected,
                actual: buffer.len(),
            });
        }

        // Skip the header bytes and only keep the content
        let content_buffer = &buffer[HEADER_LENGTH..];
        let header = header_data.header;

        Ok(match message_type {
            MessageType::Sync => {
                Message::Sync(SyncMessage::deserialize_content(header, content_buffer)?)
            }
            MessageType::DelayReq => {
                Message::DelayReq(DelayReqMessage::deserialize_content(header, content_buffer)?)
            }
            MessageType::PDelayReq => Message::PDelayReq(PDelayReqMessage::deserialize_content(
                header,
                content_buffer,
            )?),
            MessageType::PDelayResp => Message::PDelayResp(
                PDelayRespMessage::deserialize_content(header, content_buffer)?,
            ),
            MessageType::FollowUp => {
                Message::FollowUp(FollowUpMessage::deserialize_content(header, content_buffer)?)
            }
            MessageType::DelayResp => Message::DelayResp(DelayRespMessage::deserialize_content(
                header,
                content_buffer,
            )?),
            MessageType::PDelayRespFollowUp => Message::PDelayRespFollowUp(
                PDelayRespFollowUpMessage::deserialize_content(header, content_buffer)?,
            ),
            MessageType::Announce => {
                Message::Announce(AnnounceMessage::deserialize_content(header, content_buffer)?)
            }
            MessageType::Signaling => Message::Signaling(SignalingMessage::deserialize_content(
                header,
                content_buffer,
            )?),
            MessageType::Management => Message::Management(
                ManagementMessage::deserialize_content(header, content_buffer)?,
            ),
        })
    }
}

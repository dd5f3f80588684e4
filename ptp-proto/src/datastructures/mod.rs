//! General datastructures as defined by IEEE 1588-2008

use core::fmt::Debug;

pub mod common;
pub mod datasets;
pub mod messages;

use messages::MessageType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum WireFormatError {
    #[cfg_attr(feature = "std", error("enum value out of range"))]
    EnumConversionError,
    #[cfg_attr(feature = "std", error("buffer too short"))]
    BufferTooShort,
    #[cfg_attr(
        feature = "std",
        error("{message_type:?} message truncated: {actual} of {expected} bytes")
    )]
    Truncated {
        message_type: MessageType,
        expected: usize,
        actual: usize,
    },
}

impl<Enum: num_enum::TryFromPrimitive> From<num_enum::TryFromPrimitiveError<Enum>>
    for WireFormatError
{
    fn from(_: num_enum::TryFromPrimitiveError<Enum>) -> Self {
        Self::EnumConversionError
    }
}

pub(crate) trait WireFormat: Debug + Clone + Eq {
    /// Serializes the object into the PTP wire format.
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError>;

    /// Deserializes the object from the PTP wire format.
    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError>;
}

/// Copy a fixed-size field out of `buffer`, failing when the buffer is too short
pub(crate) fn field<const N: usize>(
    buffer: &[u8],
    offset: usize,
) -> Result<[u8; N], WireFormatError> {
    buffer
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(WireFormatError::BufferTooShort)
}

/// Mutable view on a fixed-size field of `buffer`
pub(crate) fn field_mut(
    buffer: &mut [u8],
    offset: usize,
    len: usize,
) -> Result<&mut [u8], WireFormatError> {
    buffer
        .get_mut(offset..offset + len)
        .ok_or(WireFormatError::BufferTooShort)
}

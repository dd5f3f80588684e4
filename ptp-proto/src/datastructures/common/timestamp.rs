use crate::{
    datastructures::{field, field_mut, WireFormat, WireFormatError},
    time::TimeInternal,
};

/// A timestamp as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    /// The seconds field of the timestamp.
    /// 48-bit, must be less than 281474976710656
    pub seconds: u64,
    /// The nanoseconds field of the timestamp.
    /// Must be less than 10^9
    pub nanos: u32,
}

impl WireFormat for Timestamp {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 10)?;
        buffer[0..2].copy_from_slice(&((self.seconds >> 32) as u16).to_be_bytes());
        buffer[2..6].copy_from_slice(&(self.seconds as u32).to_be_bytes());
        buffer[6..10].copy_from_slice(&self.nanos.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let msb = u16::from_be_bytes(field(buffer, 0)?);
        let lsb = u32::from_be_bytes(field(buffer, 2)?);

        Ok(Self {
            seconds: ((msb as u64) << 32) | lsb as u64,
            nanos: u32::from_be_bytes(field(buffer, 6)?),
        })
    }
}

impl From<Timestamp> for TimeInternal {
    /// Only the lower 32 bits of the seconds are kept, like every
    /// implementation with 32-bit time does until 2038.
    fn from(ts: Timestamp) -> Self {
        TimeInternal::new(ts.seconds as u32 as i32, ts.nanos as i32)
    }
}

impl From<TimeInternal> for Timestamp {
    /// Negative times cannot be represented and become the zero timestamp
    fn from(time: TimeInternal) -> Self {
        if time.seconds < 0 || time.nanoseconds < 0 {
            log::error!("negative time {time} cannot be put on the wire");
            return Timestamp::default();
        }

        Timestamp {
            seconds: time.seconds as u64,
            nanos: time.nanoseconds as u32,
        }
    }
}

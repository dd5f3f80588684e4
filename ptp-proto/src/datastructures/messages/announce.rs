use getset::CopyGetters;

use super::Header;
use crate::datastructures::{
    common::{ClockIdentity, ClockQuality, TimeSource, Timestamp},
    datasets::TimePropertiesDS,
    field, field_mut, WireFormat, WireFormatError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct AnnounceMessage {
    pub(crate) header: Header,
    pub(crate) origin_timestamp: Timestamp,
    pub(crate) current_utc_offset: i16,
    pub(crate) grandmaster_priority_1: u8,
    pub(crate) grandmaster_clock_quality: ClockQuality,
    pub(crate) grandmaster_priority_2: u8,
    pub(crate) grandmaster_identity: ClockIdentity,
    pub(crate) steps_removed: u16,
    pub(crate) time_source: TimeSource,
}

impl AnnounceMessage {
    pub(crate) fn content_size(&self) -> usize {
        30
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = field_mut(buffer, 0, 30)?;
        self.origin_timestamp.serialize(&mut buffer[0..10])?;
        buffer[10..12].copy_from_slice(&self.current_utc_offset.to_be_bytes());
        buffer[12] = 0;
        buffer[13] = self.grandmaster_priority_1;
        self.grandmaster_clock_quality
            .serialize(&mut buffer[14..18])?;
        buffer[18] = self.grandmaster_priority_2;
        self.grandmaster_identity.serialize(&mut buffer[19..27])?;
        buffer[27..29].copy_from_slice(&self.steps_removed.to_be_bytes());
        buffer[29] = self.time_source.into();

        Ok(())
    }

    pub(crate) fn deserialize_content(
        header: Header,
        buffer: &[u8],
    ) -> Result<Self, WireFormatError> {
        let buffer = buffer.get(0..30).ok_or(WireFormatError::BufferTooShort)?;
        Ok(Self {
            header,
            origin_timestamp: Timestamp::deserialize(&buffer[0..10])?,
            current_utc_offset: i16::from_be_bytes(field(buffer, 10)?),
            grandmaster_priority_1: buffer[13],
            grandmaster_clock_quality: ClockQuality::deserialize(&buffer[14..18])?,
            grandmaster_priority_2: buffer[18],
            grandmaster_identity: ClockIdentity::deserialize(&buffer[19..27])?,
            steps_removed: u16::from_be_bytes(field(buffer, 27)?),
            time_source: TimeSource::from(buffer[29]),
        })
    }

    /// The time properties advertised by the sender of this announce
    pub fn time_properties(&self) -> TimePropertiesDS {
        TimePropertiesDS {
            current_utc_offset: self.current_utc_offset,
            current_utc_offset_valid: self.header.current_utc_offset_valid,
            leap59: self.header.leap59,
            leap61: self.header.leap61,
            time_traceable: self.header.time_traceable,
            frequency_traceable: self.header.frequency_traceable,
            ptp_timescale: self.header.ptp_timescale,
            time_source: self.time_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockAccuracy;

    #[test]
    fn announce_wireformat() {
        let representations = [(
            [
                0x00, 0x00, 0x45, 0xb1, 0x11, 0x5a, 0x0a, 0x73, 0x46, 0x60, 0x00, 0x22, 0x00, 0x60,
                0xf8, 0xfe, 0x13, 0x88, 0x63, 0xff, 0xff, 0x00, 0x09, 0xba, 0xf8, 0x21, 0x00, 0x00,
                0x80, 0xa0,
            ],
            AnnounceMessage {
                header: Header::default(),
                origin_timestamp: Timestamp {
                    seconds: 1169232218,
                    nanos: 175326816,
                },
                current_utc_offset: 34,
                grandmaster_priority_1: 96,
                grandmaster_clock_quality: ClockQuality {
                    clock_class: 248,
                    clock_accuracy: ClockAccuracy::UNKNOWN,
                    offset_scaled_log_variance: 5000,
                },
                grandmaster_priority_2: 99,
                grandmaster_identity: ClockIdentity([
                    0xff, 0xff, 0x00, 0x09, 0xba, 0xf8, 0x21, 0x00,
                ]),
                steps_removed: 128,
                time_source: TimeSource::InternalOscillator,
            },
        )];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 30];
            object_representation
                .serialize_content(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data =
                AnnounceMessage::deserialize_content(Header::default(), &byte_representation)
                    .unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn time_properties_follow_header_flags() {
        let announce = AnnounceMessage {
            header: Header {
                leap59: true,
                ptp_timescale: true,
                ..Default::default()
            },
            origin_timestamp: Timestamp::default(),
            current_utc_offset: 37,
            grandmaster_priority_1: 128,
            grandmaster_clock_quality: ClockQuality::default(),
            grandmaster_priority_2: 128,
            grandmaster_identity: ClockIdentity::default(),
            steps_removed: 0,
            time_source: TimeSource::Gnss,
        };

        let properties = announce.time_properties();
        assert!(properties.leap59);
        assert!(!properties.leap61);
        assert!(properties.ptp_timescale);
        assert_eq!(properties.current_utc_offset, 37);
        assert_eq!(properties.time_source, TimeSource::Gnss);
    }
}

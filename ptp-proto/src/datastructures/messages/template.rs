use super::{Header, Message, MAX_DATA_LEN};
use crate::datastructures::{
    common::{PortIdentity, Timestamp},
    datasets::{ParentDS, TimePropertiesDS},
    WireFormatError,
};

/// The outgoing message buffer of a port.
///
/// The static part of the header (version, domain, flags and source port
/// identity) is written once by [`MessageTemplate::prime`]. The `pack_*`
/// functions then only rewrite what differs between messages and hand back
/// the bytes to send.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    buffer: [u8; MAX_DATA_LEN],
}

impl MessageTemplate {
    pub fn new() -> Self {
        Self {
            buffer: [0; MAX_DATA_LEN],
        }
    }

    pub fn prime(
        &mut self,
        domain_number: u8,
        two_step: bool,
        source_port_identity: PortIdentity,
    ) -> Result<(), WireFormatError> {
        Header {
            domain_number,
            two_step_flag: two_step,
            source_port_identity,
            ..Header::new()
        }
        .prime_template(&mut self.buffer)
    }

    fn pack(&mut self, message: Message) -> Result<&[u8], WireFormatError> {
        let length = message.pack(&mut self.buffer)?;
        Ok(&self.buffer[..length])
    }

    pub fn pack_announce(
        &mut self,
        sequence_id: u16,
        log_announce_interval: i8,
        origin_timestamp: Timestamp,
        parent: &ParentDS,
        time_properties: &TimePropertiesDS,
        steps_removed: u16,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(sequence_id)
                .log_message_interval(log_announce_interval)
                .time_properties(time_properties)
                .announce_message(
                    origin_timestamp,
                    time_properties.current_utc_offset,
                    parent.grandmaster_priority_1,
                    parent.grandmaster_clock_quality,
                    parent.grandmaster_priority_2,
                    parent.grandmaster_identity,
                    steps_removed,
                    time_properties.time_source,
                ),
        )
    }

    pub fn pack_sync(
        &mut self,
        sequence_id: u16,
        log_sync_interval: i8,
        origin_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(sequence_id)
                .log_message_interval(log_sync_interval)
                .sync_message(origin_timestamp),
        )
    }

    pub fn pack_follow_up(
        &mut self,
        sequence_id: u16,
        log_sync_interval: i8,
        precise_origin_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(sequence_id)
                .log_message_interval(log_sync_interval)
                .follow_up_message(precise_origin_timestamp),
        )
    }

    pub fn pack_delay_req(
        &mut self,
        sequence_id: u16,
        origin_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(sequence_id)
                .log_message_interval(super::header::LOG_INTERVAL_UNUSED)
                .delay_req_message(origin_timestamp),
        )
    }

    /// Answer `request`, echoing its correction and sequence id
    pub fn pack_delay_resp(
        &mut self,
        request: &Header,
        log_min_delay_req_interval: i8,
        receive_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(request.sequence_id)
                .correction_field(request.correction_field)
                .log_message_interval(log_min_delay_req_interval)
                .delay_resp_message(receive_timestamp, request.source_port_identity),
        )
    }

    pub fn pack_pdelay_req(
        &mut self,
        sequence_id: u16,
        origin_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(sequence_id)
                .log_message_interval(super::header::LOG_INTERVAL_UNUSED)
                .pdelay_req_message(origin_timestamp),
        )
    }

    /// Answer `request` with a zero correction
    pub fn pack_pdelay_resp(
        &mut self,
        request: &Header,
        request_receive_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(request.sequence_id)
                .log_message_interval(super::header::LOG_INTERVAL_UNUSED)
                .pdelay_resp_message(request_receive_timestamp, request.source_port_identity),
        )
    }

    /// Follow up on a response to `request`, carrying the request's correction
    pub fn pack_pdelay_resp_follow_up(
        &mut self,
        request: &Header,
        response_origin_timestamp: Timestamp,
    ) -> Result<&[u8], WireFormatError> {
        self.pack(
            Message::builder()
                .sequence_id(request.sequence_id)
                .correction_field(request.correction_field)
                .log_message_interval(super::header::LOG_INTERVAL_UNUSED)
                .pdelay_resp_follow_up_message(
                    response_origin_timestamp,
                    request.source_port_identity,
                ),
        )
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new()
    }
}

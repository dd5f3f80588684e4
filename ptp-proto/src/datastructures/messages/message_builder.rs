use super::{
    AnnounceMessage, DelayReqMessage, DelayRespMessage, FollowUpMessage, Header,
    ManagementAction, ManagementMessage, Message, PDelayReqMessage, PDelayRespFollowUpMessage,
    PDelayRespMessage, SignalingMessage, SyncMessage,
};
use crate::datastructures::{
    common::{ClockIdentity, ClockQuality, PortIdentity, TimeInterval, TimeSource, Timestamp},
    datasets::TimePropertiesDS,
};

/// A builder to build messages with.
///
/// The message type and length in the header always follow from the kind of
/// message that is built, so they cannot disagree with the content.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    header: Header,
}

impl MessageBuilder {
    /// Start the process of building a new message
    pub fn new() -> MessageBuilder {
        MessageBuilder {
            header: Header::new(),
        }
    }

    pub fn domain_number(mut self, domain_number: u8) -> Self {
        self.header.domain_number = domain_number;
        self
    }

    pub fn two_step_flag(mut self, two_step_flag: bool) -> Self {
        self.header.two_step_flag = two_step_flag;
        self
    }

    pub fn leap61(mut self, leap61: bool) -> Self {
        self.header.leap61 = leap61;
        self
    }

    pub fn leap59(mut self, leap59: bool) -> Self {
        self.header.leap59 = leap59;
        self
    }

    pub fn ptp_timescale(mut self, ptp_timescale: bool) -> Self {
        self.header.ptp_timescale = ptp_timescale;
        self
    }

    /// Set every time property flag of the header at once
    pub fn time_properties(mut self, properties: &TimePropertiesDS) -> Self {
        self.header.leap59 = properties.leap59;
        self.header.leap61 = properties.leap61;
        self.header.current_utc_offset_valid = properties.current_utc_offset_valid;
        self.header.ptp_timescale = properties.ptp_timescale;
        self.header.time_traceable = properties.time_traceable;
        self.header.frequency_traceable = properties.frequency_traceable;
        self
    }

    pub fn correction_field(mut self, correction_field: TimeInterval) -> Self {
        self.header.correction_field = correction_field;
        self
    }

    pub fn source_port_identity(mut self, source_port_identity: PortIdentity) -> Self {
        self.header.source_port_identity = source_port_identity;
        self
    }

    pub fn sequence_id(mut self, sequence_id: u16) -> Self {
        self.header.sequence_id = sequence_id;
        self
    }

    pub fn log_message_interval(mut self, log_message_interval: i8) -> Self {
        self.header.log_message_interval = log_message_interval;
        self
    }

    pub fn sync_message(self, origin_timestamp: Timestamp) -> Message {
        Message::Sync(SyncMessage {
            header: self.header,
            origin_timestamp,
        })
    }

    pub fn delay_req_message(self, origin_timestamp: Timestamp) -> Message {
        Message::DelayReq(DelayReqMessage {
            header: self.header,
            origin_timestamp,
        })
    }

    pub fn pdelay_req_message(self, origin_timestamp: Timestamp) -> Message {
        Message::PDelayReq(PDelayReqMessage {
            header: self.header,
            origin_timestamp,
        })
    }

    pub fn follow_up_message(self, precise_origin_timestamp: Timestamp) -> Message {
        Message::FollowUp(FollowUpMessage {
            header: self.header,
            precise_origin_timestamp,
        })
    }

    pub fn delay_resp_message(
        self,
        receive_timestamp: Timestamp,
        requesting_port_identity: PortIdentity,
    ) -> Message {
        Message::DelayResp(DelayRespMessage {
            header: self.header,
            receive_timestamp,
            requesting_port_identity,
        })
    }

    pub fn pdelay_resp_message(
        self,
        request_receive_timestamp: Timestamp,
        requesting_port_identity: PortIdentity,
    ) -> Message {
        Message::PDelayResp(PDelayRespMessage {
            header: self.header,
            request_receive_timestamp,
            requesting_port_identity,
        })
    }

    pub fn pdelay_resp_follow_up_message(
        self,
        response_origin_timestamp: Timestamp,
        requesting_port_identity: PortIdentity,
    ) -> Message {
        Message::PDelayRespFollowUp(PDelayRespFollowUpMessage {
            header: self.header,
            response_origin_timestamp,
            requesting_port_identity,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn announce_message(
        self,
        origin_timestamp: Timestamp,
        current_utc_offset: i16,
        grandmaster_priority_1: u8,
        grandmaster_clock_quality: ClockQuality,
        grandmaster_priority_2: u8,
        grandmaster_identity: ClockIdentity,
        steps_removed: u16,
        time_source: TimeSource,
    ) -> Message {
        Message::Announce(AnnounceMessage {
            header: self.header,
            origin_timestamp,
            current_utc_offset,
            grandmaster_priority_1,
            grandmaster_clock_quality,
            grandmaster_priority_2,
            grandmaster_identity,
            steps_removed,
            time_source,
        })
    }

    pub fn signaling_message(self, target_port_identity: PortIdentity) -> Message {
        Message::Signaling(SignalingMessage {
            header: self.header,
            target_port_identity,
        })
    }

    pub fn management_message(
        self,
        target_port_identity: PortIdentity,
        starting_boundary_hops: u8,
        boundary_hops: u8,
        action: ManagementAction,
    ) -> Message {
        Message::Management(ManagementMessage {
            header: self.header,
            target_port_identity,
            starting_boundary_hops,
            boundary_hops,
            action,
        })
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        MessageBuilder::new()
    }
}

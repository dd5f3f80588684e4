//! Dispatch of received messages

use rand::Rng;

use super::{
    PendingPDelayResp, PendingSync, Port, PortError, PortEvent, PortState, Result, TimerId,
    TimerProvider,
};
use crate::{
    clock::Clock,
    config::DelayMechanism,
    datastructures::{
        common::PortIdentity,
        messages::{
            AnnounceMessage, DelayReqMessage, DelayRespMessage, FollowUpMessage, Header, Message,
            PDelayReqMessage, PDelayRespFollowUpMessage, PDelayRespMessage, SyncMessage,
            HEADER_LENGTH,
        },
        WireFormatError,
    },
    network::{NetworkPacket, NetworkPort},
    time::TimeInternal,
};

impl<N, C, P, R> Port<N, C, P, R>
where
    N: NetworkPort,
    C: Clock,
    P: TimerProvider,
    R: Rng,
{
    /// Receive and dispatch at most one message, event port first
    pub(super) fn handle(&mut self) {
        let received = match self.network.recv_event() {
            Ok(Some(packet)) => Ok(Some((packet, true))),
            Ok(None) => self
                .network
                .recv_general()
                .map(|packet| packet.map(|packet| (packet, false))),
            Err(error) => Err(error),
        };

        let (packet, is_event) = match received {
            Ok(Some(received)) => received,
            Ok(None) => return,
            Err(error) => {
                log::error!("failed to receive message: {error:?}");
                self.to_state(PortState::Faulty);
                return;
            }
        };

        if let Err(error) = self.handle_packet(&packet, is_event) {
            self.fault(error);
        }
    }

    fn handle_packet(&mut self, packet: &NetworkPacket, is_event: bool) -> Result<()> {
        let data = packet.data.as_slice();
        if data.len() < HEADER_LENGTH {
            log::error!("message shorter than header: {} bytes", data.len());
            return Err(PortError::ShortMessage);
        }

        let header = match Header::deserialize_header(data) {
            Ok(deserialized) => deserialized.header,
            Err(WireFormatError::EnumConversionError) => {
                log::debug!("ignoring message of unknown type");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        if header.version() != self.port_ds.version_number {
            log::debug!("ignoring message of version {}", header.version());
            return Ok(());
        }

        if header.domain_number() != self.default_ds.domain_number {
            log::debug!("ignoring message from domain {}", header.domain_number());
            return Ok(());
        }

        let message = match Message::deserialize(data) {
            Ok(message) => message,
            Err(error @ WireFormatError::Truncated { .. }) => return Err(error.into()),
            Err(error) => {
                log::debug!("ignoring malformed message: {error:?}");
                return Ok(());
            }
        };

        let mut time = if is_event {
            match packet.timestamp {
                Some(time) => time,
                None => {
                    log::error!("no receive timestamp for {:?}", message.message_type());
                    return Ok(());
                }
            }
        } else {
            TimeInternal::ZERO
        };

        let from_self = header.source_port_identity() == self.port_ds.port_identity;
        if !from_self && time.seconds > 0 {
            time -= self.config.port.latency.inbound;
        }

        log::trace!(
            "received {:?} from {} in state {}",
            message.message_type(),
            header.source_port_identity(),
            self.state()
        );

        match message {
            Message::Announce(announce) => self.handle_announce(&announce, from_self),
            Message::Sync(sync) => self.handle_sync(&sync, time, from_self),
            Message::FollowUp(follow_up) => self.handle_follow_up(&follow_up, from_self),
            Message::DelayReq(request) => return self.handle_delay_req(&request, time, from_self),
            Message::DelayResp(response) => self.handle_delay_resp(&response, from_self),
            Message::PDelayReq(request) => {
                return self.handle_pdelay_req(&request, time, from_self)
            }
            Message::PDelayResp(response) => self.handle_pdelay_resp(&response, time, from_self),
            Message::PDelayRespFollowUp(follow_up) => {
                self.handle_pdelay_resp_follow_up(&follow_up, from_self)
            }
            Message::Management(_) | Message::Signaling(_) => {
                log::trace!("{:?} messages are not supported", message.message_type());
            }
        }

        Ok(())
    }

    fn is_from_parent(&self, header: &Header) -> bool {
        header.source_port_identity() == self.parent_ds.parent_port_identity
    }

    fn handle_announce(&mut self, announce: &AnnounceMessage, from_self: bool) {
        if from_self {
            log::trace!("ignoring own announce");
            return;
        }

        match self.state() {
            PortState::Initializing | PortState::Faulty | PortState::Disabled => {}
            PortState::Uncalibrated | PortState::Slave => {
                if self.is_from_parent(&announce.header()) {
                    self.bmc().s1(announce);
                    self.timers
                        .start(TimerId::AnnounceReceipt, self.announce_receipt_timeout());
                } else {
                    self.foreign_masters.add_foreign(announce);
                    self.events.raise(PortEvent::StateDecision);
                }
            }
            PortState::Passive => {
                self.timers
                    .start(TimerId::AnnounceReceipt, self.announce_receipt_timeout());
                self.foreign_masters.add_foreign(announce);
                self.events.raise(PortEvent::StateDecision);
            }
            PortState::Listening | PortState::PreMaster | PortState::Master => {
                self.foreign_masters.add_foreign(announce);
                self.events.raise(PortEvent::StateDecision);
            }
        }
    }

    fn handle_sync(&mut self, sync: &SyncMessage, time: TimeInternal, from_self: bool) {
        let state = self.state();
        if !state.is_slave() || from_self || !self.is_from_parent(&sync.header()) {
            return;
        }

        let correction = TimeInternal::from(sync.header().correction_field());

        if sync.header().two_step_flag() {
            self.pending_sync = Some(PendingSync {
                sequence_id: sync.header().sequence_id(),
                receive_time: time,
                correction,
            });
        } else {
            self.pending_sync = None;
            let path_delay = self.path_delay();
            self.servo.update_offset(
                &mut self.current_ds,
                time,
                sync.origin_timestamp().into(),
                correction,
                path_delay,
                state,
                &mut self.events,
            );
            self.update_clock();
        }
    }

    fn handle_follow_up(&mut self, follow_up: &FollowUpMessage, from_self: bool) {
        let state = self.state();
        if !state.is_slave() || from_self || !self.is_from_parent(&follow_up.header()) {
            return;
        }

        let Some(pending) = self.pending_sync else {
            log::trace!("ignoring unexpected follow up");
            return;
        };

        if pending.sequence_id != follow_up.header().sequence_id() {
            log::trace!(
                "ignoring follow up {} while waiting for {}",
                follow_up.header().sequence_id(),
                pending.sequence_id
            );
            return;
        }

        self.pending_sync = None;
        let correction =
            pending.correction + TimeInternal::from(follow_up.header().correction_field());
        let path_delay = self.path_delay();
        self.servo.update_offset(
            &mut self.current_ds,
            pending.receive_time,
            follow_up.precise_origin_timestamp().into(),
            correction,
            path_delay,
            state,
            &mut self.events,
        );
        self.update_clock();
    }

    fn handle_delay_req(
        &mut self,
        request: &DelayReqMessage,
        time: TimeInternal,
        from_self: bool,
    ) -> Result<()> {
        if self.port_ds.delay_mechanism != DelayMechanism::E2E {
            log::debug!("ignoring delay request, peer delay mechanism configured");
            return Ok(());
        }

        if self.state() == PortState::Master && !from_self {
            self.issue_delay_resp(&request.header(), time)?;
        }

        Ok(())
    }

    fn handle_delay_resp(&mut self, response: &DelayRespMessage, from_self: bool) {
        if self.port_ds.delay_mechanism != DelayMechanism::E2E {
            log::debug!("ignoring delay response, peer delay mechanism configured");
            return;
        }

        if !self.state().is_slave() || from_self || !self.is_from_parent(&response.header()) {
            return;
        }

        let Some(send_time) = self.delay_req_send_time else {
            return;
        };

        if response.requesting_port_identity() != self.port_ds.port_identity
            || response.header().sequence_id() != self.delay_req_ids.last()
        {
            log::trace!(
                "ignoring delay response {} for {}",
                response.header().sequence_id(),
                response.requesting_port_identity()
            );
            return;
        }

        self.servo.update_delay(
            &mut self.current_ds,
            send_time,
            response.receive_timestamp().into(),
            response.header().correction_field().into(),
        );
        self.port_ds.log_min_delay_req_interval = response.header().log_message_interval();
    }

    fn handle_pdelay_req(
        &mut self,
        request: &PDelayReqMessage,
        time: TimeInternal,
        from_self: bool,
    ) -> Result<()> {
        if self.port_ds.delay_mechanism != DelayMechanism::P2P {
            log::debug!("ignoring peer delay request, end to end mechanism configured");
            return Ok(());
        }

        if !self.state().is_active() || from_self {
            return Ok(());
        }

        let sent = self.issue_pdelay_resp(&request.header(), time)?;
        if self.default_ds.two_step_flag {
            let egress = match sent {
                Some(egress) => egress,
                None => self.clock.now() + self.config.port.latency.outbound,
            };
            self.issue_pdelay_resp_follow_up(&request.header(), egress)?;
        }

        Ok(())
    }

    /// Whether the port measures the peer delay in its current state
    fn measures_peer_delay(&self) -> bool {
        matches!(
            self.state(),
            PortState::Master | PortState::Passive | PortState::Uncalibrated | PortState::Slave
        )
    }

    /// Whether `header` answers our latest peer delay request
    fn answers_pdelay_req(&self, header: &Header, requesting: PortIdentity) -> bool {
        requesting == self.port_ds.port_identity
            && header.sequence_id() == self.pdelay_req_ids.last()
    }

    fn handle_pdelay_resp(
        &mut self,
        response: &PDelayRespMessage,
        time: TimeInternal,
        from_self: bool,
    ) {
        if self.port_ds.delay_mechanism != DelayMechanism::P2P {
            log::debug!("ignoring peer delay response, end to end mechanism configured");
            return;
        }

        if !self.measures_peer_delay() || from_self {
            return;
        }

        if !self.answers_pdelay_req(&response.header(), response.requesting_port_identity()) {
            log::trace!(
                "ignoring peer delay response {}",
                response.header().sequence_id()
            );
            return;
        }

        let Some(mut times) = self.pdelay_times else {
            return;
        };

        times.t2 = response.request_receive_timestamp().into();
        times.t4 = time;
        let correction = TimeInternal::from(response.header().correction_field());

        if response.header().two_step_flag() {
            self.pdelay_times = Some(times);
            self.pending_pdelay_resp = Some(PendingPDelayResp {
                responder: response.header().source_port_identity(),
                correction,
            });
        } else {
            self.pending_pdelay_resp = None;
            self.servo
                .update_peer_delay(&mut self.port_ds, times, correction, false);
        }
    }

    fn handle_pdelay_resp_follow_up(
        &mut self,
        follow_up: &PDelayRespFollowUpMessage,
        from_self: bool,
    ) {
        if self.port_ds.delay_mechanism != DelayMechanism::P2P {
            log::debug!("ignoring peer delay follow up, end to end mechanism configured");
            return;
        }

        if !self.measures_peer_delay() || from_self {
            return;
        }

        if !self.answers_pdelay_req(&follow_up.header(), follow_up.requesting_port_identity()) {
            return;
        }

        let (Some(pending), Some(mut times)) = (self.pending_pdelay_resp, self.pdelay_times) else {
            log::trace!("ignoring unexpected peer delay follow up");
            return;
        };

        if pending.responder != follow_up.header().source_port_identity() {
            return;
        }

        self.pending_pdelay_resp = None;
        times.t3 = follow_up.response_origin_timestamp().into();
        let correction =
            pending.correction + TimeInternal::from(follow_up.header().correction_field());
        self.servo
            .update_peer_delay(&mut self.port_ds, times, correction, true);
    }
}

//! Construction and transmission of outgoing messages

use rand::Rng;

use super::{Port, PortError, Result, TimerId, TimerProvider};
use crate::{
    clock::Clock,
    config::DelayMechanism,
    datastructures::messages::Header,
    network::NetworkPort,
    servo::PeerDelayTimes,
    time::TimeInternal,
};

fn send_failed<E: core::fmt::Debug>(what: &'static str) -> impl FnOnce(E) -> PortError {
    move |error| {
        log::error!("failed to send {what}: {error:?}");
        PortError::Network
    }
}

impl<N, C, P, R> Port<N, C, P, R>
where
    N: NetworkPort,
    C: Clock,
    P: TimerProvider,
    R: Rng,
{
    /// The moment a message left the port. Falls back to `origin` when the
    /// adapter gives no transmit timestamp.
    fn egress_time(&self, sent: Option<TimeInternal>, origin: TimeInternal) -> TimeInternal {
        match sent {
            Some(time) => time + self.config.port.latency.outbound,
            None => origin,
        }
    }

    pub(super) fn issue_announce(&mut self) -> Result<()> {
        let now = self.clock.now();
        let sequence_id = self.announce_ids.peek();
        let data = self.template.pack_announce(
            sequence_id,
            self.port_ds.log_announce_interval,
            now.into(),
            &self.parent_ds,
            &self.time_properties_ds,
            self.current_ds.steps_removed,
        )?;
        self.network
            .send_general(data)
            .map_err(send_failed("announce"))?;

        log::trace!("sent announce {sequence_id}");
        self.announce_ids.advance();
        Ok(())
    }

    pub(super) fn issue_sync(&mut self) -> Result<()> {
        let now = self.clock.now();
        let sequence_id = self.sync_ids.peek();
        let data =
            self.template
                .pack_sync(sequence_id, self.port_ds.log_sync_interval, now.into())?;
        let sent = self.network.send_event(data).map_err(send_failed("sync"))?;

        log::trace!("sent sync {sequence_id}");
        self.sync_ids.advance();

        if self.default_ds.two_step_flag {
            let egress = self.egress_time(sent, now);
            self.issue_follow_up(self.sync_ids.last(), egress)?;
        }

        Ok(())
    }

    fn issue_follow_up(&mut self, sequence_id: u16, precise_origin: TimeInternal) -> Result<()> {
        let data = self.template.pack_follow_up(
            sequence_id,
            self.port_ds.log_sync_interval,
            precise_origin.into(),
        )?;
        self.network
            .send_general(data)
            .map_err(send_failed("follow up"))?;

        log::trace!("sent follow up {sequence_id}");
        Ok(())
    }

    fn issue_delay_req(&mut self) -> Result<()> {
        let now = self.clock.now();
        let sequence_id = self.delay_req_ids.peek();
        let data = self.template.pack_delay_req(sequence_id, now.into())?;
        let sent = self
            .network
            .send_event(data)
            .map_err(send_failed("delay request"))?;

        log::trace!("sent delay request {sequence_id}");
        self.delay_req_ids.advance();
        self.delay_req_send_time = Some(self.egress_time(sent, now));
        Ok(())
    }

    pub(super) fn issue_delay_resp(
        &mut self,
        request: &Header,
        receive_time: TimeInternal,
    ) -> Result<()> {
        let data = self.template.pack_delay_resp(
            request,
            self.port_ds.log_min_delay_req_interval,
            receive_time.into(),
        )?;
        self.network
            .send_general(data)
            .map_err(send_failed("delay response"))?;

        log::trace!(
            "answered delay request {} from {}",
            request.sequence_id(),
            request.source_port_identity()
        );
        Ok(())
    }

    fn issue_pdelay_req(&mut self) -> Result<()> {
        let now = self.clock.now();
        let sequence_id = self.pdelay_req_ids.peek();
        let data = self.template.pack_pdelay_req(sequence_id, now.into())?;
        let sent = self
            .network
            .send_peer_event(data)
            .map_err(send_failed("peer delay request"))?;

        log::trace!("sent peer delay request {sequence_id}");
        self.pdelay_req_ids.advance();
        self.pending_pdelay_resp = None;
        self.pdelay_times = Some(PeerDelayTimes {
            t1: self.egress_time(sent, now),
            ..Default::default()
        });
        Ok(())
    }

    /// Answer a peer delay request, returning the egress time of the response
    /// when the adapter knows it
    pub(super) fn issue_pdelay_resp(
        &mut self,
        request: &Header,
        receive_time: TimeInternal,
    ) -> Result<Option<TimeInternal>> {
        let data = self
            .template
            .pack_pdelay_resp(request, receive_time.into())?;
        let sent = self
            .network
            .send_peer_event(data)
            .map_err(send_failed("peer delay response"))?;

        Ok(sent.map(|time| time + self.config.port.latency.outbound))
    }

    pub(super) fn issue_pdelay_resp_follow_up(
        &mut self,
        request: &Header,
        response_origin: TimeInternal,
    ) -> Result<()> {
        let data = self
            .template
            .pack_pdelay_resp_follow_up(request, response_origin.into())?;
        self.network
            .send_peer_general(data)
            .map_err(send_failed("peer delay response follow up"))
    }

    /// Send a (peer) delay request when its interval timer expired, then
    /// rearm the timer with a fresh random interval.
    ///
    /// End to end requests only go out while following a master.
    pub(super) fn issue_delay_req_timer_expired(&mut self) -> Result<()> {
        match self.port_ds.delay_mechanism {
            DelayMechanism::E2E => {
                if !self.state().is_slave()
                    || !self.timers.poll_expired(TimerId::DelayReqInterval)
                {
                    return Ok(());
                }

                let interval =
                    self.random_interval(self.port_ds.log_min_delay_req_interval.saturating_add(1));
                self.timers.start(TimerId::DelayReqInterval, interval);
                self.issue_delay_req()
            }
            DelayMechanism::P2P => {
                if !self.timers.poll_expired(TimerId::PDelayReqInterval) {
                    return Ok(());
                }

                let interval = self
                    .random_interval(self.port_ds.log_min_pdelay_req_interval.saturating_add(1));
                self.timers.start(TimerId::PDelayReqInterval, interval);
                self.issue_pdelay_req()
            }
        }
    }
}

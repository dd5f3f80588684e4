//! The port state machine of an ordinary clock.
//!
//! A [`Port`] owns every piece of protocol state: the datasets, the foreign
//! master table, the servo, the sequence counters and the outgoing message
//! template. One call to [`Port::do_state`] performs one engine iteration:
//! evaluate pending state decisions, move toward the recommended state, then
//! run the actions of the current state, handling at most one inbound
//! message.

pub use error::{PortError, Result};
pub use events::{EventSet, PortEvent};
pub use sequence_id::SequenceIdGenerator;
pub use state::PortState;
pub use timers::{Alert, ExpiryFlags, TimerBank, TimerId, TimerProvider};

use rand::Rng;

use crate::{
    bmc::{Bmc, ForeignMasterTable, RecommendedState},
    clock::Clock,
    config::{Config, DelayMechanism},
    datastructures::{
        common::{PortIdentity, SLAVE_ONLY_CLOCK_CLASS},
        datasets::{CurrentDS, DefaultDS, ParentDS, PortDS, TimePropertiesDS},
        messages::MessageTemplate,
    },
    network::NetworkPort,
    servo::{ClockUpdate, PeerDelayTimes, Servo},
    time::{Interval, TimeInternal},
};

mod error;
mod events;
mod handle;
mod issue;
mod sequence_id;
mod state;
mod timers;

/// A sync message waiting for its follow up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSync {
    sequence_id: u16,
    receive_time: TimeInternal,
    correction: TimeInternal,
}

/// A two-step peer delay response waiting for its follow up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPDelayResp {
    responder: PortIdentity,
    correction: TimeInternal,
}

pub struct Port<N, C, P, R> {
    config: Config,
    network: N,
    clock: C,
    timers: TimerBank<P>,
    rng: R,

    default_ds: DefaultDS,
    current_ds: CurrentDS,
    parent_ds: ParentDS,
    time_properties_ds: TimePropertiesDS,
    port_ds: PortDS,
    recommended_state: RecommendedState,

    foreign_masters: ForeignMasterTable,
    servo: Servo,
    events: EventSet,
    template: MessageTemplate,

    announce_ids: SequenceIdGenerator,
    sync_ids: SequenceIdGenerator,
    delay_req_ids: SequenceIdGenerator,
    pdelay_req_ids: SequenceIdGenerator,

    pending_sync: Option<PendingSync>,
    /// Egress time of the last delay request
    delay_req_send_time: Option<TimeInternal>,
    /// The peer delay exchange in progress
    pdelay_times: Option<PeerDelayTimes>,
    pending_pdelay_resp: Option<PendingPDelayResp>,
}

impl<N, C, P, R> Port<N, C, P, R>
where
    N: NetworkPort,
    C: Clock,
    P: TimerProvider,
    R: Rng,
{
    /// Create a port in the initializing state. The first call to
    /// [`Port::do_state`] initializes it.
    pub fn new(config: Config, network: N, clock: C, timers: P, rng: R) -> Self {
        let config = config.sanitized();
        let default_ds = DefaultDS::new_ordinary_clock(&config.instance);
        let port_ds = PortDS::new(
            PortIdentity {
                clock_identity: config.instance.clock_identity,
                port_number: 1,
            },
            &config.port,
        );

        Port {
            network,
            clock,
            timers: TimerBank::new(timers),
            rng,
            parent_ds: ParentDS::new(&default_ds),
            time_properties_ds: TimePropertiesDS::new_local(&config.instance),
            current_ds: CurrentDS::default(),
            default_ds,
            port_ds,
            recommended_state: RecommendedState::Listening,
            foreign_masters: ForeignMasterTable::new(config.port.max_foreign_records),
            servo: Servo::new(&config.servo),
            events: EventSet::default(),
            template: MessageTemplate::new(),
            announce_ids: SequenceIdGenerator::new(),
            sync_ids: SequenceIdGenerator::new(),
            delay_req_ids: SequenceIdGenerator::new(),
            pdelay_req_ids: SequenceIdGenerator::new(),
            pending_sync: None,
            delay_req_send_time: None,
            pdelay_times: None,
            pending_pdelay_resp: None,
            config,
        }
    }

    pub fn state(&self) -> PortState {
        self.port_ds.port_state
    }

    pub fn recommended_state(&self) -> RecommendedState {
        self.recommended_state
    }

    pub fn default_ds(&self) -> &DefaultDS {
        &self.default_ds
    }

    pub fn current_ds(&self) -> &CurrentDS {
        &self.current_ds
    }

    pub fn parent_ds(&self) -> &ParentDS {
        &self.parent_ds
    }

    pub fn time_properties_ds(&self) -> &TimePropertiesDS {
        &self.time_properties_ds
    }

    pub fn port_ds(&self) -> &PortDS {
        &self.port_ds
    }

    pub fn servo(&self) -> &Servo {
        &self.servo
    }

    pub fn foreign_masters(&self) -> &ForeignMasterTable {
        &self.foreign_masters
    }

    /// Whether the network adapter has datagrams waiting
    pub fn has_pending(&self) -> bool {
        self.network.has_pending()
    }

    fn is_slave_only(&self) -> bool {
        self.default_ds.slave_only
            || self.default_ds.clock_quality.clock_class == SLAVE_ONLY_CLOCK_CLASS
    }

    fn bmc(&mut self) -> Bmc<'_> {
        Bmc {
            default_ds: &self.default_ds,
            port_identity: self.port_ds.port_identity,
            foreign_masters: &self.foreign_masters,
            current_ds: &mut self.current_ds,
            parent_ds: &mut self.parent_ds,
            time_properties_ds: &mut self.time_properties_ds,
            events: &mut self.events,
        }
    }

    /// The mean path delay of the active delay mechanism
    fn path_delay(&self) -> TimeInternal {
        match self.port_ds.delay_mechanism {
            DelayMechanism::E2E => self.current_ds.mean_path_delay,
            DelayMechanism::P2P => self.port_ds.peer_mean_path_delay,
        }
    }

    /// A random interval in `[1, 2^log_2]` seconds worth of milliseconds
    fn random_interval(&mut self, log_2: i8) -> u32 {
        let max = Interval::from_log_2(log_2).as_millis().max(1);
        self.rng.gen_range(1..=max)
    }

    fn announce_receipt_timeout(&self) -> u32 {
        self.port_ds.announce_receipt_timeout_millis()
    }

    /// One iteration of the engine
    pub fn do_state(&mut self) {
        let state = self.port_ds.port_state;

        if state.is_active() {
            if self.events.take_and_clear(PortEvent::StateDecision) {
                let threshold = self.config.port.foreign_master_threshold;
                let mut recommended = self.bmc().run(threshold, state);

                if matches!(
                    recommended,
                    RecommendedState::Master | RecommendedState::Passive
                ) && self.is_slave_only()
                {
                    recommended = RecommendedState::Listening;
                }

                log::debug!("recommending state {recommended:?}");
                self.recommended_state = recommended;
            }

            self.reconcile();
        }

        match self.port_ds.port_state {
            PortState::Initializing => match self.do_init() {
                Ok(()) => self.to_state(PortState::Listening),
                Err(error) => {
                    log::error!("failed to initialize port: {error:?}");
                    self.to_state(PortState::Faulty);
                }
            },
            PortState::Faulty => {
                log::debug!("fault cleared, reinitializing");
                self.to_state(PortState::Initializing);
            }
            PortState::Disabled | PortState::PreMaster => self.handle(),
            PortState::Listening
            | PortState::Uncalibrated
            | PortState::Slave
            | PortState::Passive => {
                if self.timers.poll_expired(TimerId::AnnounceReceipt) {
                    log::info!("announce receipt timeout in state {}", self.state());
                    self.foreign_masters.clear();

                    if !self.is_slave_only() {
                        self.bmc().m1();
                        self.recommended_state = RecommendedState::Master;
                        self.to_state(PortState::Master);
                    } else if self.state() != PortState::Listening {
                        self.to_state(PortState::Listening);
                    }
                } else {
                    self.handle();
                    if self.state().is_active() {
                        if let Err(error) = self.issue_delay_req_timer_expired() {
                            self.fault(error);
                        }
                    }
                }
            }
            PortState::Master => {
                if self.timers.poll_expired(TimerId::SyncInterval) {
                    if let Err(error) = self.issue_sync() {
                        self.fault(error);
                        return;
                    }
                }

                if self.timers.poll_expired(TimerId::AnnounceInterval) {
                    if let Err(error) = self.issue_announce() {
                        self.fault(error);
                        return;
                    }
                }

                self.handle();
                if self.state() == PortState::Master {
                    if let Err(error) = self.issue_delay_req_timer_expired() {
                        self.fault(error);
                    }
                }
            }
        }
    }

    /// Move the port toward the recommended state
    fn reconcile(&mut self) {
        let state = self.port_ds.port_state;

        match self.recommended_state {
            RecommendedState::Master => match state {
                PortState::PreMaster => {
                    if self.timers.poll_expired(TimerId::QualificationTimeout) {
                        self.to_state(PortState::Master);
                    }
                }
                PortState::Master => {}
                _ => self.to_state(PortState::PreMaster),
            },
            RecommendedState::Passive => {
                if state != PortState::Passive {
                    self.to_state(PortState::Passive);
                }
            }
            RecommendedState::Slave => match state {
                PortState::Uncalibrated => {
                    if self.events.take_and_clear(PortEvent::MasterClockSelected) {
                        self.to_state(PortState::Slave);
                    }
                    self.events.take_and_clear(PortEvent::MasterClockChanged);
                }
                PortState::Slave => {
                    let fault = self.events.take_and_clear(PortEvent::SynchronizationFault);
                    let changed = self.events.take_and_clear(PortEvent::MasterClockChanged);
                    if fault || changed {
                        self.to_state(PortState::Uncalibrated);
                    }
                }
                _ => self.to_state(PortState::Uncalibrated),
            },
            RecommendedState::Listening => {
                if state != PortState::Listening {
                    self.to_state(PortState::Listening);
                }
            }
        }
    }

    fn do_init(&mut self) -> Result<()> {
        self.network.reinitialize().map_err(|error| {
            log::error!("failed to initialize network: {error:?}");
            PortError::Network
        })?;

        self.init_data();
        self.timers.stop_all();
        self.init_clock();
        self.bmc().m1();
        self.template.prime(
            self.default_ds.domain_number,
            self.default_ds.two_step_flag,
            self.port_ds.port_identity,
        )?;

        log::info!(
            "initialized port {} in domain {}",
            self.port_ds.port_identity,
            self.default_ds.domain_number
        );
        Ok(())
    }

    /// Reset the datasets and counters to their configured values
    fn init_data(&mut self) {
        let state = self.port_ds.port_state;

        self.default_ds = DefaultDS::new_ordinary_clock(&self.config.instance);
        self.port_ds = PortDS::new(self.port_ds.port_identity, &self.config.port);
        self.port_ds.port_state = state;
        self.current_ds = CurrentDS::default();
        self.parent_ds = ParentDS::new(&self.default_ds);
        self.time_properties_ds = TimePropertiesDS::new_local(&self.config.instance);
        self.foreign_masters = ForeignMasterTable::new(self.config.port.max_foreign_records);
        self.events.clear_all();

        self.announce_ids = SequenceIdGenerator::new();
        self.sync_ids = SequenceIdGenerator::new();
        self.delay_req_ids = SequenceIdGenerator::new();
        self.pdelay_req_ids = SequenceIdGenerator::new();
    }

    /// Restart synchronization from scratch
    fn init_clock(&mut self) {
        if let Err(error) = self.servo.init_clock(&mut self.clock) {
            log::error!("failed to reset clock frequency: {error:?}");
        }

        self.pending_sync = None;
        self.delay_req_send_time = None;
        self.pdelay_times = None;
        self.pending_pdelay_resp = None;
        self.parent_ds.parent_stats = false;
        self.parent_ds.observed_parent_clock_phase_change_rate = 0;
        self.parent_ds.observed_parent_offset_scaled_log_variance = 0;

        if let Err(error) = self.network.flush_event() {
            log::warn!("failed to flush event queue: {error:?}");
        }
    }

    /// Run the servo on the latest offset
    fn update_clock(&mut self) {
        match self.servo.update_clock(
            &mut self.clock,
            &self.current_ds,
            self.port_ds.log_sync_interval,
        ) {
            Ok(ClockUpdate::Stepped) => self.init_clock(),
            Ok(_) => {}
            Err(error) => log::error!("failed to adjust clock: {error:?}"),
        }
    }

    fn fault(&mut self, error: PortError) {
        log::error!("port fault in state {}: {error:?}", self.state());
        self.to_state(PortState::Faulty);
    }

    /// Leave the current state and enter `next`
    pub fn to_state(&mut self, next: PortState) {
        let current = self.port_ds.port_state;
        log::info!("port state {current} -> {next}");

        match current {
            PortState::Master => {
                self.init_clock();
                self.timers.stop(TimerId::SyncInterval);
                self.timers.stop(TimerId::AnnounceInterval);
                self.timers.stop(TimerId::PDelayReqInterval);
            }
            PortState::Uncalibrated | PortState::Slave if !next.is_slave() => {
                self.timers.stop(TimerId::AnnounceReceipt);
                match self.port_ds.delay_mechanism {
                    DelayMechanism::E2E => self.timers.stop(TimerId::DelayReqInterval),
                    DelayMechanism::P2P => self.timers.stop(TimerId::PDelayReqInterval),
                }
                self.init_clock();
            }
            PortState::Passive => {
                self.init_clock();
                self.timers.stop(TimerId::PDelayReqInterval);
                self.timers.stop(TimerId::AnnounceReceipt);
            }
            PortState::Listening => {
                self.init_clock();
                self.timers.stop(TimerId::AnnounceReceipt);
            }
            PortState::PreMaster => {
                self.init_clock();
                self.timers.stop(TimerId::QualificationTimeout);
            }
            _ => {}
        }

        match next {
            PortState::Initializing => {
                self.recommended_state = RecommendedState::Listening;
            }
            PortState::Faulty | PortState::Disabled | PortState::Slave => {}
            PortState::Listening => {
                self.timers
                    .start(TimerId::AnnounceReceipt, self.announce_receipt_timeout());
                self.recommended_state = RecommendedState::Listening;
            }
            PortState::PreMaster => {
                let steps = self.current_ds.steps_removed as u32 + 1;
                let interval = Interval::from_log_2(self.port_ds.log_announce_interval);
                self.timers.start(
                    TimerId::QualificationTimeout,
                    interval.as_millis().saturating_mul(steps),
                );
            }
            PortState::Master => {
                self.port_ds.log_min_delay_req_interval =
                    self.config.port.min_delay_req_interval.as_log_2();
                self.timers.start(
                    TimerId::SyncInterval,
                    Interval::from_log_2(self.port_ds.log_sync_interval).as_millis(),
                );
                self.timers.start(
                    TimerId::AnnounceInterval,
                    Interval::from_log_2(self.port_ds.log_announce_interval).as_millis(),
                );
                if self.port_ds.delay_mechanism == DelayMechanism::P2P {
                    let interval = self.random_interval(self.port_ds.log_min_pdelay_req_interval);
                    self.timers.start(TimerId::PDelayReqInterval, interval);
                }
            }
            PortState::Passive => {
                self.timers
                    .start(TimerId::AnnounceReceipt, self.announce_receipt_timeout());
                if self.port_ds.delay_mechanism == DelayMechanism::P2P {
                    let interval = self
                        .random_interval(self.port_ds.log_min_pdelay_req_interval.saturating_add(1));
                    self.timers.start(TimerId::PDelayReqInterval, interval);
                }
            }
            PortState::Uncalibrated => {
                self.timers
                    .start(TimerId::AnnounceReceipt, self.announce_receipt_timeout());
                match self.port_ds.delay_mechanism {
                    DelayMechanism::E2E => {
                        let interval = self
                            .random_interval(self.port_ds.log_min_delay_req_interval.saturating_add(1));
                        self.timers.start(TimerId::DelayReqInterval, interval);
                    }
                    DelayMechanism::P2P => {
                        let interval = self.random_interval(
                            self.port_ds.log_min_pdelay_req_interval.saturating_add(1),
                        );
                        self.timers.start(TimerId::PDelayReqInterval, interval);
                    }
                }
            }
        }

        self.port_ds.port_state = next;
    }
}

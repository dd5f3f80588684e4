//! Implementation of the best master clock algorithm [Bmc]

use super::{
    dataset_comparison::{ComparisonDataset, DatasetOrdering},
    foreign_master::ForeignMasterTable,
};
use crate::{
    datastructures::{
        common::PortIdentity,
        datasets::{CurrentDS, DefaultDS, ParentDS, TimePropertiesDS},
        messages::AnnounceMessage,
    },
    port::{EventSet, PortEvent, PortState},
    time::TimeInternal,
};

/// Clock classes below this value belong to clocks that never become slaves
const MASTER_ONLY_CLOCK_CLASS_LIMIT: u8 = 128;

/// The state the algorithm recommends for the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendedState {
    Master,
    Passive,
    Slave,
    Listening,
}

impl RecommendedState {
    /// The recommendation that keeps a port in `state`
    pub fn keeping(state: PortState) -> Self {
        match state {
            PortState::Master | PortState::PreMaster => RecommendedState::Master,
            PortState::Passive => RecommendedState::Passive,
            PortState::Uncalibrated | PortState::Slave => RecommendedState::Slave,
            PortState::Initializing
            | PortState::Faulty
            | PortState::Disabled
            | PortState::Listening => RecommendedState::Listening,
        }
    }
}

/// The outcome of the state decision algorithm, naming the dataset update
/// that goes with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateDecision {
    M1,
    P1,
    S1(AnnounceMessage),
}

impl StateDecision {
    pub fn recommended_state(&self) -> RecommendedState {
        match self {
            StateDecision::M1 => RecommendedState::Master,
            StateDecision::P1 => RecommendedState::Passive,
            StateDecision::S1(_) => RecommendedState::Slave,
        }
    }
}

/// Decide between the local clock (D0) and the best foreign master (Erbest)
pub fn state_decision(
    own_data: &DefaultDS,
    port_identity: &PortIdentity,
    best_foreign: &AnnounceMessage,
) -> StateDecision {
    let d0 = ComparisonDataset::from_own_data(own_data, port_identity);
    let erbest = ComparisonDataset::from_announce_message(best_foreign, port_identity);
    let ordering = d0.compare(&erbest);

    if own_data.clock_quality.clock_class < MASTER_ONLY_CLOCK_CLASS_LIMIT {
        return if ordering.is_better() {
            StateDecision::M1
        } else {
            StateDecision::P1
        };
    }

    match ordering {
        DatasetOrdering::Better | DatasetOrdering::BetterByTopology => StateDecision::M1,
        DatasetOrdering::Worse | DatasetOrdering::WorseByTopology => {
            StateDecision::S1(*best_foreign)
        }
        DatasetOrdering::Error1 | DatasetOrdering::Error2 => StateDecision::P1,
    }
}

/// The datasets touched by the best master clock algorithm, borrowed from the
/// port for the duration of one decision.
#[derive(Debug)]
pub struct Bmc<'a> {
    pub default_ds: &'a DefaultDS,
    pub port_identity: PortIdentity,
    pub foreign_masters: &'a ForeignMasterTable,
    pub current_ds: &'a mut CurrentDS,
    pub parent_ds: &'a mut ParentDS,
    pub time_properties_ds: &'a mut TimePropertiesDS,
    pub events: &'a mut EventSet,
}

impl Bmc<'_> {
    /// Run the state decision algorithm and apply the matching dataset
    /// update.
    ///
    /// Without qualified foreign masters the port keeps its current role.
    pub fn run(&mut self, threshold: u16, port_state: PortState) -> RecommendedState {
        let best = self
            .foreign_masters
            .best(threshold, &self.port_identity)
            .map(|record| record.announce());

        let Some(best) = best else {
            if port_state == PortState::Master {
                self.m1();
            }
            return RecommendedState::keeping(port_state);
        };

        let decision = state_decision(self.default_ds, &self.port_identity, &best);
        match decision {
            StateDecision::M1 => self.m1(),
            StateDecision::P1 => self.p1(),
            StateDecision::S1(announce) => self.s1(&announce),
        }

        let recommended = decision.recommended_state();
        log::debug!("best master clock recommends {recommended:?}");
        recommended
    }

    /// Become our own grandmaster
    pub fn m1(&mut self) {
        self.current_ds.steps_removed = 0;
        self.current_ds.offset_from_master = TimeInternal::ZERO;
        self.current_ds.mean_path_delay = TimeInternal::ZERO;

        self.parent_ds.parent_port_identity = self.port_identity;
        self.parent_ds.grandmaster_identity = self.default_ds.clock_identity;
        self.parent_ds.grandmaster_clock_quality = self.default_ds.clock_quality;
        self.parent_ds.grandmaster_priority_1 = self.default_ds.priority_1;
        self.parent_ds.grandmaster_priority_2 = self.default_ds.priority_2;
    }

    pub fn p1(&mut self) {}

    /// Follow the master that sent `announce`.
    ///
    /// Raises [`PortEvent::MasterClockChanged`] when the parent differs from
    /// the previous one.
    pub fn s1(&mut self, announce: &AnnounceMessage) {
        let parent = announce.header().source_port_identity();
        if self.parent_ds.parent_port_identity != parent
            || self.parent_ds.grandmaster_identity != announce.grandmaster_identity()
        {
            log::info!(
                "new master {parent}, grandmaster {}",
                announce.grandmaster_identity()
            );
            self.events.raise(PortEvent::MasterClockChanged);
        }

        self.current_ds.steps_removed = announce.steps_removed().saturating_add(1);

        self.parent_ds.parent_port_identity = parent;
        self.parent_ds.grandmaster_identity = announce.grandmaster_identity();
        self.parent_ds.grandmaster_clock_quality = announce.grandmaster_clock_quality();
        self.parent_ds.grandmaster_priority_1 = announce.grandmaster_priority_1();
        self.parent_ds.grandmaster_priority_2 = announce.grandmaster_priority_2();

        *self.time_properties_ds = announce.time_properties();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::InstanceConfig,
        datastructures::{
            common::{ClockIdentity, ClockQuality, TimeSource, Timestamp},
            messages::Message,
        },
    };

    const OWN: ClockIdentity = ClockIdentity([0x10; 8]);

    fn own_port() -> PortIdentity {
        PortIdentity {
            clock_identity: OWN,
            port_number: 1,
        }
    }

    fn default_ds(priority_1: u8, clock_class: u8) -> DefaultDS {
        DefaultDS::new_ordinary_clock(&InstanceConfig {
            clock_identity: OWN,
            priority_1,
            slave_only: false,
            clock_quality: ClockQuality {
                clock_class,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn announce(source: u8, priority_1: u8, steps_removed: u16) -> AnnounceMessage {
        let message = Message::builder()
            .source_port_identity(PortIdentity {
                clock_identity: ClockIdentity([source; 8]),
                port_number: 1,
            })
            .leap61(true)
            .announce_message(
                Timestamp::default(),
                37,
                priority_1,
                ClockQuality::default(),
                248,
                ClockIdentity([source; 8]),
                steps_removed,
                TimeSource::Gnss,
            );
        match message {
            Message::Announce(announce) => announce,
            _ => unreachable!(),
        }
    }

    struct Fixture {
        default_ds: DefaultDS,
        foreign_masters: ForeignMasterTable,
        current_ds: CurrentDS,
        parent_ds: ParentDS,
        time_properties_ds: TimePropertiesDS,
        events: EventSet,
    }

    impl Fixture {
        fn new(default_ds: DefaultDS) -> Self {
            Self {
                default_ds,
                foreign_masters: ForeignMasterTable::new(5),
                parent_ds: ParentDS::new(&default_ds),
                current_ds: CurrentDS::default(),
                time_properties_ds: TimePropertiesDS::default(),
                events: EventSet::default(),
            }
        }

        fn bmc(&mut self) -> Bmc<'_> {
            Bmc {
                default_ds: &self.default_ds,
                port_identity: own_port(),
                foreign_masters: &self.foreign_masters,
                current_ds: &mut self.current_ds,
                parent_ds: &mut self.parent_ds,
                time_properties_ds: &mut self.time_properties_ds,
                events: &mut self.events,
            }
        }
    }

    #[test]
    fn better_foreign_master_becomes_parent() {
        let mut fixture = Fixture::new(default_ds(128, 248));
        fixture.foreign_masters.add_foreign(&announce(2, 100, 1));

        let recommended = fixture.bmc().run(1, PortState::Listening);

        assert_eq!(recommended, RecommendedState::Slave);
        assert_eq!(fixture.current_ds.steps_removed, 2);
        assert_eq!(
            fixture.parent_ds.grandmaster_identity,
            ClockIdentity([2; 8])
        );
        assert_eq!(fixture.parent_ds.grandmaster_priority_1, 100);
        assert!(fixture.time_properties_ds.leap61);
        assert_eq!(fixture.time_properties_ds.current_utc_offset, 37);
        assert!(fixture.events.take_and_clear(PortEvent::MasterClockChanged));
    }

    #[test]
    fn local_clock_wins() {
        let mut fixture = Fixture::new(default_ds(50, 248));
        fixture.foreign_masters.add_foreign(&announce(2, 100, 0));
        fixture.current_ds.steps_removed = 3;

        let recommended = fixture.bmc().run(1, PortState::Listening);

        assert_eq!(recommended, RecommendedState::Master);
        assert_eq!(fixture.current_ds.steps_removed, 0);
        assert_eq!(fixture.parent_ds.parent_port_identity, own_port());
        assert_eq!(fixture.parent_ds.grandmaster_identity, OWN);
        assert!(!fixture.events.contains(PortEvent::MasterClockChanged));
    }

    #[test]
    fn primary_reference_stays_passive() {
        let mut fixture = Fixture::new(default_ds(200, 6));
        let mut better = announce(2, 100, 0);
        better.grandmaster_clock_quality.clock_class = 6;
        fixture.foreign_masters.add_foreign(&better);

        assert_eq!(
            fixture.bmc().run(1, PortState::Master),
            RecommendedState::Passive
        );
    }

    #[test]
    fn unqualified_masters_keep_state() {
        let mut fixture = Fixture::new(default_ds(128, 248));
        fixture.foreign_masters.add_foreign(&announce(2, 100, 0));

        assert_eq!(
            fixture.bmc().run(2, PortState::Uncalibrated),
            RecommendedState::Slave
        );
        assert_eq!(
            fixture.bmc().run(2, PortState::Listening),
            RecommendedState::Listening
        );
        assert_eq!(
            fixture.parent_ds.grandmaster_identity,
            fixture.default_ds.clock_identity
        );
    }

    #[test]
    fn same_parent_does_not_signal_change() {
        let mut fixture = Fixture::new(default_ds(128, 248));
        let message = announce(2, 100, 0);

        fixture.bmc().s1(&message);
        assert!(fixture.events.take_and_clear(PortEvent::MasterClockChanged));

        fixture.bmc().s1(&message);
        assert!(!fixture.events.contains(PortEvent::MasterClockChanged));
    }
}

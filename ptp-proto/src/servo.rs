//! The clock servo: offset and delay filtering plus the PI controller that
//! steers the local clock.

use getset::CopyGetters;

use crate::{
    clock::Clock,
    config::ServoConfig,
    datastructures::datasets::{CurrentDS, PortDS},
    filters::ExponentialFilter,
    port::{EventSet, PortEvent, PortState},
    time::TimeInternal,
};

/// Offsets above this are stepped instead of slewed
const MAX_ADJ_OFFSET_NS: i32 = 100_000_000;
/// Below this offset an uncalibrated port considers itself synchronized
const CALIBRATED_OFFSET_NS: i32 = 10_000;
/// Above this offset a slave considers itself no longer synchronized
const UNCALIBRATED_OFFSET_NS: i32 = 1_000_000;

/// The four timestamps of a peer delay measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerDelayTimes {
    /// Transmission of the request
    pub t1: TimeInternal,
    /// Reception of the request by the peer
    pub t2: TimeInternal,
    /// Transmission of the response by the peer
    pub t3: TimeInternal,
    /// Reception of the response
    pub t4: TimeInternal,
}

/// What [`Servo::update_clock`] did to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockUpdate {
    /// The clock was set; the caller must restart synchronization
    Stepped,
    /// The offset was too large to slew, so the clock runs at maximum rate
    Nudged(i32),
    /// Regular frequency correction in ppb
    Adjusted(i32),
    /// Adjustment is disabled by configuration
    Unchanged,
}

#[derive(Debug, Clone, CopyGetters)]
pub struct Servo {
    offset_filter: ExponentialFilter,
    delay_filter: ExponentialFilter,
    offset_filter_shift: u8,
    delay_filter_shift: u8,
    /// The integral of the PI controller, in ppb
    #[getset(get_copy = "pub")]
    observed_drift: i32,
    ap: i32,
    ai: i32,
    max_frequency_adjustment: i32,
    no_reset_clock: bool,
    no_adjust: bool,
    /// Last measured master to slave delay, offset included
    #[getset(get_copy = "pub")]
    master_to_slave_delay: TimeInternal,
    /// Last measured slave to master delay, offset included
    #[getset(get_copy = "pub")]
    slave_to_master_delay: TimeInternal,
    /// The last frequency correction handed to the clock
    #[getset(get_copy = "pub")]
    last_adjustment: i32,
}

impl Servo {
    pub fn new(config: &ServoConfig) -> Self {
        Self {
            offset_filter: ExponentialFilter::new(config.offset_filter_shift),
            delay_filter: ExponentialFilter::new(config.delay_filter_shift),
            offset_filter_shift: config.offset_filter_shift,
            delay_filter_shift: config.delay_filter_shift,
            observed_drift: 0,
            ap: config.ap.max(1),
            ai: config.ai.max(1),
            max_frequency_adjustment: config.max_frequency_adjustment.max(1),
            no_reset_clock: config.no_reset_clock,
            no_adjust: config.no_adjust,
            master_to_slave_delay: TimeInternal::ZERO,
            slave_to_master_delay: TimeInternal::ZERO,
            last_adjustment: 0,
        }
    }

    /// Forget all measurements and level the clock rate
    pub fn init_clock<C: Clock>(&mut self, clock: &mut C) -> Result<(), C::Error> {
        self.offset_filter.reset(self.offset_filter_shift);
        self.delay_filter.reset(self.delay_filter_shift);
        self.observed_drift = 0;
        self.master_to_slave_delay = TimeInternal::ZERO;
        self.slave_to_master_delay = TimeInternal::ZERO;

        if !self.no_adjust {
            self.adjust_frequency(clock, 0)?;
        }

        Ok(())
    }

    /// Whether an offset sample made it through the filter since the last
    /// reset
    pub fn has_offset(&self) -> bool {
        self.offset_filter.samples() > 0
    }

    /// Compute the offset from master from a sync measurement.
    ///
    /// `path_delay` is the mean path delay of the active delay mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn update_offset(
        &mut self,
        current_ds: &mut CurrentDS,
        ingress: TimeInternal,
        origin: TimeInternal,
        correction: TimeInternal,
        path_delay: TimeInternal,
        state: PortState,
        events: &mut EventSet,
    ) {
        self.master_to_slave_delay = ingress - origin - correction;
        let mut offset = self.master_to_slave_delay - path_delay;

        if offset.seconds != 0 {
            current_ds.offset_from_master = offset;
            if state == PortState::Slave {
                events.raise(PortEvent::SynchronizationFault);
            }
            log::trace!("offset {offset} too large to filter");
            return;
        }

        offset.nanoseconds = self.offset_filter.filter(offset.nanoseconds);
        current_ds.offset_from_master = offset;

        let magnitude = offset.nanoseconds.unsigned_abs();
        if magnitude < CALIBRATED_OFFSET_NS as u32 {
            if state == PortState::Uncalibrated {
                events.raise(PortEvent::MasterClockSelected);
            }
        } else if magnitude > UNCALIBRATED_OFFSET_NS as u32 && state == PortState::Slave {
            events.raise(PortEvent::SynchronizationFault);
        }
    }

    /// Compute the mean path delay from a delay request round trip
    pub fn update_delay(
        &mut self,
        current_ds: &mut CurrentDS,
        send: TimeInternal,
        receive: TimeInternal,
        correction: TimeInternal,
    ) {
        if !self.has_offset() {
            log::trace!("no master to slave delay yet, skipping delay update");
            return;
        }

        self.slave_to_master_delay = receive - send - correction;
        let mut delay = (self.master_to_slave_delay + self.slave_to_master_delay).halved();

        if delay.seconds == 0 {
            delay.nanoseconds = self.delay_filter.filter(delay.nanoseconds);
        } else {
            log::trace!("delay {delay} too large to filter");
        }

        current_ds.mean_path_delay = delay;
    }

    /// Compute the peer mean path delay from a peer delay exchange
    pub fn update_peer_delay(
        &mut self,
        port_ds: &mut PortDS,
        times: PeerDelayTimes,
        correction: TimeInternal,
        two_step: bool,
    ) {
        let round_trip = if two_step {
            (times.t2 - times.t1) + (times.t4 - times.t3)
        } else {
            times.t4 - times.t1
        };
        let mut delay = (round_trip - correction).halved();

        if delay.seconds == 0 {
            delay.nanoseconds = self.delay_filter.filter(delay.nanoseconds);
        } else {
            log::trace!("peer delay {delay} too large to filter");
        }

        port_ds.peer_mean_path_delay = delay;
    }

    /// Steer the clock toward the master
    pub fn update_clock<C: Clock>(
        &mut self,
        clock: &mut C,
        current_ds: &CurrentDS,
        log_sync_interval: i8,
    ) -> Result<ClockUpdate, C::Error> {
        let offset = current_ds.offset_from_master;

        let update = if offset.seconds != 0 || offset.nanoseconds.abs() > MAX_ADJ_OFFSET_NS {
            if self.no_adjust {
                ClockUpdate::Unchanged
            } else if !self.no_reset_clock {
                log::info!("stepping clock by {}", -offset);
                clock.apply_offset(-offset)?;
                ClockUpdate::Stepped
            } else {
                let adj = if offset.nanos() > 0 {
                    self.max_frequency_adjustment
                } else {
                    -self.max_frequency_adjustment
                };
                ClockUpdate::Nudged(self.adjust_frequency(clock, -adj)?)
            }
        } else {
            // normalize the offset to a sync interval of one second
            let mut offset_norm = offset.nanoseconds as i64;
            if log_sync_interval > 0 {
                offset_norm >>= log_sync_interval.min(31);
            } else if log_sync_interval < 0 {
                offset_norm <<= (-(log_sync_interval as i32)).min(31);
            }

            let max = self.max_frequency_adjustment as i64;
            let drift = (self.observed_drift as i64 + offset_norm / self.ai as i64).clamp(-max, max);
            self.observed_drift = drift as i32;

            if self.no_adjust {
                ClockUpdate::Unchanged
            } else {
                let adj = offset_norm / self.ap as i64 + drift;
                let ppb = (-adj).clamp(-max, max) as i32;
                ClockUpdate::Adjusted(self.adjust_frequency(clock, ppb)?)
            }
        };

        log::debug!(
            "offset from master {}, mean path delay {}, drift {} ppb",
            current_ds.offset_from_master,
            current_ds.mean_path_delay,
            self.observed_drift
        );

        Ok(update)
    }

    fn adjust_frequency<C: Clock>(&mut self, clock: &mut C, ppb: i32) -> Result<i32, C::Error> {
        let ppb = ppb.clamp(-self.max_frequency_adjustment, self.max_frequency_adjustment);
        clock.adjust_frequency(ppb)?;
        self.last_adjustment = ppb;
        Ok(ppb)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::config::{PortConfig, ADJ_FREQ_MAX};

    #[derive(Debug, Default)]
    struct RecordingClock {
        now: TimeInternal,
        frequencies: Vec<i32>,
        offsets: Vec<TimeInternal>,
    }

    impl Clock for RecordingClock {
        type Error = ();

        fn now(&self) -> TimeInternal {
            self.now
        }

        fn set_time(&mut self, time: TimeInternal) -> Result<(), Self::Error> {
            self.now = time;
            Ok(())
        }

        fn adjust_frequency(&mut self, ppb: i32) -> Result<(), Self::Error> {
            self.frequencies.push(ppb);
            Ok(())
        }

        fn apply_offset(&mut self, offset: TimeInternal) -> Result<(), Self::Error> {
            self.offsets.push(offset);
            Ok(())
        }
    }

    fn servo() -> Servo {
        Servo::new(&ServoConfig::default())
    }

    fn ns(nanos: i64) -> TimeInternal {
        TimeInternal::from_nanos(nanos)
    }

    #[test]
    fn offset_subtracts_path_delay_and_correction() {
        let mut servo = servo();
        let mut current_ds = CurrentDS::default();
        let mut events = EventSet::default();

        servo.update_offset(
            &mut current_ds,
            ns(1_000_500_000),
            ns(1_000_000_000),
            ns(100_000),
            ns(50_000),
            PortState::Slave,
            &mut events,
        );

        assert_eq!(servo.master_to_slave_delay(), ns(400_000));
        assert_eq!(current_ds.offset_from_master, ns(350_000));
        assert!(events.is_empty());
    }

    #[test]
    fn small_offset_selects_master() {
        let mut servo = servo();
        let mut current_ds = CurrentDS::default();
        let mut events = EventSet::default();

        servo.update_offset(
            &mut current_ds,
            ns(5_000),
            ns(0),
            ns(0),
            ns(0),
            PortState::Uncalibrated,
            &mut events,
        );

        assert!(events.take_and_clear(PortEvent::MasterClockSelected));
    }

    #[test]
    fn large_offset_is_a_fault_in_slave() {
        let mut servo = servo();
        let mut current_ds = CurrentDS::default();
        let mut events = EventSet::default();

        servo.update_offset(
            &mut current_ds,
            ns(3_000_000),
            ns(0),
            ns(0),
            ns(0),
            PortState::Slave,
            &mut events,
        );
        assert!(events.take_and_clear(PortEvent::SynchronizationFault));

        // whole seconds are never filtered
        servo.update_offset(
            &mut current_ds,
            ns(2_000_000_000),
            ns(0),
            ns(0),
            ns(0),
            PortState::Slave,
            &mut events,
        );
        assert!(events.take_and_clear(PortEvent::SynchronizationFault));
        assert_eq!(current_ds.offset_from_master, TimeInternal::new(2, 0));
    }

    #[test]
    fn delay_needs_an_offset_first() {
        let mut servo = servo();
        let mut current_ds = CurrentDS::default();
        let mut events = EventSet::default();

        servo.update_delay(&mut current_ds, ns(0), ns(80_000), ns(0));
        assert_eq!(current_ds.mean_path_delay, TimeInternal::ZERO);

        servo.update_offset(
            &mut current_ds,
            ns(120_000),
            ns(0),
            ns(0),
            ns(0),
            PortState::Uncalibrated,
            &mut events,
        );
        servo.update_delay(&mut current_ds, ns(0), ns(80_000), ns(0));
        // (120 µs + 80 µs) / 2
        assert_eq!(current_ds.mean_path_delay, ns(100_000));
    }

    #[test]
    fn peer_delay_one_and_two_step() {
        let times = PeerDelayTimes {
            t1: ns(1_000),
            t2: ns(6_000),
            t3: ns(9_000),
            t4: ns(15_000),
        };
        let mut port_ds = PortDS::new(Default::default(), &PortConfig::default());

        servo().update_peer_delay(&mut port_ds, times, ns(1_000), true);
        // ((5 µs) + (6 µs) - 1 µs) / 2
        assert_eq!(port_ds.peer_mean_path_delay, ns(5_000));

        servo().update_peer_delay(&mut port_ds, times, ns(0), false);
        assert_eq!(port_ds.peer_mean_path_delay, ns(7_000));
    }

    #[test]
    fn pi_controller_steers_against_offset() {
        let mut servo = servo();
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: ns(32_000),
            ..Default::default()
        };

        let update = servo.update_clock(&mut clock, &current_ds, 0).unwrap();

        // drift 32000 / 16, adjustment 32000 / 2 + 2000
        assert_eq!(servo.observed_drift(), 2_000);
        assert_eq!(update, ClockUpdate::Adjusted(-18_000));
        assert_eq!(clock.frequencies, [-18_000]);
    }

    #[test]
    fn offset_is_normalized_to_sync_interval() {
        let current_ds = CurrentDS {
            offset_from_master: ns(32_000),
            ..Default::default()
        };

        let mut slow = servo();
        slow.update_clock(&mut RecordingClock::default(), &current_ds, 2)
            .unwrap();
        assert_eq!(slow.observed_drift(), 500);

        let mut fast = servo();
        fast.update_clock(&mut RecordingClock::default(), &current_ds, -1)
            .unwrap();
        assert_eq!(fast.observed_drift(), 4_000);
    }

    #[test]
    fn drift_is_clamped() {
        let mut servo = servo();
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: ns(-90_000_000),
            ..Default::default()
        };

        for _ in 0..200 {
            servo.update_clock(&mut clock, &current_ds, 0).unwrap();
        }

        assert_eq!(servo.observed_drift(), -ADJ_FREQ_MAX);
        assert_eq!(clock.frequencies.last(), Some(&ADJ_FREQ_MAX));
    }

    #[test]
    fn large_offset_steps_clock() {
        let mut servo = servo();
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: TimeInternal::new(3, 0),
            ..Default::default()
        };

        let update = servo.update_clock(&mut clock, &current_ds, 0).unwrap();

        assert_eq!(update, ClockUpdate::Stepped);
        assert_eq!(clock.offsets, [TimeInternal::new(-3, 0)]);
        assert!(clock.frequencies.is_empty());
    }

    #[test]
    fn large_offset_without_reset_nudges() {
        let mut servo = Servo::new(&ServoConfig {
            no_reset_clock: true,
            ..Default::default()
        });
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: ns(200_000_000),
            ..Default::default()
        };

        let update = servo.update_clock(&mut clock, &current_ds, 0).unwrap();

        assert_eq!(update, ClockUpdate::Nudged(-ADJ_FREQ_MAX));
        assert!(clock.offsets.is_empty());
    }

    #[test]
    fn no_adjust_leaves_clock_alone() {
        let mut servo = Servo::new(&ServoConfig {
            no_adjust: true,
            ..Default::default()
        });
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: ns(5_000),
            ..Default::default()
        };

        servo.init_clock(&mut clock).unwrap();
        assert_eq!(
            servo.update_clock(&mut clock, &current_ds, 0).unwrap(),
            ClockUpdate::Unchanged
        );
        assert!(clock.frequencies.is_empty());
        assert_eq!(servo.observed_drift(), 312);
    }

    #[test]
    fn init_clock_levels_frequency() {
        let mut servo = servo();
        let mut clock = RecordingClock::default();
        let current_ds = CurrentDS {
            offset_from_master: ns(64_000),
            ..Default::default()
        };
        servo.update_clock(&mut clock, &current_ds, 0).unwrap();

        servo.init_clock(&mut clock).unwrap();

        assert_eq!(servo.observed_drift(), 0);
        assert_eq!(clock.frequencies.last(), Some(&0));
        assert!(!servo.has_offset());
    }
}

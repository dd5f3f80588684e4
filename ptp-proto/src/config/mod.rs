//! Startup configuration of the engine

mod instance;
mod port;
mod servo;

pub use instance::{InstanceConfig, Latency};
pub use port::{DelayMechanism, PortConfig, MAX_FOREIGN_RECORDS};
pub use servo::{ServoConfig, ADJ_FREQ_MAX};

use crate::datastructures::common::SLAVE_ONLY_CLOCK_CLASS;

/// Everything the engine needs to know at startup
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Config {
    pub instance: InstanceConfig,
    pub port: PortConfig,
    pub servo: ServoConfig,
}

impl Config {
    /// Apply the fixups the engine relies on.
    ///
    /// Out of range values are clamped instead of rejected, so a bad
    /// configuration still yields a running clock.
    pub fn sanitized(mut self) -> Self {
        if self.instance.slave_only {
            self.instance.clock_quality.clock_class = SLAVE_ONLY_CLOCK_CLASS;
        }

        if self.servo.ap < 1 {
            log::warn!("ap of {} is too small, using 1", self.servo.ap);
            self.servo.ap = 1;
        }

        if self.servo.ai < 1 {
            log::warn!("ai of {} is too small, using 1", self.servo.ai);
            self.servo.ai = 1;
        }

        if self.servo.max_frequency_adjustment < 1 {
            log::warn!(
                "maximum frequency adjustment of {} ppb is too small, using {}",
                self.servo.max_frequency_adjustment,
                ADJ_FREQ_MAX
            );
            self.servo.max_frequency_adjustment = ADJ_FREQ_MAX;
        }

        let records = self
            .port
            .max_foreign_records
            .clamp(1, MAX_FOREIGN_RECORDS);
        if records != self.port.max_foreign_records {
            log::warn!(
                "foreign master table size {} out of range, using {}",
                self.port.max_foreign_records,
                records
            );
            self.port.max_foreign_records = records;
        }

        if self.port.foreign_master_threshold == 0 {
            self.port.foreign_master_threshold = 1;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slave_only_forces_class_255() {
        let config = Config::default().sanitized();
        assert!(config.instance.slave_only);
        assert_eq!(config.instance.clock_quality.clock_class, 255);

        let mut config = Config::default();
        config.instance.slave_only = false;
        assert_eq!(config.sanitized().instance.clock_quality.clock_class, 248);
    }

    #[test]
    fn gains_are_clamped() {
        let mut config = Config::default();
        config.servo.ap = 0;
        config.servo.ai = -4;

        let config = config.sanitized();
        assert_eq!(config.servo.ap, 1);
        assert_eq!(config.servo.ai, 1);
    }

    #[test]
    fn foreign_records_are_bounded() {
        let mut config = Config::default();
        config.port.max_foreign_records = 0;
        assert_eq!(config.sanitized().port.max_foreign_records, 1);

        config.port.max_foreign_records = 100;
        assert_eq!(
            config.sanitized().port.max_foreign_records,
            MAX_FOREIGN_RECORDS
        );
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.port.announce_interval.as_log_2(), 1);
        assert_eq!(config.port.sync_interval.as_log_2(), 0);
        assert_eq!(config.port.min_delay_req_interval.as_log_2(), 3);
        assert_eq!(config.port.min_pdelay_req_interval.as_log_2(), 1);
        assert_eq!(config.port.max_foreign_records, 5);
        assert_eq!(config.servo.ap, 2);
        assert_eq!(config.servo.ai, 16);
        assert_eq!(config.servo.max_frequency_adjustment, 512_000);
        assert_eq!(config.instance.current_utc_offset, 34);
    }
}

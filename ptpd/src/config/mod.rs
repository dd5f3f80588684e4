use std::{
    fs::read_to_string, net::Ipv4Addr, os::unix::fs::PermissionsExt, path::Path, str::FromStr,
};

use log::warn;
use ptp_proto::{
    ClockAccuracy, ClockIdentity, ClockQuality, InstanceConfig, Interval, TimeInternal,
    TimeSource,
};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(
        default = "default_loglevel",
        deserialize_with = "deserialize_loglevel"
    )]
    pub loglevel: log::LevelFilter,
    #[serde(default, deserialize_with = "deserialize_clock_identity")]
    pub identity: Option<ClockIdentity>,
    #[serde(default = "default_domain")]
    pub domain: u8,
    #[serde(default = "default_priority")]
    pub priority1: u8,
    #[serde(default = "default_priority")]
    pub priority2: u8,
    #[serde(default = "default_true")]
    pub slave_only: bool,
    #[serde(default = "default_true")]
    pub two_step: bool,
    #[serde(default = "default_clock_class")]
    pub clock_class: u8,
    #[serde(default = "default_clock_accuracy")]
    pub clock_accuracy: u8,
    #[serde(default = "default_clock_variance")]
    pub clock_variance: u16,
    #[serde(default = "default_utc_offset")]
    pub utc_offset: i16,
    #[serde(default)]
    pub port: PortConfig,
    #[serde(default)]
    pub servo: ServoConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PortConfig {
    /// Address of the interface to run on, all interfaces when absent
    #[serde(default)]
    pub interface: Option<Ipv4Addr>,
    #[serde(default)]
    pub delay_mechanism: DelayMechanism,
    #[serde(default = "default_announce_interval")]
    pub announce_interval: i8,
    #[serde(default = "default_announce_receipt_timeout")]
    pub announce_receipt_timeout: u8,
    #[serde(default = "default_sync_interval")]
    pub sync_interval: i8,
    #[serde(default = "default_min_delay_req_interval")]
    pub min_delay_req_interval: i8,
    #[serde(default = "default_min_pdelay_req_interval")]
    pub min_pdelay_req_interval: i8,
    /// Nanoseconds between the arrival of a datagram and its timestamp
    #[serde(default)]
    pub inbound_latency: i32,
    /// Nanoseconds between the transmit timestamp and the datagram leaving
    #[serde(default)]
    pub outbound_latency: i32,
    #[serde(default = "default_max_foreign_records")]
    pub max_foreign_records: usize,
    #[serde(default = "default_foreign_master_threshold")]
    pub foreign_master_threshold: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            interface: None,
            delay_mechanism: DelayMechanism::default(),
            announce_interval: default_announce_interval(),
            announce_receipt_timeout: default_announce_receipt_timeout(),
            sync_interval: default_sync_interval(),
            min_delay_req_interval: default_min_delay_req_interval(),
            min_pdelay_req_interval: default_min_pdelay_req_interval(),
            inbound_latency: 0,
            outbound_latency: 0,
            max_foreign_records: default_max_foreign_records(),
            foreign_master_threshold: default_foreign_master_threshold(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DelayMechanism {
    #[default]
    E2e,
    P2p,
}

impl From<DelayMechanism> for ptp_proto::DelayMechanism {
    fn from(value: DelayMechanism) -> Self {
        match value {
            DelayMechanism::E2e => ptp_proto::DelayMechanism::E2E,
            DelayMechanism::P2p => ptp_proto::DelayMechanism::P2P,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServoConfig {
    #[serde(default = "default_ap")]
    pub ap: i32,
    #[serde(default = "default_ai")]
    pub ai: i32,
    #[serde(default = "default_delay_filter_shift")]
    pub delay_filter_shift: u8,
    #[serde(default = "default_offset_filter_shift")]
    pub offset_filter_shift: u8,
    #[serde(default)]
    pub no_reset_clock: bool,
    #[serde(default)]
    pub no_adjust: bool,
    #[serde(default = "default_max_frequency_adjustment")]
    pub max_frequency_adjustment: i32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            ap: default_ap(),
            ai: default_ai(),
            delay_filter_shift: default_delay_filter_shift(),
            offset_filter_shift: default_offset_filter_shift(),
            no_reset_clock: false,
            no_adjust: false,
            max_frequency_adjustment: default_max_frequency_adjustment(),
        }
    }
}

fn deserialize_loglevel<'de, D>(deserializer: D) -> Result<log::LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw: String = Deserialize::deserialize(deserializer)?;
    log::LevelFilter::from_str(&raw)
        .map_err(|e| D::Error::custom(format!("Invalid loglevel: {}", e)))
}

fn deserialize_clock_identity<'de, D>(deserializer: D) -> Result<Option<ClockIdentity>, D::Error>
where
    D: Deserializer<'de>,
{
    use hex::FromHex;
    use serde::de::Error;
    let raw: String = Deserialize::deserialize(deserializer)?;
    Ok(Some(ClockIdentity(<[u8; 8]>::from_hex(raw).map_err(
        |e| D::Error::custom(format!("Invalid clock identifier: {}", e)),
    )?)))
}

impl Config {
    /// Parse config from file
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let meta = std::fs::metadata(file).map_err(ConfigError::Io)?;
        let perm = meta.permissions();

        if perm.mode() as libc::mode_t & libc::S_IWOTH != 0 {
            warn!("Unrestricted config file permissions: Others can write.");
        }

        let contents = read_to_string(file).map_err(ConfigError::Io)?;
        let config: Config = toml::de::from_str(&contents).map_err(ConfigError::Toml)?;
        config.warn_when_unreasonable();
        Ok(config)
    }

    /// Warns about unreasonable config values
    pub fn warn_when_unreasonable(&self) {
        if self.slave_only && self.clock_class != 255 && self.clock_class != default_clock_class()
        {
            warn!("Clock class is ignored for a slave only clock.");
        }

        if !self.slave_only && self.clock_class == 255 {
            warn!("Clock class 255 never becomes master.");
        }

        if self.port.announce_receipt_timeout < 2 {
            warn!("Announce receipt timeout below 2 makes the master selection unstable.");
        }

        for (name, interval) in [
            ("announce-interval", self.port.announce_interval),
            ("sync-interval", self.port.sync_interval),
            ("min-delay-req-interval", self.port.min_delay_req_interval),
            ("min-pdelay-req-interval", self.port.min_pdelay_req_interval),
        ] {
            if !(-7..=7).contains(&interval) {
                warn!("Log interval {name} of {interval} is outside the usual range.");
            }
        }

        if self.port.max_foreign_records == 0 || self.port.max_foreign_records > 16 {
            warn!("Foreign master table size must be between 1 and 16.");
        }

        if self.servo.ap < 1 || self.servo.ai < 1 {
            warn!("Servo gains below 1 are raised to 1.");
        }

        if self.servo.no_adjust {
            warn!("Clock adjustment is disabled, the clock only follows its master on paper.");
        }
    }

    /// The engine configuration for a clock with the given identity
    pub fn protocol_config(&self, clock_identity: ClockIdentity) -> ptp_proto::Config {
        ptp_proto::Config {
            instance: InstanceConfig {
                clock_identity,
                priority_1: self.priority1,
                priority_2: self.priority2,
                domain_number: self.domain,
                slave_only: self.slave_only,
                two_step: self.two_step,
                clock_quality: ClockQuality {
                    clock_class: self.clock_class,
                    clock_accuracy: ClockAccuracy(self.clock_accuracy),
                    offset_scaled_log_variance: self.clock_variance,
                },
                time_source: TimeSource::InternalOscillator,
                current_utc_offset: self.utc_offset,
                current_utc_offset_valid: false,
            },
            port: ptp_proto::PortConfig {
                delay_mechanism: self.port.delay_mechanism.into(),
                announce_interval: Interval::from_log_2(self.port.announce_interval),
                announce_receipt_timeout: self.port.announce_receipt_timeout,
                sync_interval: Interval::from_log_2(self.port.sync_interval),
                min_delay_req_interval: Interval::from_log_2(self.port.min_delay_req_interval),
                min_pdelay_req_interval: Interval::from_log_2(self.port.min_pdelay_req_interval),
                latency: ptp_proto::config::Latency {
                    inbound: TimeInternal::from_nanos(self.port.inbound_latency as i64),
                    outbound: TimeInternal::from_nanos(self.port.outbound_latency as i64),
                },
                max_foreign_records: self.port.max_foreign_records,
                foreign_master_threshold: self.port.foreign_master_threshold,
            },
            servo: ptp_proto::ServoConfig {
                ap: self.servo.ap,
                ai: self.servo.ai,
                delay_filter_shift: self.servo.delay_filter_shift,
                offset_filter_shift: self.servo.offset_filter_shift,
                no_reset_clock: self.servo.no_reset_clock,
                no_adjust: self.servo.no_adjust,
                max_frequency_adjustment: self.servo.max_frequency_adjustment,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error while reading config: {0}")]
    Io(std::io::Error),
    #[error("config toml parsing error: {0}")]
    Toml(toml::de::Error),
}

fn default_loglevel() -> log::LevelFilter {
    log::LevelFilter::Info
}

fn default_domain() -> u8 {
    0
}

fn default_priority() -> u8 {
    248
}

fn default_true() -> bool {
    true
}

fn default_clock_class() -> u8 {
    248
}

fn default_clock_accuracy() -> u8 {
    ClockAccuracy::UNKNOWN.0
}

fn default_clock_variance() -> u16 {
    5000
}

fn default_utc_offset() -> i16 {
    34
}

fn default_announce_interval() -> i8 {
    1
}

fn default_announce_receipt_timeout() -> u8 {
    6
}

fn default_sync_interval() -> i8 {
    0
}

fn default_min_delay_req_interval() -> i8 {
    3
}

fn default_min_pdelay_req_interval() -> i8 {
    1
}

fn default_max_foreign_records() -> usize {
    5
}

fn default_foreign_master_threshold() -> u16 {
    1
}

fn default_ap() -> i32 {
    2
}

fn default_ai() -> i32 {
    16
}

fn default_delay_filter_shift() -> u8 {
    6
}

fn default_offset_filter_shift() -> u8 {
    1
}

fn default_max_frequency_adjustment() -> i32 {
    ptp_proto::config::ADJ_FREQ_MAX
}

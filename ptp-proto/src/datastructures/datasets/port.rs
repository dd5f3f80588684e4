use getset::CopyGetters;

use crate::{
    config::{DelayMechanism, PortConfig},
    datastructures::{common::PortIdentity, messages::PTP_VERSION},
    port::PortState,
    time::{Interval, TimeInternal},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PortDS {
    pub(crate) port_identity: PortIdentity,
    pub(crate) port_state: PortState,
    pub(crate) log_min_delay_req_interval: i8,
    pub(crate) peer_mean_path_delay: TimeInternal,
    pub(crate) log_announce_interval: i8,
    pub(crate) announce_receipt_timeout: u8,
    pub(crate) log_sync_interval: i8,
    pub(crate) delay_mechanism: DelayMechanism,
    pub(crate) log_min_pdelay_req_interval: i8,
    pub(crate) version_number: u8,
}

impl PortDS {
    pub fn new(port_identity: PortIdentity, config: &PortConfig) -> Self {
        PortDS {
            port_identity,
            port_state: PortState::Initializing,
            log_min_delay_req_interval: config.min_delay_req_interval.as_log_2(),
            peer_mean_path_delay: TimeInternal::ZERO,
            log_announce_interval: config.announce_interval.as_log_2(),
            announce_receipt_timeout: config.announce_receipt_timeout,
            log_sync_interval: config.sync_interval.as_log_2(),
            delay_mechanism: config.delay_mechanism,
            log_min_pdelay_req_interval: config.min_pdelay_req_interval.as_log_2(),
            version_number: PTP_VERSION,
        }
    }

    /// How long to wait for an announce from the master before giving up on it
    pub fn announce_receipt_timeout_millis(&self) -> u32 {
        Interval::from_log_2(self.log_announce_interval)
            .as_millis()
            .saturating_mul(self.announce_receipt_timeout as u32)
    }
}

use crate::time::Interval;

/// Which delay mechanism a port is using
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DelayMechanism {
    /// End to end delay mechanism. Delay measurement is done directly to the
    /// chosen master, across potential transparent nodes in between.
    #[default]
    E2E,
    /// Peer to peer delay mechanism. Delay measurement is done to the
    /// neighbouring node only.
    P2P,
}

/// Upper bound on the configurable size of the foreign master table
pub const MAX_FOREIGN_RECORDS: usize = 16;

/// Configuration items of the PTP PortDS dataset. Dynamical fields are kept
/// as part of [crate::port::Port].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PortConfig {
    pub delay_mechanism: DelayMechanism,
    pub announce_interval: Interval,
    /// How many announce intervals to wait for an announce from the current
    /// master before it is considered gone
    pub announce_receipt_timeout: u8,
    pub sync_interval: Interval,
    pub min_delay_req_interval: Interval,
    pub min_pdelay_req_interval: Interval,
    pub latency: super::Latency,
    /// Capacity of the foreign master table
    pub max_foreign_records: usize,
    /// Announce messages a foreign master needs to send before it takes
    /// part in the best master selection
    pub foreign_master_threshold: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            delay_mechanism: DelayMechanism::E2E,
            announce_interval: Interval::TWO_SECONDS,
            announce_receipt_timeout: 6,
            sync_interval: Interval::ONE_SECOND,
            min_delay_req_interval: Interval::from_log_2(3),
            min_pdelay_req_interval: Interval::TWO_SECONDS,
            latency: super::Latency::default(),
            max_foreign_records: 5,
            foreign_master_threshold: 1,
        }
    }
}

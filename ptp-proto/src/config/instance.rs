use crate::{
    datastructures::common::{ClockAccuracy, ClockIdentity, ClockQuality, TimeSource},
    time::TimeInternal,
};

/// Configuration of the clock as a whole, the source of the default and time
/// properties datasets.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InstanceConfig {
    pub clock_identity: ClockIdentity,
    pub priority_1: u8,
    pub priority_2: u8,
    pub domain_number: u8,
    /// Never become master, which also forces clock class 255
    pub slave_only: bool,
    /// Send a follow up with the precise origin time after every sync
    pub two_step: bool,
    pub clock_quality: ClockQuality,
    pub time_source: TimeSource,
    pub current_utc_offset: i16,
    pub current_utc_offset_valid: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            clock_identity: ClockIdentity::default(),
            priority_1: 248,
            priority_2: 248,
            domain_number: 0,
            slave_only: true,
            two_step: true,
            clock_quality: ClockQuality {
                clock_class: 248,
                clock_accuracy: ClockAccuracy::UNKNOWN,
                offset_scaled_log_variance: 5000,
            },
            time_source: TimeSource::InternalOscillator,
            current_utc_offset: 34,
            current_utc_offset_valid: false,
        }
    }
}

/// Correction applied to hardware timestamps, positive values make the
/// timestamp earlier (inbound) or later (outbound).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Latency {
    pub inbound: TimeInternal,
    pub outbound: TimeInternal,
}

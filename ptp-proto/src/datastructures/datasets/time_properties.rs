use getset::CopyGetters;

use crate::{config::InstanceConfig, datastructures::common::TimeSource};

#[derive(Default, Copy, Clone, Debug, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct TimePropertiesDS {
    pub(crate) current_utc_offset: i16,
    pub(crate) current_utc_offset_valid: bool,
    pub(crate) leap59: bool,
    pub(crate) leap61: bool,
    pub(crate) time_traceable: bool,
    pub(crate) frequency_traceable: bool,
    pub(crate) ptp_timescale: bool,
    pub(crate) time_source: TimeSource,
}

impl TimePropertiesDS {
    /// The properties of the local clock on an arbitrary timescale
    pub fn new_local(config: &InstanceConfig) -> Self {
        TimePropertiesDS {
            current_utc_offset: config.current_utc_offset,
            current_utc_offset_valid: config.current_utc_offset_valid,
            leap59: false,
            leap61: false,
            time_traceable: false,
            frequency_traceable: false,
            ptp_timescale: false,
            time_source: config.time_source,
        }
    }
}

use getset::CopyGetters;

use crate::{
    config::InstanceConfig,
    datastructures::common::{ClockIdentity, ClockQuality},
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct DefaultDS {
    pub(crate) two_step_flag: bool,
    pub(crate) clock_identity: ClockIdentity,
    pub(crate) number_ports: u16,
    pub(crate) clock_quality: ClockQuality,
    pub(crate) priority_1: u8,
    pub(crate) priority_2: u8,
    pub(crate) domain_number: u8,
    pub(crate) slave_only: bool,
}

impl DefaultDS {
    pub fn new_ordinary_clock(config: &InstanceConfig) -> Self {
        DefaultDS {
            two_step_flag: config.two_step,
            clock_identity: config.clock_identity,
            number_ports: 1,
            clock_quality: config.clock_quality,
            priority_1: config.priority_1,
            priority_2: config.priority_2,
            domain_number: config.domain_number,
            slave_only: config.slave_only,
        }
    }
}

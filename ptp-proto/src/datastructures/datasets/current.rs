use getset::CopyGetters;

use crate::time::TimeInternal;

#[derive(Default, Copy, Clone, Debug, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct CurrentDS {
    pub(crate) steps_removed: u16,
    pub(crate) offset_from_master: TimeInternal,
    pub(crate) mean_path_delay: TimeInternal,
}

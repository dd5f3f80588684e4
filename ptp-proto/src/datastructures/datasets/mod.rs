//! The datasets describing the clock and its single port

pub use current::CurrentDS;
pub use default::DefaultDS;
pub use parent::ParentDS;
pub use port::PortDS;
pub use time_properties::TimePropertiesDS;

mod current;
mod default;
mod parent;
mod port;
mod time_properties;

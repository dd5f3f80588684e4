//! Time definitions

mod interval;
mod internal;

pub use internal::TimeInternal;
pub use interval::Interval;

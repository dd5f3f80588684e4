//! Definitions of the abstract clock types

use crate::time::TimeInternal;

/// Clock manipulation and querying interface
///
/// The clock trait is the primary way the engine interfaces with the local
/// clock. Implementations clamp frequency adjustments to what the hardware
/// supports. An implementation for linux is provided by the ptpd crate.
pub trait Clock {
    type Error: core::fmt::Debug;

    /// Get the current time of the clock
    fn now(&self) -> TimeInternal;

    /// Set the clock to the given time
    fn set_time(&mut self, time: TimeInternal) -> Result<(), Self::Error>;

    /// Change the clock rate by `ppb` parts per billion
    fn adjust_frequency(&mut self, ppb: i32) -> Result<(), Self::Error>;

    /// Step the clock by `offset`.
    ///
    /// Implementations that can step atomically should override this.
    fn apply_offset(&mut self, offset: TimeInternal) -> Result<(), Self::Error> {
        let now = self.now();
        self.set_time(now + offset)
    }
}

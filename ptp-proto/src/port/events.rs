/// Protocol events raised while handling messages and consumed by the state
/// machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortEvent {
    /// New announce information is available for the best master clock
    StateDecision,
    /// The offset to the selected master is small enough to call it
    /// synchronized
    MasterClockSelected,
    /// Synchronization to the master was lost
    SynchronizationFault,
    /// The port follows a different master than before
    MasterClockChanged,
}

impl PortEvent {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of pending [`PortEvent`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSet(u8);

impl EventSet {
    pub fn raise(&mut self, event: PortEvent) {
        self.0 |= event.bit();
    }

    pub fn contains(&self, event: PortEvent) -> bool {
        self.0 & event.bit() != 0
    }

    /// Consume `event`, returning whether it was pending
    pub fn take_and_clear(&mut self, event: PortEvent) -> bool {
        let pending = self.contains(event);
        self.0 &= !event.bit();
        pending
    }

    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

//! The protocol timers of a port.
//!
//! Timers run outside the engine. When one expires, its provider sets the
//! matching flag in the shared [`ExpiryFlags`] and raises the alert; the
//! engine only ever polls the flags.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// The timers a port uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    PDelayReqInterval,
    DelayReqInterval,
    SyncInterval,
    AnnounceReceipt,
    AnnounceInterval,
    QualificationTimeout,
}

impl TimerId {
    pub const ALL: [TimerId; 6] = [
        TimerId::PDelayReqInterval,
        TimerId::DelayReqInterval,
        TimerId::SyncInterval,
        TimerId::AnnounceReceipt,
        TimerId::AnnounceInterval,
        TimerId::QualificationTimeout,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One expiry flag per [`TimerId`], shared between the engine and the
/// timer provider
#[derive(Debug, Default)]
pub struct ExpiryFlags {
    flags: [AtomicBool; TimerId::ALL.len()],
}

impl ExpiryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as expired. Called by the timer provider.
    pub fn expire(&self, id: TimerId) {
        self.flags[id.index()].store(true, Ordering::Release);
    }

    pub fn is_expired(&self, id: TimerId) -> bool {
        self.flags[id.index()].load(Ordering::Acquire)
    }

    /// Consume the expiry of `id`
    pub fn take(&self, id: TimerId) -> bool {
        self.flags[id.index()].swap(false, Ordering::AcqRel)
    }

    pub fn clear(&self, id: TimerId) {
        self.flags[id.index()].store(false, Ordering::Release);
    }
}

/// Runs the timers of a port.
///
/// A started timer is periodic: it keeps expiring every `interval` until it
/// is stopped or started again.
pub trait TimerProvider {
    /// The flags this provider sets on expiry
    fn expiry_flags(&self) -> Arc<ExpiryFlags>;

    /// (Re)start `id`, replacing a running timer of the same id
    fn start(&mut self, id: TimerId, interval: core::time::Duration);

    fn stop(&mut self, id: TimerId);
}

/// Wakes up the engine. Multiple alerts before the engine wakes count as one.
pub trait Alert {
    fn alert(&self);
}

/// The engine side of the timers
#[derive(Debug)]
pub struct TimerBank<P> {
    provider: P,
    flags: Arc<ExpiryFlags>,
}

impl<P: TimerProvider> TimerBank<P> {
    pub fn new(provider: P) -> Self {
        let flags = provider.expiry_flags();
        Self { provider, flags }
    }

    pub fn start(&mut self, id: TimerId, millis: u32) {
        log::trace!("starting {id:?} timer, {millis} ms");
        self.flags.clear(id);
        self.provider
            .start(id, core::time::Duration::from_millis(millis as u64));
    }

    pub fn stop(&mut self, id: TimerId) {
        self.provider.stop(id);
        self.flags.clear(id);
    }

    pub fn stop_all(&mut self) {
        for id in TimerId::ALL {
            self.stop(id);
        }
    }

    /// Whether `id` expired since it was last polled
    pub fn poll_expired(&mut self, id: TimerId) -> bool {
        let expired = self.flags.take(id);
        if expired {
            log::trace!("{id:?} timer expired");
        }
        expired
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        flags: Arc<ExpiryFlags>,
        calls: Vec<(TimerId, Option<u128>)>,
    }

    impl TimerProvider for Recorder {
        fn expiry_flags(&self) -> Arc<ExpiryFlags> {
            self.flags.clone()
        }

        fn start(&mut self, id: TimerId, interval: core::time::Duration) {
            self.calls.push((id, Some(interval.as_millis())));
        }

        fn stop(&mut self, id: TimerId) {
            self.calls.push((id, None));
        }
    }

    #[test]
    fn expiry_is_reported_once() {
        let mut bank = TimerBank::new(Recorder::default());
        bank.start(TimerId::SyncInterval, 1000);

        assert!(!bank.poll_expired(TimerId::SyncInterval));
        bank.provider().flags.expire(TimerId::SyncInterval);
        assert!(bank.poll_expired(TimerId::SyncInterval));
        assert!(!bank.poll_expired(TimerId::SyncInterval));

        // periodic timers keep expiring
        bank.provider().flags.expire(TimerId::SyncInterval);
        assert!(bank.poll_expired(TimerId::SyncInterval));
    }

    #[test]
    fn start_and_stop_discard_stale_expiry() {
        let mut bank = TimerBank::new(Recorder::default());
        let flags = bank.provider().expiry_flags();

        flags.expire(TimerId::AnnounceReceipt);
        bank.start(TimerId::AnnounceReceipt, 12_000);
        assert!(!bank.poll_expired(TimerId::AnnounceReceipt));

        flags.expire(TimerId::AnnounceReceipt);
        bank.stop(TimerId::AnnounceReceipt);
        assert!(!flags.is_expired(TimerId::AnnounceReceipt));

        assert_eq!(
            bank.provider().calls,
            [
                (TimerId::AnnounceReceipt, Some(12_000)),
                (TimerId::AnnounceReceipt, None)
            ]
        );
    }
}

use std::{collections::HashMap, sync::Arc, time::Duration};

use ptp_proto::{Alert, ExpiryFlags, TimerId, TimerProvider};
use tokio::{runtime::Handle, task::JoinHandle};

use crate::alert::AlertSignal;

/// Shortest period a timer runs with
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Protocol timers as periodic tokio tasks
pub struct TokioTimers {
    handle: Handle,
    flags: Arc<ExpiryFlags>,
    alert: Arc<AlertSignal>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(handle: Handle, alert: Arc<AlertSignal>) -> Self {
        Self {
            handle,
            flags: Arc::new(ExpiryFlags::new()),
            alert,
            tasks: HashMap::new(),
        }
    }
}

impl TimerProvider for TokioTimers {
    fn expiry_flags(&self) -> Arc<ExpiryFlags> {
        self.flags.clone()
    }

    fn start(&mut self, id: TimerId, interval: Duration) {
        let period = interval.max(MIN_PERIOD);
        let flags = self.flags.clone();
        let alert = self.alert.clone();

        let task = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticks = tokio::time::interval_at(start, period);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                flags.expire(id);
                alert.alert();
            }
        });

        if let Some(previous) = self.tasks.insert(id, task) {
            previous.abort();
        }
    }

    fn stop(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn timer_expires_periodically() {
        let alert = Arc::new(AlertSignal::new());
        let mut timers = TokioTimers::new(Handle::current(), alert.clone());
        let flags = timers.expiry_flags();

        timers.start(TimerId::SyncInterval, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(flags.take(TimerId::SyncInterval));
        assert!(!flags.is_expired(TimerId::AnnounceInterval));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(flags.take(TimerId::SyncInterval));
        assert!(alert.wait_timeout(Duration::ZERO));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stopped_timer_stays_quiet() {
        let alert = Arc::new(AlertSignal::new());
        let mut timers = TokioTimers::new(Handle::current(), alert);
        let flags = timers.expiry_flags();

        timers.start(TimerId::AnnounceReceipt, Duration::from_millis(20));
        timers.stop(TimerId::AnnounceReceipt);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!flags.is_expired(TimerId::AnnounceReceipt));
    }
}

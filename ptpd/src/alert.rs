use std::{
    sync::{Condvar, Mutex, PoisonError},
    time::Duration,
};

use ptp_proto::Alert;

/// Wakes the engine thread when a datagram arrives or a timer expires
#[derive(Debug, Default)]
pub struct AlertSignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl AlertSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until an alert was raised or `timeout` passed, consuming the
    /// alert. Returns whether an alert was seen.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut raised, _) = self
            .condvar
            .wait_timeout_while(raised, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);

        std::mem::replace(&mut *raised, false)
    }
}

impl Alert for AlertSignal {
    fn alert(&self) {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.condvar.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Instant};

    use super::*;

    #[test]
    fn times_out_without_alert() {
        let signal = AlertSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn alerts_coalesce() {
        let signal = AlertSignal::new();
        signal.alert();
        signal.alert();
        assert!(signal.wait_timeout(Duration::from_millis(10)));
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn wakes_waiting_thread() {
        let signal = Arc::new(AlertSignal::new());
        let waker = signal.clone();
        let thread = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            waker.alert();
        });

        assert!(signal.wait_timeout(Duration::from_secs(10)));
        thread.join().unwrap();
    }
}

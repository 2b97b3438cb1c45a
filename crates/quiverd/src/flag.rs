//! A one-way boolean gate that sleepers can wait on with a timeout.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Boolean flag with timed waits and broadcast wake-up.
///
/// The flag starts unset. [`BlockingFlag::set`] is idempotent and wakes every
/// thread blocked in [`BlockingFlag::wait`].
#[derive(Debug, Default)]
pub struct BlockingFlag {
    state: Mutex<bool>,
    changed: Condvar,
}

impl BlockingFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes all waiters.
    pub fn set(&self) {
        let mut state = self.lock();
        if !*state {
            *state = true;
            self.changed.notify_all();
        }
    }

    /// Reports whether the flag has been set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Blocks until the flag is set or `timeout` elapses.
    ///
    /// Returns `true` when the flag is set on return. Spurious wake-ups do not
    /// shorten the wait.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock();
        while !*state {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                break;
            }
            let (guard, _) = self
                .changed
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        *state
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::BlockingFlag;

    #[test]
    fn wait_times_out_when_unset() {
        let flag = BlockingFlag::new();
        let started = Instant::now();
        assert!(!flag.wait(Duration::from_millis(50)));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn wait_returns_immediately_once_set() {
        let flag = BlockingFlag::new();
        flag.set();
        flag.set();
        let started = Instant::now();
        assert!(flag.wait(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(flag.is_set());
    }

    #[test]
    fn set_wakes_every_waiter() {
        let flag = Arc::new(BlockingFlag::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let flag = Arc::clone(&flag);
                thread::spawn(move || {
                    let started = Instant::now();
                    let woke = flag.wait(Duration::from_secs(10));
                    (woke, started.elapsed())
                })
            })
            .collect();
        thread::sleep(Duration::from_millis(50));
        flag.set();
        for waiter in waiters {
            let (woke, elapsed) = waiter.join().expect("waiter thread");
            assert!(woke);
            assert!(elapsed < Duration::from_secs(5), "waited {elapsed:?}");
        }
    }
}

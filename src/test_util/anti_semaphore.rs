use std::time::Duration;

use parking_lot::{Condvar, Mutex};

const DEADLOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocks callers until `saturation` threads are waiting at the same time.
///
/// A system that calls [`wait`](Self::wait) only returns
/// if enough other systems are running concurrently,
/// so a test deadlocks (and panics after a timeout) if the scheduler serializes them.
#[derive(Debug)]
pub struct AntiSemaphore {
    saturation: usize,
    waiting:    Mutex<usize>,
    condvar:    Condvar,
}

impl AntiSemaphore {
    pub fn new(saturation: usize) -> Self {
        assert!(saturation > 0, "saturation must be positive");
        Self { saturation, waiting: Mutex::new(0), condvar: Condvar::new() }
    }

    /// Blocks until the semaphore is saturated.
    pub fn wait(&self) {
        let mut waiting = self.waiting.lock();
        log::trace!("AntiSemaphore({}/{}).wait()", *waiting, self.saturation);

        *waiting += 1;
        assert!(*waiting <= self.saturation, "AntiSemaphore exceeded saturation");

        if *waiting == self.saturation {
            *waiting = 0;
            self.condvar.notify_all();
            return;
        }

        if self.condvar.wait_for(&mut waiting, DEADLOCK_TIMEOUT).timed_out() {
            panic!("Deadlock: AntiSemaphore not saturated for {DEADLOCK_TIMEOUT:?}");
        }
    }
}

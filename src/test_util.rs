#![allow(missing_docs)]

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Once;

use crate::scheduler::SystemIndex;
use crate::tracer::{self, Tracer};

mod anti_semaphore;
pub use anti_semaphore::AntiSemaphore;

mod event_tracer;
pub use event_tracer::EventTracer;

// Repeat concurrent tests to increase the chance of catching random bugs.
// However, do not rely on test repetitions to assert for behavior;
// use more synchronization where practical.
lazy_static::lazy_static! {
    pub static ref CONCURRENT_TEST_REPETITIONS: usize = (|| {
        if let Ok(count) = env::var("CONCURRENT_TEST_REPETITIONS") {
            if let Ok(count) = count.parse::<usize>() {
                return count;
            }
        }

        if env::var("RUST_LOG").is_ok() { 1 } else { 100 }
    })();
}

pub(crate) fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Collects the maximum number of systems running at the same time.
#[derive(Default)]
pub struct MaxConcurrencyTracer {
    current: AtomicUsize,
    max:     AtomicUsize,
}

impl MaxConcurrencyTracer {
    pub fn max(&self) -> usize { self.max.load(Ordering::SeqCst) }
}

impl Tracer for MaxConcurrencyTracer {
    fn start_run(&self, _thread: tracer::Thread, _node: SystemIndex, _debug_name: &str) {
        let value = self.current.fetch_add(1, Ordering::SeqCst);
        self.max.fetch_max(value + 1, Ordering::SeqCst);
    }

    fn end_run(&self, _thread: tracer::Thread, _node: SystemIndex, _debug_name: &str) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Counts the number of system runs.
#[derive(Default)]
pub struct RunCounterTracer(AtomicUsize);

impl RunCounterTracer {
    pub fn count(&self) -> usize { self.0.load(Ordering::SeqCst) }
}

impl Tracer for RunCounterTracer {
    fn start_run(&self, _thread: tracer::Thread, _node: SystemIndex, _debug_name: &str) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A test component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Comp1(pub i32);

/// A test component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Comp2(pub i32);

/// A test component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Comp3(pub i32);

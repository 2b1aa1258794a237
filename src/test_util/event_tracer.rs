use std::collections::HashMap;

use indexmap::IndexSet;
use parking_lot::Mutex;

use crate::scheduler::SystemIndex;
use crate::tracer::{self, Tracer};

/// A system run boundary observed by [`EventTracer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    Start(String),
    End(String),
}

/// Records system starts and ends, and asserts that they happen in the expected order.
pub struct EventTracer {
    dependencies: HashMap<Event, Vec<Event>>,
    seen:         Mutex<IndexSet<Event>>,
}

impl EventTracer {
    /// Creates a tracer that asserts `before` ends before `after` starts
    /// for each `(before, after)` pair of system names.
    pub fn new<'t>(orders: impl IntoIterator<Item = (&'t str, &'t str)>) -> Self {
        let mut dependencies: HashMap<Event, Vec<Event>> = HashMap::new();
        for (before, after) in orders {
            dependencies
                .entry(Event::Start(after.to_string()))
                .or_default()
                .push(Event::End(before.to_string()));
        }

        Self { dependencies, seen: Mutex::new(IndexSet::new()) }
    }

    /// Records that `event` has happened.
    ///
    /// # Panics
    /// Panics if the same `event` was sent twice or a dependency is not satisfied.
    pub fn trace(&self, event: Event) {
        let mut seen = self.seen.lock();

        if let Some(deps) = self.dependencies.get(&event) {
            for dep in deps {
                assert!(seen.contains(dep), "{event:?} should happen after {dep:?}");
            }
        }

        let (index, new) = seen.insert_full(event);
        assert!(
            new,
            "{:?} is inserted twice",
            seen.get_index(index).expect("insert_full should return valid index")
        );
    }

    /// Returns the names of systems in the order they started.
    pub fn start_order(self) -> Vec<String> {
        self.seen
            .into_inner()
            .into_iter()
            .filter_map(|event| match event {
                Event::Start(name) => Some(name),
                Event::End(_) => None,
            })
            .collect()
    }
}

impl Tracer for EventTracer {
    fn start_run(&self, _thread: tracer::Thread, _node: SystemIndex, debug_name: &str) {
        self.trace(Event::Start(debug_name.to_string()));
    }

    fn end_run(&self, _thread: tracer::Thread, _node: SystemIndex, debug_name: &str) {
        self.trace(Event::End(debug_name.to_string()));
    }
}

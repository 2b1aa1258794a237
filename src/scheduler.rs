//! The scheduler manages the execution of systems,
//! including dependency inference and per-tick dispatch.
//!
//! Systems are organized into a [`Graph`] once, when the world is built.
//! Every tick, the executor walks the graph and runs each system
//! as soon as all of its children (the systems that must run before it) have completed.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::Context;
use crate::error::{BuildError, TickError};
use crate::tracer::Tracer;
use crate::world::Store;

mod builder;
pub(crate) use builder::Builder;

mod executor;
use executor::Executor;

mod graph;
pub use graph::{Graph, Vertex};

mod planner;
use planner::Planner;

mod state;
use state::SyncState;

mod topology;
use topology::Topology;


pub(crate) struct Scheduler {
    graph:    Arc<Graph>,
    topology: Topology,
    planner:  Mutex<Planner>,
    state:    SyncState,
    executor: Executor,
    orders:   Vec<Order>,
}

impl Scheduler {
    pub(crate) fn execute(
        &mut self,
        tracer: &impl Tracer,
        store: &mut Store,
        context: &Context,
    ) -> Result<(), TickError> {
        self.executor.execute_full_cycle(
            tracer,
            &self.topology,
            &mut self.planner,
            &mut self.state,
            store,
            context,
        )
    }

    pub(crate) fn graph(&self) -> &Arc<Graph> { &self.graph }

    pub(crate) fn concurrency(&self) -> usize { self.executor.concurrency() }

    /// An empty scheduler without worker threads.
    pub(crate) fn placeholder() -> Self {
        Builder::new(0).build_with(Arc::default())
    }

    /// Converts the scheduler back into a builder with the same systems, orders and workers.
    pub(crate) fn into_builder(self) -> Builder {
        Builder::from_parts(self.executor, self.state.into_systems(), self.orders)
    }

    /// Organizes the systems of `builder` and builds a scheduler.
    pub(crate) fn build(builder: Builder) -> Result<Self, BuildError> {
        let graph = builder.organize()?;
        Ok(builder.build_with(Arc::new(graph)))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum WakeupState {
    /// The node is runnable after being awaken by `count` other nodes.
    Blocked { count: NonZeroUsize },
    /// The node is in the planner queue.
    Pending,
    /// The node is scheduled on one of the threads.
    Started,
    /// The node has already completed.
    Completed,
}

/// Uniquely identifies a system in a world.
///
/// Indices are assigned in registration order, starting from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemIndex(pub usize);

impl fmt::Display for SystemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// An explicit constraint that `before` completes before `after` starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Order {
    pub(crate) before: SystemIndex,
    pub(crate) after:  SystemIndex,
}

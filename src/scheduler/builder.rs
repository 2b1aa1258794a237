use std::sync::Arc;

use parking_lot::Mutex;

use super::{graph, Executor, Graph, Order, Scheduler, SyncState, SystemIndex, Topology};
use crate::error::BuildError;
use crate::system;

pub(crate) struct Builder {
    executor: Executor,
    systems:  Vec<(system::Spec, Box<dyn system::System>)>,
    orders:   Vec<Order>,
}

/// The number of systems and orders in a builder at some point,
/// used to roll back registrations that failed to organize.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    systems: usize,
    orders:  usize,
}

impl Builder {
    pub(crate) fn new(concurrency: usize) -> Self {
        Self::from_parts(Executor::new(concurrency), Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(
        executor: Executor,
        systems: Vec<(system::Spec, Box<dyn system::System>)>,
        orders: Vec<Order>,
    ) -> Self {
        Self { executor, systems, orders }
    }

    pub(crate) fn concurrency(&self) -> usize { self.executor.concurrency() }

    pub(crate) fn push_system(
        &mut self,
        sys: Box<dyn system::System>,
    ) -> (SystemIndex, &system::Spec) {
        let spec = sys.get_spec();
        let index = SystemIndex(self.systems.len());
        self.systems.push((spec, sys));
        let (spec, _) = self.systems.last().expect("just pushed");
        (index, spec)
    }

    pub(crate) fn add_dependency(&mut self, before: SystemIndex, after: SystemIndex) {
        self.orders.push(Order { before, after });
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint { systems: self.systems.len(), orders: self.orders.len() }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.systems.truncate(checkpoint.systems);
        self.orders.truncate(checkpoint.orders);
    }

    /// Builds the dependency graph of the registered systems without consuming them.
    pub(crate) fn organize(&self) -> Result<Graph, BuildError> {
        let specs: Vec<&system::Spec> = self.systems.iter().map(|(spec, _)| spec).collect();
        graph::organize(&specs, &self.orders)
    }

    /// Builds the scheduler with a graph previously returned by [`organize`](Self::organize).
    pub(crate) fn build_with(self, graph: Arc<Graph>) -> Scheduler {
        debug_assert_eq!(graph.len(), self.systems.len(), "graph does not match the systems");

        let topology = Topology::init(&graph);
        let planner = Mutex::new(topology.initial_planner().clone());

        Scheduler {
            graph,
            topology,
            planner,
            state: SyncState::new(self.systems),
            executor: self.executor,
            orders: self.orders,
        }
    }
}

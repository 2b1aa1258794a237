use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use super::{Graph, Planner, SystemIndex, WakeupState};

/// Stores the topology of the schedule.
#[derive(Debug)]
pub(crate) struct Topology {
    /// If `dependents[a].contains(b)`, `b` depends on `a`.
    /// This means `b` is a wakeup candidate when `a` completes.
    dependents: Vec<Vec<SystemIndex>>,

    /// The [`Planner`] reset state every tick.
    initial_planner: Planner,
}

impl Topology {
    pub(crate) fn init(graph: &Graph) -> Self {
        let mut dependents: Vec<Vec<SystemIndex>> = vec![Vec::new(); graph.len()];
        for (child, parent) in graph.edges() {
            dependents.get_mut(child.0).expect("invalid node index").push(parent);
        }

        Self { dependents, initial_planner: build_initial(graph) }
    }

    pub(crate) fn dependents_of(&self, node: SystemIndex) -> &[SystemIndex] {
        self.dependents.get(node.0).expect("invalid node index")
    }

    pub(crate) fn initial_planner(&self) -> &Planner { &self.initial_planner }
}

fn build_initial(graph: &Graph) -> Planner {
    let wakeup_state: Vec<WakeupState> = graph
        .vertices()
        .iter()
        .map(|vertex| match NonZeroUsize::new(vertex.children().len()) {
            Some(count) => WakeupState::Blocked { count },
            None => WakeupState::Pending,
        })
        .collect();

    // nominate dependencyless systems into the runnable pool
    let runnable: BTreeSet<SystemIndex> = graph
        .vertices()
        .iter()
        .filter(|vertex| vertex.children().is_empty())
        .map(|vertex| vertex.index())
        .collect();

    Planner { wakeup_state, runnable, remaining_systems: graph.len(), aborted: false }
}

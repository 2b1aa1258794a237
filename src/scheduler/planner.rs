use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use super::{SystemIndex, Topology, WakeupState};
use crate::tracer::{self, Tracer};

/// Stores the tick-local state for schedule availability.
#[derive(Debug, Clone)]
pub(crate) struct Planner {
    /// The wakeup state of each system, indexed by [`SystemIndex`].
    pub(crate) wakeup_state: Vec<WakeupState>,

    /// The queue of systems whose children have all completed.
    /// Systems are stolen in ascending index order.
    pub(crate) runnable: BTreeSet<SystemIndex>,

    /// Number of systems that have not completed yet.
    pub(crate) remaining_systems: usize,

    /// Whether a system failed in this tick.
    /// No more systems are stolen once set.
    pub(crate) aborted: bool,
}

impl Planner {
    /// Steal a task from the pending pool if any is available
    pub(crate) fn steal(&mut self, tracer: &impl Tracer, thread: tracer::Thread) -> StealResult {
        if self.aborted {
            return StealResult::Aborted;
        }

        if self.remaining_systems == 0 {
            tracer.steal_return_complete(thread);
            return StealResult::CycleComplete;
        }

        let index = match self.runnable.pop_first() {
            Some(index) => index,
            None => {
                tracer.steal_return_pending(thread);
                return StealResult::Pending;
            }
        };

        // mark node as started
        let state = self.wakeup_state.get_mut(index.0).expect("invalid node index");
        match state {
            WakeupState::Pending => *state = WakeupState::Started,
            _ => panic!(
                "node {index:?} is in runnable queue but state is {state:?} instead of Pending"
            ),
        }

        StealResult::Ready(index)
    }

    /// Mark a node as completed and wake up its dependents.
    pub(crate) fn complete(&mut self, tracer: &impl Tracer, node: SystemIndex, topology: &Topology) {
        self.finish(node);

        for &dependent in topology.dependents_of(node) {
            self.remove_one_block(tracer, dependent);
        }

        tracer.complete_system(node, self.remaining_systems);
    }

    /// Mark a node as failed.
    ///
    /// Its dependents are never woken up, and no more nodes are stolen in this tick.
    pub(crate) fn fail(&mut self, tracer: &impl Tracer, node: SystemIndex, debug_name: &str) {
        self.finish(node);
        self.aborted = true;
        tracer.abort_cycle(node, debug_name);
    }

    fn finish(&mut self, node: SystemIndex) {
        let state = self.wakeup_state.get_mut(node.0).expect("invalid node index");
        match state {
            WakeupState::Started => *state = WakeupState::Completed,
            _ => panic!("cannot mark a {state:?} node as completed"),
        }

        self.remaining_systems -= 1;
    }

    /// Removes one blocker count from a node wakeup state
    fn remove_one_block(&mut self, tracer: &impl Tracer, node: SystemIndex) {
        let state = self.wakeup_state.get_mut(node.0).expect("invalid node index");
        match state {
            WakeupState::Blocked { count } if count.get() > 1 => {
                *count = NonZeroUsize::new(count.get() - 1).expect("count - 1 > 1 - 1 = 0")
            }
            WakeupState::Blocked { .. } => {
                *state = WakeupState::Pending;
                let new = self.runnable.insert(node);
                if !new {
                    panic!("Blocked node {node:?} is already in runnable pool")
                }
                tracer.mark_runnable(node);
            }
            state => panic!("Node {node:?} is in state {state:?} which should not have blockers"),
        }
    }

    /// Checks whether all nodes have completed.
    pub(crate) fn is_complete(&self) -> bool {
        self.wakeup_state.iter().all(|state| matches!(state, WakeupState::Completed))
    }
}

#[derive(Debug)]
pub(crate) enum StealResult {
    Ready(SystemIndex),
    Pending,
    CycleComplete,
    Aborted,
}

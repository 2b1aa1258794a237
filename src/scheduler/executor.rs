use parking_lot::Mutex;

use super::planner::StealResult;
use super::state::SyncState;
use super::{Planner, SystemIndex, Topology};
use crate::context::Context;
use crate::error::TickError;
use crate::system::{Args, Subdivider};
use crate::tracer::{self, Tracer};
use crate::world::Store;

pub(crate) struct Executor {
    thread_pool: Option<rayon::ThreadPool>,
    concurrency: usize,
}

impl Executor {
    /// Builds a new executor with the given `concurrency`.
    ///
    /// Note that `concurrency` only specifies the number of worker threads.
    /// The calling thread is not considered a worker thread.
    /// Therefore, it is valid to set a concurrency of 0,
    /// especially in environments where threading is not supported.
    pub(crate) fn new(concurrency: usize) -> Self {
        Self {
            thread_pool: (concurrency > 0).then(|| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(concurrency)
                    .thread_name(|i| format!("tickgraph worker #{}", i))
                    .build()
                    .expect("Failed to create thread pool")
            }),
            concurrency,
        }
    }

    pub(crate) fn concurrency(&self) -> usize { self.concurrency }

    pub(crate) fn execute_full_cycle(
        &self,
        tracer: &impl Tracer,
        topology: &Topology,
        planner: &mut Mutex<Planner>,
        state: &mut SyncState,
        store: &mut Store,
        context: &Context,
    ) -> Result<(), TickError> {
        // Buffers left over from a tick that unwound are never applied.
        for slot in &mut state.slots {
            slot.commands.get_mut().clear();
        }

        planner.get_mut().clone_from(topology.initial_planner());

        tracer.start_cycle();

        for &index in &planner.get_mut().runnable {
            tracer.mark_runnable(index);
        }

        let failure = Mutex::new(None::<TickError>);

        {
            let cx = Cx {
                tracer,
                topology,
                planner: &*planner,
                state: &*state,
                store: &*store,
                context,
                failure: &failure,
                subdivider: Subdivider::new(self.thread_pool.as_ref(), self.concurrency),
            };

            match &self.thread_pool {
                Some(pool) => pool.scope(|scope| spawn_runnable(scope, cx)),
                None => main_worker(cx),
            }
        }

        if let Some(err) = failure.into_inner() {
            for slot in &mut state.slots {
                slot.commands.get_mut().clear();
            }
            tracer.end_cycle();
            return Err(err);
        }

        #[cfg(debug_assertions)]
        {
            let planner = planner.get_mut();
            if !planner.is_complete() {
                panic!("Tick ended with incomplete nodes: {:?}", planner.wakeup_state);
            }
        }

        let mut destroys = Vec::new();
        for (index, slot) in state.slots.iter_mut().enumerate() {
            let count = slot.commands.get_mut().drain_into(store, &mut destroys);
            if count > 0 {
                tracer.drain_commands(SystemIndex(index), count);
            }
        }
        if !destroys.is_empty() {
            let destroyed = store.destroy_entities(&destroys);
            tracer.destroy_entities(destroys.len(), destroyed);
        }

        tracer.end_cycle();

        Ok(())
    }
}

/// Runs all systems on the calling thread in ascending index order of readiness.
fn main_worker<T: Tracer>(cx: Cx<'_, T>) {
    loop {
        let steal = cx.planner.lock().steal(cx.tracer, tracer::Thread::Main);
        match steal {
            StealResult::Ready(index) => run_node(cx, index),
            StealResult::CycleComplete | StealResult::Aborted => return,
            StealResult::Pending => {
                panic!("Deadlock detected, no systems are runnable but the tick is incomplete")
            }
        }
    }
}

/// Spawns a task for every runnable system.
///
/// Each task spawns the systems it wakes up after it completes,
/// so the scope only joins after every reachable system has run.
fn spawn_runnable<'s, T: Tracer>(scope: &rayon::Scope<'s>, cx: Cx<'s, T>) {
    let thread = tracer::Thread::current();

    let ready: Vec<SystemIndex> = {
        let mut planner = cx.planner.lock();
        std::iter::from_fn(|| match planner.steal(cx.tracer, thread) {
            StealResult::Ready(index) => Some(index),
            _ => None,
        })
        .collect()
    };

    for index in ready {
        scope.spawn(move |scope| {
            run_node(cx, index);
            spawn_runnable(scope, cx);
        });
    }
}

fn run_node<T: Tracer>(cx: Cx<'_, T>, index: SystemIndex) {
    let thread = tracer::Thread::current();
    let slot = cx.state.get(index);

    let result = {
        let mut system =
            slot.system.try_lock().expect("system should only be scheduled to one worker");
        let mut commands =
            slot.commands.try_lock().expect("command buffer should only be used by its system");

        let mut args = Args {
            store:      cx.store,
            context:    cx.context,
            commands:   &mut *commands,
            access:     &slot.access,
            debug_name: &slot.debug_name,
            subdivider: cx.subdivider,
        };

        cx.tracer.start_run(thread, index, &slot.debug_name);
        let result = system.run(&mut args);
        cx.tracer.end_run(thread, index, &slot.debug_name);
        result
    };

    let mut planner = cx.planner.lock();
    match result {
        Ok(()) => planner.complete(cx.tracer, index, cx.topology),
        Err(source) => {
            planner.fail(cx.tracer, index, &slot.debug_name);
            drop(planner);

            log::error!("System {} failed: {source}", slot.debug_name);
            let mut failure = cx.failure.lock();
            if failure.is_none() {
                *failure = Some(TickError::System {
                    index,
                    name: slot.debug_name.clone(),
                    source,
                });
            }
        }
    }
}

/// References shared by all tasks of a tick.
struct Cx<'t, T> {
    tracer:     &'t T,
    topology:   &'t Topology,
    planner:    &'t Mutex<Planner>,
    state:      &'t SyncState,
    store:      &'t Store,
    context:    &'t Context,
    failure:    &'t Mutex<Option<TickError>>,
    subdivider: Subdivider<'t>,
}

impl<'t, T> Clone for Cx<'t, T> {
    fn clone(&self) -> Self { *self }
}

impl<'t, T> Copy for Cx<'t, T> {}

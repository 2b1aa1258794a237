use std::sync::Arc;

use super::{Store, World};
use crate::context::{Context, FixedDelta};
use crate::error::BuildError;
use crate::scheduler::{self, Scheduler, SystemIndex};
use crate::system::{self, Access, Args, Spec, System};

/// This type is used to build a world.
/// No more systems can be scheduled after the builder is built.
pub struct Builder {
    pub(crate) scheduler: scheduler::Builder,
    pub(crate) store:     Store,
    pub(crate) context:   Context,
}

impl Builder {
    /// Creates a new builder with the specified concurrency.
    ///
    /// `concurrency` is the number of worker threads.
    /// If it is 0, all systems run on the thread that calls [`World::execute`].
    pub fn new(concurrency: usize) -> Self {
        Self {
            scheduler: scheduler::Builder::new(concurrency),
            store:     Store::default(),
            context:   Context::default(),
        }
    }

    /// The number of worker threads the world will use.
    pub fn concurrency(&self) -> usize { self.scheduler.concurrency() }

    /// Schedules a system.
    ///
    /// Systems are indexed in scheduling order.
    /// When two systems have conflicting access, the one scheduled earlier runs first in every tick.
    pub fn schedule(&mut self, system: Box<dyn System>) -> SystemIndex {
        let (index, spec) = self.scheduler.push_system(system);
        for access in &spec.access {
            self.store.register(access);
        }
        log::trace!("Scheduled system {} as {index}", spec.debug_name);
        index
    }

    /// Schedules a closure as a system.
    ///
    /// Any state the system keeps across ticks should be moved into the closure.
    pub fn schedule_fn<F>(
        &mut self,
        debug_name: impl Into<String>,
        access: impl IntoIterator<Item = Access>,
        run: F,
    ) -> SystemIndex
    where
        F: FnMut(&mut Args<'_>) -> Result<(), system::Error> + Send + 'static,
    {
        let spec = Spec::new(debug_name).with_all(access);
        self.schedule(Box::new(system::from_fn(spec, run)))
    }

    /// Requires `before` to complete before `after` starts in every tick,
    /// in addition to the order inferred from their access.
    pub fn order(&mut self, before: SystemIndex, after: SystemIndex) {
        self.scheduler.add_dependency(before, after);
    }

    /// The context of the world being built.
    pub fn context_mut(&mut self) -> &mut Context { &mut self.context }

    /// The entity and component store of the world being built.
    pub fn store_mut(&mut self) -> &mut Store { &mut self.store }

    /// Organizes the scheduled systems and builds the world.
    pub fn build(self) -> Result<World, BuildError> {
        let Self { scheduler, store, mut context } = self;

        let scheduler = Scheduler::build(scheduler)?;
        log::debug!(
            "Built dependency graph of {} systems with {} workers",
            scheduler.graph().len(),
            scheduler.concurrency()
        );

        context.get_or_create(FixedDelta::default);
        context.insert(Arc::clone(scheduler.graph()));

        Ok(World { store, context, scheduler, ticks: 0 })
    }
}

//! The world stores the states of the simulation.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::Context;
use crate::entity::Entity;
use crate::error::{BuildError, TickError};
use crate::scheduler::{Graph, Scheduler};
use crate::storage::Component;
use crate::tracer::{self, Tracer};

mod builder;
pub use builder::Builder;

mod store;
pub use store::{Read, Store, Write};

pub mod offline;


/// A bundle encapsulates the systems and resources for a specific feature.
/// This can be used by library crates to expose their features as a single API.
pub trait Bundle {
    /// Schedules the systems used by this bundle.
    ///
    /// Scheduling a system automatically creates the storages of the components it accesses.
    fn register(&self, _builder: &mut Builder) {}

    /// Populates the world with entities and context values.
    fn populate(&self, _world: &mut World) {}
}

/// Creates a world from bundles, with one worker thread per available CPU.
pub fn new<'t>(
    bundles: impl IntoIterator<Item = &'t dyn Bundle> + Copy,
) -> Result<World, BuildError> {
    new_with_concurrency(
        bundles,
        match std::thread::available_parallelism() {
            Ok(c) => c.get(),
            Err(err) => {
                log::error!("Cannot detect number of CPUs ({err}), parallelism disabled");
                0
            }
        },
    )
}

/// Creates a world from bundles with threading disabled.
pub fn new_unthreaded<'t>(
    bundles: impl IntoIterator<Item = &'t dyn Bundle> + Copy,
) -> Result<World, BuildError> {
    new_with_concurrency(bundles, 0)
}

/// Creates a world from bundles and specify the number of worker threads
/// (not counting the calling thread, which only waits for the workers).
pub fn new_with_concurrency<'t>(
    bundles: impl IntoIterator<Item = &'t dyn Bundle> + Copy,
    concurrency: usize,
) -> Result<World, BuildError> {
    let mut builder = Builder::new(concurrency);

    for bundle in bundles {
        bundle.register(&mut builder);
    }

    let mut world = builder.build()?;

    for bundle in bundles {
        bundle.populate(&mut world);
    }

    Ok(world)
}

/// The data structure that stores all states in the simulation.
pub struct World {
    /// The entities and their components.
    store:     Store,
    /// Singleton values shared by all systems.
    context:   Context,
    /// The systems along with their dependency graph.
    scheduler: Scheduler,
    /// Number of ticks completed successfully.
    ticks:     u64,
}

impl World {
    /// Executes all systems in the world once.
    ///
    /// Structural changes queued by systems are applied after all systems have completed.
    /// If a system fails, the systems not yet started are skipped,
    /// all queued changes of this tick are discarded and the first error is returned.
    pub fn execute(&mut self, tracer: &impl Tracer) -> Result<(), TickError> {
        self.scheduler.execute(tracer, &mut self.store, &self.context)?;
        self.ticks += 1;
        Ok(())
    }

    /// Executes all systems once without tracing.
    pub fn run_tick(&mut self) -> Result<(), TickError> { self.execute(&tracer::Noop) }

    /// Number of ticks completed successfully.
    pub fn tick_count(&self) -> u64 { self.ticks }

    /// Adds an entity without components.
    pub fn create_entity(&mut self) -> Entity { self.store.create_entity() }

    /// Destroys a batch of entities and removes all their components.
    ///
    /// Returns the number of entities actually destroyed;
    /// stale and repeated handles are skipped.
    pub fn destroy_entities(&mut self, entities: &[Entity]) -> usize {
        self.store.destroy_entities(entities)
    }

    /// Destroys an entity, returning whether it was alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        self.store.destroy_entities(&[entity]) == 1
    }

    /// Sets a component of a live entity.
    ///
    /// # Panics
    /// Panics if `entity` is not alive.
    pub fn emplace<C: Component>(&mut self, entity: Entity, value: C) -> &mut C {
        self.store.emplace(entity, value)
    }

    /// Removes a component from an entity.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.store.remove(entity)
    }

    /// Checks whether an entity has a component of type `C`.
    pub fn contains<C: Component>(&mut self, entity: Entity) -> bool {
        self.store.contains::<C>(entity)
    }

    /// Gets a reference to an entity component in offline mode.
    pub fn get<C: Component>(&mut self, entity: Entity) -> Option<&C> { self.store.get(entity) }

    /// Gets a mutable reference to an entity component in offline mode.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.store.get_mut(entity)
    }

    /// Locks the storage of `C` for reading.
    ///
    /// # Panics
    /// Panics if `C` is not accessed by any system.
    pub fn read<C: Component>(&self) -> Read<'_, C> { self.store.read() }

    /// Locks the storage of `C` for writing.
    ///
    /// # Panics
    /// Panics if `C` is not accessed by any system.
    pub fn write<C: Component>(&self) -> Write<'_, C> { self.store.write() }

    /// Checks whether an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool { self.store.is_alive(entity) }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize { self.store.entity_count() }

    /// The entity and component store.
    pub fn store(&self) -> &Store { &self.store }

    /// The entity and component store, for offline changes.
    pub fn store_mut(&mut self) -> &mut Store { &mut self.store }

    /// The context of the world.
    pub fn context(&self) -> &Context { &self.context }

    /// The context of the world, for offline changes.
    pub fn context_mut(&mut self) -> &mut Context { &mut self.context }

    /// The dependency graph of the scheduled systems.
    ///
    /// The same graph is also stored in the context.
    pub fn graph(&self) -> &Arc<Graph> { self.scheduler.graph() }

    /// The number of worker threads.
    pub fn concurrency(&self) -> usize { self.scheduler.concurrency() }

    /// Schedules more systems and rebuilds the dependency graph.
    ///
    /// The existing systems keep their indices and their states.
    /// `f` receives a builder that already contains the entities, context and systems of this world.
    /// If the new graph cannot be built, the systems and orders added by `f` are dropped,
    /// the world keeps its previous graph and the error is returned.
    /// If `f` panics, the same rollback happens before the panic is resumed.
    pub fn rebuild(&mut self, f: impl FnOnce(&mut Builder)) -> Result<(), BuildError> {
        let scheduler = mem::replace(&mut self.scheduler, Scheduler::placeholder());
        let old_graph = Arc::clone(scheduler.graph());

        let mut builder = Builder {
            scheduler: scheduler.into_builder(),
            store:     mem::take(&mut self.store),
            context:   mem::take(&mut self.context),
        };

        let checkpoint = builder.scheduler.checkpoint();
        let registered = panic::catch_unwind(AssertUnwindSafe(|| f(&mut builder)));

        if let Err(payload) = registered {
            log::debug!("Rebuild panicked, restoring the previous schedule");
            builder.scheduler.rollback(checkpoint);
            self.restore(builder, old_graph);
            panic::resume_unwind(payload);
        }

        let (graph, result) = match builder.scheduler.organize() {
            Ok(graph) => {
                log::debug!("Rebuilt dependency graph of {} systems", graph.len());
                (Arc::new(graph), Ok(()))
            }
            Err(err) => {
                log::debug!("Rebuild failed ({err}), keeping the previous graph");
                builder.scheduler.rollback(checkpoint);
                (old_graph, Err(err))
            }
        };

        self.restore(builder, graph);
        result
    }

    fn restore(&mut self, builder: Builder, graph: Arc<Graph>) {
        let Builder { scheduler, store, mut context } = builder;
        context.insert(Arc::clone(&graph));
        self.store = store;
        self.context = context;
        self.scheduler = scheduler.build_with(graph);
    }
}

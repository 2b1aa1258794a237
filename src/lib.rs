//! A dependency-graph-driven system scheduler for entity-component simulations.
//!
//! # Entities, components and systems
//! Entities are generational handles.
//! Each component type is stored in its own packed array (see [`storage::Packed`]),
//! and components of different types are joined through a [`View`].
//!
//! Systems declare which component types they read and write through a [`Spec`].
//! When the world is built, all systems are organized into a dependency [`Graph`]:
//! if two systems access the same component type and at least one of them writes it,
//! the system scheduled later waits for the system scheduled earlier.
//! Systems without conflicts may run concurrently on the worker pool.
//!
//! # Structural changes are deferred
//! During a tick, systems only see shared references to the [`world::Store`] and the [`Context`].
//! Entities are created and destroyed, and components are added and removed,
//! through the [`CommandBuffer`](world::offline::CommandBuffer) of each system.
//! The buffers are applied after all systems of the tick have completed,
//! in system index order,
//! so every system observes the same set of entities throughout a tick.
//!
//! # Intra-system parallelism
//! A system that processes many components can split the work across the same worker pool
//! with a [`system::Subdivider`].
//! The slice is cut into one contiguous chunk per worker,
//! and the result does not depend on the number of workers.
//!
//! # Example
//! ```
//! use tickgraph::{system::Access, world, View};
//!
//! struct Position(i32);
//! struct Velocity(i32);
//!
//! let mut builder = world::Builder::new(2);
//! builder.schedule_fn(
//!     "movement",
//!     [Access::write::<Position>(), Access::read::<Velocity>()],
//!     |args| {
//!         let mut positions = args.write::<Position>();
//!         let velocities = args.read::<Velocity>();
//!         View::new((&mut *positions, &*velocities)).each(|_, (position, velocity)| {
//!             position.0 += velocity.0;
//!         });
//!         Ok(())
//!     },
//! );
//! let mut world = builder.build().unwrap();
//!
//! let entity = world.create_entity();
//! world.emplace(entity, Position(0));
//! world.emplace(entity, Velocity(3));
//!
//! world.run_tick().unwrap();
//! world.run_tick().unwrap();
//! assert_eq!(world.get::<Position>(entity).map(|p| p.0), Some(6));
//! ```

#![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(doc, warn(missing_docs))]

#[macro_use]
pub mod tracer;
pub use tracer::Tracer;

pub mod context;
pub use context::Context;

pub mod entity;
pub use entity::Entity;

pub mod error;
pub use error::{BuildError, TickError};

pub mod scheduler;
pub use scheduler::{Graph, SystemIndex, Vertex};

pub mod storage;
pub use storage::{Component, Packed};

pub mod system;
pub use system::{Access, Mode, Spec, System};

pub mod view;
pub use view::View;

pub mod world;
pub use world::{new, Bundle, World};

pub mod util;

#[cfg(test)]
pub(crate) mod test_util;

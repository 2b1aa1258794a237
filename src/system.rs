//! Systems are actions performed every tick to manipulate entities and components.
//!
//! A system declares read or write access to component types through its [`Spec`].
//! The scheduler orders systems so that two systems never run concurrently
//! if one of them writes a component type that the other one accesses.
//! Systems registered earlier run earlier when they conflict.

use std::fmt;

use crate::context::Context;
use crate::entity::Entity;
use crate::storage::Component;
use crate::world::offline::CommandBuffer;
use crate::world::{Read, Store, Write};

pub mod spec;
#[doc(inline)]
pub use spec::{Access, Mode, Spec};

mod closure;
pub use closure::{from_fn, Closure};

mod subdivide;
pub use subdivide::Subdivider;

/// The error type returned by failing systems.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A system declares its component access, stores some states of its own
/// and is runnable with the declared resources.
///
/// There may be multiple instances of the same implementor type.
/// This is meaningful as they may have different states.
pub trait System: Send {
    /// Describes this instance of system.
    ///
    /// The method is only called when the system is scheduled,
    /// but it should return a consistent value.
    fn get_spec(&self) -> Spec;

    /// Runs the system for one tick.
    ///
    /// Returning an error aborts the current tick.
    fn run(&mut self, args: &mut Args<'_>) -> Result<(), Error>;
}

/// The resources passed to a running system.
pub struct Args<'t> {
    pub(crate) store:      &'t Store,
    pub(crate) context:    &'t Context,
    pub(crate) commands:   &'t mut CommandBuffer,
    pub(crate) access:     &'t [Access],
    pub(crate) debug_name: &'t str,
    pub(crate) subdivider: Subdivider<'t>,
}

impl<'t> Args<'t> {
    /// Locks the storage of `C` for reading.
    ///
    /// # Panics
    /// Panics if the system did not declare access to `C`.
    pub fn read<C: Component>(&self) -> Read<'t, C> {
        self.check_access::<C>(Mode::Read);
        match self.store.try_read::<C>() {
            Some(guard) => guard,
            None => self.undeclared::<C>(),
        }
    }

    /// Locks the storage of `C` for writing.
    ///
    /// # Panics
    /// Panics if the system did not declare write access to `C`.
    pub fn write<C: Component>(&self) -> Write<'t, C> {
        self.check_access::<C>(Mode::Write);
        match self.store.try_write::<C>() {
            Some(guard) => guard,
            None => self.undeclared::<C>(),
        }
    }

    /// The context of the world.
    pub fn context(&self) -> &'t Context { self.context }

    /// The command buffer of this system.
    ///
    /// Structural changes queued here are applied after all systems of the tick have completed.
    pub fn commands(&mut self) -> &mut CommandBuffer { self.commands }

    /// Splits work across the worker pool of the world.
    pub fn subdivider(&self) -> Subdivider<'t> { self.subdivider }

    /// The debug name of the running system.
    pub fn debug_name(&self) -> &str { self.debug_name }

    /// Checks whether `entity` is alive as of the start of this tick.
    pub fn is_alive(&self, entity: Entity) -> bool { self.store.is_alive(entity) }

    /// Number of live entities as of the start of this tick.
    pub fn entity_count(&self) -> usize { self.store.entity_count() }

    fn check_access<C: Component>(&self, mode: Mode) {
        if cfg!(debug_assertions) {
            let declared = self.access.iter().find(|access| access.ty == spec::type_of::<C>());
            match declared {
                Some(access) if mode == Mode::Read || access.mode == Mode::Write => {}
                Some(_) => panic!(
                    "System {} requested write access to {} but only declared read access",
                    self.debug_name,
                    std::any::type_name::<C>()
                ),
                None => self.undeclared::<C>(),
            }
        }
    }

    fn undeclared<C: Component>(&self) -> ! {
        panic!(
            "System {} accessed {} without declaring it, or the storage is in use by a \
             conflicting system",
            self.debug_name,
            std::any::type_name::<C>()
        )
    }
}

impl<'t> fmt::Debug for Args<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("system", &self.debug_name).finish_non_exhaustive()
    }
}

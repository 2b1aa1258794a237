use std::any;
use std::collections::HashMap;
use std::ops;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::entity::{Ealloc, Entity};
use crate::storage::{self, AnyStorage, Component, Packed};
use crate::system::Access;
use crate::util::DbgTypeId;

/// Stores the entities and component storages of a world.
///
/// Each component type is stored in its own [`Packed`] storage behind a lock,
/// so that systems with disjoint access can borrow different storages concurrently.
#[derive(Default)]
pub struct Store {
    ealloc:   Ealloc,
    storages: HashMap<DbgTypeId, RwLock<Box<dyn AnyStorage>>>,
}

static_assertions::assert_impl_all!(Store: Send, Sync);

/// A shared lock on the storage of `C`.
pub struct Read<'t, C>(MappedRwLockReadGuard<'t, Packed<C>>);

impl<'t, C> ops::Deref for Read<'t, C> {
    type Target = Packed<C>;

    fn deref(&self) -> &Packed<C> { &self.0 }
}

/// An exclusive lock on the storage of `C`.
pub struct Write<'t, C>(MappedRwLockWriteGuard<'t, Packed<C>>);

impl<'t, C> ops::Deref for Write<'t, C> {
    type Target = Packed<C>;

    fn deref(&self) -> &Packed<C> { &self.0 }
}

impl<'t, C> ops::DerefMut for Write<'t, C> {
    fn deref_mut(&mut self) -> &mut Packed<C> { &mut self.0 }
}

impl Store {
    /// Ensures that a storage exists for the accessed type.
    pub(crate) fn register(&mut self, access: &Access) {
        self.storages.entry(access.ty).or_insert_with(|| RwLock::new((access.storage_builder)()));
    }

    /// Allocates a new entity without components.
    pub fn create_entity(&mut self) -> Entity { self.ealloc.allocate() }

    /// Destroys a batch of entities and removes all their components.
    ///
    /// Components are removed by swapping the last element of each storage into the vacated slot.
    /// Stale handles and repeated handles in the batch are skipped.
    /// Returns the number of entities actually destroyed.
    pub fn destroy_entities(&mut self, entities: &[Entity]) -> usize {
        let mut destroyed = 0;
        for &entity in entities {
            if !self.ealloc.is_alive(entity) {
                log::debug!("Skipping destruction of stale entity {entity:?}");
                continue;
            }

            for storage in self.storages.values_mut() {
                storage.get_mut().remove_entity(entity);
            }
            let released = self.ealloc.deallocate(entity);
            debug_assert!(released, "entity was checked alive");
            destroyed += 1;
        }
        destroyed
    }

    /// Checks whether `entity` is alive.
    pub fn is_alive(&self, entity: Entity) -> bool { self.ealloc.is_alive(entity) }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize { self.ealloc.len() }

    /// Iterates over all live entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ { self.ealloc.iter() }

    /// Returns the storage of `C`, creating it if it does not exist.
    pub fn storage_mut<C: Component>(&mut self) -> &mut Packed<C> {
        self.storages
            .entry(DbgTypeId::of::<C>())
            .or_insert_with(|| RwLock::new(storage::new_any::<C>()))
            .get_mut()
            .as_any_mut()
            .downcast_mut::<Packed<C>>()
            .expect("TypeId mismatch")
    }

    /// Sets the component of a live entity and returns a reference to it.
    ///
    /// # Panics
    /// Panics if `entity` is not alive.
    pub fn emplace<C: Component>(&mut self, entity: Entity, value: C) -> &mut C {
        if !self.ealloc.is_alive(entity) {
            panic!("Cannot emplace {} on dead entity {entity:?}", any::type_name::<C>());
        }
        self.storage_mut::<C>().emplace(entity, value)
    }

    /// Removes the component of `entity`.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.storage_mut::<C>().remove(entity)
    }

    /// Gets the component of `entity` mutably.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.storage_mut::<C>().get_mut(entity)
    }

    /// Checks whether `entity` has a component of type `C`.
    pub fn contains<C: Component>(&mut self, entity: Entity) -> bool {
        self.storage_mut::<C>().contains(entity)
    }

    /// Gets the component of `entity`.
    pub fn get<C: Component>(&mut self, entity: Entity) -> Option<&C> {
        self.storage_mut::<C>().get(entity)
    }

    /// Locks the storage of `C` for reading, blocking if it is written elsewhere.
    ///
    /// # Panics
    /// Panics if no storage exists for `C`.
    pub fn read<C: Component>(&self) -> Read<'_, C> {
        Read(RwLockReadGuard::map(self.lock::<C>().read(), downcast_ref::<C>))
    }

    /// Locks the storage of `C` for writing, blocking if it is used elsewhere.
    ///
    /// # Panics
    /// Panics if no storage exists for `C`.
    pub fn write<C: Component>(&self) -> Write<'_, C> {
        Write(RwLockWriteGuard::map(self.lock::<C>().write(), downcast_mut::<C>))
    }

    /// Locks the storage of `C` for reading without blocking.
    ///
    /// Returns `None` if the storage does not exist or is locked for writing.
    pub fn try_read<C: Component>(&self) -> Option<Read<'_, C>> {
        let guard = self.storages.get(&DbgTypeId::of::<C>())?.try_read()?;
        Some(Read(RwLockReadGuard::map(guard, downcast_ref::<C>)))
    }

    /// Locks the storage of `C` for writing without blocking.
    ///
    /// Returns `None` if the storage does not exist or is locked.
    pub fn try_write<C: Component>(&self) -> Option<Write<'_, C>> {
        let guard = self.storages.get(&DbgTypeId::of::<C>())?.try_write()?;
        Some(Write(RwLockWriteGuard::map(guard, downcast_mut::<C>)))
    }

    /// Number of component storages.
    pub fn storage_count(&self) -> usize { self.storages.len() }

    fn lock<C: Component>(&self) -> &RwLock<Box<dyn AnyStorage>> {
        match self.storages.get(&DbgTypeId::of::<C>()) {
            Some(lock) => lock,
            None => panic!(
                "The component {} cannot be accessed because it is not used in any system",
                any::type_name::<C>()
            ),
        }
    }
}

#[allow(clippy::borrowed_box)]
fn downcast_ref<C: Component>(storage: &Box<dyn AnyStorage>) -> &Packed<C> {
    storage.as_any().downcast_ref::<Packed<C>>().expect("TypeId mismatch")
}

#[allow(clippy::borrowed_box)]
fn downcast_mut<C: Component>(storage: &mut Box<dyn AnyStorage>) -> &mut Packed<C> {
    storage.as_any_mut().downcast_mut::<Packed<C>>().expect("TypeId mismatch")
}

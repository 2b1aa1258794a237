//! A storage is the data structure where components of the same type for all entities are stored.
//!
//! Each component type has exactly one [`Packed`] storage:
//! a sparse set that keeps components contiguous in memory.
//! The packed arrays are exposed directly through [`Packed::as_slice`] and [`Packed::entities`]
//! so that systems can iterate them by index, optionally across worker threads.

use std::any::Any;
use std::{iter, slice};

use crate::entity::Entity;

#[cfg(test)]
mod tests;

/// Marker trait for types that can be stored as components.
pub trait Component: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Component for T {}

/// Sentinel in the sparse array for slots without a component.
const EMPTY: u32 = u32::MAX;

/// A sparse-set storage of components of type `C`.
///
/// The `i`-th element of [`as_slice`](Self::as_slice) belongs to the `i`-th element of
/// [`entities`](Self::entities).
/// Removal swaps the last element into the vacated position,
/// so the packed order is not stable across removals.
pub struct Packed<C> {
    /// Maps entity slot index to the position in the packed arrays.
    sparse:   Vec<u32>,
    /// The owner of each packed component.
    entities: Vec<Entity>,
    /// The packed components.
    data:     Vec<C>,
}

impl<C> Default for Packed<C> {
    fn default() -> Self { Self { sparse: Vec::new(), entities: Vec::new(), data: Vec::new() } }
}

impl<C: Component> Packed<C> {
    /// Returns the position of `entity` in the packed arrays, if it has a component.
    pub fn position(&self, entity: Entity) -> Option<usize> {
        let dense = *self.sparse.get(entity.usize())?;
        if dense == EMPTY {
            return None;
        }
        let dense = dense as usize;
        (self.entities[dense] == entity).then_some(dense)
    }

    /// Checks whether `entity` has a component in this storage.
    pub fn contains(&self, entity: Entity) -> bool { self.position(entity).is_some() }

    /// Gets a shared reference to the component of `entity`.
    pub fn get(&self, entity: Entity) -> Option<&C> {
        let dense = self.position(entity)?;
        Some(&self.data[dense])
    }

    /// Gets a mutable reference to the component of `entity`.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let dense = self.position(entity)?;
        Some(&mut self.data[dense])
    }

    /// Sets the component of `entity`, returning the previous value if it had one.
    ///
    /// A component left behind by a previous occupant of the same slot is replaced and dropped.
    pub fn insert(&mut self, entity: Entity, value: C) -> Option<C> {
        let slot = entity.usize();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, EMPTY);
        }

        match self.sparse[slot] {
            EMPTY => {
                self.sparse[slot] =
                    self.entities.len().try_into().expect("too many components in storage");
                self.entities.push(entity);
                self.data.push(value);
                None
            }
            dense => {
                let dense = dense as usize;
                let old_owner = std::mem::replace(&mut self.entities[dense], entity);
                let old = std::mem::replace(&mut self.data[dense], value);
                (old_owner == entity).then_some(old)
            }
        }
    }

    /// Inserts a component and returns a mutable reference to it.
    pub fn emplace(&mut self, entity: Entity, value: C) -> &mut C {
        self.insert(entity, value);
        let dense = self.position(entity).expect("component was just inserted");
        &mut self.data[dense]
    }

    /// Removes the component of `entity` by swapping the last component into its position.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let dense = self.position(entity)?;
        self.sparse[entity.usize()] = EMPTY;

        let last = self.entities.len() - 1;
        if dense != last {
            let moved = self.entities[last];
            self.sparse[moved.usize()] = dense as u32;
        }

        self.entities.swap_remove(dense);
        Some(self.data.swap_remove(dense))
    }

    /// Number of components in this storage.
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether this storage is empty.
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// The owners of the packed components, in packed order.
    pub fn entities(&self) -> &[Entity] { &self.entities }

    /// The packed components.
    pub fn as_slice(&self) -> &[C] { &self.data }

    /// The packed components, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.data }

    /// The owners and the packed components, where the components are mutable.
    pub fn split_mut(&mut self) -> (&[Entity], &mut [C]) { (&self.entities, &mut self.data) }

    /// Iterates over all components in packed order.
    pub fn iter(&self) -> iter::Zip<iter::Copied<slice::Iter<'_, Entity>>, slice::Iter<'_, C>> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    /// Iterates over all components mutably in packed order.
    pub fn iter_mut(
        &mut self,
    ) -> iter::Zip<iter::Copied<slice::Iter<'_, Entity>>, slice::IterMut<'_, C>> {
        self.entities.iter().copied().zip(self.data.iter_mut())
    }
}

/// A type-erased [`Packed`] storage.
pub(crate) trait AnyStorage: Send + Sync + 'static {
    /// Removes the component of `entity` if present.
    fn remove_entity(&mut self, entity: Entity);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> AnyStorage for Packed<C> {
    fn remove_entity(&mut self, entity: Entity) { self.remove(entity); }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}

/// Creates an empty type-erased storage for `C`.
pub(crate) fn new_any<C: Component>() -> Box<dyn AnyStorage> { Box::<Packed<C>>::default() }

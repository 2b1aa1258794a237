//! An entity is a single object that owns components.
//!
//! Entities are plain `Copy` handles made of a slot index and a generation.
//! A handle stays valid until its entity is destroyed;
//! destroying an entity bumps the generation of its slot,
//! so stale handles never match an entity created later in the same slot.

use std::fmt;

pub mod ealloc;
pub use ealloc::Ealloc;

/// A handle to an entity in a [`World`](crate::World).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    index:      u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self { Self { index, generation } }

    /// The slot index of this entity.
    ///
    /// Indices are recycled after destruction; use the whole handle for identity.
    pub fn index(self) -> u32 { self.index }

    /// The number of times the slot was released before this entity was created.
    pub fn generation(self) -> u32 { self.generation }

    pub(crate) fn usize(self) -> usize { self.index.try_into().expect("usize >= u32") }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

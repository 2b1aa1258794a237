//! Joined traversal over the entities that have all of a set of components.
//!
//! A [`View`] wraps one storage reference or a tuple of up to four of them:
//!
//! ```
//! # use tickgraph::{storage::Packed, view::View};
//! # struct Pos(f32); struct Vel(f32);
//! # fn demo(vel: &Packed<Vel>, pos: &mut Packed<Pos>) {
//! View::new((vel, pos)).each(|_entity, (vel, pos)| pos.0 += vel.0);
//! # }
//! ```
//!
//! The storage with the fewest components drives the traversal,
//! so entities are visited in the packed order of that storage.
//! Views hold no state between calls and can be traversed any number of times.

use crate::entity::Entity;
use crate::storage::{Component, Packed};


/// The item type of a [`Fetch`] borrowed for `'a`.
///
/// `Outlives` is never named by implementors.
/// It carries the implied bound `Self: 'a`,
/// so that `for<'a> FetchItem<'a>` only ranges over lifetimes shorter than the fetch.
pub trait FetchItem<'a, Outlives = &'a Self> {
    /// The value yielded for each matching entity.
    type Item;
}

/// A storage reference (or a tuple of them) that can be joined in a [`View`].
pub trait Fetch: for<'a> FetchItem<'a> {
    /// The candidate entities, taken from the smallest storage.
    fn candidates(&self) -> &[Entity];

    /// Checks whether `entity` has every component of this fetch.
    fn contains(&self, entity: Entity) -> bool;

    /// Fetches the components of `entity`, or `None` if any is missing.
    fn fetch(&mut self, entity: Entity) -> Option<<Self as FetchItem<'_>>::Item>;
}

impl<'a, 's, C: Component> FetchItem<'a> for &'s Packed<C> {
    type Item = &'a C;
}

impl<'s, C: Component> Fetch for &'s Packed<C> {
    fn candidates(&self) -> &[Entity] { self.entities() }

    fn contains(&self, entity: Entity) -> bool { Packed::contains(self, entity) }

    fn fetch(&mut self, entity: Entity) -> Option<<Self as FetchItem<'_>>::Item> {
        self.get(entity)
    }
}

impl<'a, 's, C: Component> FetchItem<'a> for &'s mut Packed<C> {
    type Item = &'a mut C;
}

impl<'s, C: Component> Fetch for &'s mut Packed<C> {
    fn candidates(&self) -> &[Entity] { self.entities() }

    fn contains(&self, entity: Entity) -> bool { Packed::contains(self, entity) }

    fn fetch(&mut self, entity: Entity) -> Option<<Self as FetchItem<'_>>::Item> {
        self.get_mut(entity)
    }
}

macro_rules! impl_fetch_tuple {
    ($first_ty:ident $first_idx:tt $(, $ty:ident $idx:tt)*) => {
        impl<'a, $first_ty: Fetch $(, $ty: Fetch)*> FetchItem<'a> for ($first_ty, $($ty,)*) {
            type Item = (
                <$first_ty as FetchItem<'a>>::Item,
                $(<$ty as FetchItem<'a>>::Item,)*
            );
        }

        impl<$first_ty: Fetch $(, $ty: Fetch)*> Fetch for ($first_ty, $($ty,)*) {
            fn candidates(&self) -> &[Entity] {
                #[allow(unused_mut)]
                let mut smallest = self.$first_idx.candidates();
                $(
                    let candidates = self.$idx.candidates();
                    if candidates.len() < smallest.len() {
                        smallest = candidates;
                    }
                )*
                smallest
            }

            fn contains(&self, entity: Entity) -> bool {
                self.$first_idx.contains(entity) $(&& self.$idx.contains(entity))*
            }

            fn fetch(&mut self, entity: Entity) -> Option<<Self as FetchItem<'_>>::Item> {
                Some((self.$first_idx.fetch(entity)?, $(self.$idx.fetch(entity)?,)*))
            }
        }
    };
}

impl_fetch_tuple!(A 0);
impl_fetch_tuple!(A 0, B 1);
impl_fetch_tuple!(A 0, B 1, C 2);
impl_fetch_tuple!(A 0, B 1, C 2, D 3);

/// A joined traversal over the storages in `F`.
pub struct View<F> {
    fetch: F,
}

impl<F: Fetch> View<F> {
    /// Creates a view over the given storages.
    pub fn new(fetch: F) -> Self { Self { fetch } }

    /// Calls `f` for each entity that has every component in the view.
    pub fn each(&mut self, mut f: impl FnMut(Entity, <F as FetchItem<'_>>::Item)) {
        let len = self.fetch.candidates().len();
        for i in 0..len {
            let entity = self.fetch.candidates()[i];
            if let Some(item) = self.fetch.fetch(entity) {
                f(entity, item);
            }
        }
    }

    /// Fetches the components of a single entity.
    pub fn get(&mut self, entity: Entity) -> Option<<F as FetchItem<'_>>::Item> {
        self.fetch.fetch(entity)
    }

    /// Iterates over the entities that have every component in the view.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.fetch.candidates().iter().copied().filter(|&entity| self.fetch.contains(entity))
    }

    /// Counts the entities that have every component in the view.
    pub fn count(&self) -> usize { self.entities().count() }

    /// Releases the wrapped storages.
    pub fn into_inner(self) -> F { self.fetch }
}

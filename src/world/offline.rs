//! Operations queued during a tick and applied after all systems have completed.

use std::any;
use std::marker::PhantomData;

use super::Store;
use crate::entity::Entity;
use crate::storage::Component;

/// An operation to be executed after join.
trait Operation: Send {
    /// Performs the operation on the offline store.
    fn run(self: Box<Self>, store: &mut Store);
}

/// A set of components attached to an entity spawned from a [`CommandBuffer`].
///
/// Implemented for tuples of up to 8 components.
pub trait ComponentSet: Send + 'static {
    /// Emplaces all components on `entity`.
    fn emplace_all(self, store: &mut Store, entity: Entity);
}

macro_rules! impl_component_set {
    ($($ty:ident $idx:tt),*) => {
        impl<$($ty: Component),*> ComponentSet for ($($ty,)*) {
            #[allow(unused_variables)]
            fn emplace_all(self, store: &mut Store, entity: Entity) {
                $(
                    store.emplace(entity, self.$idx);
                )*
            }
        }
    };
}

impl_component_set!();
impl_component_set!(A 0);
impl_component_set!(A 0, B 1);
impl_component_set!(A 0, B 1, C 2);
impl_component_set!(A 0, B 1, C 2, D 3);
impl_component_set!(A 0, B 1, C 2, D 3, E 4);
impl_component_set!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_component_set!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_component_set!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Create an entity.
struct SpawnEntity<S> {
    components: S,
}

impl<S: ComponentSet> Operation for SpawnEntity<S> {
    fn run(self: Box<Self>, store: &mut Store) {
        let entity = store.create_entity();
        self.components.emplace_all(store, entity);
    }
}

/// Set a component on an existing entity.
struct InsertComponent<C> {
    entity: Entity,
    value:  C,
}

impl<C: Component> Operation for InsertComponent<C> {
    fn run(self: Box<Self>, store: &mut Store) {
        if store.is_alive(self.entity) {
            store.emplace(self.entity, self.value);
        } else {
            log::debug!(
                "Dropping queued {} for dead entity {:?}",
                any::type_name::<C>(),
                self.entity
            );
        }
    }
}

/// Remove a component from an entity.
struct RemoveComponent<C> {
    entity: Entity,
    _ph:    PhantomData<fn() -> C>,
}

impl<C: Component> Operation for RemoveComponent<C> {
    fn run(self: Box<Self>, store: &mut Store) { store.remove::<C>(self.entity); }
}

/// Structural changes queued by one system during a tick.
///
/// Spawns, insertions and removals are applied in the order they were queued.
/// Destructions are applied after every other queued operation of the tick,
/// so a component inserted on an entity destroyed in the same tick is dropped.
#[derive(Default)]
pub struct CommandBuffer {
    items:    Vec<Box<dyn Operation>>,
    destroys: Vec<Entity>,
}

impl CommandBuffer {
    /// Queues the creation of an entity with the given components.
    pub fn spawn(&mut self, components: impl ComponentSet) {
        self.items.push(Box::new(SpawnEntity { components }));
    }

    /// Queues setting a component on an entity.
    pub fn insert<C: Component>(&mut self, entity: Entity, value: C) {
        self.items.push(Box::new(InsertComponent { entity, value }));
    }

    /// Queues removing a component from an entity.
    pub fn remove<C: Component>(&mut self, entity: Entity) {
        self.items.push(Box::new(RemoveComponent::<C> { entity, _ph: PhantomData }));
    }

    /// Queues the destruction of an entity.
    pub fn destroy(&mut self, entity: Entity) { self.destroys.push(entity); }

    /// Number of queued operations, including destructions.
    pub fn len(&self) -> usize { self.items.len() + self.destroys.len() }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool { self.items.is_empty() && self.destroys.is_empty() }

    /// Discards all queued operations.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.destroys.clear();
    }

    /// Applies queued spawns, insertions and removals,
    /// and moves queued destructions into `destroys`.
    pub(crate) fn drain_into(&mut self, store: &mut Store, destroys: &mut Vec<Entity>) -> usize {
        let count = self.len();
        for op in self.items.drain(..) {
            op.run(store);
        }
        destroys.append(&mut self.destroys);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Hp(u32);
    #[derive(Debug, PartialEq)]
    struct Name(&'static str);

    fn apply(store: &mut Store, buffer: &mut CommandBuffer) -> usize {
        let mut destroys = Vec::new();
        let count = buffer.drain_into(store, &mut destroys);
        store.destroy_entities(&destroys);
        count
    }

    #[test]
    fn test_spawn() {
        let mut store = Store::default();
        let mut buffer = CommandBuffer::default();
        buffer.spawn((Hp(3), Name("a")));
        buffer.spawn(());
        assert_eq!(store.entity_count(), 0, "spawns are deferred");

        assert_eq!(apply(&mut store, &mut buffer), 2);
        assert_eq!(store.entity_count(), 2);
        assert!(buffer.is_empty());

        let entity = store.storage_mut::<Hp>().entities()[0];
        assert_eq!(store.get::<Name>(entity), Some(&Name("a")));
    }

    #[test]
    fn test_destroy_after_insert() {
        let mut store = Store::default();
        let entity = store.create_entity();

        let mut buffer = CommandBuffer::default();
        buffer.destroy(entity);
        buffer.insert(entity, Hp(1));
        apply(&mut store, &mut buffer);

        assert!(!store.is_alive(entity));
        assert!(store.storage_mut::<Hp>().is_empty());
    }

    #[test]
    fn test_insert_remove_order() {
        let mut store = Store::default();
        let entity = store.create_entity();

        let mut buffer = CommandBuffer::default();
        buffer.insert(entity, Hp(1));
        buffer.remove::<Hp>(entity);
        buffer.insert(entity, Hp(2));
        apply(&mut store, &mut buffer);

        assert_eq!(store.get::<Hp>(entity), Some(&Hp(2)));
    }

    #[test]
    fn test_insert_dead_entity_dropped() {
        let mut store = Store::default();
        let entity = store.create_entity();
        store.destroy_entities(&[entity]);

        let mut buffer = CommandBuffer::default();
        buffer.insert(entity, Hp(1));
        apply(&mut store, &mut buffer);
        assert!(store.storage_mut::<Hp>().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = CommandBuffer::default();
        buffer.spawn((Hp(1),));
        buffer.destroy(Entity::new(0, 0));
        assert_eq!(buffer.len(), 2);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}

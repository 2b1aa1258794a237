use super::*;
use crate::entity::Ealloc;

fn alloc(n: usize) -> (Ealloc, Vec<Entity>) {
    let mut ealloc = Ealloc::default();
    let entities = (0..n).map(|_| ealloc.allocate()).collect();
    (ealloc, entities)
}

#[test]
fn test_insert_get() {
    let (_, entities) = alloc(3);
    let mut storage = Packed::<i64>::default();

    assert_eq!(storage.insert(entities[2], 20), None);
    assert_eq!(storage.insert(entities[0], 0), None);
    assert_eq!(storage.insert(entities[0], 5), Some(0));

    assert_eq!(storage.get(entities[0]), Some(&5));
    assert_eq!(storage.get(entities[1]), None);
    assert_eq!(storage.get(entities[2]), Some(&20));
    assert_eq!(storage.len(), 2);
    assert_eq!(storage.entities(), &[entities[2], entities[0]]);
    assert_eq!(storage.as_slice(), &[20, 5]);
}

#[test]
fn test_swap_remove_keeps_mapping() {
    let (_, entities) = alloc(4);
    let mut storage = Packed::<i64>::default();
    for (i, &entity) in entities.iter().enumerate() {
        storage.insert(entity, i as i64 * 10);
    }

    assert_eq!(storage.remove(entities[1]), Some(10));
    assert_eq!(storage.remove(entities[1]), None);

    assert_eq!(storage.entities(), &[entities[0], entities[3], entities[2]]);
    assert_eq!(storage.as_slice(), &[0, 30, 20]);
    assert_eq!(storage.get(entities[3]), Some(&30));
    assert_eq!(storage.position(entities[3]), Some(1));

    assert_eq!(storage.remove(entities[2]), Some(20));
    assert_eq!(storage.remove(entities[0]), Some(0));
    assert_eq!(storage.remove(entities[3]), Some(30));
    assert!(storage.is_empty());
}

#[test]
fn test_stale_generation_is_absent() {
    let (mut ealloc, entities) = alloc(1);
    let mut storage = Packed::<&'static str>::default();
    storage.insert(entities[0], "old");

    ealloc.deallocate(entities[0]);
    let reborn = ealloc.allocate();
    assert_eq!(reborn.index(), entities[0].index());

    assert_eq!(storage.get(reborn), None, "new occupant must not see stale component");
    assert_eq!(storage.insert(reborn, "new"), None);
    assert_eq!(storage.get(entities[0]), None);
    assert_eq!(storage.get(reborn), Some(&"new"));
    assert_eq!(storage.len(), 1);
}

#[test]
fn test_emplace_returns_mut() {
    let (_, entities) = alloc(2);
    let mut storage = Packed::<Vec<u8>>::default();
    storage.emplace(entities[1], vec![1]).push(2);
    assert_eq!(storage.get(entities[1]), Some(&vec![1, 2]));
}

#[test]
fn test_iter_mut() {
    let (_, entities) = alloc(3);
    let mut storage = Packed::<i64>::default();
    for &entity in &entities {
        storage.insert(entity, 1);
    }
    for (entity, value) in storage.iter_mut() {
        *value += i64::from(entity.index());
    }
    let collected: Vec<_> = storage.iter().map(|(e, &v)| (e.index(), v)).collect();
    assert_eq!(collected, vec![(0, 1), (1, 2), (2, 3)]);
}

#[test]
fn test_any_storage_remove() {
    let (_, entities) = alloc(2);
    let mut storage = new_any::<i64>();
    storage
        .as_any_mut()
        .downcast_mut::<Packed<i64>>()
        .expect("storage type")
        .insert(entities[0], 1);

    storage.remove_entity(entities[1]);
    assert_eq!(storage.len(), 1);
    storage.remove_entity(entities[0]);
    assert_eq!(storage.len(), 0);
    assert_eq!(storage.type_name(), "i64");
}

use super::*;

#[test]
fn test_allocate_sequential() {
    let mut ealloc = Ealloc::default();
    let entities: Vec<_> = (0..4).map(|_| ealloc.allocate()).collect();
    assert_eq!(entities.iter().map(|e| e.index()).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(entities.iter().all(|e| e.generation() == 0));
    assert_eq!(ealloc.len(), 4);
}

#[test]
fn test_recycle_filo_with_new_generation() {
    let mut ealloc = Ealloc::default();
    let a = ealloc.allocate();
    let b = ealloc.allocate();
    let c = ealloc.allocate();

    assert!(ealloc.deallocate(a));
    assert!(ealloc.deallocate(c));
    assert_eq!(ealloc.len(), 1);

    let d = ealloc.allocate();
    assert_eq!(d.index(), c.index(), "last released slot is reused first");
    assert_eq!(d.generation(), c.generation() + 1);
    assert_ne!(d, c);

    let e = ealloc.allocate();
    assert_eq!(e.index(), a.index());
    assert_eq!(e.generation(), 1);

    assert!(ealloc.is_alive(b));
    assert!(!ealloc.is_alive(a));
    assert!(!ealloc.is_alive(c));
}

#[test]
fn test_stale_deallocate() {
    let mut ealloc = Ealloc::default();
    let a = ealloc.allocate();
    assert!(ealloc.deallocate(a));
    assert!(!ealloc.deallocate(a), "double deallocation must be rejected");

    let b = ealloc.allocate();
    assert!(!ealloc.deallocate(a), "stale handle must not release the new occupant");
    assert!(ealloc.is_alive(b));
}

#[test]
fn test_never_allocated() {
    let ealloc = Ealloc::default();
    assert!(!ealloc.is_alive(Entity::new(5, 0)));
}

#[test]
fn test_generation_overflow_retires_slot() {
    let mut ealloc = Ealloc::default();
    let a = ealloc.allocate();
    ealloc.force_generation(a.index(), u32::MAX);
    let a = Entity::new(a.index(), u32::MAX);
    assert!(ealloc.is_alive(a));
    assert!(ealloc.deallocate(a));

    let b = ealloc.allocate();
    assert_ne!(b.index(), a.index(), "overflowed slot must not be reused");
}

#[test]
fn test_iter_live() {
    let mut ealloc = Ealloc::default();
    let entities: Vec<_> = (0..5).map(|_| ealloc.allocate()).collect();
    ealloc.deallocate(entities[1]);
    ealloc.deallocate(entities[3]);
    let live: Vec<_> = ealloc.iter().collect();
    assert_eq!(live, vec![entities[0], entities[2], entities[4]]);
}

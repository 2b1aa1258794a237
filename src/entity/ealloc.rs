//! Allocates entity slots and tracks their generations.

use bitvec::vec::BitVec;

use super::Entity;

#[cfg(test)]
mod tests;

/// Allocates entity handles.
///
/// Released slots are recycled in FILO order.
/// A slot whose generation counter would overflow is retired instead of recycled.
#[derive(Debug, Default)]
pub struct Ealloc {
    /// The current generation of each slot.
    generations: Vec<u32>,
    /// Whether each slot currently holds a live entity.
    alive:       BitVec,
    /// Released slots available for reuse.
    recycled:    Vec<u32>,
    /// Number of live entities.
    live:        usize,
}

impl Ealloc {
    /// Allocates a new entity handle.
    pub fn allocate(&mut self) -> Entity {
        let index = match self.recycled.pop() {
            Some(index) => index,
            None => {
                let index: u32 = self
                    .generations
                    .len()
                    .try_into()
                    .expect("too many entities allocated, entity index overflows u32");
                self.generations.push(0);
                self.alive.push(false);
                index
            }
        };

        let slot = index as usize;
        debug_assert!(!self.alive[slot], "recycled slot {index} is still alive");
        self.alive.set(slot, true);
        self.live += 1;

        Entity::new(index, self.generations[slot])
    }

    /// Releases the slot of a live entity.
    ///
    /// Returns `false` if the handle is stale or was never allocated.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = entity.usize();
        self.alive.set(slot, false);
        self.live -= 1;

        let generation = &mut self.generations[slot];
        match generation.checked_add(1) {
            Some(next) => {
                *generation = next;
                self.recycled.push(entity.index());
            }
            None => log::debug!("Retiring entity slot {} after generation overflow", entity.index()),
        }

        true
    }

    /// Checks whether the handle refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.usize();
        match self.alive.get(slot) {
            Some(alive) if *alive => self.generations[slot] == entity.generation(),
            _ => false,
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize { self.live }

    /// Whether there are no live entities.
    pub fn is_empty(&self) -> bool { self.live == 0 }

    /// Iterates over all live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive.iter_ones().map(|slot| {
            let index = u32::try_from(slot).expect("slot was allocated from a u32");
            Entity::new(index, self.generations[slot])
        })
    }

    #[cfg(test)]
    pub(crate) fn force_generation(&mut self, index: u32, generation: u32) {
        self.generations[index as usize] = generation;
    }
}

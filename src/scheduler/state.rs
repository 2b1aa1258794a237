use parking_lot::Mutex;

use super::SystemIndex;
use crate::system::{self, Access, Spec};
use crate::world::offline::CommandBuffer;

/// A scheduled system along with the state it owns between ticks.
pub(crate) struct Slot {
    pub(crate) debug_name: String,
    pub(crate) access:     Vec<Access>,
    pub(crate) system:     Mutex<Box<dyn system::System>>,
    pub(crate) commands:   Mutex<CommandBuffer>,
}

pub(crate) struct SyncState {
    pub(crate) slots: Vec<Slot>,
}

impl SyncState {
    pub(crate) fn new(systems: Vec<(Spec, Box<dyn system::System>)>) -> Self {
        let slots = systems
            .into_iter()
            .map(|(spec, system)| Slot {
                debug_name: spec.debug_name,
                access:     spec.access,
                system:     Mutex::new(system),
                commands:   Mutex::new(CommandBuffer::default()),
            })
            .collect();
        Self { slots }
    }

    pub(crate) fn get(&self, index: SystemIndex) -> &Slot {
        self.slots.get(index.0).expect("invalid node index")
    }

    pub(crate) fn into_systems(self) -> Vec<(Spec, Box<dyn system::System>)> {
        self.slots
            .into_iter()
            .map(|slot| {
                let spec = Spec { debug_name: slot.debug_name, access: slot.access };
                (spec, slot.system.into_inner())
            })
            .collect()
    }
}

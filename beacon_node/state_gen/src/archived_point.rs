use types::{Hash256, Slot};

/// A fixed anchor in the cold region: the full state at `index * slots_per_archived_point`,
/// persisted so a cold read never needs to replay further back than the nearest one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchivedPoint {
    pub index: u64,
    pub slot: Slot,
    pub state_root: Hash256,
}

impl ArchivedPoint {
    pub fn slot_for_index(index: u64, slots_per_archived_point: u64) -> Slot {
        Slot::new(index * slots_per_archived_point)
    }

    pub fn index_for_slot(slot: Slot, slots_per_archived_point: u64) -> u64 {
        slot.as_u64() / slots_per_archived_point
    }
}

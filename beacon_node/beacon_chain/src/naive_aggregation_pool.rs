//! The local attestation pool named in spec §4.4 step 8 ("remove the block's operations from the
//! local pools"): a flat map of not-yet-included attestations keyed by `(slot,
//! attestation_data_root)`, drained by `BlockProcessor::on_block` as attestations are consumed.
//!
//! Unlike the teacher's aggregation pool this never merges signatures — committee/duty scheduling
//! and signature aggregation are out of this core's scope (§1) — it is purely a "what have we
//! seen but not yet included" bookkeeping map.

use std::collections::HashMap;
use tree_hash::TreeHash;
use types::{Attestation, AttestationData, Hash256, Slot};

type AttestationDataRoot = Hash256;

/// The number of slots retained by the pool; attestations older than this are pruned and future
/// ones below the cutoff are refused.
const SLOTS_RETAINED: usize = 3;

/// DoS protection: caps the number of distinct `AttestationData` tracked per slot.
const MAX_ATTESTATIONS_PER_SLOT: usize = 16_384;

#[derive(Debug, PartialEq)]
pub enum Error {
    SlotTooLow { slot: Slot, lowest_permissible_slot: Slot },
    ReachedMaxAttestationsPerSlot(usize),
}

#[derive(Default)]
pub struct NaiveAggregationPool {
    lowest_permissible_slot: Slot,
    maps: HashMap<Slot, HashMap<AttestationDataRoot, Attestation>>,
}

impl NaiveAggregationPool {
    pub fn insert(&mut self, attestation: &Attestation) -> Result<(), Error> {
        let slot = attestation.data.slot;
        if slot < self.lowest_permissible_slot {
            return Err(Error::SlotTooLow { slot, lowest_permissible_slot: self.lowest_permissible_slot });
        }

        let map = self.maps.entry(slot).or_insert_with(HashMap::new);
        let root = Hash256::from_slice(&attestation.data.tree_hash_root()[..]);
        if !map.contains_key(&root) && map.len() >= MAX_ATTESTATIONS_PER_SLOT {
            return Err(Error::ReachedMaxAttestationsPerSlot(MAX_ATTESTATIONS_PER_SLOT));
        }
        map.insert(root, attestation.clone());

        self.prune(slot);
        Ok(())
    }

    pub fn get(&self, data: &AttestationData) -> Option<Attestation> {
        let root = Hash256::from_slice(&data.tree_hash_root()[..]);
        self.maps.get(&data.slot)?.get(&root).cloned()
    }

    /// Removes `data`'s entry, if present. Called once per attestation a block consumes.
    pub fn remove(&mut self, data: &AttestationData) {
        let root = Hash256::from_slice(&data.tree_hash_root()[..]);
        if let Some(map) = self.maps.get_mut(&data.slot) {
            map.remove(&root);
        }
    }

    pub fn num_attestations(&self) -> usize {
        self.maps.values().map(|m| m.len()).sum()
    }

    /// Drops every map older than `current_slot - SLOTS_RETAINED` and bars future inserts below
    /// that cutoff.
    pub fn prune(&mut self, current_slot: Slot) {
        let lowest_permissible_slot = current_slot.saturating_sub(Slot::new(SLOTS_RETAINED as u64));
        if self.lowest_permissible_slot == lowest_permissible_slot && self.maps.len() <= SLOTS_RETAINED {
            return;
        }
        self.lowest_permissible_slot = lowest_permissible_slot;
        self.maps.retain(|slot, _| *slot >= lowest_permissible_slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Checkpoint, Epoch, SignatureBytes};

    fn attestation(slot: u64, block_root: u8) -> Attestation {
        Attestation {
            aggregation_bits: vec![0b1],
            data: AttestationData {
                slot: Slot::new(slot),
                index: 0,
                beacon_block_root: Hash256::from_slice(&[block_root; 32]),
                source: Checkpoint::new(Epoch::new(0), Hash256::zero()),
                target: Checkpoint::new(Epoch::new(1), Hash256::zero()),
            },
            signature: SignatureBytes::empty(),
        }
    }

    #[test]
    fn insert_get_remove_round_trip() {
        let mut pool = NaiveAggregationPool::default();
        let a = attestation(5, 1);
        pool.insert(&a).unwrap();
        assert_eq!(pool.get(&a.data), Some(a.clone()));
        pool.remove(&a.data);
        assert_eq!(pool.get(&a.data), None);
    }

    #[test]
    fn prunes_old_slots() {
        let mut pool = NaiveAggregationPool::default();
        pool.insert(&attestation(0, 1)).unwrap();
        pool.insert(&attestation(10, 2)).unwrap();
        assert_eq!(pool.maps.len(), 1);
        assert!(matches!(pool.insert(&attestation(0, 3)), Err(Error::SlotTooLow { .. })));
    }
}

use crate::archived_point::ArchivedPoint;
use crate::caches::{EpochBoundaryStateCache, HotStateCache, StateSummaryCache};
use crate::split::Split;
use crate::Error;
use parking_lot::RwLock;
use ssz::{Decode, Encode};
use state_processing::{advance_slots, state_transition_no_verify_any_sig};
use std::sync::Arc;
use store::{index_key, BeaconStateSummary, DBColumn, ItemStore, KeyValueStore};
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, EthSpec, Hash256, Slot};

const SPLIT_KEY: &[u8] = b"split";

/// Hot/cold state store: `BeaconState`s are expensive (hundreds of KB once validator counts
/// grow), so only genesis, epoch-boundary, and archived states are ever fully persisted. Every
/// other slot is reconstructed on demand by replaying blocks over the nearest persisted ancestor.
pub struct StateGen<S> {
    store: Arc<S>,
    spec: ChainSpec,
    split: RwLock<Split>,
    hot_state_cache: HotStateCache,
    epoch_boundary_state_cache: EpochBoundaryStateCache,
    state_summary_cache: StateSummaryCache,
}

impl<S: KeyValueStore> StateGen<S> {
    pub fn new(store: Arc<S>, spec: ChainSpec) -> Result<Self, Error> {
        let split = match store.get_bytes(DBColumn::BeaconChain, SPLIT_KEY)? {
            Some(bytes) => Split::from_ssz_bytes(&bytes).map_err(store::Error::from)?,
            None => Split::default(),
        };

        Ok(Self {
            store,
            spec,
            split: RwLock::new(split),
            hot_state_cache: HotStateCache::default(),
            epoch_boundary_state_cache: EpochBoundaryStateCache::default(),
            state_summary_cache: StateSummaryCache::default(),
        })
    }

    pub fn split(&self) -> Split {
        *self.split.read()
    }

    /// Seeds the hot/cold split at genesis, so the very first `migrate_to_cold` call has a real
    /// anchor to replay from instead of `Split::default()`'s placeholder zero root. Also seeds
    /// archived-point index 0 at genesis itself, so `archived_point_state`'s base case always has
    /// a real entry to bottom out at rather than relying on `migrate_to_cold` to have archived it
    /// later. A no-op on a restart where the split has already advanced past genesis.
    pub fn initialize_genesis_split(&self, genesis_state: &BeaconState) -> Result<(), Error> {
        let split = self.split();
        if split.slot == Slot::new(0) && split.state_root == Hash256::zero() {
            let genesis_state_root = Hash256::from_slice(&genesis_state.tree_hash_root()[..]);
            self.store.put_bytes(
                DBColumn::BeaconArchivedPointRoot,
                &index_key(0),
                genesis_state_root.as_bytes(),
            )?;
            self.persist_archived_point_state(0, genesis_state)?;
            store::put_last_archived_index(&*self.store, &0)?;
            self.set_split(Split { slot: Slot::new(0), state_root: genesis_state_root })?;
        }
        Ok(())
    }

    fn set_split(&self, split: Split) -> Result<(), Error> {
        self.store.put_bytes(DBColumn::BeaconChain, SPLIT_KEY, &split.as_ssz_bytes())?;
        *self.split.write() = split;
        Ok(())
    }

    fn state_summary(&self, state_root: &Hash256) -> Result<BeaconStateSummary, Error> {
        if let Some(summary) = self.state_summary_cache.get(state_root) {
            return Ok(summary);
        }

        let summary = self
            .store
            .get_item::<BeaconStateSummary>(state_root)?
            .ok_or(Error::UnknownStateSummary(*state_root))?;
        self.state_summary_cache.put(*state_root, summary);
        Ok(summary)
    }

    /// The state a block's `state_root` resolves to, if it's directly persisted (hot cache,
    /// epoch-boundary cache, or DB) — i.e. without needing to replay anything.
    fn persisted_state(&self, state_root: &Hash256) -> Result<Option<BeaconState>, Error> {
        if let Some(state) = self.hot_state_cache.get(state_root) {
            return Ok(Some(state));
        }
        if let Some(state) = self.epoch_boundary_state_cache.get(state_root) {
            return Ok(Some(state));
        }
        Ok(self.store.get_item::<BeaconState>(state_root)?)
    }

    fn load_archived_point(&self, index: u64) -> Result<ArchivedPoint, Error> {
        let root = self
            .store
            .get_bytes(DBColumn::BeaconArchivedPointRoot, &index_key(index))?
            .ok_or(Error::UnknownArchivedState(index))?;
        let state_root = Hash256::from_slice(&root);
        let slot = ArchivedPoint::slot_for_index(index, self.spec.slots_per_archived_point);
        Ok(ArchivedPoint { index, slot, state_root })
    }

    fn persist_archived_point_state(&self, index: u64, state: &BeaconState) -> Result<(), Error> {
        self.store.put_bytes(
            DBColumn::BeaconArchivedPointState,
            &index_key(index),
            &state.as_ssz_bytes(),
        )?;
        Ok(())
    }

    /// `archivedPointByIndex`: the full state at `index * slots_per_archived_point`, read from its
    /// own dedicated slot rather than the general state column. If that slot has gone missing
    /// (deleted out from under the node, or never populated), it's recomputed by replaying
    /// forward from the nearest earlier archived point that's still present and re-persisted
    /// under the same key — `chain_tip_root` is any block root known to descend from this archive
    /// point (the finalized root or the root of whatever state triggered the lookup both work).
    pub fn archived_point_state<E: EthSpec>(
        &self,
        index: u64,
        chain_tip_root: Hash256,
        committees: &dyn Fn(u64, u64) -> Vec<u64>,
    ) -> Result<BeaconState, Error> {
        if let Some(bytes) = self
            .store
            .get_bytes(DBColumn::BeaconArchivedPointState, &index_key(index))?
        {
            return Ok(BeaconState::from_ssz_bytes(&bytes).map_err(store::Error::from)?);
        }

        let spap = self.spec.slots_per_archived_point;
        let archive_slot = ArchivedPoint::slot_for_index(index, spap);

        let (anchor_state, anchor_slot) = if index == 0 {
            let point = self.load_archived_point(0)?;
            let state = self
                .persisted_state(&point.state_root)?
                .ok_or(Error::UnknownArchivedState(0))?;
            (state, Slot::new(0))
        } else {
            let state = self.archived_point_state::<E>(index - 1, chain_tip_root, committees)?;
            (state, ArchivedPoint::slot_for_index(index - 1, spap))
        };

        let (_, raw_blocks) = self.collect_replay_chain(chain_tip_root, Some(anchor_slot))?;
        let blocks: Vec<_> = raw_blocks
            .into_iter()
            .take_while(|b| b.message.slot <= archive_slot)
            .collect();

        let state = Self::replay_blocks::<E>(&anchor_state, &blocks, archive_slot, committees, &self.spec)?;
        self.persist_archived_point_state(index, &state)?;
        Ok(state)
    }

    /// Walks `block_root`'s ancestry backward collecting blocks (most recent first), stopping
    /// either at the first block whose own post-state is already persisted (`anchor_slot` is
    /// `None`, the hot-region case) or at the first block at or before `anchor_slot` (the
    /// cold-region case, whose anchor is a known `ArchivedPoint` rather than a persisted state).
    fn collect_replay_chain(
        &self,
        block_root: Hash256,
        anchor_slot: Option<Slot>,
    ) -> Result<(Option<BeaconState>, Vec<types::SignedBeaconBlock>), Error> {
        let mut chain = Vec::new();
        let mut cursor = block_root;

        loop {
            let block = self
                .store
                .get_item::<types::SignedBeaconBlock>(&cursor)?
                .ok_or(Error::UnknownBlock(cursor))?;

            if let Some(slot) = anchor_slot {
                if block.message.slot <= slot {
                    chain.reverse();
                    return Ok((None, chain));
                }
            } else if let Some(state) = self.persisted_state(&block.message.state_root)? {
                chain.reverse();
                return Ok((Some(state), chain));
            }

            let parent = block.message.parent_root;
            chain.push(block);
            cursor = parent;
        }
    }

    /// `StateByRoot`: resolves `state_root` to a full `BeaconState`, replaying blocks over the
    /// nearest persisted ancestor if it isn't already materialised.
    pub fn state_by_root<E: EthSpec>(
        &self,
        state_root: Hash256,
        committees: &dyn Fn(u64, u64) -> Vec<u64>,
    ) -> Result<BeaconState, Error> {
        if let Some(state) = self.persisted_state(&state_root)? {
            return Ok(state);
        }

        let summary = self.state_summary(&state_root)?;
        let split = self.split();

        let (anchor_state, blocks) = if summary.slot < split.slot {
            let index = ArchivedPoint::index_for_slot(summary.slot, self.spec.slots_per_archived_point);
            let anchor_slot = ArchivedPoint::slot_for_index(index, self.spec.slots_per_archived_point);
            let anchor_state = self.archived_point_state::<E>(index, summary.root, committees)?;
            let (_, blocks) = self.collect_replay_chain(summary.root, Some(anchor_slot))?;
            (anchor_state, blocks)
        } else {
            let (anchor_state, blocks) = self.collect_replay_chain(summary.root, None)?;
            (anchor_state.ok_or(Error::UnknownStateSummary(state_root))?, blocks)
        };

        Self::replay_blocks::<E>(&anchor_state, &blocks, summary.slot, committees, &self.spec)
    }

    /// `SaveState`: always writes the summary; the full state is persisted only at epoch
    /// boundaries (everything else lives purely in the hot cache, bounding DB write amplification).
    pub fn save_state<E: EthSpec>(
        &self,
        block_root: Hash256,
        state_root: Hash256,
        state: &BeaconState,
    ) -> Result<(), Error> {
        let summary = BeaconStateSummary { root: block_root, slot: state.slot };
        self.store.put_item(&state_root, &summary)?;
        self.state_summary_cache.put(state_root, summary);

        if state.slot.is_epoch_start(E::slots_per_epoch()) {
            self.epoch_boundary_state_cache.put(state_root, state.clone());
            self.store.put_item(&state_root, state)?;
        } else {
            self.hot_state_cache.put(state_root, state.clone());
        }

        Ok(())
    }

    /// `ReplayBlocks`: applies every block with no signature verification, then advances by
    /// empty-slot processing to `target_slot`. Side-effect-free — the caller decides whether and
    /// how to persist the result.
    pub fn replay_blocks<E: EthSpec>(
        start_state: &BeaconState,
        blocks: &[types::SignedBeaconBlock],
        target_slot: Slot,
        committees: &dyn Fn(u64, u64) -> Vec<u64>,
        spec: &ChainSpec,
    ) -> Result<BeaconState, Error> {
        let mut state = start_state.clone();
        for block in blocks {
            state = state_transition_no_verify_any_sig::<E>(&state, block, committees, spec)?;
        }
        advance_slots::<E>(&mut state, target_slot, spec)?;
        Ok(state)
    }

    /// `MigrateToCold`: advances the hot/cold split to `finalized_slot`, archiving the state at
    /// every `slots_per_archived_point` boundary crossed in the process.
    ///
    /// Per-slot state deletion from the hot region (the second bullet of the spec's migration
    /// description) is left to whatever prunes `hot_state_cache`/DB entries on eviction — this
    /// crate only ever overwrites/grows the DB, it never issues its own deletes, so a
    /// mid-migration crash can't leave the hot region missing a state that's still needed.
    pub fn migrate_to_cold<E: EthSpec>(
        &self,
        finalized_slot: Slot,
        finalized_root: Hash256,
        committees: &dyn Fn(u64, u64) -> Vec<u64>,
    ) -> Result<(), Error> {
        let split = self.split();
        if finalized_slot == split.slot {
            return Ok(());
        }
        if finalized_slot < split.slot {
            return Err(Error::FinalizedSlotOutOfOrder {
                current_split_slot: split.slot,
                new_finalized_slot: finalized_slot,
            });
        }

        let spap = self.spec.slots_per_archived_point;
        let last_archived_index = store::get_last_archived_index(&*self.store)?.unwrap_or(0);
        let last_new_index = ArchivedPoint::index_for_slot(finalized_slot, spap);

        let mut anchor_state = self
            .persisted_state(&split.state_root)?
            .ok_or(Error::UnknownStateSummary(split.state_root))?;
        let mut anchor_slot = split.slot;

        for index in (last_archived_index + 1)..=last_new_index {
            let archive_slot = ArchivedPoint::slot_for_index(index, spap);
            if archive_slot >= finalized_slot {
                break;
            }

            let (_, raw_blocks) = self.collect_replay_chain(finalized_root, Some(anchor_slot))?;
            let blocks: Vec<_> = raw_blocks
                .into_iter()
                .take_while(|b| b.message.slot <= archive_slot)
                .collect();
            let state = Self::replay_blocks::<E>(&anchor_state, &blocks, archive_slot, committees, &self.spec)?;

            let state_root = Hash256::from_slice(&state.tree_hash_root()[..]);
            self.store.put_bytes(DBColumn::BeaconArchivedPointRoot, &index_key(index), state_root.as_bytes())?;
            self.persist_archived_point_state(index, &state)?;
            store::put_last_archived_index(&*self.store, &index)?;

            anchor_state = state;
            anchor_slot = archive_slot;
        }

        self.set_split(Split { slot: finalized_slot, state_root: finalized_root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use state_processing::genesis::initialize_beacon_state_from_eth1;
    use state_processing::per_block_processing::{per_block_processing, BlockSignatureStrategy};
    use state_processing::signature_sets::NullVerifier;
    use store::MemoryStore;
    use types::{BeaconBlock, BeaconBlockBody, Eth1Data, MinimalEthSpec};

    type TestE = MinimalEthSpec;

    fn no_committees(_slot: u64, _index: u64) -> Vec<u64> {
        vec![]
    }

    /// Builds `slot`'s block atop `parent_state`, computing the resulting state root the way a
    /// proposer would (run the transition once to find it, then stamp it into the block) so the
    /// real `state_transition_no_verify_any_sig` call below accepts it.
    fn next_block(parent_root: Hash256, parent_state: &BeaconState, slot: Slot, spec: &ChainSpec) -> (BeaconBlock, BeaconState) {
        let mut block = BeaconBlock {
            slot,
            proposer_index: 0,
            parent_root,
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        };
        let mut state = parent_state.clone();
        advance_slots::<TestE>(&mut state, slot, spec).unwrap();
        let signed_block = types::SignedBeaconBlock { message: block.clone(), signature: types::SignatureBytes::empty() };
        per_block_processing::<TestE, NullVerifier>(
            &mut state,
            &signed_block,
            &no_committees,
            BlockSignatureStrategy::NoVerification,
            &NullVerifier,
            spec,
        )
        .unwrap();
        block.state_root = Hash256::from_slice(&state.tree_hash_root()[..]);
        (block, state)
    }

    struct TestChain {
        store: Arc<MemoryStore>,
        state_gen: StateGen<MemoryStore>,
    }

    /// Builds a chain of `count` blocks (`B1..Bcount`, `Bi.slot == i`) on top of genesis,
    /// persisting every block and its post-state, and returns the tip's root.
    fn build_chain(spec: ChainSpec, count: u64) -> (TestChain, Hash256) {
        let genesis_state = initialize_beacon_state_from_eth1::<TestE>(Hash256::zero(), 0, &[], &spec);
        let genesis_block = BeaconBlock {
            slot: Slot::new(0),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::from_slice(&genesis_state.tree_hash_root()[..]),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        };
        let genesis_root = genesis_block.canonical_root();

        let store = Arc::new(MemoryStore::default());
        let state_gen = StateGen::new(store.clone(), spec.clone()).unwrap();
        store
            .put_item(&genesis_root, &SignedBeaconBlock { message: genesis_block, signature: types::SignatureBytes::empty() })
            .unwrap();
        state_gen
            .save_state::<TestE>(genesis_root, Hash256::from_slice(&genesis_state.tree_hash_root()[..]), &genesis_state)
            .unwrap();
        state_gen.initialize_genesis_split(&genesis_state).unwrap();

        let mut parent_root = genesis_root;
        let mut parent_state = genesis_state;
        let mut tip_root = genesis_root;
        for i in 1..=count {
            let (block, state) = next_block(parent_root, &parent_state, Slot::new(i), &spec);
            let root = block.canonical_root();
            store
                .put_item(&root, &SignedBeaconBlock { message: block.clone(), signature: types::SignatureBytes::empty() })
                .unwrap();
            state_gen.save_state::<TestE>(root, block.state_root, &state).unwrap();
            parent_root = root;
            parent_state = state;
            tip_root = root;
        }

        (TestChain { store, state_gen }, tip_root)
    }

    #[test]
    fn state_by_root_replays_skipped_slots() {
        // B1 (slot 1), B2 (slot 2, parent B1), then B4 (slot 4, parent B2): slot 3 is skipped.
        // B4's own post-state is deliberately left unsaved (only its summary is written) so
        // resolving it forces `state_by_root` to replay it over B2's persisted state.
        let spec = ChainSpec::minimal();
        let (chain, tip_root) = build_chain(spec.clone(), 2);
        let tip_block = chain.store.get_item::<types::SignedBeaconBlock>(&tip_root).unwrap().unwrap();
        let tip_state = chain.state_gen.state_by_root::<TestE>(tip_block.message.state_root, &no_committees).unwrap();

        let (b4, b4_state) = next_block(tip_root, &tip_state, Slot::new(4), &spec);
        let b4_root = b4.canonical_root();
        chain
            .store
            .put_item(&b4_root, &SignedBeaconBlock { message: b4.clone(), signature: types::SignatureBytes::empty() })
            .unwrap();
        chain
            .store
            .put_item(&b4.state_root, &BeaconStateSummary { root: b4_root, slot: b4_state.slot })
            .unwrap();

        let resolved = chain.state_gen.state_by_root::<TestE>(b4.state_root, &no_committees).unwrap();
        assert_eq!(resolved.slot, Slot::new(4));
    }

    #[test]
    fn deleted_archived_point_state_recomputes_by_replay() {
        let mut spec = ChainSpec::minimal();
        spec.slots_per_archived_point = 4;
        let (chain, tip_root) = build_chain(spec.clone(), 12);

        chain.state_gen.migrate_to_cold::<TestE>(Slot::new(12), tip_root, &no_committees).unwrap();

        // Index 1 anchors slot 4; delete its dedicated persisted entry to simulate data loss.
        chain
            .store
            .key_delete(DBColumn::BeaconArchivedPointState, &index_key(1))
            .unwrap();

        let recovered = chain.state_gen.archived_point_state::<TestE>(1, tip_root, &no_committees).unwrap();
        assert_eq!(recovered.slot, Slot::new(4));

        // A second read sees the re-persisted entry directly, without needing to replay again.
        let reread = chain.state_gen.archived_point_state::<TestE>(1, tip_root, &no_committees).unwrap();
        assert_eq!(reread.slot, Slot::new(4));
    }
}

//! The `BeaconChain` façade: wires `StateGen`, `ForkChoice`, `HeadTracker`, `AttestationProcessor`,
//! `EventHandler` and the local operation pools behind the three block-processing entrypoints a
//! running node actually calls — everything else in this crate exists to support these.

use crate::attestation_processor::AttestationProcessor;
use crate::errors::BeaconChainError as Error;
use crate::events::{EventHandler, EventKind};
use crate::fork_choice_store::BeaconForkChoiceStore;
use crate::head_tracker::HeadTracker;
use crate::naive_aggregation_pool::NaiveAggregationPool;
use crate::ChainConfig;
use fork_choice::ForkChoice;
use parking_lot::RwLock;
use slog::{debug, info, Logger};
use state_gen::StateGen;
use state_processing::signature_sets::{BlsVerifier, NullVerifier};
use state_processing::{state_transition, state_transition_no_verify_any_sig, state_transition_signature_sets};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;
use store::{put_finalized_checkpoint, put_genesis_block_root, put_head_block_root, ItemStore, KeyValueStore};
use tree_hash::TreeHash;
use types::{BeaconBlock, BeaconState, ChainSpec, Checkpoint, EthSpec, Hash256, SignedBeaconBlock, Slot};

/// A resolver from `(slot, committee_index)` to the sorted validator indices assigned to that
/// committee. Duty/shuffling computation is out of this crate's scope (§1); every caller of
/// `BeaconChain` supplies its own.
pub type CommitteesFn<'a> = dyn Fn(u64, u64) -> Vec<u64> + 'a;

struct BufferedBlock {
    block_root: Hash256,
    signed_block: SignedBeaconBlock,
    state: BeaconState,
}

pub struct BeaconChain<S, E> {
    pub spec: ChainSpec,
    pub config: ChainConfig,
    pub store: Arc<S>,
    pub state_gen: StateGen<S>,
    pub fork_choice: RwLock<ForkChoice<BeaconForkChoiceStore<E>, E>>,
    pub head_tracker: HeadTracker,
    pub event_handler: EventHandler,
    pub naive_aggregation_pool: RwLock<NaiveAggregationPool>,
    pub attestation_processor: AttestationProcessor,
    pub genesis_block_root: Hash256,
    init_sync_buffer: RwLock<VecDeque<BufferedBlock>>,
    log: Logger,
    _phantom: PhantomData<E>,
}

impl<S, E> BeaconChain<S, E>
where
    S: KeyValueStore,
    E: EthSpec,
{
    /// Builds a fresh chain from a genesis block/state pair, persisting both and seeding every
    /// subsystem (`ForkChoice`, `HeadTracker`, the singleton DB entries) from them.
    pub fn from_genesis(
        store: Arc<S>,
        genesis_state: BeaconState,
        genesis_block: BeaconBlock,
        spec: ChainSpec,
        config: ChainConfig,
        log: Logger,
    ) -> Result<Self, Error> {
        let genesis_block_root = genesis_block.canonical_root();
        let genesis_state_root = genesis_block.state_root;

        let state_gen = StateGen::new(store.clone(), spec.clone())?;
        let signed_genesis_block = SignedBeaconBlock {
            message: genesis_block.clone(),
            signature: types::SignatureBytes::empty(),
        };
        store.put_item(&genesis_block_root, &signed_genesis_block)?;
        state_gen.save_state::<E>(genesis_block_root, genesis_state_root, &genesis_state)?;
        state_gen.initialize_genesis_split(&genesis_state)?;

        put_genesis_block_root(&*store, &genesis_block_root)?;
        put_head_block_root(&*store, &genesis_block_root)?;
        let genesis_checkpoint = Checkpoint { epoch: genesis_state.current_epoch(E::slots_per_epoch()), root: genesis_block_root };
        put_finalized_checkpoint(&*store, &genesis_checkpoint)?;

        let fc_store = BeaconForkChoiceStore::<E>::from_genesis(&genesis_state);
        let fork_choice = ForkChoice::from_genesis(fc_store, genesis_block_root, &genesis_block, &genesis_state)?;

        let head_tracker = HeadTracker::new(genesis_block_root, genesis_block, genesis_state);

        info!(log, "Beacon chain initialized from genesis"; "genesis_block_root" => format!("{:?}", genesis_block_root));

        Ok(Self {
            spec,
            config,
            store,
            state_gen,
            fork_choice: RwLock::new(fork_choice),
            head_tracker,
            event_handler: EventHandler::new(log.clone()),
            naive_aggregation_pool: RwLock::new(NaiveAggregationPool::default()),
            attestation_processor: AttestationProcessor::new(),
            genesis_block_root,
            init_sync_buffer: RwLock::new(VecDeque::new()),
            log,
            _phantom: PhantomData,
        })
    }

    /// Resumes from a store that already holds a genesis (and possibly more) via the singleton
    /// `genesis_block_root`/`head_block_root`/`finalized_checkpoint` entries.
    pub fn genesis_block_root(&self) -> Hash256 {
        self.genesis_block_root
    }

    pub fn head_root(&self) -> Hash256 {
        self.head_tracker.head_root()
    }

    pub fn head_slot(&self) -> Slot {
        self.head_tracker.head_slot()
    }

    pub fn head_state(&self) -> Arc<BeaconState> {
        self.head_tracker.head_state()
    }

    fn persisted_state_root(&self, block_root: Hash256) -> Result<Hash256, Error> {
        let signed_block = self
            .store
            .get_item::<SignedBeaconBlock>(&block_root)?
            .ok_or(Error::AncestorNotFound(block_root))?;
        Ok(signed_block.message.state_root)
    }

    /// The pre-state a block with parent `parent_root` transitions from: the parent block's own
    /// post-state, resolved (and replayed, if necessary) via `StateGen`.
    fn pre_state(&self, parent_root: Hash256, committees: &CommitteesFn) -> Result<BeaconState, Error> {
        let state_root = self.persisted_state_root(parent_root)?;
        Ok(self.state_gen.state_by_root::<E>(state_root, committees)?)
    }

    /// Bounds how many empty slots a block is allowed to skip over, per
    /// `ChainConfig::import_max_skip_slots`.
    fn check_skip_slots(&self, pre_state_slot: Slot, block_slot: Slot) -> Result<(), Error> {
        if let Some(max) = self.config.import_max_skip_slots {
            let skipped = block_slot.as_u64().saturating_sub(pre_state_slot.as_u64());
            if skipped > max {
                return Err(Error::TooManySkippedSlots { skipped, max });
            }
        }
        Ok(())
    }

    fn finalized_slot(&self) -> Slot {
        let checkpoint = *self.fork_choice.read().fc_store().finalized_checkpoint();
        checkpoint.epoch.start_slot(E::slots_per_epoch())
    }

    fn assert_descends_from_finalized(&self, block_slot: Slot) -> Result<(), Error> {
        let finalized_slot = self.finalized_slot();
        if block_slot <= finalized_slot {
            return Err(Error::FinalizedDescendantCheckFailed { block_slot, finalized_slot });
        }
        Ok(())
    }

    /// Drains the block's own attestations into fork choice and out of the local pool, then
    /// records them with the slashing-protection check so a later surrounding vote is rejected.
    fn consume_block_attestations(
        &self,
        current_slot: Slot,
        signed_block: &SignedBeaconBlock,
        committees: &CommitteesFn,
    ) -> Result<(), Error> {
        let mut fork_choice = self.fork_choice.write();
        let mut pool = self.naive_aggregation_pool.write();
        for attestation in &signed_block.message.body.attestations {
            let committee = committees(attestation.data.slot.as_u64(), attestation.data.index);
            let indexed = self.attestation_processor.verify(attestation, &committee)?;
            self.attestation_processor.record(&indexed);
            fork_choice.on_attestation(current_slot, &indexed)?;
            pool.remove(&attestation.data);
        }
        Ok(())
    }

    /// Recomputes the canonical head and, if it moved, updates `HeadTracker` (firing
    /// `HeadChanged`) with the new head's block and state pulled back from storage.
    fn update_head(&self, current_slot: Slot, committees: &CommitteesFn) -> Result<(), Error> {
        let new_head_root = self.fork_choice.write().get_head(current_slot)?;
        if new_head_root == self.head_tracker.head_root() {
            return Ok(());
        }

        let signed_block = self
            .store
            .get_item::<SignedBeaconBlock>(&new_head_root)?
            .ok_or(Error::AncestorNotFound(new_head_root))?;
        let state = self.state_gen.state_by_root::<E>(signed_block.message.state_root, committees)?;
        put_head_block_root(&*self.store, &new_head_root)?;
        self.head_tracker.save_head(new_head_root, signed_block.message, state, &self.event_handler);
        Ok(())
    }

    /// If finality advanced as a result of the last `fork_choice.on_block`, compacts the DAG and
    /// migrates the newly-finalized hot-region states into the cold archive.
    fn maybe_finalize(&self, previous_finalized: Checkpoint, committees: &CommitteesFn) -> Result<(), Error> {
        let current_finalized = *self.fork_choice.read().fc_store().finalized_checkpoint();
        if current_finalized.epoch <= previous_finalized.epoch {
            return Ok(());
        }

        put_finalized_checkpoint(&*self.store, &current_finalized)?;
        self.fork_choice.write().prune()?;
        let finalized_slot = current_finalized.epoch.start_slot(E::slots_per_epoch());
        self.state_gen.migrate_to_cold::<E>(finalized_slot, current_finalized.root, committees)?;
        self.event_handler.register(EventKind::FinalizedCheckpoint(current_finalized));
        Ok(())
    }

    /// `onBlock`: full verification path. Applies `StateTransition` with BLS signature checks,
    /// persists the block/post-state, wires the block and its attestations into fork choice,
    /// advances finality bookkeeping, and recomputes the head.
    pub fn on_block<V: BlsVerifier>(
        &self,
        current_slot: Slot,
        signed_block: &SignedBeaconBlock,
        committees: &CommitteesFn,
        verifier: &V,
    ) -> Result<Hash256, Error> {
        let block = &signed_block.message;
        self.assert_descends_from_finalized(block.slot)?;

        let pre_state = self.pre_state(block.parent_root, committees)?;
        self.check_skip_slots(pre_state.slot, block.slot)?;
        let post_state = state_transition::<E, V>(&pre_state, signed_block, committees, verifier, &self.spec)?;

        let block_root = block.canonical_root();
        self.store.put_item(&block_root, signed_block)?;
        self.state_gen.save_state::<E>(block_root, block.state_root, &post_state)?;

        let previous_finalized = *self.fork_choice.read().fc_store().finalized_checkpoint();
        self.fork_choice.write().on_block(current_slot, block, block_root, &post_state)?;
        self.consume_block_attestations(current_slot, signed_block, committees)?;
        self.maybe_finalize(previous_finalized, committees)?;
        self.update_head(current_slot, committees)?;

        self.event_handler.register(EventKind::BlockProcessed { block_root, verified: true });
        debug!(self.log, "Processed block"; "block_root" => format!("{:?}", block_root), "slot" => block.slot.as_u64());

        Ok(block_root)
    }

    /// `onBlockBatch`: replays every block with no per-block signature check, collecting the
    /// `SignatureSet`s for a single batched verification; on success applies each block's
    /// persistence/fork-choice side effects exactly as `on_block` does, all-or-nothing.
    pub fn on_block_batch<V: BlsVerifier>(
        &self,
        current_slot: Slot,
        signed_blocks: &[SignedBeaconBlock],
        committees: &CommitteesFn,
        verifier: &V,
    ) -> Result<Vec<Hash256>, Error> {
        if signed_blocks.is_empty() {
            return Ok(vec![]);
        }

        let mut pre_state = self.pre_state(signed_blocks[0].message.parent_root, committees)?;
        let mut post_states = Vec::with_capacity(signed_blocks.len());
        let mut all_sets = Vec::new();

        for signed_block in signed_blocks {
            self.assert_descends_from_finalized(signed_block.message.slot)?;
            self.check_skip_slots(pre_state.slot, signed_block.message.slot)?;
            let (post_state, sets) =
                state_transition_signature_sets::<E>(&pre_state, signed_block, committees, &self.spec)?;
            all_sets.extend(sets);
            post_states.push(post_state.clone());
            pre_state = post_state;
        }

        if !verifier.verify_batch(&all_sets) {
            return Err(Error::BatchVerificationFailed);
        }

        let mut roots = Vec::with_capacity(signed_blocks.len());
        for (signed_block, post_state) in signed_blocks.iter().zip(post_states.into_iter()) {
            let block = &signed_block.message;
            let block_root = block.canonical_root();
            self.store.put_item(&block_root, signed_block)?;
            self.state_gen.save_state::<E>(block_root, block.state_root, &post_state)?;

            let previous_finalized = *self.fork_choice.read().fc_store().finalized_checkpoint();
            self.fork_choice.write().on_block(current_slot, block, block_root, &post_state)?;
            self.consume_block_attestations(current_slot, signed_block, committees)?;
            self.maybe_finalize(previous_finalized, committees)?;

            self.event_handler.register(EventKind::BlockProcessed { block_root, verified: true });
            roots.push(block_root);
        }

        self.update_head(current_slot, committees)?;
        Ok(roots)
    }

    /// `onBlockInitialSync`: skips attestation signature verification and pool bookkeeping
    /// entirely (no peer is gossiping during a sync), buffering blocks in memory until finality
    /// advances or the buffer fills, at which point it flushes to the DB in one pass.
    pub fn on_block_initial_sync(
        &self,
        current_slot: Slot,
        signed_block: SignedBeaconBlock,
        committees: &CommitteesFn,
    ) -> Result<Hash256, Error> {
        let block = &signed_block.message;
        self.assert_descends_from_finalized(block.slot)?;

        let pre_state = {
            let buffer = self.init_sync_buffer.read();
            if let Some(buffered) = buffer.iter().find(|b| b.block_root == block.parent_root) {
                buffered.state.clone()
            } else {
                drop(buffer);
                self.pre_state(block.parent_root, committees)?
            }
        };

        self.check_skip_slots(pre_state.slot, block.slot)?;
        let post_state = state_transition_no_verify_any_sig::<E>(&pre_state, &signed_block, committees, &self.spec)?;
        let block_root = block.canonical_root();

        let previous_finalized = *self.fork_choice.read().fc_store().finalized_checkpoint();
        self.fork_choice.write().on_block(current_slot, block, block_root, &post_state)?;

        self.init_sync_buffer.write().push_back(BufferedBlock { block_root, signed_block, state: post_state });

        let current_finalized = *self.fork_choice.read().fc_store().finalized_checkpoint();
        let should_flush = current_finalized.epoch > previous_finalized.epoch
            || self.init_sync_buffer.read().len() >= self.spec.init_sync_block_cache_size;
        if should_flush {
            self.flush_init_sync_buffer()?;
            self.maybe_finalize(previous_finalized, committees)?;
        }

        self.update_head(current_slot, committees)?;
        Ok(block_root)
    }

    fn flush_init_sync_buffer(&self) -> Result<(), Error> {
        let mut buffer = self.init_sync_buffer.write();
        for buffered in buffer.drain(..) {
            self.store.put_item(&buffered.block_root, &buffered.signed_block)?;
            self.state_gen.save_state::<E>(
                buffered.block_root,
                buffered.signed_block.message.state_root,
                &buffered.state,
            )?;
        }
        Ok(())
    }
}

/// `NullVerifier`-backed convenience for callers that have already verified signatures upstream
/// (e.g. re-importing blocks this node itself produced).
pub fn trusted_verifier() -> NullVerifier {
    NullVerifier
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Discard};
    use state_processing::genesis::initialize_beacon_state_from_eth1;
    use store::MemoryStore;
    use types::{BeaconBlockBody, Eth1Data, MinimalEthSpec};

    type TestE = MinimalEthSpec;

    fn no_committees(_slot: u64, _index: u64) -> Vec<u64> {
        vec![]
    }

    fn test_chain() -> BeaconChain<MemoryStore, TestE> {
        let spec = ChainSpec::minimal();
        let genesis_state = initialize_beacon_state_from_eth1::<TestE>(Hash256::zero(), 0, &[], &spec);
        let genesis_block = BeaconBlock {
            slot: Slot::new(0),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::from_slice(&genesis_state.tree_hash_root()[..]),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        };
        let store = Arc::new(MemoryStore::default());
        let log = Logger::root(Discard, o!());
        BeaconChain::from_genesis(store, genesis_state, genesis_block, spec, ChainConfig::default(), log).unwrap()
    }

    #[test]
    fn from_genesis_sets_head_to_genesis() {
        let chain = test_chain();
        assert_eq!(chain.head_root(), chain.genesis_block_root());
        assert_eq!(chain.head_slot(), Slot::new(0));
    }

    #[test]
    fn on_block_rejects_block_at_or_before_finalized_slot() {
        let chain = test_chain();
        let mut block = BeaconBlock {
            slot: Slot::new(0),
            proposer_index: 0,
            parent_root: chain.genesis_block_root(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        };
        block.slot = Slot::new(0);
        let signed = SignedBeaconBlock { message: block, signature: types::SignatureBytes::empty() };
        let err = chain
            .on_block(Slot::new(1), &signed, &no_committees, &NullVerifier)
            .unwrap_err();
        assert!(matches!(err, Error::FinalizedDescendantCheckFailed { .. }));
    }

    #[test]
    fn on_block_rejects_excessive_skip_slots() {
        let mut chain = test_chain();
        chain.config.import_max_skip_slots = Some(2);
        let block = BeaconBlock {
            slot: Slot::new(5),
            proposer_index: 0,
            parent_root: chain.genesis_block_root(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        };
        let signed = SignedBeaconBlock { message: block, signature: types::SignatureBytes::empty() };
        let err = chain
            .on_block(Slot::new(5), &signed, &no_committees, &NullVerifier)
            .unwrap_err();
        assert!(matches!(err, Error::TooManySkippedSlots { skipped: 5, max: 2 }));
    }
}

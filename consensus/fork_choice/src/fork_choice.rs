use crate::ForkChoiceStore;
use proto_array::{Block as ProtoBlock, ProtoArrayForkChoice};
use ssz_derive::{Decode, Encode};
use std::marker::PhantomData;
use types::{BeaconBlock, BeaconState, Epoch, EthSpec, Hash256, IndexedAttestation, Slot};

/// The width, in slots from the start of an epoch, within which it is always safe to move the
/// store's justified checkpoint straight to a newly-justified one. Outside this window the
/// ancestor check in `should_update_justified_checkpoint` applies instead.
pub const SAFE_SLOTS_TO_UPDATE_JUSTIFIED: u64 = 8;

#[derive(Debug)]
pub enum Error<T> {
    InvalidAttestation(InvalidAttestation),
    InvalidBlock(InvalidBlock),
    ProtoArrayError(String),
    InvalidProtoArrayBytes(String),
    MissingProtoArrayBlock(Hash256),
    InconsistentOnTick { previous_slot: Slot, time: Slot },
    ForkChoiceStoreError(T),
    UnableToSetJustifiedCheckpoint(T),
    AfterBlockFailed(T),
}

impl<T> From<InvalidAttestation> for Error<T> {
    fn from(e: InvalidAttestation) -> Self {
        Error::InvalidAttestation(e)
    }
}

impl<T> From<String> for Error<T> {
    fn from(e: String) -> Self {
        Error::ProtoArrayError(e)
    }
}

#[derive(Debug)]
pub enum InvalidBlock {
    FutureSlot { present_slot: Slot, block_slot: Slot },
}

#[derive(Debug)]
pub enum InvalidAttestation {
    EmptyIndices,
    UnknownHeadBlock { beacon_block_root: Hash256 },
    BadTargetEpoch,
    UnknownTargetRoot(Hash256),
    FutureEpoch { attestation_epoch: Epoch, current_epoch: Epoch },
    PastEpoch { attestation_epoch: Epoch, current_epoch: Epoch },
    InvalidTarget { attestation: Hash256, block: Hash256 },
    AttestsToFutureBlock { block: Slot, attestation: Slot },
}

/// Slots elapsed since the start of `slot`'s epoch.
pub fn compute_slots_since_epoch_start<E: EthSpec>(slot: Slot) -> Slot {
    slot - slot.epoch(E::slots_per_epoch()).start_slot(E::slots_per_epoch())
}

fn compute_start_slot_at_epoch<E: EthSpec>(epoch: Epoch) -> Slot {
    epoch.start_slot(E::slots_per_epoch())
}

/// Called whenever the wall-clock slot advances. Only does real work at an epoch boundary: if a
/// `best_justified_checkpoint` has overtaken the store's `justified_checkpoint` since the last
/// tick, it is promoted.
fn on_tick<T, E>(store: &mut T, time: Slot) -> Result<(), Error<T::Error>>
where
    T: ForkChoiceStore<E>,
    E: EthSpec,
{
    let previous_slot = store.get_current_slot();

    if time > previous_slot + 1 {
        return Err(Error::InconsistentOnTick { previous_slot, time });
    }

    store.set_current_slot(time);

    let current_slot = store.get_current_slot();
    if !(current_slot > previous_slot && compute_slots_since_epoch_start::<E>(current_slot) == Slot::new(0)) {
        return Ok(());
    }

    if store.best_justified_checkpoint().epoch > store.justified_checkpoint().epoch {
        store
            .set_justified_checkpoint_to_best_justified_checkpoint()
            .map_err(Error::ForkChoiceStoreError)?;
    }

    Ok(())
}

/// A simplified, owned copy of an `IndexedAttestation`, queued until its slot is in the past —
/// the phase0 spec forbids an attestation from affecting fork choice before then.
#[derive(Clone, PartialEq, Encode, Decode)]
pub struct QueuedAttestation {
    slot: Slot,
    attesting_indices: Vec<u64>,
    block_root: Hash256,
    target_epoch: Epoch,
}

impl From<&IndexedAttestation> for QueuedAttestation {
    fn from(a: &IndexedAttestation) -> Self {
        Self {
            slot: a.data.slot,
            attesting_indices: a.attesting_indices.clone(),
            block_root: a.data.beacon_block_root,
            target_epoch: a.data.target.epoch,
        }
    }
}

fn dequeue_attestations(
    current_slot: Slot,
    queued_attestations: &mut Vec<QueuedAttestation>,
) -> Vec<QueuedAttestation> {
    let split_at = queued_attestations
        .iter()
        .position(|a| a.slot >= current_slot)
        .unwrap_or(queued_attestations.len());
    let remaining = queued_attestations.split_off(split_at);
    std::mem::replace(queued_attestations, remaining)
}

/// Wraps `ProtoArrayForkChoice` with the bookkeeping the bare LMD-GHOST weights don't cover:
/// which checkpoint is currently justified/finalized, and attestations queued from the current
/// slot that aren't yet allowed to vote.
pub struct ForkChoice<T, E> {
    fc_store: T,
    proto_array: ProtoArrayForkChoice,
    /// Resolves the `0x00..00` alias fork choice uses for "no vote cast yet" back to genesis.
    genesis_block_root: Hash256,
    queued_attestations: Vec<QueuedAttestation>,
    _phantom: PhantomData<E>,
}

impl<T, E> ForkChoice<T, E>
where
    T: ForkChoiceStore<E>,
    E: EthSpec,
{
    pub fn from_genesis(
        fc_store: T,
        genesis_block_root: Hash256,
        genesis_block: &BeaconBlock,
        genesis_state: &BeaconState,
    ) -> Result<Self, Error<T::Error>> {
        let finalized_block_slot = genesis_block.slot;
        let finalized_block_state_root = genesis_block.state_root;
        let epoch = genesis_state.current_epoch(E::slots_per_epoch());

        let proto_array = ProtoArrayForkChoice::new(
            finalized_block_slot,
            finalized_block_state_root,
            epoch,
            epoch,
            genesis_block_root,
        )?;

        Ok(Self {
            fc_store,
            proto_array,
            genesis_block_root,
            queued_attestations: vec![],
            _phantom: PhantomData,
        })
    }

    /// Restores `Self` from persisted components, e.g. after a process restart.
    pub fn from_components(
        fc_store: T,
        proto_array: ProtoArrayForkChoice,
        genesis_block_root: Hash256,
        queued_attestations: Vec<QueuedAttestation>,
    ) -> Self {
        Self { fc_store, proto_array, genesis_block_root, queued_attestations, _phantom: PhantomData }
    }

    fn get_ancestor(
        &self,
        state: &BeaconState,
        block_root: Hash256,
        ancestor_slot: Slot,
    ) -> Result<Hash256, Error<T::Error>> {
        let block = self
            .proto_array
            .get_block(&block_root)
            .ok_or(Error::MissingProtoArrayBlock(block_root))?;

        if block.slot > ancestor_slot {
            self.fc_store
                .ancestor_at_slot(state, block_root, ancestor_slot)
                .map_err(Error::ForkChoiceStoreError)
        } else {
            // Either an exact match or `block_root` is already the most recent root before a
            // skip slot at `ancestor_slot` — either way it's the answer.
            Ok(block_root)
        }
    }

    /// Runs the fork-choice rule: advances the store's clock to `current_slot`, then returns the
    /// root of the best descendant of the justified checkpoint's block.
    pub fn get_head(&mut self, current_slot: Slot) -> Result<Hash256, Error<T::Error>> {
        self.update_time(current_slot)?;

        let genesis_block_root = self.genesis_block_root;
        let remove_alias = |root: Hash256| if root == Hash256::zero() { genesis_block_root } else { root };

        self.proto_array
            .find_head(
                self.fc_store.justified_checkpoint().epoch,
                remove_alias(self.fc_store.justified_checkpoint().root),
                self.fc_store.finalized_checkpoint().epoch,
                self.fc_store.justified_balances(),
            )
            .map_err(Into::into)
    }

    /// Per spec §4.5: within `SAFE_SLOTS_TO_UPDATE_JUSTIFIED` of the epoch start it is always
    /// safe to move the justified checkpoint forward; afterwards only if the new checkpoint is
    /// still descended from the current one.
    fn should_update_justified_checkpoint(
        &mut self,
        current_slot: Slot,
        state: &BeaconState,
    ) -> Result<bool, Error<T::Error>> {
        self.update_time(current_slot)?;

        let new_justified_checkpoint = state.current_justified_checkpoint;

        if compute_slots_since_epoch_start::<E>(self.fc_store.get_current_slot()).as_u64()
            < SAFE_SLOTS_TO_UPDATE_JUSTIFIED
        {
            return Ok(true);
        }

        let justified_slot = compute_start_slot_at_epoch::<E>(self.fc_store.justified_checkpoint().epoch);
        if self.get_ancestor(state, new_justified_checkpoint.root, justified_slot)?
            != self.fc_store.justified_checkpoint().root
        {
            return Ok(false);
        }

        Ok(true)
    }

    /// Registers `block` (already verified by the caller — `StateTransition` — this only wires
    /// it into the DAG) and updates the store's justified/finalized checkpoints from `state`.
    pub fn on_block(
        &mut self,
        current_slot: Slot,
        block: &BeaconBlock,
        block_root: Hash256,
        state: &BeaconState,
    ) -> Result<(), Error<T::Error>> {
        let current_slot = self.update_time(current_slot)?;

        if block.slot > current_slot {
            return Err(Error::InvalidBlock(InvalidBlock::FutureSlot {
                present_slot: current_slot,
                block_slot: block.slot,
            }));
        }

        if state.current_justified_checkpoint.epoch > self.fc_store.justified_checkpoint().epoch {
            if state.current_justified_checkpoint.epoch > self.fc_store.best_justified_checkpoint().epoch {
                self.fc_store.set_best_justified_checkpoint(state);
            }
            if self.should_update_justified_checkpoint(current_slot, state)? {
                self.fc_store
                    .set_justified_checkpoint(state)
                    .map_err(Error::UnableToSetJustifiedCheckpoint)?;
            }
        }

        if state.finalized_checkpoint.epoch > self.fc_store.finalized_checkpoint().epoch {
            self.fc_store.set_finalized_checkpoint(state.finalized_checkpoint);
            let finalized_slot = compute_start_slot_at_epoch::<E>(self.fc_store.finalized_checkpoint().epoch);

            if state.current_justified_checkpoint.epoch > self.fc_store.justified_checkpoint().epoch
                || self.get_ancestor(state, self.fc_store.justified_checkpoint().root, finalized_slot)?
                    != self.fc_store.finalized_checkpoint().root
            {
                self.fc_store
                    .set_justified_checkpoint(state)
                    .map_err(Error::UnableToSetJustifiedCheckpoint)?;
            }
        }

        let target_slot = block.slot.epoch(E::slots_per_epoch()).start_slot(E::slots_per_epoch());
        let target_root = if block.slot == target_slot {
            block_root
        } else {
            state
                .get_block_root(target_slot)
                .ok_or(Error::MissingProtoArrayBlock(block_root))?
        };

        self.proto_array.process_block(ProtoBlock {
            slot: block.slot,
            root: block_root,
            parent_root: Some(block.parent_root),
            target_root,
            state_root: block.state_root,
            justified_epoch: state.current_justified_checkpoint.epoch,
            finalized_epoch: state.finalized_checkpoint.epoch,
        })?;

        self.fc_store
            .after_block(block, block_root, state)
            .map_err(Error::AfterBlockFailed)?;

        Ok(())
    }

    fn validate_on_attestation(&self, attestation: &IndexedAttestation) -> Result<(), InvalidAttestation> {
        if attestation.attesting_indices.is_empty() {
            return Err(InvalidAttestation::EmptyIndices);
        }

        let slot_now = self.fc_store.get_current_slot();
        let epoch_now = slot_now.epoch(E::slots_per_epoch());
        let target = attestation.data.target;

        if target.epoch > epoch_now {
            return Err(InvalidAttestation::FutureEpoch { attestation_epoch: target.epoch, current_epoch: epoch_now });
        } else if target.epoch + 1 < epoch_now {
            return Err(InvalidAttestation::PastEpoch { attestation_epoch: target.epoch, current_epoch: epoch_now });
        }

        if target.epoch != attestation.data.slot.epoch(E::slots_per_epoch()) {
            return Err(InvalidAttestation::BadTargetEpoch);
        }

        if !self.proto_array.contains_block(&target.root) {
            return Err(InvalidAttestation::UnknownTargetRoot(target.root));
        }

        let block = self
            .proto_array
            .get_block(&attestation.data.beacon_block_root)
            .ok_or(InvalidAttestation::UnknownHeadBlock { beacon_block_root: attestation.data.beacon_block_root })?;

        if block.target_root != target.root {
            return Err(InvalidAttestation::InvalidTarget { attestation: target.root, block: block.target_root });
        }

        if block.slot > attestation.data.slot {
            return Err(InvalidAttestation::AttestsToFutureBlock { block: block.slot, attestation: attestation.data.slot });
        }

        Ok(())
    }

    /// Registers `attestation`'s votes with the DAG, or queues it if its slot has not yet
    /// elapsed (a spec requirement: attestations may only affect subsequent slots).
    pub fn on_attestation(
        &mut self,
        current_slot: Slot,
        attestation: &IndexedAttestation,
    ) -> Result<(), Error<T::Error>> {
        self.update_time(current_slot)?;

        // Votes to the zero hash are votes cast before the voter had seen any block; applying
        // them is a no-op since every validator already implicitly attests to genesis.
        if attestation.data.beacon_block_root == Hash256::zero() {
            return Ok(());
        }

        self.validate_on_attestation(attestation)?;

        if attestation.data.slot < self.fc_store.get_current_slot() {
            for &validator_index in &attestation.attesting_indices {
                self.proto_array.process_attestation(
                    validator_index as usize,
                    attestation.data.beacon_block_root,
                    attestation.data.target.epoch,
                )?;
            }
        } else {
            self.queued_attestations.push(QueuedAttestation::from(attestation));
        }

        Ok(())
    }

    /// Advances the store's clock to `current_slot` one tick at a time, then drains any queued
    /// attestations whose slot has now elapsed. Returns the store's resulting current slot.
    pub fn update_time(&mut self, current_slot: Slot) -> Result<Slot, Error<T::Error>> {
        while self.fc_store.get_current_slot() < current_slot {
            let previous_slot = self.fc_store.get_current_slot();
            on_tick(&mut self.fc_store, previous_slot + 1)?;
        }

        self.process_attestation_queue()?;

        Ok(self.fc_store.get_current_slot())
    }

    fn process_attestation_queue(&mut self) -> Result<(), Error<T::Error>> {
        for attestation in dequeue_attestations(self.fc_store.get_current_slot(), &mut self.queued_attestations) {
            for &validator_index in &attestation.attesting_indices {
                self.proto_array.process_attestation(
                    validator_index as usize,
                    attestation.block_root,
                    attestation.target_epoch,
                )?;
            }
        }

        Ok(())
    }

    pub fn contains_block(&self, block_root: &Hash256) -> bool {
        self.proto_array.contains_block(block_root)
    }

    pub fn get_block(&self, block_root: &Hash256) -> Option<ProtoBlock> {
        self.proto_array.get_block(block_root)
    }

    pub fn latest_message(&self, validator_index: usize) -> Option<(Hash256, Epoch)> {
        self.proto_array.latest_message(validator_index)
    }

    pub fn proto_array(&self) -> &ProtoArrayForkChoice {
        &self.proto_array
    }

    pub fn fc_store(&self) -> &T {
        &self.fc_store
    }

    pub fn genesis_block_root(&self) -> &Hash256 {
        &self.genesis_block_root
    }

    pub fn queued_attestations(&self) -> &[QueuedAttestation] {
        &self.queued_attestations
    }

    /// Drops forked-off branches once the finalized checkpoint has advanced far enough to be
    /// worth compacting the DAG for.
    pub fn prune(&mut self) -> Result<(), Error<T::Error>> {
        let finalized_root = self.fc_store.finalized_checkpoint().root;
        self.proto_array.maybe_prune(finalized_root).map_err(Into::into)
    }

    pub fn from_persisted(persisted: PersistedForkChoice, fc_store: T) -> Result<Self, Error<T::Error>> {
        let proto_array =
            ProtoArrayForkChoice::from_bytes(&persisted.proto_array_bytes).map_err(Error::InvalidProtoArrayBytes)?;

        Ok(Self {
            fc_store,
            proto_array,
            genesis_block_root: persisted.genesis_block_root,
            queued_attestations: persisted.queued_attestations,
            _phantom: PhantomData,
        })
    }

    pub fn to_persisted(&self) -> PersistedForkChoice {
        PersistedForkChoice {
            proto_array_bytes: self.proto_array().as_bytes(),
            queued_attestations: self.queued_attestations().to_vec(),
            genesis_block_root: *self.genesis_block_root(),
        }
    }
}

/// SSZ-encodable snapshot of a `ForkChoice`, written to disk so a restart doesn't have to replay
/// the whole unfinalized chain to rebuild the DAG.
#[derive(Encode, Decode, Clone)]
pub struct PersistedForkChoice {
    proto_array_bytes: Vec<u8>,
    queued_attestations: Vec<QueuedAttestation>,
    genesis_block_root: Hash256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::MinimalEthSpec;

    type E = MinimalEthSpec;

    #[test]
    fn slots_since_epoch_start() {
        for epoch in 0..3 {
            for slot in 0..E::slots_per_epoch() {
                let input = epoch * E::slots_per_epoch() + slot;
                assert_eq!(compute_slots_since_epoch_start::<E>(Slot::new(input)), Slot::new(slot));
            }
        }
    }

    #[test]
    fn start_slot_at_epoch() {
        for epoch in 0..3 {
            assert_eq!(compute_start_slot_at_epoch::<E>(Epoch::new(epoch)), Slot::new(epoch * E::slots_per_epoch()));
        }
    }

    fn queued(slots: &[u64]) -> Vec<QueuedAttestation> {
        slots
            .iter()
            .map(|&slot| QueuedAttestation {
                slot: Slot::new(slot),
                attesting_indices: vec![],
                block_root: Hash256::zero(),
                target_epoch: Epoch::new(0),
            })
            .collect()
    }

    fn slots_of(attestations: &[QueuedAttestation]) -> Vec<u64> {
        attestations.iter().map(|a| a.slot.as_u64()).collect()
    }

    #[test]
    fn dequeuing_attestations() {
        let mut q = queued(&[1, 2, 3]);
        let dequeued = dequeue_attestations(Slot::new(0), &mut q);
        assert_eq!(slots_of(&q), vec![1, 2, 3]);
        assert!(dequeued.is_empty());

        let mut q = queued(&[1, 2, 3]);
        let dequeued = dequeue_attestations(Slot::new(2), &mut q);
        assert_eq!(slots_of(&q), vec![2, 3]);
        assert_eq!(slots_of(&dequeued), vec![1]);

        let mut q = queued(&[1, 2, 3]);
        let dequeued = dequeue_attestations(Slot::new(4), &mut q);
        assert!(q.is_empty());
        assert_eq!(slots_of(&dequeued), vec![1, 2, 3]);
    }
}

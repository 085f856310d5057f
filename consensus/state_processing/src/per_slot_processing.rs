use crate::per_block_processing::errors::SlotProcessingError;
use crate::per_epoch_processing::per_epoch_processing;
use eth2_hashing::hash;
use types::{BeaconState, ChainSpec, EthSpec, Hash256};

/// Advances `state` by exactly one slot: rotates the state-root ring buffer, runs epoch
/// processing if the outgoing slot was the last of an epoch, then advances `state.slot` and
/// rotates the block-root ring buffer so that the new slot's `latest_block_header` parent link
/// is resolvable.
///
/// Mirrors the teacher's `per_slot_processing`, minus cache maintenance for shuffling/committees
/// (out of this core's scope) and the fork-upgrade dispatch (single-phase state here).
pub fn per_slot_processing<E: EthSpec>(
    state: &mut BeaconState,
    state_root: Option<Hash256>,
    spec: &ChainSpec,
) -> Result<(), SlotProcessingError> {
    cache_state(state, state_root)?;

    let slots_per_epoch = E::slots_per_epoch();
    if (state.slot.as_u64() + 1) % slots_per_epoch == 0 {
        per_epoch_processing::<E>(state, spec)?;
    }

    state.slot += 1;

    Ok(())
}

fn cache_state(state: &mut BeaconState, state_root: Option<Hash256>) -> Result<(), SlotProcessingError> {
    let previous_state_root = match state_root {
        Some(root) => root,
        None => {
            let mut header = state.latest_block_header.clone();
            if header.state_root.is_zero() {
                header.state_root = fake_tree_hash_root(state);
            }
            header.canonical_root()
        }
    };

    state.set_state_root(state.slot, previous_state_root);

    if state.latest_block_header.state_root.is_zero() {
        state.latest_block_header.state_root = previous_state_root;
    }

    let previous_block_root = state.latest_block_header.canonical_root();
    state.set_block_root(state.slot, previous_block_root);

    Ok(())
}

/// Placeholder used only when the caller does not already have a hash-tree-root function wired
/// up (SSZ hash-tree-root itself is an external interface per the core's scope). In production
/// callers always pass `Some(state_root)` computed via `tree_hash::TreeHash`.
fn fake_tree_hash_root(state: &BeaconState) -> Hash256 {
    Hash256::from_slice(&hash(&state.slot.as_u64().to_le_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BeaconBlockHeader, Checkpoint, Eth1Data, MinimalEthSpec, Slot};

    fn fresh_state(len: usize) -> BeaconState {
        BeaconState {
            genesis_time: 0,
            genesis_validators_root: Hash256::zero(),
            slot: Slot::new(0),
            fork: Default::default(),
            latest_block_header: BeaconBlockHeader {
                slot: Slot::new(0),
                proposer_index: 0,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body_root: Hash256::zero(),
            },
            block_roots: vec![Hash256::zero(); len],
            state_roots: vec![Hash256::zero(); len],
            historical_roots: vec![],
            eth1_data: Eth1Data::default(),
            eth1_data_votes: vec![],
            eth1_deposit_index: 0,
            validators: vec![],
            balances: vec![],
            randao_mixes: vec![Hash256::zero(); len],
            previous_epoch_attestations: vec![],
            current_epoch_attestations: vec![],
            slashings: vec![0; len],
            justification_bits: 0,
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
        }
    }

    #[test]
    fn advances_slot_by_one() {
        let mut state = fresh_state(8);
        per_slot_processing::<MinimalEthSpec>(&mut state, None, &spec()).unwrap();
        assert_eq!(state.slot, Slot::new(1));
    }

    #[test]
    fn runs_epoch_processing_at_boundary() {
        let mut state = fresh_state(8);
        state.slot = Slot::new(MinimalEthSpec::slots_per_epoch() - 1);
        per_slot_processing::<MinimalEthSpec>(&mut state, None, &spec()).unwrap();
        assert!(state.slot.is_epoch_start(MinimalEthSpec::slots_per_epoch()));
    }

    fn spec() -> ChainSpec {
        ChainSpec::minimal()
    }
}

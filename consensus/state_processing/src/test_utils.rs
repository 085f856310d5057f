//! Minimal state fixtures shared by this crate's unit tests.

use types::{BeaconBlockHeader, BeaconState, Checkpoint, Eth1Data, Hash256, Slot};

pub fn empty_state(ring_len: usize) -> BeaconState {
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
        block_roots: vec![Hash256::zero(); ring_len],
        state_roots: vec![Hash256::zero(); ring_len],
        historical_roots: vec![],
        eth1_data: Eth1Data::default(),
        eth1_data_votes: vec![],
        eth1_deposit_index: 0,
        validators: vec![],
        balances: vec![],
        randao_mixes: vec![Hash256::zero(); ring_len],
        previous_epoch_attestations: vec![],
        current_epoch_attestations: vec![],
        slashings: vec![0; ring_len],
        justification_bits: 0,
        previous_justified_checkpoint: Checkpoint::default(),
        current_justified_checkpoint: Checkpoint::default(),
        finalized_checkpoint: Checkpoint::default(),
    }
}

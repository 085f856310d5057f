use crate::per_block_processing::process_deposit;
use tree_hash::TreeHash;
use types::{
    BeaconBlockHeader, BeaconState, Checkpoint, ChainSpec, Deposit, Epoch, Eth1Data, EthSpec,
    Fork, Hash256, Slot,
};

/// Builds the genesis `BeaconState` from an eth1 deposit log, the phase0 equivalent of the
/// teacher's `interop_genesis_state`/`initialize_beacon_state_from_eth1`: every deposit is
/// applied through the ordinary `process_deposit` path, then validators whose balance has
/// already reached `MAX_EFFECTIVE_BALANCE` are activated immediately rather than waiting out the
/// normal activation queue, since there is no preceding chain for that queue to have run against.
pub fn initialize_beacon_state_from_eth1<E: EthSpec>(
    eth1_block_hash: Hash256,
    genesis_time: u64,
    deposits: &[Deposit],
    spec: &ChainSpec,
) -> BeaconState {
    let eth1_data = Eth1Data {
        deposit_root: Hash256::zero(),
        deposit_count: deposits.len() as u64,
        block_hash: eth1_block_hash,
    };

    let mut state = BeaconState {
        genesis_time,
        genesis_validators_root: Hash256::zero(),
        slot: Slot::new(0),
        fork: Fork {
            previous_version: [0; 4],
            current_version: [0; 4],
            epoch: Epoch::new(0),
        },
        latest_block_header: BeaconBlockHeader {
            slot: Slot::new(0),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body_root: Hash256::zero(),
        },
        block_roots: vec![Hash256::zero(); E::slots_per_historical_root() as usize],
        state_roots: vec![Hash256::zero(); E::slots_per_historical_root() as usize],
        historical_roots: vec![],
        eth1_data: eth1_data.clone(),
        eth1_data_votes: vec![],
        eth1_deposit_index: 0,
        validators: vec![],
        balances: vec![],
        randao_mixes: vec![eth1_block_hash; E::epochs_per_historical_vector() as usize],
        previous_epoch_attestations: vec![],
        current_epoch_attestations: vec![],
        slashings: vec![0; E::epochs_per_slashings_vector() as usize],
        justification_bits: 0,
        previous_justified_checkpoint: Checkpoint::default(),
        current_justified_checkpoint: Checkpoint::default(),
        finalized_checkpoint: Checkpoint::default(),
    };

    for deposit in deposits {
        process_deposit(&mut state, deposit, spec);
    }

    for validator in state.validators.iter_mut() {
        if validator.effective_balance == spec.max_effective_balance {
            validator.activation_eligibility_epoch = Epoch::new(0);
            validator.activation_epoch = Epoch::new(0);
        }
    }

    state.genesis_validators_root = genesis_validators_root(&state);

    state
}

fn genesis_validators_root(state: &BeaconState) -> Hash256 {
    Hash256::from_slice(&state.validators.tree_hash_root()[..])
}

/// True once `state.genesis_time` is at or past `MIN_GENESIS_TIME` and enough validators have
/// deposited, the condition the eth1 bridge polls for before it emits the `genesis` event this
/// core's `StateTransition` is not itself responsible for detecting.
pub fn is_valid_genesis_state(state: &BeaconState, min_genesis_active_validator_count: usize) -> bool {
    state.get_active_validator_indices(Epoch::new(0)).len() >= min_genesis_active_validator_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{DepositData, MinimalEthSpec, PublicKeyBytes, SignatureBytes};

    fn deposit(seed: u8) -> Deposit {
        Deposit {
            proof: vec![],
            data: DepositData {
                pubkey: PublicKeyBytes::from_bytes(&[seed; 48]).unwrap(),
                withdrawal_credentials: Hash256::zero(),
                amount: 32_000_000_000,
                signature: SignatureBytes::empty(),
            },
        }
    }

    #[test]
    fn activates_fully_funded_validators_at_genesis() {
        let spec = ChainSpec::mainnet();
        let deposits = vec![deposit(1), deposit(2)];
        let state = initialize_beacon_state_from_eth1::<MinimalEthSpec>(
            Hash256::from_slice(&[9; 32]),
            1_600_000_000,
            &deposits,
            &spec,
        );
        assert_eq!(state.validators.len(), 2);
        assert!(state.validators.iter().all(|v| v.activation_epoch == Epoch::new(0)));
        assert!(is_valid_genesis_state(&state, 2));
        assert!(!is_valid_genesis_state(&state, 3));
    }
}

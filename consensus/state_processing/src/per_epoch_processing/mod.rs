mod justification_and_finalization;
mod registry_updates;
mod resets;
mod rewards_and_penalties;
mod slashings;
mod validator_statuses;

pub use justification_and_finalization::process_justification_and_finalization;
pub use registry_updates::{initiate_validator_exit, process_registry_updates};
pub use resets::{
    process_eth1_data_reset, process_historical_roots_update, process_participation_record_updates,
    process_randao_mixes_reset, process_slashings_reset,
};
pub use rewards_and_penalties::process_rewards_and_penalties;
pub use slashings::process_slashings;
pub use validator_statuses::{compute_total_balances, TotalBalances};

use crate::per_block_processing::errors::EpochProcessingError;
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, EthSpec, HistoricalBatch};

/// Runs the full epoch-boundary transition, applied whenever `per_slot_processing` crosses an
/// epoch boundary. Order matches phase0: justify/finalize against the epoch that just ended,
/// pay out rewards for it, roll the registry and slashings forward, then reset the
/// per-epoch accumulators for the epoch about to start.
pub fn per_epoch_processing<E: EthSpec>(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    let total_balances = compute_total_balances::<E>(state, spec.effective_balance_increment);

    process_justification_and_finalization::<E>(state, &total_balances)?;
    process_rewards_and_penalties::<E>(state, &total_balances, spec)?;
    process_registry_updates::<E>(state, spec)?;
    process_slashings::<E>(state, total_balances.current_epoch, spec)?;

    process_eth1_data_reset::<E>(state)?;
    process_slashings_reset::<E>(state)?;
    process_randao_mixes_reset::<E>(state)?;

    let batch = HistoricalBatch {
        block_roots: state.block_roots.clone(),
        state_roots: state.state_roots.clone(),
    };
    let batch_root = types::Hash256::from_slice(&batch.tree_hash_root()[..]);
    process_historical_roots_update::<E>(state, batch_root)?;
    process_participation_record_updates(state);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::MinimalEthSpec;

    #[test]
    fn runs_without_attestations() {
        let mut state = crate::test_utils::empty_state(256);
        state.slot = types::Slot::new(MinimalEthSpec::slots_per_epoch() * 3 - 1);
        let spec = ChainSpec::minimal();
        per_epoch_processing::<MinimalEthSpec>(&mut state, &spec).unwrap();
        assert!(state.current_epoch_attestations.is_empty());
        assert!(state.previous_epoch_attestations.is_empty());
    }
}

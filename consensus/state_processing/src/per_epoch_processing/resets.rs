use safe_arith::{ArithError, SafeArith};
use types::{BeaconState, EthSpec};

/// Clears `eth1_data_votes` once the current voting period has elapsed, so the next period
/// starts counting from zero.
pub fn process_eth1_data_reset<E: EthSpec>(state: &mut BeaconState) -> Result<(), ArithError> {
    if (state.slot.as_u64() + 1).safe_rem(E::slots_per_eth1_voting_period())? == 0 {
        state.eth1_data_votes.clear();
    }
    Ok(())
}

/// Carries the current epoch's randao mix forward into the slot the next epoch will read from,
/// so `get_randao_mix` never sees a stale or zeroed entry for an epoch not yet reached.
pub fn process_randao_mixes_reset<E: EthSpec>(state: &mut BeaconState) -> Result<(), ArithError> {
    let slots_per_epoch = E::slots_per_epoch();
    let current_epoch = state.current_epoch(slots_per_epoch);
    let next_epoch = current_epoch + 1;
    let mix = state.get_randao_mix(current_epoch).unwrap_or_default();
    state.update_randao_mix(next_epoch, mix);
    Ok(())
}

/// Zeroes the slashings-vector slot the next epoch will accumulate into.
pub fn process_slashings_reset<E: EthSpec>(state: &mut BeaconState) -> Result<(), ArithError> {
    let next_epoch = state.current_epoch(E::slots_per_epoch()) + 1;
    let len = state.slashings.len() as u64;
    if len > 0 {
        state.slashings[(next_epoch.as_u64() % len) as usize] = 0;
    }
    Ok(())
}

/// Appends a historical-roots batch once per `slots_per_historical_root` worth of epochs, the
/// epoch-granularity half of the state's two-tier history accumulator (the other half,
/// `block_roots`/`state_roots`, rolls per slot).
pub fn process_historical_roots_update<E: EthSpec>(
    state: &mut BeaconState,
    batch_root: types::Hash256,
) -> Result<(), ArithError> {
    let next_epoch = state.current_epoch(E::slots_per_epoch()) + 1;
    let epochs_per_batch = E::slots_per_historical_root().safe_div(E::slots_per_epoch())?;
    if next_epoch.as_u64().safe_rem(epochs_per_batch)? == 0 {
        state.historical_roots.push(batch_root);
    }
    Ok(())
}

/// Rotates `current_epoch_attestations` into `previous_epoch_attestations`, the per-epoch
/// analogue of `per_slot_processing`'s block/state-root ring buffers.
pub fn process_participation_record_updates(state: &mut BeaconState) {
    state.previous_epoch_attestations = std::mem::take(&mut state.current_epoch_attestations);
}

use types::{BeaconState, EthSpec, Hash256};

/// Active-balance aggregates consumed by justification/finalization and by the base-reward
/// calculation. Computed once per epoch transition and threaded through the steps that need it
/// rather than recomputed per validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalBalances {
    pub current_epoch: u64,
    pub previous_epoch: u64,
    pub current_epoch_target_attesters: u64,
    pub previous_epoch_target_attesters: u64,
    pub previous_epoch_attesters: u64,
}

/// Tallies `TotalBalances` for `state`'s current/previous epochs, using the already-resolved
/// `attesting_indices` on each `PendingAttestation` (see `types::PendingAttestation`) so that no
/// committee/shuffling recomputation is needed here.
pub fn compute_total_balances<E: EthSpec>(
    state: &BeaconState,
    effective_balance_increment: u64,
) -> TotalBalances {
    let slots_per_epoch = E::slots_per_epoch();
    let current_epoch = state.current_epoch(slots_per_epoch);
    let previous_epoch = state.previous_epoch(slots_per_epoch);

    let current_target_root = state
        .get_block_root(current_epoch.start_slot(slots_per_epoch))
        .unwrap_or_else(Hash256::zero);
    let previous_target_root = state
        .get_block_root(previous_epoch.start_slot(slots_per_epoch))
        .unwrap_or_else(Hash256::zero);

    let mut current_epoch_target_attesters = std::collections::BTreeSet::new();
    let mut previous_epoch_target_attesters = std::collections::BTreeSet::new();
    let mut previous_epoch_attesters = std::collections::BTreeSet::new();

    for attestation in &state.current_epoch_attestations {
        if attestation.data.target.root == current_target_root {
            current_epoch_target_attesters.extend(attestation.attesting_indices.iter().copied());
        }
    }

    for attestation in &state.previous_epoch_attestations {
        previous_epoch_attesters.extend(attestation.attesting_indices.iter().copied());
        if attestation.data.target.root == previous_target_root {
            previous_epoch_target_attesters.extend(attestation.attesting_indices.iter().copied());
        }
    }

    let balance_of = |indices: &std::collections::BTreeSet<u64>| -> u64 {
        indices
            .iter()
            .filter_map(|&i| state.validators.get(i as usize))
            .map(|v| v.effective_balance)
            .sum()
    };

    TotalBalances {
        current_epoch: state.active_balance(current_epoch, effective_balance_increment),
        previous_epoch: state.active_balance(previous_epoch, effective_balance_increment),
        current_epoch_target_attesters: balance_of(&current_epoch_target_attesters)
            .max(effective_balance_increment),
        previous_epoch_target_attesters: balance_of(&previous_epoch_target_attesters)
            .max(effective_balance_increment),
        previous_epoch_attesters: balance_of(&previous_epoch_attesters),
    }
}

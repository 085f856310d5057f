use safe_arith::{ArithError, SafeArith};
use types::{BeaconState, ChainSpec, Epoch, EthSpec, FAR_FUTURE_EPOCH};

/// Advances the activation-eligibility/activation/exit queue: eligible validators become
/// eligible for activation, the front of the activation queue (bounded by the per-epoch churn
/// limit) activates, and any validator below the ejection balance is queued for exit.
///
/// Mirrors phase0's `process_registry_updates`; the initiated-exit helper lives here rather than
/// being shared with `process_exits` because the queueing rule (churn-limited, keyed by
/// `activation_eligibility_epoch` ordering) only applies to registry-driven ejections, not
/// validator-initiated voluntary exits.
pub fn process_registry_updates<E: EthSpec>(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), ArithError> {
    let slots_per_epoch = E::slots_per_epoch();
    let current_epoch = state.current_epoch(slots_per_epoch);
    let next_epoch = current_epoch + 1;

    for index in 0..state.validators.len() {
        let validator = &state.validators[index];
        let becomes_eligible = validator.is_eligible_for_activation_queue(spec);
        let should_eject = validator.is_active_at(current_epoch)
            && validator.effective_balance <= spec.ejection_balance
            && validator.exit_epoch == FAR_FUTURE_EPOCH;

        if becomes_eligible {
            state.validators[index].activation_eligibility_epoch = next_epoch;
        }

        if should_eject {
            initiate_validator_exit::<E>(state, index, spec)?;
        }
    }

    let mut activation_queue: Vec<usize> = (0..state.validators.len())
        .filter(|&i| is_eligible_for_activation(&state.validators[i], state))
        .collect();
    activation_queue.sort_by_key(|&i| {
        (
            state.validators[i].activation_eligibility_epoch.as_u64(),
            i,
        )
    });

    let churn_limit = churn_limit::<E>(state, spec)?;
    let delayed_activation_epoch = compute_activation_exit_epoch::<E>(current_epoch, spec);

    for &index in activation_queue.iter().take(churn_limit as usize) {
        state.validators[index].activation_epoch = delayed_activation_epoch;
    }

    Ok(())
}

fn is_eligible_for_activation(validator: &types::Validator, state: &BeaconState) -> bool {
    validator.activation_eligibility_epoch <= state.finalized_checkpoint.epoch
        && validator.activation_epoch == FAR_FUTURE_EPOCH
}

/// `E::slots_per_epoch` stands in for the teacher's `EthSpec::ValidatorRegistryLimit`-aware churn
/// table lookup: there is no registry-limit typenum in this core's `EthSpec`, so the churn limit
/// is derived directly from `ChainSpec`'s quotient against the active validator count.
fn churn_limit<E: EthSpec>(state: &BeaconState, spec: &ChainSpec) -> Result<u64, ArithError> {
    let active_count = state
        .get_active_validator_indices(state.current_epoch(E::slots_per_epoch()))
        .len() as u64;
    Ok(std::cmp::max(
        spec.min_per_epoch_churn_limit,
        active_count.safe_div(spec.churn_limit_quotient)?,
    ))
}

fn compute_activation_exit_epoch<E: EthSpec>(epoch: Epoch, spec: &ChainSpec) -> Epoch {
    epoch + 1 + spec.max_seed_lookahead
}

/// Queues `index` for exit, pushing the exit epoch past any already-queued exits in the same
/// epoch so that at most `churn_limit` validators leave per epoch.
pub fn initiate_validator_exit<E: EthSpec>(
    state: &mut BeaconState,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), ArithError> {
    if state.validators[index].exit_epoch != FAR_FUTURE_EPOCH {
        return Ok(());
    }

    let current_epoch = state.current_epoch(E::slots_per_epoch());
    let delayed_epoch = compute_activation_exit_epoch::<E>(current_epoch, spec);

    let mut exit_epochs: Vec<Epoch> = state
        .validators
        .iter()
        .filter(|v| v.exit_epoch != FAR_FUTURE_EPOCH)
        .map(|v| v.exit_epoch)
        .collect();
    exit_epochs.push(delayed_epoch);

    let exit_queue_epoch = exit_epochs.into_iter().max().unwrap_or(delayed_epoch);
    let churn_limit = churn_limit::<E>(state, spec)?;
    let exit_queue_churn = state
        .validators
        .iter()
        .filter(|v| v.exit_epoch == exit_queue_epoch)
        .count() as u64;

    let exit_queue_epoch = if exit_queue_churn >= churn_limit {
        exit_queue_epoch + 1
    } else {
        exit_queue_epoch
    };

    state.validators[index].exit_epoch = exit_queue_epoch;
    state.validators[index].withdrawable_epoch =
        exit_queue_epoch + spec.min_validator_withdrawability_delay;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Hash256, MinimalEthSpec, PublicKeyBytes, Validator};

    fn validator(effective_balance: u64) -> Validator {
        Validator {
            pubkey: PublicKeyBytes::empty(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(0),
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    #[test]
    fn ejects_validators_below_ejection_balance() {
        let mut state = crate::test_utils::empty_state(64);
        state.validators = vec![validator(15_000_000_000)];
        state.balances = vec![15_000_000_000];
        let spec = ChainSpec::mainnet();
        process_registry_updates::<MinimalEthSpec>(&mut state, &spec).unwrap();
        assert_ne!(state.validators[0].exit_epoch, FAR_FUTURE_EPOCH);
    }

    #[test]
    fn leaves_healthy_validators_alone() {
        let mut state = crate::test_utils::empty_state(64);
        state.validators = vec![validator(32_000_000_000)];
        state.balances = vec![32_000_000_000];
        let spec = ChainSpec::mainnet();
        process_registry_updates::<MinimalEthSpec>(&mut state, &spec).unwrap();
        assert_eq!(state.validators[0].exit_epoch, FAR_FUTURE_EPOCH);
    }
}

use safe_arith::{ArithError, SafeArith};
use types::{BeaconState, ChainSpec, EthSpec};

/// Applies the mid-term slashing penalty: validators slashed `EPOCHS_PER_SLASHINGS_VECTOR / 2`
/// epochs ago take an additional proportional hit sized to how much of the total stake was
/// slashed in that window, on top of the immediate per-operation penalty already applied in
/// `process_proposer_slashing`/`process_attester_slashing`.
pub fn process_slashings<E: EthSpec>(
    state: &mut BeaconState,
    total_balance: u64,
    spec: &ChainSpec,
) -> Result<(), ArithError> {
    let epoch = state.current_epoch(E::slots_per_epoch());
    let sum_slashings: u64 = state.slashings.iter().copied().sum();

    let adjusted_total_slashing_balance = std::cmp::min(
        sum_slashings.safe_mul(spec.proportional_slashing_multiplier)?,
        total_balance,
    );

    let target_withdrawable_epoch = epoch + E::epochs_per_slashings_vector().safe_div(2)?;

    let indices: Vec<(usize, u64)> = state
        .validators
        .iter()
        .enumerate()
        .filter(|(_, v)| v.slashed && v.withdrawable_epoch == target_withdrawable_epoch)
        .map(|(i, v)| (i, v.effective_balance))
        .collect();

    for (index, effective_balance) in indices {
        let increment = spec.effective_balance_increment;
        let penalty = effective_balance
            .safe_div(increment)?
            .safe_mul(adjusted_total_slashing_balance)?
            .safe_div(total_balance)?
            .safe_mul(increment)?;
        state.balances[index] = state.balances[index].saturating_sub(penalty);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Hash256, MinimalEthSpec, PublicKeyBytes, Validator, FAR_FUTURE_EPOCH};

    #[test]
    fn applies_proportional_penalty_to_slashed_validator() {
        let mut state = crate::test_utils::empty_state(64);
        let epoch = state.current_epoch(MinimalEthSpec::slots_per_epoch());
        let target_withdrawable =
            epoch + MinimalEthSpec::epochs_per_slashings_vector() / 2;
        state.validators = vec![Validator {
            pubkey: PublicKeyBytes::empty(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance: 32_000_000_000,
            slashed: true,
            activation_eligibility_epoch: types::Epoch::new(0),
            activation_epoch: types::Epoch::new(0),
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: target_withdrawable,
        }];
        state.balances = vec![32_000_000_000];
        state.slashings = vec![32_000_000_000; 64];

        let spec = ChainSpec::mainnet();
        process_slashings::<MinimalEthSpec>(&mut state, 32_000_000_000, &spec).unwrap();
        assert!(state.balances[0] < 32_000_000_000);
    }
}

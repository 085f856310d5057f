use types::{BeaconState, ChainSpec, Deposit, Validator, FAR_FUTURE_EPOCH};

/// Applies a deposit. Merkle-proof verification against `state.eth1_data.deposit_root` belongs
/// to the eth1 bridge (an external collaborator per this core's scope); this function trusts
/// that the caller has already proven inclusion and only performs the registry-side bookkeeping
/// the spec assigns to `StateTransition`.
///
/// Creates a new validator on first sight of a pubkey, or tops up the balance of an existing
/// one. `eth1_deposit_index` is advanced unconditionally so that a duplicate or invalid deposit
/// can never be replayed.
pub fn process_deposit(state: &mut BeaconState, deposit: &Deposit, spec: &ChainSpec) {
    state.eth1_deposit_index += 1;

    let existing = state
        .validators
        .iter()
        .position(|v| v.pubkey == deposit.data.pubkey);

    match existing {
        Some(index) => {
            state.balances[index] = state.balances[index].saturating_add(deposit.data.amount);
        }
        None => {
            let effective_balance = deposit
                .data
                .amount
                .saturating_sub(deposit.data.amount % spec.effective_balance_increment)
                .min(spec.max_effective_balance);

            state.validators.push(Validator {
                pubkey: deposit.data.pubkey,
                withdrawal_credentials: deposit.data.withdrawal_credentials,
                effective_balance,
                slashed: false,
                activation_eligibility_epoch: FAR_FUTURE_EPOCH,
                activation_epoch: FAR_FUTURE_EPOCH,
                exit_epoch: FAR_FUTURE_EPOCH,
                withdrawable_epoch: FAR_FUTURE_EPOCH,
            });
            state.balances.push(deposit.data.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{DepositData, Hash256, PublicKeyBytes, SignatureBytes};

    fn deposit(pubkey: PublicKeyBytes, amount: u64) -> Deposit {
        Deposit {
            proof: vec![],
            data: DepositData {
                pubkey,
                withdrawal_credentials: Hash256::zero(),
                amount,
                signature: SignatureBytes::empty(),
            },
        }
    }

    #[test]
    fn creates_new_validator() {
        let mut state = crate::test_utils::empty_state(1);
        let pk = PublicKeyBytes::from_bytes(&[1; 48]).unwrap();
        process_deposit(&mut state, &deposit(pk, 32_000_000_000), &ChainSpec::mainnet());
        assert_eq!(state.validators.len(), 1);
        assert_eq!(state.balances[0], 32_000_000_000);
    }

    #[test]
    fn tops_up_existing_validator() {
        let mut state = crate::test_utils::empty_state(1);
        let pk = PublicKeyBytes::from_bytes(&[1; 48]).unwrap();
        let spec = ChainSpec::mainnet();
        process_deposit(&mut state, &deposit(pk, 32_000_000_000), &spec);
        process_deposit(&mut state, &deposit(pk, 1_000_000_000), &spec);
        assert_eq!(state.validators.len(), 1);
        assert_eq!(state.balances[0], 33_000_000_000);
    }
}

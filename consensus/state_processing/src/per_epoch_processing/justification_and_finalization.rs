use super::validator_statuses::TotalBalances;
use safe_arith::{ArithError, SafeArith};
use types::{BeaconState, Checkpoint, EthSpec, Hash256};

/// Applies the Casper FFG justification/finalization rule: a checkpoint is justified once
/// two-thirds of the active stake has attested to it as target, and finalized once a run of
/// consecutive justified checkpoints satisfies one of the four link patterns below.
///
/// Mirrors the teacher's `process_justification_and_finalization`/`weigh_justification_and_finalization`
/// split, collapsed into a single function operating directly on `state` since this core has no
/// separate epoch-transition cache to stage the change through.
pub fn process_justification_and_finalization<E: EthSpec>(
    state: &mut BeaconState,
    total_balances: &TotalBalances,
) -> Result<(), ArithError> {
    let slots_per_epoch = E::slots_per_epoch();
    let current_epoch = state.current_epoch(slots_per_epoch);

    if current_epoch <= E::genesis_epoch() + 1 {
        return Ok(());
    }

    let previous_epoch = state.previous_epoch(slots_per_epoch);
    let old_previous_justified = state.previous_justified_checkpoint;
    let old_current_justified = state.current_justified_checkpoint;

    state.previous_justified_checkpoint = state.current_justified_checkpoint;
    state.shift_justification_bits();

    if total_balances.previous_epoch_target_attesters.safe_mul(3)?
        >= total_balances.previous_epoch.safe_mul(2)?
    {
        let root = state
            .get_block_root(previous_epoch.start_slot(slots_per_epoch))
            .unwrap_or_else(Hash256::zero);
        state.current_justified_checkpoint = Checkpoint::new(previous_epoch, root);
        state.set_justified(1);
    }

    if total_balances.current_epoch_target_attesters.safe_mul(3)?
        >= total_balances.current_epoch.safe_mul(2)?
    {
        let root = state
            .get_block_root(current_epoch.start_slot(slots_per_epoch))
            .unwrap_or_else(Hash256::zero);
        state.current_justified_checkpoint = Checkpoint::new(current_epoch, root);
        state.set_justified(0);
    }

    // Four finalization patterns from the Gasper spec, checked against the checkpoints that were
    // current *before* this epoch's justification bits were updated above.
    let bits = state.justification_bits;
    let all_set = |mask: u8| bits & mask == mask;

    if all_set(0b1110) && old_previous_justified.epoch + 3 == current_epoch {
        state.finalized_checkpoint = old_previous_justified;
    } else if all_set(0b0110) && old_previous_justified.epoch + 2 == current_epoch {
        state.finalized_checkpoint = old_previous_justified;
    } else if all_set(0b0111) && old_current_justified.epoch + 2 == current_epoch {
        state.finalized_checkpoint = old_current_justified;
    } else if all_set(0b0011) && old_current_justified.epoch + 1 == current_epoch {
        state.finalized_checkpoint = old_current_justified;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use safe_arith::SafeArith;
    use types::MinimalEthSpec;

    fn state_at_epoch(epoch: u64) -> BeaconState {
        let slots_per_epoch = MinimalEthSpec::slots_per_epoch();
        let mut state = crate::test_utils::empty_state(256);
        state.slot = types::Slot::new(epoch * slots_per_epoch + slots_per_epoch - 1);
        state
    }

    #[test]
    fn justifies_checkpoint_with_supermajority() {
        let mut state = state_at_epoch(2);
        let totals = TotalBalances {
            current_epoch: 100,
            previous_epoch: 100,
            current_epoch_target_attesters: 0,
            previous_epoch_target_attesters: 100,
            previous_epoch_attesters: 100,
        };
        process_justification_and_finalization::<MinimalEthSpec>(&mut state, &totals).unwrap();
        assert!(state.is_justified(1));
        assert_eq!(
            state.current_justified_checkpoint.epoch,
            state.previous_epoch(MinimalEthSpec::slots_per_epoch())
        );
    }

    #[test]
    fn does_not_justify_below_threshold() {
        let mut state = state_at_epoch(2);
        let totals = TotalBalances {
            current_epoch: 100,
            previous_epoch: 100,
            current_epoch_target_attesters: 0,
            previous_epoch_target_attesters: 10,
            previous_epoch_attesters: 10,
        };
        process_justification_and_finalization::<MinimalEthSpec>(&mut state, &totals).unwrap();
        assert!(!state.is_justified(1));
    }
}

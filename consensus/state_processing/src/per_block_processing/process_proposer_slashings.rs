use super::errors::{BlockOperationError, ProposerSlashingInvalid};
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec, ProposerSlashing};

type Result<T> = std::result::Result<T, BlockOperationError<ProposerSlashingInvalid>>;

fn error(reason: ProposerSlashingInvalid) -> BlockOperationError<ProposerSlashingInvalid> {
    BlockOperationError::invalid(reason)
}

/// Verifies `slashing` is a legal double-proposal proof and not a replay against an
/// already-slashed or inactive proposer. Signature checks are the caller's responsibility (see
/// `get_proposer_slashing_signature_sets`).
pub fn verify_proposer_slashing<E: EthSpec>(
    slashing: &ProposerSlashing,
    state: &BeaconState,
) -> Result<()> {
    let h1 = &slashing.signed_header_1.message;
    let h2 = &slashing.signed_header_2.message;

    verify!(h1.slot == h2.slot, error(ProposerSlashingInvalid::ProposalSlotMismatch(h1.slot, h2.slot)));
    verify!(
        h1.proposer_index == h2.proposer_index,
        error(ProposerSlashingInvalid::ProposerIndexMismatch(h1.proposer_index, h2.proposer_index))
    );
    verify!(h1 != h2, error(ProposerSlashingInvalid::ProposalsIdentical));

    let proposer = state
        .validators
        .get(h1.proposer_index as usize)
        .ok_or_else(|| error(ProposerSlashingInvalid::ProposerUnknown(h1.proposer_index)))?;

    verify!(
        proposer.is_slashable_at(state.current_epoch(E::slots_per_epoch())),
        error(ProposerSlashingInvalid::ProposerNotSlashable(h1.proposer_index))
    );

    Ok(())
}

/// Applies the slashing penalty and schedules the proposer's withdrawal.
pub fn process_proposer_slashing<E: EthSpec>(
    slashing: &ProposerSlashing,
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> std::result::Result<(), safe_arith::ArithError> {
    let index = slashing.signed_header_1.message.proposer_index as usize;
    let current_epoch = state.current_epoch(E::slots_per_epoch());
    let earliest_withdrawable = current_epoch + spec.min_validator_withdrawability_delay;

    state.validators[index].slashed = true;
    state.validators[index].withdrawable_epoch =
        std::cmp::max(state.validators[index].withdrawable_epoch, earliest_withdrawable);

    let penalty = state.validators[index]
        .effective_balance
        .safe_div(spec.min_slashing_penalty_quotient)?;
    state.balances[index] = state.balances[index].saturating_sub(penalty);

    Ok(())
}

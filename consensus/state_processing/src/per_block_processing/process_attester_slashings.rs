use super::errors::{BlockOperationError, AttesterSlashingInvalid};
use crate::common::get_indexed_attestation::is_valid_indexed_attestation;
use safe_arith::SafeArith;
use types::{AttesterSlashing, BeaconState, ChainSpec, EthSpec};

type Result<T> = std::result::Result<T, BlockOperationError<AttesterSlashingInvalid>>;

fn error(reason: AttesterSlashingInvalid) -> BlockOperationError<AttesterSlashingInvalid> {
    BlockOperationError::invalid(reason)
}

/// Verifies both attestations are individually well-formed and that, together, they constitute
/// a slashable offense (a double vote or a surround vote). Aggregate signature checks are the
/// caller's responsibility.
pub fn verify_attester_slashing(slashing: &AttesterSlashing) -> Result<()> {
    is_valid_indexed_attestation(&slashing.attestation_1)
        .map_err(|e| error(AttesterSlashingInvalid::IndexedAttestation1Invalid(e)))?;
    is_valid_indexed_attestation(&slashing.attestation_2)
        .map_err(|e| error(AttesterSlashingInvalid::IndexedAttestation2Invalid(e)))?;

    verify!(
        !slashing.slashable_indices().is_empty(),
        error(AttesterSlashingInvalid::NotSlashable)
    );

    Ok(())
}

/// Applies the slashing penalty to every validator index present in both attestations.
pub fn process_attester_slashing<E: EthSpec>(
    slashing: &AttesterSlashing,
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<Vec<u64>> {
    let current_epoch = state.current_epoch(E::slots_per_epoch());
    let mut slashed_indices = Vec::new();

    for index in slashing.slashable_indices() {
        let validator = state
            .validators
            .get(index as usize)
            .ok_or_else(|| error(AttesterSlashingInvalid::NoSlashableIndices))?;

        if !validator.is_slashable_at(current_epoch) {
            continue;
        }

        let earliest_withdrawable = current_epoch + spec.min_validator_withdrawability_delay;
        state.validators[index as usize].slashed = true;
        state.validators[index as usize].withdrawable_epoch = std::cmp::max(
            state.validators[index as usize].withdrawable_epoch,
            earliest_withdrawable,
        );

        let penalty = state.validators[index as usize]
            .effective_balance
            .safe_div(spec.min_slashing_penalty_quotient)
            .map_err(BlockOperationError::from)?;
        state.balances[index as usize] = state.balances[index as usize].saturating_sub(penalty);

        slashed_indices.push(index);
    }

    if slashed_indices.is_empty() {
        return Err(error(AttesterSlashingInvalid::NoSlashableIndices));
    }

    Ok(slashed_indices)
}

use super::errors::{AttestationInvalid, BlockOperationError};
use types::{Attestation, BeaconState, ChainSpec, EthSpec, PendingAttestation};

type Result<T> = std::result::Result<T, BlockOperationError<AttestationInvalid>>;

fn error(reason: AttestationInvalid) -> BlockOperationError<AttestationInvalid> {
    BlockOperationError::invalid(reason)
}

/// Checks the inclusion-delay window and that `attestation.data` agrees with one of the state's
/// two trailing justified checkpoints, per Casper FFG's accountable-safety requirement that an
/// attestation's source must be a checkpoint the chain has already justified.
pub fn verify_attestation<E: EthSpec>(
    state: &BeaconState,
    attestation: &Attestation,
    spec: &ChainSpec,
) -> Result<()> {
    let data = &attestation.data;
    let slots_per_epoch = E::slots_per_epoch();

    verify!(
        data.target.epoch == state.current_epoch(slots_per_epoch)
            || data.target.epoch == state.previous_epoch(slots_per_epoch),
        error(AttestationInvalid::BadTargetEpoch)
    );

    verify!(
        data.target.epoch == data.slot.epoch(slots_per_epoch),
        error(AttestationInvalid::TargetEpochSlotMismatch {
            target_epoch: data.target.epoch,
            slot_epoch: data.slot.epoch(slots_per_epoch),
        })
    );

    verify!(
        state.slot >= data.slot + spec.min_attestation_inclusion_delay,
        error(AttestationInvalid::IncludedTooEarly {
            state: state.slot,
            delay: spec.min_attestation_inclusion_delay,
            attestation: data.slot,
        })
    );

    verify!(
        state.slot <= data.slot + slots_per_epoch,
        error(AttestationInvalid::IncludedTooLate { state: state.slot, attestation: data.slot })
    );

    let expected = if data.target.epoch == state.current_epoch(slots_per_epoch) {
        &state.current_justified_checkpoint
    } else {
        &state.previous_justified_checkpoint
    };

    verify!(
        data.source == *expected,
        error(AttestationInvalid::WrongJustifiedCheckpoint {
            state: Box::new(expected.clone()),
            attestation: Box::new(data.source),
            is_current: data.target.epoch == state.current_epoch(slots_per_epoch),
        })
    );

    Ok(())
}

/// Records the attestation as a `PendingAttestation` so that `rewards_and_penalties` can credit
/// the attesters (and the including proposer) at the next epoch boundary. `attesting_indices` is
/// the committee-resolved index set the caller already computed via `get_indexed_attestation`.
pub fn process_attestation<E: EthSpec>(
    state: &mut BeaconState,
    attestation: &Attestation,
    attesting_indices: Vec<u64>,
    proposer_index: u64,
) {
    let inclusion_delay = (state.slot - attestation.data.slot).as_u64();
    let pending = PendingAttestation {
        attesting_indices,
        data: attestation.data.clone(),
        inclusion_delay,
        proposer_index,
    };

    if attestation.data.target.epoch == state.current_epoch(E::slots_per_epoch()) {
        state.current_epoch_attestations.push(pending);
    } else {
        state.previous_epoch_attestations.push(pending);
    }
}

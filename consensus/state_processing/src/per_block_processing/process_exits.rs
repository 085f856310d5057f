use super::errors::{BlockOperationError, ExitInvalid};
use types::{BeaconState, ChainSpec, EthSpec, VoluntaryExit, FAR_FUTURE_EPOCH};

type Result<T> = std::result::Result<T, BlockOperationError<ExitInvalid>>;

fn error(reason: ExitInvalid) -> BlockOperationError<ExitInvalid> {
    BlockOperationError::invalid(reason)
}

/// Mirrors the teacher's `verify_exit`/`verify_exit_time_independent_only` split: the
/// `time_independent_only` checks are the ones that stay true regardless of which future state
/// the exit eventually lands in, used by mempool admission; the remainder are re-checked here at
/// block-processing time against the actual state.
pub fn verify_voluntary_exit<E: EthSpec>(
    state: &BeaconState,
    exit: &VoluntaryExit,
    spec: &ChainSpec,
) -> Result<()> {
    verify_voluntary_exit_parametric::<E>(state, exit, spec, false)
}

pub fn verify_voluntary_exit_time_independent_only<E: EthSpec>(
    state: &BeaconState,
    exit: &VoluntaryExit,
    spec: &ChainSpec,
) -> Result<()> {
    verify_voluntary_exit_parametric::<E>(state, exit, spec, true)
}

fn verify_voluntary_exit_parametric<E: EthSpec>(
    state: &BeaconState,
    exit: &VoluntaryExit,
    spec: &ChainSpec,
    time_independent_only: bool,
) -> Result<()> {
    let validator = state
        .validators
        .get(exit.validator_index as usize)
        .ok_or_else(|| error(ExitInvalid::ValidatorUnknown(exit.validator_index)))?;

    let current_epoch = state.current_epoch(E::slots_per_epoch());

    verify!(
        validator.is_active_at(current_epoch),
        error(ExitInvalid::NotActive(exit.validator_index))
    );

    verify!(
        validator.exit_epoch == FAR_FUTURE_EPOCH,
        error(ExitInvalid::AlreadyExited(exit.validator_index))
    );

    verify!(
        time_independent_only || current_epoch >= exit.epoch,
        error(ExitInvalid::FutureEpoch { current_epoch, earliest_exit_epoch: exit.epoch })
    );

    let _ = spec;
    Ok(())
}

/// Initiates exit for `exit.validator_index`, computing the exit epoch and the withdrawable
/// epoch that follows `MIN_VALIDATOR_WITHDRAWABILITY_DELAY` after it.
pub fn process_voluntary_exit<E: EthSpec>(
    state: &mut BeaconState,
    exit: &VoluntaryExit,
    spec: &ChainSpec,
) {
    let index = exit.validator_index as usize;
    let current_epoch = state.current_epoch(E::slots_per_epoch());
    let exit_epoch = std::cmp::max(exit.epoch, current_epoch);

    state.validators[index].exit_epoch = exit_epoch;
    state.validators[index].withdrawable_epoch =
        exit_epoch + spec.min_validator_withdrawability_delay;
}

//! Pure state-transition core of the beacon chain: `StateTransition(pre_state, block) ->
//! post_state`, split into per-slot and per-block processing, plus genesis construction.
//!
//! Everything here is deterministic and side-effect-free — no DB, no network, no wall-clock.
//! BLS/SSZ cryptography is an external collaborator (see `signature_sets::BlsVerifier`); this
//! crate only ever builds up a batch of `SignatureSet`s and hands them to whatever verifier the
//! caller injects.

#[macro_use]
mod macros;

pub mod common;
pub mod genesis;
pub mod per_block_processing;
pub mod per_epoch_processing;
pub mod per_slot_processing;
pub mod signature_sets;

#[cfg(test)]
pub mod test_utils;

use per_block_processing::errors::BlockProcessingError;
use per_block_processing::{per_block_processing, BlockSignatureStrategy};
use per_slot_processing::per_slot_processing;
use signature_sets::{BlsVerifier, NullVerifier, SignatureSet};
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, EthSpec, Hash256, SignedBeaconBlock};

/// Errors that can abort a full `state_transition` call. Any of these leave the caller's state
/// untouched; `state_transition` always operates on a cloned state and only returns it on
/// success.
#[derive(Debug, PartialEq, Clone)]
pub enum StateTransitionError {
    BlockSlotNotLaterThanState { state_slot: types::Slot, block_slot: types::Slot },
    SlotProcessingError(per_block_processing::errors::SlotProcessingError),
    BlockProcessingError(BlockProcessingError),
    StateRootMismatch { block: Hash256, state: Hash256 },
}

impl From<per_block_processing::errors::SlotProcessingError> for StateTransitionError {
    fn from(e: per_block_processing::errors::SlotProcessingError) -> Self {
        StateTransitionError::SlotProcessingError(e)
    }
}

impl From<BlockProcessingError> for StateTransitionError {
    fn from(e: BlockProcessingError) -> Self {
        StateTransitionError::BlockProcessingError(e)
    }
}

/// Runs the full `(pre_state, signed_block) -> post_state` transition: advances `state` slot by
/// slot up to `block.slot` (applying epoch processing at every epoch boundary crossed), applies
/// the block itself, verifies every signature individually, and checks the resulting state root
/// against `block.message.state_root`.
///
/// `committees(slot, index)` resolves an attestation's committee to validator indices; this
/// core never computes shuffling itself (out of scope — see `spec.md` §1), so the caller
/// supplies it.
pub fn state_transition<E: EthSpec, V: BlsVerifier>(
    state: &BeaconState,
    signed_block: &SignedBeaconBlock,
    committees: &dyn Fn(u64, u64) -> Vec<u64>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<BeaconState, StateTransitionError> {
    per_block_state_transition(
        state,
        signed_block,
        committees,
        BlockSignatureStrategy::VerifyIndividual,
        verifier,
        spec,
    )
}

/// As [`state_transition`], but every signature is accepted without verification. Used by
/// trusted replay paths (`state_gen`'s `ReplayBlocks`) where the block has already been
/// verified once and is only being re-applied to reconstruct a state.
pub fn state_transition_no_verify_any_sig<E: EthSpec>(
    state: &BeaconState,
    signed_block: &SignedBeaconBlock,
    committees: &dyn Fn(u64, u64) -> Vec<u64>,
    spec: &ChainSpec,
) -> Result<BeaconState, StateTransitionError> {
    per_block_state_transition(
        state,
        signed_block,
        committees,
        BlockSignatureStrategy::NoVerification,
        &NullVerifier,
        spec,
    )
}

/// As [`state_transition`], but returns the collected `SignatureSet`s instead of verifying them,
/// so the caller can batch them into a single aggregated check alongside sets from other blocks.
pub fn state_transition_signature_sets<E: EthSpec>(
    state: &BeaconState,
    signed_block: &SignedBeaconBlock,
    committees: &dyn Fn(u64, u64) -> Vec<u64>,
    spec: &ChainSpec,
) -> Result<(BeaconState, Vec<SignatureSet>), StateTransitionError> {
    let mut state = state.clone();
    let block = &signed_block.message;

    if block.slot <= state.slot {
        return Err(StateTransitionError::BlockSlotNotLaterThanState {
            state_slot: state.slot,
            block_slot: block.slot,
        });
    }

    advance_slots::<E>(&mut state, block.slot, spec)?;

    let signature_sets = per_block_processing::<E, NullVerifier>(
        &mut state,
        signed_block,
        committees,
        BlockSignatureStrategy::NoVerification,
        &NullVerifier,
        spec,
    )?;

    check_state_root(&state, block.state_root)?;

    Ok((state, signature_sets))
}

fn per_block_state_transition<E: EthSpec, V: BlsVerifier>(
    state: &BeaconState,
    signed_block: &SignedBeaconBlock,
    committees: &dyn Fn(u64, u64) -> Vec<u64>,
    signature_strategy: BlockSignatureStrategy,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<BeaconState, StateTransitionError> {
    let mut state = state.clone();
    let block = &signed_block.message;

    if block.slot <= state.slot {
        return Err(StateTransitionError::BlockSlotNotLaterThanState {
            state_slot: state.slot,
            block_slot: block.slot,
        });
    }

    advance_slots::<E>(&mut state, block.slot, spec)?;

    per_block_processing::<E, V>(
        &mut state,
        signed_block,
        committees,
        signature_strategy,
        verifier,
        spec,
    )?;

    check_state_root(&state, block.state_root)?;

    Ok(state)
}

/// Repeatedly runs `per_slot_processing` until `state.slot == target_slot`, the "catch up an
/// empty range of slots" loop shared by block processing and `state_gen`'s replay path.
pub fn advance_slots<E: EthSpec>(
    state: &mut BeaconState,
    target_slot: types::Slot,
    spec: &ChainSpec,
) -> Result<(), per_block_processing::errors::SlotProcessingError> {
    while state.slot < target_slot {
        let state_root = Hash256::from_slice(&state.tree_hash_root()[..]);
        per_slot_processing::<E>(state, Some(state_root), spec)?;
    }
    Ok(())
}

fn check_state_root(state: &BeaconState, expected: Hash256) -> Result<(), StateTransitionError> {
    let computed = Hash256::from_slice(&state.tree_hash_root()[..]);
    if computed != expected {
        return Err(StateTransitionError::StateRootMismatch { block: expected, state: computed });
    }
    Ok(())
}

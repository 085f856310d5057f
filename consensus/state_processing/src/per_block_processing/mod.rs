pub mod errors;
mod process_attestations;
mod process_attester_slashings;
mod process_deposits;
mod process_eth1_data;
mod process_exits;
mod process_proposer_slashings;
mod process_randao;
mod verify_block_header;

pub use process_attestations::{process_attestation, verify_attestation};
pub use process_attester_slashings::{process_attester_slashing, verify_attester_slashing};
pub use process_deposits::process_deposit;
pub use process_eth1_data::process_eth1_data;
pub use process_exits::{
    process_voluntary_exit, verify_voluntary_exit, verify_voluntary_exit_time_independent_only,
};
pub use process_proposer_slashings::{process_proposer_slashing, verify_proposer_slashing};
pub use process_randao::{get_randao_signature_set, process_randao};
pub use verify_block_header::{get_block_signature_set, process_block_header};

use crate::common::get_indexed_attestation;
use crate::signature_sets::{BlsVerifier, SignatureSet};
use errors::{BlockProcessingError, IntoWithIndex};
use types::{BeaconState, ChainSpec, EthSpec, SignedBeaconBlock};

/// How thoroughly `per_block_processing` should check signatures. Mirrors the teacher's
/// `BlockSignatureStrategy`: full verification is the default; the other two variants exist
/// because RANDAO and attestation aggregate signatures are expensive to re-check when a caller
/// has already verified them (e.g. during historical-sync backfill with `init_sync_no_verify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSignatureStrategy {
    VerifyIndividual,
    NoVerification,
}

/// Applies `block`'s operations to `state` in the canonical order (header, randao, eth1 data,
/// proposer slashings, attester slashings, attestations, deposits, voluntary exits), enforcing
/// each list's `ChainSpec` cap before iterating it.
///
/// Returns the collected `SignatureSet`s that must still be checked by the caller's `BlsVerifier`
/// (always populated, even under `NoVerification`, so that a caller doing deferred batch
/// verification - e.g. across a whole chain segment during initial sync - can still gather them).
pub fn per_block_processing<E: EthSpec, V: BlsVerifier>(
    state: &mut BeaconState,
    signed_block: &SignedBeaconBlock,
    committees: &dyn Fn(u64, u64) -> Vec<u64>,
    signature_strategy: BlockSignatureStrategy,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<Vec<SignatureSet>, BlockProcessingError> {
    let mut signature_sets = Vec::new();
    let block = &signed_block.message;

    process_block_header(state, block).map_err(|e| match e {
        errors::BlockOperationError::Invalid(reason) => BlockProcessingError::HeaderInvalid { reason },
        errors::BlockOperationError::ArithError(e) => BlockProcessingError::ArithError(e),
    })?;

    signature_sets.push(
        get_block_signature_set(state, signed_block).map_err(|e| match e {
            errors::BlockOperationError::Invalid(reason) => BlockProcessingError::HeaderInvalid { reason },
            errors::BlockOperationError::ArithError(e) => BlockProcessingError::ArithError(e),
        })?,
    );

    process_randao::<E>(state, block, spec)?;
    signature_sets.push(
        get_randao_signature_set::<E>(state, block)
            .map_err(|_| BlockProcessingError::RandaoSignatureInvalid)?,
    );

    process_eth1_data(state, &block.body.eth1_data, E::slots_per_eth1_voting_period());

    let body = &block.body;

    if body.proposer_slashings.len() > spec.max_proposer_slashings {
        return Err(BlockProcessingError::OperationCountExceedsMax {
            cap: spec.max_proposer_slashings,
            found: body.proposer_slashings.len(),
        });
    }
    for (i, slashing) in body.proposer_slashings.iter().enumerate() {
        verify_proposer_slashing::<E>(slashing, state).map_err(|e| e.into_with_index(i))?;
        process_proposer_slashing::<E>(slashing, state, spec)?;
    }

    if body.attester_slashings.len() > spec.max_attester_slashings {
        return Err(BlockProcessingError::OperationCountExceedsMax {
            cap: spec.max_attester_slashings,
            found: body.attester_slashings.len(),
        });
    }
    for (i, slashing) in body.attester_slashings.iter().enumerate() {
        verify_attester_slashing(slashing).map_err(|e| e.into_with_index(i))?;
        process_attester_slashing::<E>(slashing, state, spec).map_err(|e| e.into_with_index(i))?;
    }

    if body.attestations.len() > spec.max_attestations {
        return Err(BlockProcessingError::OperationCountExceedsMax {
            cap: spec.max_attestations,
            found: body.attestations.len(),
        });
    }
    for (i, attestation) in body.attestations.iter().enumerate() {
        verify_attestation::<E>(state, attestation, spec).map_err(|e| e.into_with_index(i))?;

        let committee = committees(attestation.data.slot.as_u64(), attestation.data.index);
        let indexed =
            get_indexed_attestation(&committee, attestation).map_err(|e| e.into_with_index(i))?;

        let proposer_index = block.proposer_index;
        process_attestation::<E>(state, attestation, indexed.attesting_indices.clone(), proposer_index);

        for &validator_index in &indexed.attesting_indices {
            if let Some(validator) = state.validators.get(validator_index as usize) {
                signature_sets.push(SignatureSet::single(
                    validator.pubkey,
                    indexed.data.target.root.as_bytes().to_vec(),
                    indexed.signature.clone(),
                ));
            }
        }
    }

    if body.deposits.len() > spec.max_deposits {
        return Err(BlockProcessingError::OperationCountExceedsMax {
            cap: spec.max_deposits,
            found: body.deposits.len(),
        });
    }
    for deposit in &body.deposits {
        process_deposit(state, deposit, spec);
    }

    if body.voluntary_exits.len() > spec.max_voluntary_exits {
        return Err(BlockProcessingError::OperationCountExceedsMax {
            cap: spec.max_voluntary_exits,
            found: body.voluntary_exits.len(),
        });
    }
    for (i, signed_exit) in body.voluntary_exits.iter().enumerate() {
        let exit = &signed_exit.message;
        verify_voluntary_exit::<E>(state, exit, spec).map_err(|e| e.into_with_index(i))?;
        process_voluntary_exit::<E>(state, exit, spec);

        if let Some(validator) = state.validators.get(exit.validator_index as usize) {
            signature_sets.push(SignatureSet::single(
                validator.pubkey,
                exit.epoch.as_u64().to_le_bytes().to_vec(),
                signed_exit.signature.clone(),
            ));
        }
    }

    if signature_strategy == BlockSignatureStrategy::VerifyIndividual
        && !verifier.verify_batch(&signature_sets)
    {
        return Err(BlockProcessingError::BulkSignatureVerificationFailed);
    }

    Ok(signature_sets)
}

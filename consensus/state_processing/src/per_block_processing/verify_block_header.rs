use crate::signature_sets::SignatureSet;
use super::errors::{BlockOperationError, HeaderInvalid};
use tree_hash::TreeHash;
use types::{BeaconBlock, BeaconState, SignedBeaconBlock};

type Result<T> = std::result::Result<T, BlockOperationError<HeaderInvalid>>;

fn error(reason: HeaderInvalid) -> BlockOperationError<HeaderInvalid> {
    BlockOperationError::invalid(reason)
}

/// Checks `block` is a legal successor to `state.latest_block_header` and updates the header,
/// leaving `state_root` zeroed (filled in by the next `per_slot_processing` call).
pub fn process_block_header(state: &mut BeaconState, block: &BeaconBlock) -> Result<()> {
    verify!(
        block.slot == state.slot,
        error(HeaderInvalid::StateSlotMismatch)
    );

    verify!(
        block.slot > state.latest_block_header.slot,
        error(HeaderInvalid::OlderThanLatestBlockHeader {
            latest_block_header_slot: state.latest_block_header.slot,
            block_slot: block.slot,
        })
    );

    verify!(
        block.parent_root == state.latest_block_header.canonical_root(),
        error(HeaderInvalid::ParentBlockRootMismatch {
            state: state.latest_block_header.canonical_root(),
            block: block.parent_root,
        })
    );

    let proposer = state
        .validators
        .get(block.proposer_index as usize)
        .ok_or_else(|| error(HeaderInvalid::ProposerUnknown(block.proposer_index)))?;

    verify!(
        !proposer.slashed,
        error(HeaderInvalid::ProposerSlashed(block.proposer_index))
    );

    state.latest_block_header = types::BeaconBlockHeader {
        slot: block.slot,
        proposer_index: block.proposer_index,
        parent_root: block.parent_root,
        state_root: types::Hash256::zero(),
        body_root: types::Hash256::from_slice(&block.body.tree_hash_root()[..]),
    };

    Ok(())
}

/// Collects the proposer's signature over the whole block as a signature set rather than
/// verifying it eagerly, mirroring `get_randao_signature_set`'s deferred-batch treatment of the
/// randao reveal.
pub fn get_block_signature_set(state: &BeaconState, signed_block: &SignedBeaconBlock) -> Result<SignatureSet> {
    let block = &signed_block.message;
    let proposer = state
        .validators
        .get(block.proposer_index as usize)
        .ok_or_else(|| error(HeaderInvalid::ProposerUnknown(block.proposer_index)))?;

    Ok(SignatureSet::single(
        proposer.pubkey,
        block.canonical_root().as_bytes().to_vec(),
        signed_block.signature.clone(),
    ))
}

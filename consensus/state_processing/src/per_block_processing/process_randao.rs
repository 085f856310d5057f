use crate::signature_sets::SignatureSet;
use eth2_hashing::hash;
use types::{BeaconBlock, BeaconState, ChainSpec, EthSpec, Hash256};

/// XORs the proposer's randao reveal into the current epoch's randao mix. The reveal's signature
/// is verified by the caller (see `get_randao_signature_set`) so that it can be folded into the
/// block's batched signature check.
pub fn process_randao<E: EthSpec>(
    state: &mut BeaconState,
    block: &BeaconBlock,
    spec: &ChainSpec,
) -> Result<(), safe_arith::ArithError> {
    let _ = spec;
    let epoch = state.current_epoch(E::slots_per_epoch());
    let current_mix = state.get_randao_mix(epoch).unwrap_or_else(Hash256::zero);
    let reveal_hash = Hash256::from_slice(&hash(block.body.randao_reveal.as_bytes()));
    let mixed = xor(current_mix, reveal_hash);
    state.update_randao_mix(epoch, mixed);
    Ok(())
}

fn xor(a: Hash256, b: Hash256) -> Hash256 {
    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = a.as_bytes()[i] ^ b.as_bytes()[i];
    }
    Hash256::from(out)
}

/// Collects the proposer's randao reveal as a signature set rather than verifying it eagerly.
pub fn get_randao_signature_set<E: EthSpec>(
    state: &BeaconState,
    block: &BeaconBlock,
) -> Result<SignatureSet, String> {
    let proposer = state
        .validators
        .get(block.proposer_index as usize)
        .ok_or_else(|| format!("unknown proposer index {}", block.proposer_index))?;
    let epoch = block.slot.epoch(E::slots_per_epoch());
    Ok(SignatureSet::single(
        proposer.pubkey,
        epoch.as_u64().to_le_bytes().to_vec(),
        block.body.randao_reveal.clone(),
    ))
}

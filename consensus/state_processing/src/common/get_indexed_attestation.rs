use crate::per_block_processing::errors::{BlockOperationError, IndexedAttestationInvalid};
use types::{Attestation, IndexedAttestation};

type Result<T> = std::result::Result<T, BlockOperationError<IndexedAttestationInvalid>>;

/// Resolves an `Attestation`'s aggregation bitfield against `committee` (the ascending list of
/// validator indices assigned to attest in this slot/index) to build an `IndexedAttestation`.
///
/// Committee assignment itself (shuffling, proposer/attester duty scheduling) is a concern of
/// the validator client, not this core; callers here pass in whatever committee the caller's
/// duty-scheduling component already resolved.
pub fn get_indexed_attestation(
    committee: &[u64],
    attestation: &Attestation,
) -> Result<IndexedAttestation> {
    let mut attesting_indices = Vec::new();
    for (i, &validator_index) in committee.iter().enumerate() {
        if bit_is_set(&attestation.aggregation_bits, i) {
            attesting_indices.push(validator_index);
        }
    }

    if attesting_indices.is_empty() {
        return Err(BlockOperationError::invalid(IndexedAttestationInvalid::IndicesEmpty));
    }

    attesting_indices.sort_unstable();

    Ok(IndexedAttestation {
        attesting_indices,
        data: attestation.data.clone(),
        signature: attestation.signature.clone(),
    })
}

/// Verifies indices are sorted and unique, as required of a well-formed `IndexedAttestation`.
pub fn is_valid_indexed_attestation(indexed: &IndexedAttestation) -> Result<()> {
    if indexed.attesting_indices.is_empty() {
        return Err(BlockOperationError::invalid(IndexedAttestationInvalid::IndicesEmpty));
    }
    for window in indexed.attesting_indices.windows(2) {
        if window[0] >= window[1] {
            return Err(BlockOperationError::invalid(
                IndexedAttestationInvalid::BadValidatorIndicesOrdering(0),
            ));
        }
    }
    Ok(())
}

fn bit_is_set(bits: &[u8], i: usize) -> bool {
    let byte = i / 8;
    let bit = i % 8;
    bits.get(byte).map_or(false, |b| b & (1 << bit) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{AttestationData, Checkpoint, Epoch, Hash256, SignatureBytes, Slot};

    fn attestation(bits: Vec<u8>) -> Attestation {
        Attestation {
            aggregation_bits: bits,
            data: AttestationData {
                slot: Slot::new(0),
                index: 0,
                beacon_block_root: Hash256::zero(),
                source: Checkpoint::new(Epoch::new(0), Hash256::zero()),
                target: Checkpoint::new(Epoch::new(1), Hash256::zero()),
            },
            signature: SignatureBytes::empty(),
        }
    }

    #[test]
    fn resolves_committee_bits() {
        let committee = vec![10, 20, 30, 40];
        let att = attestation(vec![0b0000_1010]);
        let indexed = get_indexed_attestation(&committee, &att).unwrap();
        assert_eq!(indexed.attesting_indices, vec![20, 40]);
    }

    #[test]
    fn empty_bitfield_is_invalid() {
        let committee = vec![10, 20];
        let att = attestation(vec![0b0000_0000]);
        assert!(get_indexed_attestation(&committee, &att).is_err());
    }

    #[test]
    fn rejects_duplicate_indices() {
        let indexed = IndexedAttestation {
            attesting_indices: vec![1, 1, 2],
            data: attestation(vec![]).data,
            signature: SignatureBytes::empty(),
        };
        assert!(is_valid_indexed_attestation(&indexed).is_err());
    }
}

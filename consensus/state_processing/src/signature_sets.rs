//! A `SignatureSet` bundles a pubkey, message and signature for later, batched verification.
//!
//! BLS itself is an external collaborator: this crate never calls a pairing function. Block and
//! operation processing instead collects `SignatureSet`s as it walks a block and hands the whole
//! batch to a caller-supplied `BlsVerifier` at the end (`StateTransition::execute_no_verify_any_sig`
//! followed by a single `verifier.verify_batch` call), so one invalid signature anywhere in a
//! large block costs one batch check rather than N individual ones.

use types::{PublicKeyBytes, SignatureBytes};

/// One (pubkey, message, signature) triple awaiting verification.
#[derive(Debug, Clone)]
pub struct SignatureSet {
    pub pubkey: PublicKeyBytes,
    pub message: Vec<u8>,
    pub signature: SignatureBytes,
}

impl SignatureSet {
    pub fn single(pubkey: PublicKeyBytes, message: Vec<u8>, signature: SignatureBytes) -> Self {
        Self { pubkey, message, signature }
    }
}

/// Injected at the edge of the core so that `state_processing` never links against a concrete
/// BLS implementation.
pub trait BlsVerifier {
    /// Returns `true` only if every set in `sets` verifies.
    fn verify_batch(&self, sets: &[SignatureSet]) -> bool;
}

/// A verifier that accepts everything, used by `init_sync_no_verify` and by tests that only
/// exercise arithmetic/consensus logic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVerifier;

impl BlsVerifier for NullVerifier {
    fn verify_batch(&self, _sets: &[SignatureSet]) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_verifier_always_accepts() {
        let verifier = NullVerifier;
        let sets = vec![SignatureSet::single(
            PublicKeyBytes::empty(),
            vec![1, 2, 3],
            SignatureBytes::empty(),
        )];
        assert!(verifier.verify_batch(&sets));
    }
}

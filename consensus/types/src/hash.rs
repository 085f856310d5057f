use ethereum_types::H256;
use serde_derive::{Deserialize, Serialize};
use ssz::{Decode, DecodeError, Encode};
use tree_hash::TreeHash;

/// A 32-byte hash, used for block/state roots and checkpoints.
///
/// Thin wrapper over `ethereum_types::H256` so that SSZ/tree-hash impls live in this crate
/// rather than requiring a newtype wrapper at every call site.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Hash256(H256);

impl Hash256 {
    pub fn zero() -> Self {
        Self(H256::zero())
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(H256::from_slice(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == H256::zero()
    }
}

impl From<H256> for Hash256 {
    fn from(h: H256) -> Self {
        Self(h)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(H256::from(bytes))
    }
}

impl Encode for Hash256 {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        32
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.0.as_bytes());
    }
}

impl Decode for Hash256 {
    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        32
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != 32 {
            return Err(DecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: 32,
            });
        }
        Ok(Self::from_slice(bytes))
    }
}

impl TreeHash for Hash256 {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        tree_hash::TreeHashType::Vector
    }

    fn tree_hash_packed_encoding(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    fn tree_hash_packing_factor() -> usize {
        1
    }

    fn tree_hash_root(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl std::fmt::LowerHex for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

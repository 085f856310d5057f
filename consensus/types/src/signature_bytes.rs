//! Wire-format wrappers for BLS key material.
//!
//! The BLS library itself is an external collaborator (see `spec.md` §1): this crate never
//! performs a pairing check. `PublicKeyBytes`/`SignatureBytes` only carry the bytes far enough
//! for `state_processing` to build `SignatureSet`s that get handed to an injected verifier.

use serde_derive::{Deserialize, Serialize};
use ssz::{Decode, DecodeError, Encode};
use tree_hash::TreeHash;

macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "serde_bytes_array")] [u8; $len]);

        impl $name {
            pub fn empty() -> Self {
                Self([0; $len])
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
                if bytes.len() != $len {
                    return Err(format!(
                        "expected {} bytes, got {}",
                        $len,
                        bytes.len()
                    ));
                }
                let mut arr = [0u8; $len];
                arr.copy_from_slice(bytes);
                Ok(Self(arr))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(&self.0[..]))
            }
        }

        impl Encode for $name {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $len
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.0);
            }
        }

        impl Decode for $name {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $len
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
                Self::from_bytes(bytes).map_err(|_| DecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected: $len,
                })
            }
        }

        impl TreeHash for $name {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> Vec<u8> {
                self.0.to_vec()
            }

            fn tree_hash_packing_factor() -> usize {
                1
            }

            fn tree_hash_root(&self) -> Vec<u8> {
                eth2_hashing::hash(&self.0)
            }
        }
    };
}

fixed_bytes!(PublicKeyBytes, 48);
fixed_bytes!(SignatureBytes, 96);

mod serde_bytes_array {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        use serde::Deserialize;
        let s = String::deserialize(deserializer)?;
        let s = s.trim_start_matches("0x");
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        if bytes.len() != N {
            return Err(serde::de::Error::custom("unexpected length"));
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}

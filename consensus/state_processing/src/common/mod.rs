pub mod get_indexed_attestation;

pub use get_indexed_attestation::{get_indexed_attestation, is_valid_indexed_attestation};

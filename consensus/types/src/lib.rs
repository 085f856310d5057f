//! Core data model for the beacon chain consensus engine: slots/epochs, hashes, the validator
//! registry, operations (attestations, slashings, deposits, exits) and the block/state types
//! built from them.
//!
//! BLS signatures and public keys are carried as opaque byte wrappers (`signature_bytes`); the
//! actual cryptography is an external collaborator consumed through `state_processing`'s
//! `BlsVerifier` trait, never implemented in this crate.

pub mod attestation;
pub mod beacon_block;
pub mod beacon_block_header;
pub mod beacon_state;
pub mod chain_spec;
pub mod checkpoint;
pub mod deposit;
pub mod eth1_data;
pub mod eth_spec;
pub mod fork;
pub mod hash;
pub mod historical_batch;
pub mod pending_attestation;
pub mod signature_bytes;
pub mod slashing;
pub mod slot_epoch;
pub mod validator;
pub mod voluntary_exit;

pub use attestation::{Attestation, AttestationData, IndexedAttestation};
pub use beacon_block::{BeaconBlock, BeaconBlockBody, SignedBeaconBlock};
pub use beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use beacon_state::BeaconState;
pub use chain_spec::ChainSpec;
pub use checkpoint::Checkpoint;
pub use deposit::{Deposit, DepositData};
pub use eth1_data::Eth1Data;
pub use eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use fork::Fork;
pub use hash::Hash256;
pub use historical_batch::HistoricalBatch;
pub use pending_attestation::PendingAttestation;
pub use signature_bytes::{PublicKeyBytes, SignatureBytes};
pub use slashing::{AttesterSlashing, ProposerSlashing};
pub use slot_epoch::{Epoch, Slot};
pub use validator::{Validator, FAR_FUTURE_EPOCH};
pub use voluntary_exit::{SignedVoluntaryExit, VoluntaryExit};

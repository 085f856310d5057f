//! LMD-GHOST fork choice on top of the proto-array: given a block DAG weighted by validator
//! attestations, finds the canonical head and tracks the justified/finalized checkpoints that
//! constrain it.
//!
//! The DAG itself and its weight bookkeeping live in `proto_array`; this crate adds the phase0
//! `Store` semantics (checkpoint updates, attestation queueing, `on_tick`) on top, generic over a
//! caller-supplied [`ForkChoiceStore`] so the checkpoint state can be backed by whatever storage
//! a running node uses.

mod fork_choice;
mod fork_choice_store;

pub use crate::fork_choice::{
    Error, ForkChoice, InvalidAttestation, InvalidBlock, PersistedForkChoice, QueuedAttestation,
    SAFE_SLOTS_TO_UPDATE_JUSTIFIED,
};
pub use fork_choice_store::ForkChoiceStore;
pub use proto_array::Block as ProtoBlock;

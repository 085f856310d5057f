use fork_choice::Error as ForkChoiceError;
use state_processing::per_block_processing::errors::{
    BlockOperationError, IndexedAttestationInvalid,
};
use state_processing::StateTransitionError;
use types::{Hash256, Slot};

/// The error taxonomy of §7: each variant is a distinct, non-overlapping failure kind so callers
/// can decide retry/discard policy without string-matching.
#[derive(Debug)]
pub enum BeaconChainError {
    /// Structural/signature/state-root failure from `StateTransition`. Non-retriable.
    InvalidBlock(StateTransitionError),
    /// Pre-state missing for the block's parent. Retriable once the parent is processed.
    AncestorNotFound(Hash256),
    /// Block is not a descendant of the finalized checkpoint, or precedes/equals the finalized
    /// slot. Non-retriable.
    FinalizedDescendantCheckFailed { block_slot: Slot, finalized_slot: Slot },
    /// `StateGen` lookup for a root never seen by this node.
    UnknownStateSummary(Hash256),
    /// Cold read where the archived point could not be regenerated (e.g. missing genesis).
    UnknownArchivedState(u64),
    /// Transient storage error. Propagated; caller may retry.
    DBError(store::Error),
    /// Batch BLS check rejected; the whole batch is dropped.
    BatchVerificationFailed,
    /// The operation was aborted via its cancellation token.
    ContextCancelled,
    /// A malformed or slashable attestation, rejected before it reaches fork choice.
    InvalidAttestation(BlockOperationError<IndexedAttestationInvalid>),
    SlashableAttestation { validator_index: u64 },
    /// The block's parent is more than `ChainConfig::import_max_skip_slots` slots behind it.
    TooManySkippedSlots { skipped: u64, max: u64 },
    ForkChoiceError(ForkChoiceError<StoreError>),
    StateGenError(state_gen::Error),
}

/// Alias used purely so `ForkChoiceError<StoreError>` reads naturally above; the concrete error
/// type of `BeaconForkChoiceStore` is defined in `fork_choice_store.rs`.
pub type StoreError = crate::fork_choice_store::Error;

impl From<StateTransitionError> for BeaconChainError {
    fn from(e: StateTransitionError) -> Self {
        BeaconChainError::InvalidBlock(e)
    }
}

impl From<store::Error> for BeaconChainError {
    fn from(e: store::Error) -> Self {
        BeaconChainError::DBError(e)
    }
}

impl From<state_gen::Error> for BeaconChainError {
    fn from(e: state_gen::Error) -> Self {
        BeaconChainError::StateGenError(e)
    }
}

impl From<ForkChoiceError<StoreError>> for BeaconChainError {
    fn from(e: ForkChoiceError<StoreError>) -> Self {
        BeaconChainError::ForkChoiceError(e)
    }
}

impl From<BlockOperationError<IndexedAttestationInvalid>> for BeaconChainError {
    fn from(e: BlockOperationError<IndexedAttestationInvalid>) -> Self {
        BeaconChainError::InvalidAttestation(e)
    }
}

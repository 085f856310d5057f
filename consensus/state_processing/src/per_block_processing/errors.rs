use safe_arith::ArithError;
use types::{Checkpoint, Epoch, Hash256, Slot};

/// The error returned from `per_block_processing`. Indicates the block is either invalid, or
/// that validity could not be determined due to an unexpected internal error. There is no
/// indication of _where_ the error occurred beyond the variant itself.
#[derive(Debug, PartialEq, Clone)]
pub enum BlockProcessingError {
    IncorrectStateType,
    RandaoSignatureInvalid,
    BulkSignatureVerificationFailed,
    StateRootMismatch,
    OperationCountExceedsMax { cap: usize, found: usize },
    HeaderInvalid { reason: HeaderInvalid },
    ProposerSlashingInvalid { index: usize, reason: ProposerSlashingInvalid },
    AttesterSlashingInvalid { index: usize, reason: AttesterSlashingInvalid },
    IndexedAttestationInvalid { index: usize, reason: IndexedAttestationInvalid },
    AttestationInvalid { index: usize, reason: AttestationInvalid },
    DepositInvalid { index: usize, reason: DepositInvalid },
    ExitInvalid { index: usize, reason: ExitInvalid },
    ArithError(ArithError),
    UnknownValidator(u64),
}

impl From<ArithError> for BlockProcessingError {
    fn from(e: ArithError) -> Self {
        BlockProcessingError::ArithError(e)
    }
}

pub trait IntoWithIndex<T>: Sized {
    fn into_with_index(self, index: usize) -> T;
}

macro_rules! impl_into_block_processing_error_with_index {
    ($($type: ident),*) => {
        $(
            impl IntoWithIndex<BlockProcessingError> for BlockOperationError<$type> {
                fn into_with_index(self, index: usize) -> BlockProcessingError {
                    match self {
                        BlockOperationError::Invalid(reason) => {
                            BlockProcessingError::$type { index, reason }
                        }
                        BlockOperationError::ArithError(e) => BlockProcessingError::ArithError(e),
                    }
                }
            }
        )*
    };
}

impl_into_block_processing_error_with_index!(
    ProposerSlashingInvalid,
    AttesterSlashingInvalid,
    IndexedAttestationInvalid,
    AttestationInvalid,
    DepositInvalid,
    ExitInvalid
);

pub type HeaderValidationError = BlockOperationError<HeaderInvalid>;
pub type ProposerSlashingValidationError = BlockOperationError<ProposerSlashingInvalid>;
pub type AttesterSlashingValidationError = BlockOperationError<AttesterSlashingInvalid>;
pub type AttestationValidationError = BlockOperationError<AttestationInvalid>;
pub type IndexedAttestationValidationError = BlockOperationError<IndexedAttestationInvalid>;
pub type DepositValidationError = BlockOperationError<DepositInvalid>;
pub type ExitValidationError = BlockOperationError<ExitInvalid>;

/// An operation (one item out of a block's lists) was either invalid for reason `T`, or an
/// unexpected internal error occurred while trying to determine its validity.
#[derive(Debug, PartialEq, Clone)]
pub enum BlockOperationError<T> {
    Invalid(T),
    ArithError(ArithError),
}

impl<T> BlockOperationError<T> {
    pub fn invalid(reason: T) -> Self {
        BlockOperationError::Invalid(reason)
    }
}

impl<T> From<ArithError> for BlockOperationError<T> {
    fn from(e: ArithError) -> Self {
        BlockOperationError::ArithError(e)
    }
}

impl From<BlockOperationError<IndexedAttestationInvalid>> for BlockOperationError<AttestationInvalid> {
    fn from(e: BlockOperationError<IndexedAttestationInvalid>) -> Self {
        match e {
            BlockOperationError::Invalid(e) => {
                BlockOperationError::invalid(AttestationInvalid::BadIndexedAttestation(e))
            }
            BlockOperationError::ArithError(e) => BlockOperationError::ArithError(e),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum HeaderInvalid {
    ProposalSignatureInvalid,
    StateSlotMismatch,
    OlderThanLatestBlockHeader { latest_block_header_slot: Slot, block_slot: Slot },
    ProposerUnknown(u64),
    ParentBlockRootMismatch { state: Hash256, block: Hash256 },
    ProposerSlashed(u64),
}

#[derive(Debug, PartialEq, Clone)]
pub enum ProposerSlashingInvalid {
    ProposerUnknown(u64),
    ProposalSlotMismatch(Slot, Slot),
    ProposerIndexMismatch(u64, u64),
    ProposalsIdentical,
    ProposerNotSlashable(u64),
    BadProposal1Signature,
    BadProposal2Signature,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttesterSlashingInvalid {
    NotSlashable,
    IndexedAttestation1Invalid(BlockOperationError<IndexedAttestationInvalid>),
    IndexedAttestation2Invalid(BlockOperationError<IndexedAttestationInvalid>),
    NoSlashableIndices,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttestationInvalid {
    IncludedTooEarly { state: Slot, delay: u64, attestation: Slot },
    IncludedTooLate { state: Slot, attestation: Slot },
    TargetEpochSlotMismatch { target_epoch: Epoch, slot_epoch: Epoch },
    BadTargetEpoch,
    WrongJustifiedCheckpoint {
        state: Box<Checkpoint>,
        attestation: Box<Checkpoint>,
        is_current: bool,
    },
    UnknownValidator(u64),
    BadSignature,
    BadIndexedAttestation(IndexedAttestationInvalid),
}

#[derive(Debug, PartialEq, Clone)]
pub enum IndexedAttestationInvalid {
    IndicesEmpty,
    BadValidatorIndicesOrdering(usize),
    UnknownValidator(u64),
    BadSignature,
}

#[derive(Debug, PartialEq, Clone)]
pub enum DepositInvalid {
    BadSignature,
    BadBlsBytes,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExitInvalid {
    NotActive(u64),
    ValidatorUnknown(u64),
    AlreadyExited(u64),
    FutureEpoch { current_epoch: Epoch, earliest_exit_epoch: Epoch },
    BadSignature,
}

/// The error returned from `per_slot_processing`.
#[derive(Debug, PartialEq, Clone)]
pub enum SlotProcessingError {
    EpochProcessingError(EpochProcessingError),
    ArithError(ArithError),
}

impl From<EpochProcessingError> for SlotProcessingError {
    fn from(e: EpochProcessingError) -> Self {
        SlotProcessingError::EpochProcessingError(e)
    }
}

impl From<ArithError> for SlotProcessingError {
    fn from(e: ArithError) -> Self {
        SlotProcessingError::ArithError(e)
    }
}

/// The error returned from `per_epoch_processing`.
#[derive(Debug, PartialEq, Clone)]
pub enum EpochProcessingError {
    UnknownValidator(u64),
    ArithError(ArithError),
}

impl From<ArithError> for EpochProcessingError {
    fn from(e: ArithError) -> Self {
        EpochProcessingError::ArithError(e)
    }
}

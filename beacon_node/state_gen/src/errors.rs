use state_processing::per_block_processing::errors::SlotProcessingError;
use state_processing::StateTransitionError;
use types::Hash256;

#[derive(Debug)]
pub enum Error {
    /// `StateSummary(root)` had no entry: `root` is unknown to this node, or predates genesis.
    UnknownStateSummary(Hash256),
    /// A replay chain walk needed a block that isn't in the `blocks` column.
    UnknownBlock(Hash256),
    /// A cold-region read needed an `ArchivedPoint` that could not be found or regenerated.
    UnknownArchivedState(u64),
    DBError(store::Error),
    ReplayBlockError(StateTransitionError),
    ReplaySlotError(SlotProcessingError),
    /// `MigrateToCold` was asked to migrate past a point already finalized in a previous call.
    FinalizedSlotOutOfOrder { current_split_slot: types::Slot, new_finalized_slot: types::Slot },
}

impl From<store::Error> for Error {
    fn from(e: store::Error) -> Self {
        Error::DBError(e)
    }
}

impl From<StateTransitionError> for Error {
    fn from(e: StateTransitionError) -> Self {
        Error::ReplayBlockError(e)
    }
}

impl From<SlotProcessingError> for Error {
    fn from(e: SlotProcessingError) -> Self {
        Error::ReplaySlotError(e)
    }
}

use types::{Epoch, Hash256};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    FinalizedNodeUnknown(Hash256),
    JustifiedNodeUnknown(Hash256),
    InvalidDeltaLen { deltas: usize, indices: usize },
    InvalidNodeIndex(usize),
    InvalidNodeDelta(usize),
    InvalidParentDelta(usize),
    InvalidBestDescendant(usize),
    InvalidJustifiedIndex(usize),
    InvalidBestNode {
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
        node_justified_epoch: Epoch,
        node_finalized_epoch: Epoch,
    },
    DeltaOverflow(usize),
    IndexOverflow(&'static str),
    RevertedFinalizedEpoch {
        current_finalized_epoch: Epoch,
        new_finalized_epoch: Epoch,
    },
    InvalidProtoArrayBytes(String),
    ParentUnknown(Hash256),
}

impl From<Error> for String {
    fn from(e: Error) -> Self {
        format!("{:?}", e)
    }
}

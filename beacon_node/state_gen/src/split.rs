use ssz_derive::{Decode, Encode};
use types::{Hash256, Slot};

/// The boundary between the hot and cold regions of the store. Everything at or after
/// `slot` is hot (kept around intact, replay-free); everything before it is cold (reachable only
/// via an `ArchivedPoint` plus replay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct Split {
    pub slot: Slot,
    pub state_root: Hash256,
}

use crate::events::{EventHandler, EventKind};
use parking_lot::RwLock;
use std::sync::Arc;
use types::{BeaconBlock, BeaconState, Hash256, Slot};

/// A `{slot, root, block, state}` snapshot of the canonical head, per §4.1/§4.6: a single
/// writer (`BlockProcessor::on_block`) updates it, any number of readers take a cheap `Arc`
/// clone of the fields they need.
struct Head {
    slot: Slot,
    root: Hash256,
    block: Arc<BeaconBlock>,
    state: Arc<BeaconState>,
}

/// Single-writer/many-reader holder of the canonical head (§4.6). `save_head` is a no-op if the
/// root hasn't changed, and fires `HeadChanged` exactly when it has.
pub struct HeadTracker {
    head: RwLock<Head>,
}

impl HeadTracker {
    pub fn new(genesis_root: Hash256, genesis_block: BeaconBlock, genesis_state: BeaconState) -> Self {
        Self {
            head: RwLock::new(Head {
                slot: genesis_block.slot,
                root: genesis_root,
                block: Arc::new(genesis_block),
                state: Arc::new(genesis_state),
            }),
        }
    }

    pub fn head_slot(&self) -> Slot {
        self.head.read().slot
    }

    pub fn head_root(&self) -> Hash256 {
        self.head.read().root
    }

    pub fn head_block(&self) -> Arc<BeaconBlock> {
        self.head.read().block.clone()
    }

    pub fn head_state(&self) -> Arc<BeaconState> {
        self.head.read().state.clone()
    }

    /// Updates the head snapshot and, through `events`, fires `HeadChanged` iff `new_root`
    /// differs from the current root. A no-op call still counts as "idempotent" per the
    /// round-trip property in §8 (`Head(); Head()` with no intervening mutation is stable).
    pub fn save_head(
        &self,
        new_root: Hash256,
        new_block: BeaconBlock,
        new_state: BeaconState,
        events: &EventHandler,
    ) {
        let mut head = self.head.write();
        if head.root == new_root {
            return;
        }

        let previous_root = head.root;
        head.slot = new_block.slot;
        head.root = new_root;
        head.block = Arc::new(new_block);
        head.state = Arc::new(new_state);
        drop(head);

        events.register(EventKind::HeadChanged { previous_root, current_root: new_root });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Discard, Logger};
    use types::{BeaconBlockBody, ChainSpec, Eth1Data};

    fn empty_state() -> BeaconState {
        state_processing::genesis::initialize_beacon_state_from_eth1::<types::MinimalEthSpec>(
            Hash256::zero(),
            0,
            &[],
            &ChainSpec::minimal(),
        )
    }

    fn block(slot: u64) -> BeaconBlock {
        BeaconBlock {
            slot: Slot::new(slot),
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(Eth1Data::default()),
        }
    }

    #[test]
    fn save_head_is_noop_when_root_unchanged() {
        let genesis_root = Hash256::from_slice(&[1; 32]);
        let tracker = HeadTracker::new(genesis_root, block(0), empty_state());
        let events = EventHandler::new(Logger::root(Discard, o!()));

        tracker.save_head(genesis_root, block(0), empty_state(), &events);
        assert_eq!(tracker.head_root(), genesis_root);
        assert_eq!(tracker.head_slot(), Slot::new(0));
    }

    #[test]
    fn save_head_updates_on_new_root() {
        let genesis_root = Hash256::from_slice(&[1; 32]);
        let tracker = HeadTracker::new(genesis_root, block(0), empty_state());
        let events = EventHandler::new(Logger::root(Discard, o!()));
        let mut rx = events.subscribe_head();

        let new_root = Hash256::from_slice(&[2; 32]);
        tracker.save_head(new_root, block(1), empty_state(), &events);
        assert_eq!(tracker.head_root(), new_root);
        assert_eq!(tracker.head_slot(), Slot::new(1));
        assert!(rx.try_recv().is_ok());
    }
}

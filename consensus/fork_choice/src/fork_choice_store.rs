use std::fmt::Debug;
use types::{BeaconBlock, BeaconState, Checkpoint, EthSpec, Hash256, Slot};

/// Approximates the `Store` object in the phase0 fork-choice spec: a `ForkChoice` is generic
/// over this trait so that the justified/finalized bookkeeping can be backed by an in-memory
/// struct in tests and by something DB-aware in a running node, without `fork_choice` itself
/// depending on a storage layer.
pub trait ForkChoiceStore<E: EthSpec>: Sized {
    type Error: Debug;

    /// The store's view of the current slot, advanced only via `ForkChoice::update_time`.
    fn get_current_slot(&self) -> Slot;

    fn set_current_slot(&mut self, slot: Slot);

    /// Called once a block's `on_block` bookkeeping has completed, so a caching implementation
    /// can index the new block/state pair.
    fn after_block(
        &mut self,
        block: &BeaconBlock,
        block_root: Hash256,
        state: &BeaconState,
    ) -> Result<(), Self::Error>;

    fn justified_checkpoint(&self) -> &Checkpoint;

    /// Effective balances as of the justified checkpoint's state, indexed by validator index.
    /// This is what `ProtoArrayForkChoice::find_head` weighs votes by.
    fn justified_balances(&self) -> &[u64];

    fn finalized_checkpoint(&self) -> &Checkpoint;

    fn best_justified_checkpoint(&self) -> &Checkpoint;

    fn set_finalized_checkpoint(&mut self, checkpoint: Checkpoint);

    /// Adopts `state.current_justified_checkpoint` as the store's justified checkpoint,
    /// refreshing `justified_balances` from `state`.
    fn set_justified_checkpoint(&mut self, state: &BeaconState) -> Result<(), Self::Error>;

    fn set_best_justified_checkpoint(&mut self, state: &BeaconState);

    fn set_justified_checkpoint_to_best_justified_checkpoint(&mut self) -> Result<(), Self::Error>;

    /// Returns the root of the block that is an ancestor of `block_root` at `ancestor_slot`,
    /// found by walking `state`'s historical block roots.
    fn ancestor_at_slot(
        &self,
        state: &BeaconState,
        block_root: Hash256,
        ancestor_slot: Slot,
    ) -> Result<Hash256, Self::Error>;
}

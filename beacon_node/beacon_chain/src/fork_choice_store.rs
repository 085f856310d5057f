use fork_choice::ForkChoiceStore;
use std::marker::PhantomData;
use types::{BeaconBlock, BeaconState, Checkpoint, EthSpec, Hash256, Slot};

/// This store never talks to the DB directly; it only holds the small amount of state the
/// phase0 fork-choice spec calls `Store` (current slot, checkpoints, justified balances). Block
/// and state persistence is `BlockProcessor`'s job (§4.4), done alongside the `fork_choice.on_block`
/// call rather than from inside `after_block`.
#[derive(Debug)]
pub enum Error {
    /// `ancestor_at_slot` was asked for a slot outside `state`'s rolling `block_roots` window.
    AncestorOutOfHistoricalRange { block_root: Hash256, ancestor_slot: Slot },
}

/// Fork-choice vote weight uses each validator's hysteresis-clamped effective balance, not the
/// raw balance that `rewards_and_penalties.rs` mutates every epoch.
fn effective_balances(state: &BeaconState) -> Vec<u64> {
    state.validators.iter().map(|v| v.effective_balance).collect()
}

pub struct BeaconForkChoiceStore<E> {
    current_slot: Slot,
    justified_checkpoint: Checkpoint,
    justified_balances: Vec<u64>,
    best_justified_checkpoint: Checkpoint,
    finalized_checkpoint: Checkpoint,
    _phantom: PhantomData<E>,
}

impl<E: EthSpec> BeaconForkChoiceStore<E> {
    pub fn from_genesis(genesis_state: &BeaconState) -> Self {
        let justified = Checkpoint { epoch: genesis_state.current_epoch(E::slots_per_epoch()), root: Hash256::zero() };
        Self {
            current_slot: genesis_state.slot,
            justified_checkpoint: justified,
            justified_balances: effective_balances(genesis_state),
            best_justified_checkpoint: justified,
            finalized_checkpoint: justified,
            _phantom: PhantomData,
        }
    }
}

impl<E: EthSpec> ForkChoiceStore<E> for BeaconForkChoiceStore<E> {
    type Error = Error;

    fn get_current_slot(&self) -> Slot {
        self.current_slot
    }

    fn set_current_slot(&mut self, slot: Slot) {
        self.current_slot = slot;
    }

    fn after_block(&mut self, _block: &BeaconBlock, _block_root: Hash256, _state: &BeaconState) -> Result<(), Self::Error> {
        Ok(())
    }

    fn justified_checkpoint(&self) -> &Checkpoint {
        &self.justified_checkpoint
    }

    fn justified_balances(&self) -> &[u64] {
        &self.justified_balances
    }

    fn finalized_checkpoint(&self) -> &Checkpoint {
        &self.finalized_checkpoint
    }

    fn best_justified_checkpoint(&self) -> &Checkpoint {
        &self.best_justified_checkpoint
    }

    fn set_finalized_checkpoint(&mut self, checkpoint: Checkpoint) {
        self.finalized_checkpoint = checkpoint;
    }

    fn set_justified_checkpoint(&mut self, state: &BeaconState) -> Result<(), Self::Error> {
        self.justified_checkpoint = state.current_justified_checkpoint;
        self.justified_balances = effective_balances(state);
        Ok(())
    }

    fn set_best_justified_checkpoint(&mut self, state: &BeaconState) {
        self.best_justified_checkpoint = state.current_justified_checkpoint;
    }

    fn set_justified_checkpoint_to_best_justified_checkpoint(&mut self) -> Result<(), Self::Error> {
        self.justified_checkpoint = self.best_justified_checkpoint;
        Ok(())
    }

    fn ancestor_at_slot(&self, state: &BeaconState, block_root: Hash256, ancestor_slot: Slot) -> Result<Hash256, Self::Error> {
        state
            .get_block_root(ancestor_slot)
            .ok_or(Error::AncestorOutOfHistoricalRange { block_root, ancestor_slot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::MinimalEthSpec;

    fn genesis_state() -> BeaconState {
        state_processing::genesis::initialize_beacon_state_from_eth1::<MinimalEthSpec>(
            Hash256::zero(),
            0,
            &[],
            &types::ChainSpec::minimal(),
        )
    }

    #[test]
    fn from_genesis_seeds_all_three_checkpoints_equal() {
        let state = genesis_state();
        let store = BeaconForkChoiceStore::<MinimalEthSpec>::from_genesis(&state);
        assert_eq!(store.justified_checkpoint(), store.finalized_checkpoint());
        assert_eq!(store.justified_checkpoint(), store.best_justified_checkpoint());
    }
}

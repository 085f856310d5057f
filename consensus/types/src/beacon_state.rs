use crate::{
    BeaconBlockHeader, Checkpoint, Epoch, Eth1Data, Fork, Hash256, PendingAttestation, Slot,
    Validator,
};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The consensus state machine's state.
///
/// Vector fields that the teacher bounds at the type level with `FixedVector<_, T::SlotsPerEra>`
/// (`block_roots`, `state_roots`, `randao_mixes`) are plain `Vec`s here, pre-sized by the caller
/// at genesis according to `EthSpec::slots_per_historical_root()` /
/// `EthSpec::epochs_per_historical_vector()`; the modulo-indexing invariant is the same either
/// way, it is just checked at runtime instead of compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconState {
    // Versioning.
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // History.
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: Vec<Hash256>,
    pub state_roots: Vec<Hash256>,
    pub historical_roots: Vec<Hash256>,

    // Eth1.
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: Vec<Eth1Data>,
    pub eth1_deposit_index: u64,

    // Registry.
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,

    // Randomness.
    pub randao_mixes: Vec<Hash256>,

    // Attestations seen this epoch and the one before, consumed by `rewards_and_penalties`
    // and cleared each epoch boundary.
    pub previous_epoch_attestations: Vec<PendingAttestation>,
    pub current_epoch_attestations: Vec<PendingAttestation>,

    // Slashings: sum of effective balances of validators slashed in each of the trailing
    // `epochs_per_slashings_vector` epochs, indexed by `epoch % epochs_per_slashings_vector`.
    pub slashings: Vec<u64>,

    // Finality. Packed as a 4-bit field (bit 0 = most recent epoch), mirroring the teacher's
    // `BitVector<JustificationBitsLength>` without pulling in a bounded-bitfield crate.
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
}

impl BeaconState {
    pub fn current_epoch(&self, slots_per_epoch: u64) -> Epoch {
        self.slot.epoch(slots_per_epoch)
    }

    pub fn previous_epoch(&self, slots_per_epoch: u64) -> Epoch {
        let current = self.current_epoch(slots_per_epoch);
        current.saturating_sub(Epoch::new(1))
    }

    /// Block root at `slot`, taken from the rolling `block_roots` window.
    pub fn get_block_root(&self, slot: Slot) -> Option<Hash256> {
        if self.block_roots.is_empty() {
            return None;
        }
        let len = self.block_roots.len() as u64;
        if slot >= self.slot || self.slot.as_u64().saturating_sub(slot.as_u64()) > len {
            return None;
        }
        Some(self.block_roots[(slot.as_u64() % len) as usize])
    }

    pub fn set_block_root(&mut self, slot: Slot, root: Hash256) {
        let len = self.block_roots.len() as u64;
        self.block_roots[(slot.as_u64() % len) as usize] = root;
    }

    pub fn get_state_root(&self, slot: Slot) -> Option<Hash256> {
        if self.state_roots.is_empty() {
            return None;
        }
        let len = self.state_roots.len() as u64;
        if slot >= self.slot || self.slot.as_u64().saturating_sub(slot.as_u64()) > len {
            return None;
        }
        Some(self.state_roots[(slot.as_u64() % len) as usize])
    }

    pub fn set_state_root(&mut self, slot: Slot, root: Hash256) {
        let len = self.state_roots.len() as u64;
        self.state_roots[(slot.as_u64() % len) as usize] = root;
    }

    pub fn get_randao_mix(&self, epoch: Epoch) -> Option<Hash256> {
        let len = self.randao_mixes.len() as u64;
        if len == 0 {
            return None;
        }
        self.randao_mixes.get((epoch.as_u64() % len) as usize).copied()
    }

    pub fn update_randao_mix(&mut self, epoch: Epoch, mix: Hash256) {
        let len = self.randao_mixes.len() as u64;
        let index = (epoch.as_u64() % len) as usize;
        self.randao_mixes[index] = mix;
    }

    /// Sum of effective balances of all active validators at `epoch`.
    pub fn active_balance(&self, epoch: Epoch, effective_balance_increment: u64) -> u64 {
        let total: u64 = self
            .validators
            .iter()
            .filter(|v| v.is_active_at(epoch))
            .map(|v| v.effective_balance)
            .sum();
        total.max(effective_balance_increment)
    }

    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<u64> {
        self.validators
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active_at(epoch))
            .map(|(i, _)| i as u64)
            .collect()
    }

    pub fn is_justified(&self, bit: u8) -> bool {
        self.justification_bits & (1 << bit) != 0
    }

    pub fn set_justified(&mut self, bit: u8) {
        self.justification_bits |= 1 << bit;
    }

    /// Shifts the bitfield up by one epoch and clears the newly-vacated low bit, as done at the
    /// start of each epoch transition before the current epoch's justification is (re-)computed.
    pub fn shift_justification_bits(&mut self) {
        self.justification_bits = (self.justification_bits << 1) & 0b1111;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PublicKeyBytes;

    fn state_with_roots(len: usize) -> BeaconState {
        BeaconState {
            genesis_time: 0,
            genesis_validators_root: Hash256::zero(),
            slot: Slot::new(len as u64),
            fork: Default::default(),
            latest_block_header: BeaconBlockHeader {
                slot: Slot::new(0),
                proposer_index: 0,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body_root: Hash256::zero(),
            },
            block_roots: vec![Hash256::zero(); len],
            state_roots: vec![Hash256::zero(); len],
            historical_roots: vec![],
            eth1_data: Eth1Data::default(),
            eth1_data_votes: vec![],
            eth1_deposit_index: 0,
            validators: vec![],
            balances: vec![],
            randao_mixes: vec![Hash256::zero(); len],
            previous_epoch_attestations: vec![],
            current_epoch_attestations: vec![],
            slashings: vec![0; len],
            justification_bits: 0,
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
        }
    }

    #[test]
    fn block_root_round_trip() {
        let mut state = state_with_roots(8);
        let root = Hash256::from_slice(&[7; 32]);
        state.set_block_root(Slot::new(3), root);
        assert_eq!(state.get_block_root(Slot::new(3)), Some(root));
    }

    #[test]
    fn block_root_out_of_range_is_none() {
        let state = state_with_roots(8);
        assert_eq!(state.get_block_root(state.slot), None);
        assert_eq!(state.get_block_root(Slot::new(0)), None);
    }

    #[test]
    fn active_balance_filters_inactive_validators() {
        let mut state = state_with_roots(1);
        state.validators = vec![
            Validator {
                pubkey: PublicKeyBytes::empty(),
                withdrawal_credentials: Hash256::zero(),
                effective_balance: 32_000_000_000,
                slashed: false,
                activation_eligibility_epoch: Epoch::new(0),
                activation_epoch: Epoch::new(0),
                exit_epoch: crate::validator::FAR_FUTURE_EPOCH,
                withdrawable_epoch: crate::validator::FAR_FUTURE_EPOCH,
            },
            Validator {
                pubkey: PublicKeyBytes::empty(),
                withdrawal_credentials: Hash256::zero(),
                effective_balance: 32_000_000_000,
                slashed: false,
                activation_eligibility_epoch: Epoch::new(0),
                activation_epoch: Epoch::new(0),
                exit_epoch: Epoch::new(0),
                withdrawable_epoch: Epoch::new(0),
            },
        ];
        assert_eq!(state.active_balance(Epoch::new(0), 1_000_000_000), 32_000_000_000);
    }
}

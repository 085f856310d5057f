use crate::{Epoch, Hash256, PublicKeyBytes};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// `FAR_FUTURE_EPOCH`: sentinel for validator fields that have not yet been set.
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::max_value();

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash,
)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    /// Whether the validator counts toward the active balance at `epoch`.
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    pub fn is_exited_at(&self, epoch: Epoch) -> bool {
        self.exit_epoch <= epoch
    }

    pub fn is_withdrawable_at(&self, epoch: Epoch) -> bool {
        self.withdrawable_epoch <= epoch
    }

    pub fn is_slashable_at(&self, epoch: Epoch) -> bool {
        !self.slashed && self.activation_epoch <= epoch && epoch < self.withdrawable_epoch
    }

    /// Whether the validator is ready to be queued for activation: its full deposit has landed
    /// (`effective_balance` has reached the cap) and it hasn't already been queued.
    pub fn is_eligible_for_activation_queue(&self, spec: &crate::ChainSpec) -> bool {
        self.activation_eligibility_epoch == FAR_FUTURE_EPOCH
            && self.effective_balance == spec.max_effective_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator {
            pubkey: PublicKeyBytes::empty(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(0),
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    #[test]
    fn active_range() {
        let v = validator();
        assert!(v.is_active_at(Epoch::new(0)));
        assert!(v.is_active_at(Epoch::new(1000)));
        assert!(!v.is_exited_at(Epoch::new(1000)));
    }

    #[test]
    fn slashable_until_withdrawable() {
        let mut v = validator();
        assert!(v.is_slashable_at(Epoch::new(5)));
        v.slashed = true;
        assert!(!v.is_slashable_at(Epoch::new(5)));
    }
}

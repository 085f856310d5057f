use crate::Epoch;
use serde_derive::{Deserialize, Serialize};

/// Network-wide tunables consumed by the core (§6 of the design spec).
///
/// Unlike `EthSpec`, these are runtime values (they may differ between mainnet/testnets without
/// a recompile), so they are plain fields on a struct built once at node startup and threaded
/// through every call, never read from a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub max_effective_balance: u64,
    pub effective_balance_increment: u64,
    pub min_validator_withdrawability_delay: Epoch,
    pub safe_slots_to_update_justified: u64,
    pub slots_per_archived_point: u64,
    pub init_sync_block_cache_size: usize,
    pub init_sync_no_verify: bool,
    pub min_attestation_inclusion_delay: u64,
    pub max_attester_slashings: usize,
    pub max_proposer_slashings: usize,
    pub max_attestations: usize,
    pub max_deposits: usize,
    pub max_voluntary_exits: usize,
    pub min_slashing_penalty_quotient: u64,
    pub proportional_slashing_multiplier: u64,
    pub base_reward_factor: u64,
    pub base_rewards_per_epoch: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,
    pub min_epochs_to_inactivity_penalty: u64,
    pub ejection_balance: u64,
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,
    pub max_seed_lookahead: u64,
}

impl ChainSpec {
    pub fn mainnet() -> Self {
        Self {
            max_effective_balance: 32_000_000_000,
            effective_balance_increment: 1_000_000_000,
            min_validator_withdrawability_delay: Epoch::new(256),
            safe_slots_to_update_justified: 8,
            slots_per_archived_point: 2048, // 64 epochs at 32 slots/epoch.
            init_sync_block_cache_size: 64, // 2 * SLOTS_PER_EPOCH.
            init_sync_no_verify: false,
            min_attestation_inclusion_delay: 1,
            max_attester_slashings: 2,
            max_proposer_slashings: 16,
            max_attestations: 128,
            max_deposits: 16,
            max_voluntary_exits: 16,
            min_slashing_penalty_quotient: 128,
            proportional_slashing_multiplier: 3,
            base_reward_factor: 64,
            base_rewards_per_epoch: 4,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 1 << 26,
            min_epochs_to_inactivity_penalty: 4,
            ejection_balance: 16_000_000_000,
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65536,
            max_seed_lookahead: 4,
        }
    }

    /// A spec tuned for fast-running tests: short epochs, small caps.
    pub fn minimal() -> Self {
        Self {
            max_effective_balance: 32_000_000_000,
            effective_balance_increment: 1_000_000_000,
            min_validator_withdrawability_delay: Epoch::new(256),
            safe_slots_to_update_justified: 2,
            slots_per_archived_point: 32, // 4 epochs at 8 slots/epoch.
            init_sync_block_cache_size: 16,
            init_sync_no_verify: false,
            min_attestation_inclusion_delay: 1,
            max_attester_slashings: 2,
            max_proposer_slashings: 16,
            max_attestations: 128,
            max_deposits: 16,
            max_voluntary_exits: 16,
            min_slashing_penalty_quotient: 128,
            proportional_slashing_multiplier: 3,
            base_reward_factor: 64,
            base_rewards_per_epoch: 4,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 1 << 26,
            min_epochs_to_inactivity_penalty: 4,
            ejection_balance: 16_000_000_000,
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65536,
            max_seed_lookahead: 4,
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

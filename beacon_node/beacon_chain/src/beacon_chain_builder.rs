//! Deterministic, interop-style genesis construction: no eth1 deposit contract is watched (out of
//! scope per §1), so a fixed number of validators are deposited directly into a freshly-built
//! state. There is no real BLS here, so "signing" a deposit is just filling its `pubkey` with a
//! per-validator-index byte pattern; `process_deposit` never checks the signature or the proof.

use crate::beacon_chain::BeaconChain;
use crate::chain_config::ChainConfig;
use slog::Logger;
use state_processing::genesis::initialize_beacon_state_from_eth1;
use std::sync::Arc;
use store::KeyValueStore;
use types::{BeaconBlock, BeaconBlockBody, BeaconState, ChainSpec, Deposit, DepositData, Eth1Data, EthSpec, Hash256, PublicKeyBytes, SignatureBytes};

enum BuildStrategy {
    FromGenesis { genesis_state: Box<BeaconState>, genesis_block: Box<BeaconBlock> },
}

pub struct BeaconChainBuilder<E> {
    build_strategy: BuildStrategy,
    spec: ChainSpec,
    config: ChainConfig,
    log: Logger,
    _phantom: std::marker::PhantomData<E>,
}

impl<E: EthSpec> BeaconChainBuilder<E> {
    /// Deterministic interop genesis: `validator_count` validators each deposited at
    /// `spec.max_effective_balance`, activated immediately (per
    /// `initialize_beacon_state_from_eth1`'s genesis-only activation rule).
    pub fn quick_start(genesis_time: u64, validator_count: usize, spec: ChainSpec, config: ChainConfig, log: Logger) -> Self {
        let genesis_state = interop_genesis_state::<E>(validator_count, genesis_time, &spec);
        Self::from_genesis_state(genesis_state, spec, config, log)
    }

    fn from_genesis_state(genesis_state: BeaconState, spec: ChainSpec, config: ChainConfig, log: Logger) -> Self {
        let genesis_block = genesis_block(&genesis_state);
        Self {
            build_strategy: BuildStrategy::FromGenesis {
                genesis_block: Box::new(genesis_block),
                genesis_state: Box::new(genesis_state),
            },
            spec,
            config,
            log,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn build<S: KeyValueStore>(self, store: Arc<S>) -> Result<BeaconChain<S, E>, crate::BeaconChainError> {
        let BuildStrategy::FromGenesis { genesis_block, genesis_state } = self.build_strategy;
        BeaconChain::from_genesis(
            store,
            genesis_state.as_ref().clone(),
            genesis_block.as_ref().clone(),
            self.spec,
            self.config,
            self.log,
        )
    }
}

fn genesis_block(genesis_state: &BeaconState) -> BeaconBlock {
    BeaconBlock {
        slot: genesis_state.slot,
        proposer_index: 0,
        parent_root: Hash256::zero(),
        state_root: Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(genesis_state)[..]),
        body: BeaconBlockBody::empty(genesis_state.eth1_data.clone()),
    }
}

/// Builds a genesis state the same way interop testnets do: no real eth1 chain, a fixed
/// validator count, each validator's pubkey a deterministic per-index byte pattern.
fn interop_genesis_state<E: EthSpec>(validator_count: usize, genesis_time: u64, spec: &ChainSpec) -> BeaconState {
    let eth1_block_hash = Hash256::from_slice(&[0x42; 32]);
    let amount = spec.max_effective_balance;

    let deposits: Vec<Deposit> = (0..validator_count)
        .map(|index| {
            let mut pubkey_bytes = [0u8; 48];
            pubkey_bytes[..8].copy_from_slice(&(index as u64).to_le_bytes());
            Deposit {
                proof: vec![],
                data: DepositData {
                    pubkey: PublicKeyBytes::from_bytes(&pubkey_bytes).expect("48-byte array is a valid pubkey"),
                    withdrawal_credentials: Hash256::from_slice(&[index as u8; 32]),
                    amount,
                    signature: SignatureBytes::empty(),
                },
            }
        })
        .collect();

    let mut state = initialize_beacon_state_from_eth1::<E>(eth1_block_hash, genesis_time, &deposits, spec);
    state.genesis_time = genesis_time;
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;
    use types::MinimalEthSpec;

    type TestE = MinimalEthSpec;

    #[test]
    fn quick_start_produces_requested_validator_count() {
        let spec = ChainSpec::minimal();
        let builder = BeaconChainBuilder::<TestE>::quick_start(42, 16, spec, ChainConfig::default(), test_logger());
        let chain = builder.build(Arc::new(MemoryStore::default())).unwrap();
        assert_eq!(chain.head_state().validators.len(), 16);
        assert_eq!(chain.head_slot(), types::Slot::new(0));
    }

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }
}

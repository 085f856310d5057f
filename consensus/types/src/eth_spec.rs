use crate::ChainSpec;
use serde_derive::{Deserialize, Serialize};
use std::fmt::Debug;

/// Compile-time network parameters.
///
/// The teacher's `EthSpec` trait encodes these as `typenum` associated types so that SSZ vector
/// lengths are checked at compile time; this core only needs the numeric values (it never
/// constructs bounded SSZ vectors directly), so they are plain associated `fn`s instead.
pub trait EthSpec: 'static + Default + Sync + Send + Clone + Debug + PartialEq {
    fn default_spec() -> ChainSpec;

    fn slots_per_epoch() -> u64;
    fn slots_per_historical_root() -> u64;
    fn epochs_per_historical_vector() -> u64;
    fn epochs_per_slashings_vector() -> u64;

    fn genesis_epoch() -> crate::Epoch {
        crate::Epoch::new(0)
    }

    /// Length, in slots, of the rolling window `process_eth1_data` counts votes over.
    fn slots_per_eth1_voting_period() -> u64 {
        Self::slots_per_epoch() * 64
    }
}

/// The full mainnet network parameters.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MainnetEthSpec;

impl EthSpec for MainnetEthSpec {
    fn default_spec() -> ChainSpec {
        ChainSpec::mainnet()
    }

    fn slots_per_epoch() -> u64 {
        32
    }

    fn slots_per_historical_root() -> u64 {
        8192
    }

    fn epochs_per_historical_vector() -> u64 {
        65536
    }

    fn epochs_per_slashings_vector() -> u64 {
        8192
    }
}

/// A small-constant spec used in unit/integration tests, mirroring the teacher's
/// `MinimalEthSpec`.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MinimalEthSpec;

impl EthSpec for MinimalEthSpec {
    fn default_spec() -> ChainSpec {
        ChainSpec::minimal()
    }

    fn slots_per_epoch() -> u64 {
        8
    }

    fn slots_per_historical_root() -> u64 {
        64
    }

    fn epochs_per_historical_vector() -> u64 {
        64
    }

    fn epochs_per_slashings_vector() -> u64 {
        64
    }
}

//! Block processing, fork choice and head tracking for a single beacon node: the pipeline that
//! turns a `SignedBeaconBlock` into an updated canonical head.

mod attestation_processor;
mod beacon_chain;
mod beacon_chain_builder;
mod chain_config;
mod errors;
mod events;
mod fork_choice_store;
mod head_tracker;
mod naive_aggregation_pool;

pub use crate::beacon_chain::{trusted_verifier, BeaconChain, CommitteesFn};
pub use attestation_processor::AttestationProcessor;
pub use beacon_chain_builder::BeaconChainBuilder;
pub use chain_config::ChainConfig;
pub use errors::BeaconChainError;
pub use events::{EventHandler, EventKind};
pub use fork_choice_store::BeaconForkChoiceStore;
pub use head_tracker::HeadTracker;
pub use naive_aggregation_pool::NaiveAggregationPool;

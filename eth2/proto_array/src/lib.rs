//! The proto-array: an append-only forest of every block seen since the last finalized block,
//! weighted by LMD-GHOST votes, used to pick the chain head in O(depth).
//!
//! `ProtoArray` (in `proto_array.rs`) is the bare data structure and its tree-walking
//! invariants; `ProtoArrayForkChoice` here wraps it with the vote map and balance vector that
//! turn attestations into weight deltas.

mod error;
mod proto_array;
mod ssz_container;

pub use error::Error;
pub use proto_array::{ProtoArray, ProtoNode};
pub use ssz_container::SszContainer;

use serde_derive::{Deserialize, Serialize};
use ssz::{Decode, Encode};
use ssz_derive::{Decode as SszDeriveDecode, Encode as SszDeriveEncode};
use std::collections::HashMap;
use types::{Epoch, Hash256, Slot};

/// Input to `ProtoArrayForkChoice::process_block`. Distinct from the internal `ProtoNode`: a
/// caller only ever supplies these fields, never `weight`/`best_child`/`best_descendant`, which
/// are this crate's own bookkeeping.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Block {
    pub slot: Slot,
    pub root: Hash256,
    pub parent_root: Option<Hash256>,
    pub target_root: Hash256,
    pub state_root: Hash256,
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
}

/// A validator's most recent and pending LMD-GHOST vote. `next_epoch` only ever moves forward:
/// an attestation with a target epoch no later than the validator's current vote is ignored.
#[derive(Clone, Copy, PartialEq, Debug, Default, SszDeriveEncode, SszDeriveDecode, Serialize, Deserialize)]
pub struct VoteTracker {
    pub current_root: Hash256,
    pub next_root: Hash256,
    pub next_epoch: Epoch,
}

/// A `Vec` that grows on demand, filling new slots with `T::default()`, so a vote or balance can
/// be recorded for a validator index before every lower index has been touched.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ElasticList<T>(pub Vec<T>);

impl<T> ElasticList<T>
where
    T: Default + Clone,
{
    fn grow(&mut self, index: usize) {
        if self.0.len() <= index {
            self.0.resize(index + 1, T::default());
        }
    }

    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.grow(index);
        &mut self.0[index]
    }
}

/// Computes the per-node weight deltas to apply for this round: for every validator whose vote
/// changed (new target root) or whose effective balance changed since the last call, remove its
/// balance from the subtree under its old vote and add it under the new one.
///
/// Equivalent to the phase0 fork-choice spec's `compute_deltas`.
pub fn compute_deltas(
    indices: &HashMap<Hash256, usize>,
    votes: &mut ElasticList<VoteTracker>,
    old_balances: &[u64],
    new_balances: &[u64],
) -> Result<Vec<i64>, Error> {
    let mut deltas = vec![0_i64; indices.len()];

    for val_index in 0..votes.0.len() {
        let vote = votes.0[val_index];

        let old_balance = old_balances.get(val_index).copied().unwrap_or(0);
        let new_balance = new_balances.get(val_index).copied().unwrap_or(0);

        if vote.current_root == vote.next_root && old_balance == new_balance {
            continue;
        }

        if vote.current_root != Hash256::zero() {
            if let Some(&index) = indices.get(&vote.current_root) {
                let delta = deltas.get_mut(index).ok_or(Error::InvalidNodeDelta(index))?;
                *delta -= old_balance as i64;
            }
        }

        if vote.next_root != Hash256::zero() {
            if let Some(&index) = indices.get(&vote.next_root) {
                let delta = deltas.get_mut(index).ok_or(Error::InvalidNodeDelta(index))?;
                *delta += new_balance as i64;
            }
        }

        votes.0[val_index].current_root = vote.next_root;
    }

    Ok(deltas)
}

/// Owns the block DAG, the per-validator vote map, and the balance vector those votes are
/// weighted by. The only entry points a caller needs: `process_block`, `process_attestation` and
/// `find_head`.
pub struct ProtoArrayForkChoice {
    pub(crate) proto_array: ProtoArray,
    pub(crate) votes: ElasticList<VoteTracker>,
    pub(crate) balances: Vec<u64>,
}

impl ProtoArrayForkChoice {
    pub fn new(
        finalized_block_slot: Slot,
        finalized_block_state_root: Hash256,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
        finalized_root: Hash256,
    ) -> Result<Self, String> {
        let mut proto_array = ProtoArray {
            prune_threshold: 0,
            justified_epoch,
            finalized_epoch,
            nodes: vec![],
            indices: HashMap::new(),
        };

        proto_array
            .on_new_block(
                finalized_block_slot,
                finalized_root,
                None,
                Hash256::zero(),
                finalized_block_state_root,
                justified_epoch,
                finalized_epoch,
            )
            .map_err(String::from)?;

        Ok(Self {
            proto_array,
            votes: ElasticList::default(),
            balances: vec![],
        })
    }

    /// Registers a new block with the DAG. Does not itself apply any vote weight; a block is
    /// immediately eligible to be considered the head (with weight 0) even before any
    /// attestation has landed for it.
    pub fn process_block(&mut self, block: Block) -> Result<(), String> {
        if block.parent_root.is_some() && !self.contains_block(&block.parent_root.unwrap()) {
            return Err(Error::ParentUnknown(block.root).into());
        }

        self.proto_array
            .on_new_block(
                block.slot,
                block.root,
                block.parent_root,
                block.target_root,
                block.state_root,
                block.justified_epoch,
                block.finalized_epoch,
            )
            .map_err(String::from)
    }

    /// Updates `validator_index`'s vote to `block_root` if `target_epoch` is newer than the
    /// validator's current pending vote. Votes only take effect on the next `find_head` call.
    pub fn process_attestation(
        &mut self,
        validator_index: usize,
        block_root: Hash256,
        target_epoch: Epoch,
    ) -> Result<(), String> {
        let vote = self.votes.get_mut(validator_index);

        if target_epoch > vote.next_epoch || *vote == VoteTracker::default() {
            vote.next_root = block_root;
            vote.next_epoch = target_epoch;
        }

        Ok(())
    }

    /// Applies this round's weight deltas and returns the root of the best descendant of the
    /// justified checkpoint's block.
    pub fn find_head(
        &mut self,
        justified_epoch: Epoch,
        justified_root: Hash256,
        finalized_epoch: Epoch,
        justified_balances: &[u64],
    ) -> Result<Hash256, String> {
        let deltas = compute_deltas(
            &self.proto_array.indices,
            &mut self.votes,
            &self.balances,
            justified_balances,
        )
        .map_err(String::from)?;

        self.balances = justified_balances.to_vec();

        self.proto_array
            .apply_score_changes(deltas, justified_epoch, finalized_epoch)
            .map_err(String::from)?;

        self.proto_array.find_head(&justified_root).map_err(String::from)
    }

    pub fn maybe_prune(&mut self, finalized_root: Hash256) -> Result<(), String> {
        self.proto_array.maybe_prune(finalized_root).map_err(String::from)
    }

    pub fn contains_block(&self, root: &Hash256) -> bool {
        self.proto_array.indices.contains_key(root)
    }

    pub fn get_block(&self, root: &Hash256) -> Option<Block> {
        let index = *self.proto_array.indices.get(root)?;
        let node = self.proto_array.nodes.get(index)?;
        Some(Block {
            slot: node.slot,
            root: node.root,
            parent_root: node.parent.and_then(|i| self.proto_array.nodes.get(i)).map(|p| p.root),
            target_root: node.target_root,
            state_root: node.state_root,
            justified_epoch: node.justified_epoch,
            finalized_epoch: node.finalized_epoch,
        })
    }

    /// The block root a validator's latest-processed vote points at, and the epoch it targets.
    pub fn latest_message(&self, validator_index: usize) -> Option<(Hash256, Epoch)> {
        self.votes
            .0
            .get(validator_index)
            .filter(|v| v.next_root != Hash256::zero())
            .map(|v| (v.next_root, v.next_epoch))
    }

    pub fn set_prune_threshold(&mut self, prune_threshold: usize) {
        self.proto_array.prune_threshold = prune_threshold;
    }

    pub fn len(&self) -> usize {
        self.proto_array.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proto_array.nodes.is_empty()
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        SszContainer::from(self).as_ssz_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        SszContainer::from_ssz_bytes(bytes)
            .map_err(|e| format!("failed to decode SszContainer: {:?}", e))
            .map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> Hash256 {
        Hash256::from_slice(&[byte; 32])
    }

    fn setup() -> ProtoArrayForkChoice {
        ProtoArrayForkChoice::new(Slot::new(0), hash(0), Epoch::new(0), Epoch::new(0), hash(0)).unwrap()
    }

    #[test]
    fn genesis_is_its_own_head() {
        let mut fc = setup();
        let head = fc.find_head(Epoch::new(0), hash(0), Epoch::new(0), &[]).unwrap();
        assert_eq!(head, hash(0));
    }

    #[test]
    fn heavier_branch_wins() {
        let mut fc = setup();
        fc.process_block(Block {
            slot: Slot::new(1),
            root: hash(1),
            parent_root: Some(hash(0)),
            target_root: hash(1),
            state_root: hash(1),
            justified_epoch: Epoch::new(0),
            finalized_epoch: Epoch::new(0),
        })
        .unwrap();
        fc.process_block(Block {
            slot: Slot::new(1),
            root: hash(2),
            parent_root: Some(hash(0)),
            target_root: hash(2),
            state_root: hash(2),
            justified_epoch: Epoch::new(0),
            finalized_epoch: Epoch::new(0),
        })
        .unwrap();

        fc.process_attestation(0, hash(1), Epoch::new(1)).unwrap();
        fc.process_attestation(1, hash(2), Epoch::new(1)).unwrap();
        fc.process_attestation(2, hash(2), Epoch::new(1)).unwrap();

        let balances = vec![1, 1, 1];
        let head = fc.find_head(Epoch::new(0), hash(0), Epoch::new(0), &balances).unwrap();
        assert_eq!(head, hash(2));
    }

    #[test]
    fn prune_drops_non_descendants() {
        let mut fc = setup();
        fc.set_prune_threshold(0);
        fc.process_block(Block {
            slot: Slot::new(1),
            root: hash(1),
            parent_root: Some(hash(0)),
            target_root: hash(1),
            state_root: hash(1),
            justified_epoch: Epoch::new(0),
            finalized_epoch: Epoch::new(0),
        })
        .unwrap();

        assert!(fc.contains_block(&hash(0)));
        fc.maybe_prune(hash(1)).unwrap();
        assert!(!fc.contains_block(&hash(0)));
        assert!(fc.contains_block(&hash(1)));
    }
}

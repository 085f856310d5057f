use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use std::collections::HashMap;
use types::{Epoch, Hash256, Slot};

/// One node per block seen since the last finalized block. `target_root`/`state_root` are not
/// needed by the LMD-GHOST algorithm itself; they are carried so that `ProtoArrayForkChoice::get_block`
/// can hand a full `Block` back out without a second lookup elsewhere.
#[derive(Clone, PartialEq, Debug, Encode, Decode, Serialize, Deserialize)]
pub struct ProtoNode {
    pub slot: Slot,
    pub root: Hash256,
    pub parent: Option<usize>,
    pub target_root: Hash256,
    pub state_root: Hash256,
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    pub weight: i64,
    pub best_child: Option<usize>,
    pub best_descendant: Option<usize>,
}

#[derive(PartialEq, Serialize, Deserialize)]
pub struct ProtoArray {
    /// Do not attempt to prune the tree unless it has at least this many nodes. Small prunes
    /// simply waste time.
    pub prune_threshold: usize,
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    pub nodes: Vec<ProtoNode>,
    pub indices: HashMap<Hash256, usize>,
}

impl ProtoArray {
    /// Iterate backwards through the array, touching every node and its parent. The structure of
    /// `self.nodes` guarantees a node's children are always touched before the node itself, so a
    /// single backward pass both applies this round's deltas and rolls them up to the root.
    pub fn apply_score_changes(
        &mut self,
        mut deltas: Vec<i64>,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> Result<(), Error> {
        if deltas.len() != self.indices.len() {
            return Err(Error::InvalidDeltaLen {
                deltas: deltas.len(),
                indices: self.indices.len(),
            });
        }

        if justified_epoch != self.justified_epoch || finalized_epoch != self.finalized_epoch {
            self.justified_epoch = justified_epoch;
            self.finalized_epoch = finalized_epoch;
        }

        for node_index in (0..self.nodes.len()).rev() {
            let node = self
                .nodes
                .get_mut(node_index)
                .ok_or(Error::InvalidNodeIndex(node_index))?;

            // The zero hash aliases genesis; it has no parent and is always chosen, so its
            // weight is never consulted.
            if node.root == Hash256::zero() {
                continue;
            }

            let node_delta = deltas
                .get(node_index)
                .copied()
                .ok_or(Error::InvalidNodeDelta(node_index))?;

            node.weight = node
                .weight
                .checked_add(node_delta)
                .ok_or(Error::DeltaOverflow(node_index))?;

            if let Some(parent_index) = node.parent {
                let parent_delta = deltas
                    .get_mut(parent_index)
                    .ok_or(Error::InvalidParentDelta(parent_index))?;

                *parent_delta += node_delta;

                self.maybe_update_best_child_and_descendant(parent_index, node_index)?;
            }
        }

        Ok(())
    }

    /// Register a new block. Only the genesis block may be registered with `parent_opt == None`.
    pub fn on_new_block(
        &mut self,
        slot: Slot,
        root: Hash256,
        parent_opt: Option<Hash256>,
        target_root: Hash256,
        state_root: Hash256,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> Result<(), Error> {
        let node_index = self.nodes.len();

        let node = ProtoNode {
            slot,
            root,
            parent: parent_opt.and_then(|parent| self.indices.get(&parent).copied()),
            target_root,
            state_root,
            justified_epoch,
            finalized_epoch,
            weight: 0,
            best_child: None,
            best_descendant: None,
        };

        self.indices.insert(node.root, node_index);
        self.nodes.push(node.clone());

        if let Some(parent_index) = node.parent {
            self.maybe_update_best_child_and_descendant(parent_index, node_index)?;
        }

        Ok(())
    }

    /// Follows best-descendant links from the justified node to find the head.
    ///
    /// Only accurate immediately after `apply_score_changes`; `on_new_block` alone does not walk
    /// back up the tree to refresh best-descendant links above the new node.
    pub fn find_head(&self, justified_root: &Hash256) -> Result<Hash256, Error> {
        let justified_index = self
            .indices
            .get(justified_root)
            .copied()
            .ok_or(Error::JustifiedNodeUnknown(*justified_root))?;

        let justified_node = self
            .nodes
            .get(justified_index)
            .ok_or(Error::InvalidJustifiedIndex(justified_index))?;

        let best_descendant_index = justified_node.best_descendant.unwrap_or(justified_index);

        let best_node = self
            .nodes
            .get(best_descendant_index)
            .ok_or(Error::InvalidBestDescendant(best_descendant_index))?;

        if !self.node_is_viable_for_head(best_node) {
            return Err(Error::InvalidBestNode {
                justified_epoch: self.justified_epoch,
                finalized_epoch: self.finalized_epoch,
                node_justified_epoch: justified_node.justified_epoch,
                node_finalized_epoch: justified_node.finalized_epoch,
            });
        }

        Ok(best_node.root)
    }

    /// Drops every node preceding `finalized_root` and re-bases all indices, but only once the
    /// tree has grown past `prune_threshold` — small prunes cost more than they save.
    pub fn maybe_prune(&mut self, finalized_root: Hash256) -> Result<(), Error> {
        let finalized_index = *self
            .indices
            .get(&finalized_root)
            .ok_or(Error::FinalizedNodeUnknown(finalized_root))?;

        if finalized_index < self.prune_threshold {
            return Ok(());
        }

        for node_index in 0..finalized_index {
            let root = &self
                .nodes
                .get(node_index)
                .ok_or(Error::InvalidNodeIndex(node_index))?
                .root;
            self.indices.remove(root);
        }

        self.nodes = self.nodes.split_off(finalized_index);

        for index in self.indices.values_mut() {
            *index = index
                .checked_sub(finalized_index)
                .ok_or(Error::IndexOverflow("indices"))?;
        }

        for node in self.nodes.iter_mut() {
            if let Some(parent) = node.parent {
                node.parent = parent.checked_sub(finalized_index);
            }
            if let Some(best_child) = node.best_child {
                node.best_child = Some(
                    best_child
                        .checked_sub(finalized_index)
                        .ok_or(Error::IndexOverflow("best_child"))?,
                );
            }
            if let Some(best_descendant) = node.best_descendant {
                node.best_descendant = Some(
                    best_descendant
                        .checked_sub(finalized_index)
                        .ok_or(Error::IndexOverflow("best_descendant"))?,
                );
            }
        }

        Ok(())
    }

    /// Observes the child at `child_index` with respect to its parent and potentially updates
    /// the parent's `best_child`/`best_descendant`. Four outcomes: the current best child is no
    /// longer viable and is dropped; it is reaffirmed (refreshing its best-descendant); the new
    /// child displaces it; or nothing changes.
    fn maybe_update_best_child_and_descendant(
        &mut self,
        parent_index: usize,
        child_index: usize,
    ) -> Result<(), Error> {
        let child = self
            .nodes
            .get(child_index)
            .ok_or(Error::InvalidNodeIndex(child_index))?;
        let parent = self
            .nodes
            .get(parent_index)
            .ok_or(Error::InvalidNodeIndex(parent_index))?;

        let child_leads_to_viable_head = self.node_leads_to_viable_head(child)?;

        let change_to_none = (None, None);
        let change_to_child = (Some(child_index), child.best_descendant.or(Some(child_index)));
        let no_change = (parent.best_child, parent.best_descendant);

        let (new_best_child, new_best_descendant) = if let Some(best_child_index) = parent.best_child
        {
            if best_child_index == child_index && !child_leads_to_viable_head {
                change_to_none
            } else if best_child_index == child_index {
                change_to_child
            } else {
                let best_child = self
                    .nodes
                    .get(best_child_index)
                    .ok_or(Error::InvalidBestDescendant(best_child_index))?;
                let best_child_leads_to_viable_head = self.node_leads_to_viable_head(best_child)?;

                if child_leads_to_viable_head && !best_child_leads_to_viable_head {
                    change_to_child
                } else if !child_leads_to_viable_head && best_child_leads_to_viable_head {
                    no_change
                } else if child.weight == best_child.weight {
                    if child.root >= best_child.root {
                        change_to_child
                    } else {
                        no_change
                    }
                } else if child.weight >= best_child.weight {
                    change_to_child
                } else {
                    no_change
                }
            }
        } else if child_leads_to_viable_head {
            change_to_child
        } else {
            no_change
        };

        let parent = self
            .nodes
            .get_mut(parent_index)
            .ok_or(Error::InvalidNodeIndex(parent_index))?;
        parent.best_child = new_best_child;
        parent.best_descendant = new_best_descendant;

        Ok(())
    }

    /// True if the node itself, or its best descendant, is viable for the head.
    fn node_leads_to_viable_head(&self, node: &ProtoNode) -> Result<bool, Error> {
        let best_descendant_is_viable = if let Some(best_descendant_index) = node.best_descendant {
            let best_descendant = self
                .nodes
                .get(best_descendant_index)
                .ok_or(Error::InvalidBestDescendant(best_descendant_index))?;
            self.node_is_viable_for_head(best_descendant)
        } else {
            false
        };

        Ok(best_descendant_is_viable || self.node_is_viable_for_head(node))
    }

    /// The `filter_block_tree` condition: a node whose justified/finalized epoch diverges from
    /// the store's is never viable for the head, even if it is the heaviest.
    fn node_is_viable_for_head(&self, node: &ProtoNode) -> bool {
        (node.justified_epoch == self.justified_epoch || self.justified_epoch == Epoch::new(0))
            && (node.finalized_epoch == self.finalized_epoch || self.finalized_epoch == Epoch::new(0))
    }
}

//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>> with weak parents.

use crate::node::{Node, NodeId};
use crate::reward::Reward;
use std::fmt::Debug;
use uct_core::{Result, UctError};

/// Arena-allocated MCTS tree.
///
/// Nodes are stored in a contiguous vector and referenced by index.
/// The tree only grows; nodes are dropped together when it is cleared.
#[derive(Debug)]
pub struct Tree<S, A, R> {
    nodes: Vec<Node<S, A, R>>,
}

/// Shape statistics for a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub root_visits: u64,
    pub max_depth: u32,
}

impl<S, A, R> Tree<S, A, R>
where
    A: Clone + PartialEq + Debug,
    R: Reward,
{
    /// Create a new tree holding only a root for `root_state`.
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![Node::root(root_state)],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node<S, A, R> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S, A, R> {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node<S, A, R> {
        self.get(NodeId::ROOT)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// Attach a new child for `action` under `parent`.
    ///
    /// # Errors
    /// Returns `UctError::DuplicateChild` if `action` is already expanded there.
    pub fn add_child(&mut self, parent: NodeId, action: A, state: S) -> Result<NodeId> {
        let parent_node = self.get(parent);
        if parent_node.child_for(&action).is_some() {
            return Err(UctError::DuplicateChild {
                parent: parent.0,
                action: format!("{action:?}"),
            });
        }

        let depth = parent_node.depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::child(state, action.clone(), parent, depth));
        self.get_mut(parent).children.push((action, id));
        Ok(id)
    }

    /// Walk from `from` to the root, counting a visit and recording `update`
    /// at every node on the way.
    pub fn backup(&mut self, from: NodeId, update: f64) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.reward.record(update, node.visits);
            current = node.parent;
        }
    }

    /// Iterate from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.parent(current))
    }

    /// Iterate over every node id in allocation order (root first).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Discard every node and start over from a fresh root.
    pub fn clear(&mut self, root_state: S) {
        self.nodes.clear();
        self.nodes.push(Node::root(root_state));
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction on.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.nodes.len(),
            root_visits: self.root().visits,
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

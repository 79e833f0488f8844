//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices for parent/child links, so the tree has
//! no ownership cycles and no Rc/RefCell overhead.

use crate::reward::Reward;
use std::fmt;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Ids are stable for the lifetime of the tree because nodes are never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the MCTS tree.
///
/// Each node represents one explored state, reachable from the root by a
/// unique action sequence.
#[derive(Clone, Debug)]
pub struct Node<S, A, R> {
    /// State at this node. Never changes after creation.
    pub state: S,

    /// Action that led to this node (None for root).
    pub action: Option<A>,

    /// Number of completed iterations whose path passed through this node.
    pub visits: u64,

    /// Accumulated reward. Only backup mutates it.
    pub reward: R,

    /// Children: (action, node_id) pairs, in expansion order.
    pub children: Vec<(A, NodeId)>,

    /// Parent node (None for root).
    pub parent: Option<NodeId>,

    /// Distance from the root.
    pub depth: u32,
}

impl<S, A: PartialEq + Clone, R: Reward> Node<S, A, R> {
    /// Create the root node.
    pub fn root(state: S) -> Self {
        Self {
            state,
            action: None,
            visits: 0,
            reward: R::default(),
            children: Vec::new(),
            parent: None,
            depth: 0,
        }
    }

    /// Create a child node hanging off `parent`.
    pub(crate) fn child(state: S, action: A, parent: NodeId, depth: u32) -> Self {
        Self {
            state,
            action: Some(action),
            visits: 0,
            reward: R::default(),
            children: Vec::new(),
            parent: Some(parent),
            depth,
        }
    }

    /// True until the first child is attached.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Look up the child reached by `action`.
    pub fn child_for(&self, action: &A) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, id)| *id)
    }

    /// Legal actions that have not been expanded yet, in `legal` order.
    pub fn untried_actions(&self, legal: &[A]) -> Vec<A> {
        legal
            .iter()
            .filter(|a| self.child_for(a).is_none())
            .cloned()
            .collect()
    }

    pub fn has_untried_actions(&self, legal: &[A]) -> bool {
        legal.iter().any(|a| self.child_for(a).is_none())
    }
}

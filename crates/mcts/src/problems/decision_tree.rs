//! Complete binary decision tree with fixed leaf values.
//!
//! ```text
//!            root
//!          /      \
//!       Left      Right
//!       /  \      /  \
//!   leaf0 leaf1 leaf2 leaf3
//! ```
//!
//! The leaf index is the path read as a binary number, `Left = 0`.

use std::fmt;
use uct_core::{Problem, Result, UctError};

/// One binary choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    Left,
    Right,
}

impl Branch {
    fn bit(self) -> usize {
        match self {
            Branch::Left => 0,
            Branch::Right => 1,
        }
    }
}

/// Position in the tree: the choices taken so far, packed as bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    bits: usize,
    depth: u32,
}

impl Path {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Leaf index once the path is complete.
    pub fn index(&self) -> usize {
        self.bits
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in (0..self.depth).rev() {
            let c = if (self.bits >> level) & 1 == 0 { 'L' } else { 'R' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Binary decision problem of fixed depth.
#[derive(Clone, Debug)]
pub struct DecisionTree {
    depth: u32,
    leaf_values: Vec<f64>,
}

impl DecisionTree {
    /// # Errors
    /// Returns `UctError::InvalidConfig` unless there are exactly `2^depth`
    /// leaf values.
    pub fn new(depth: u32, leaf_values: Vec<f64>) -> Result<Self> {
        let expected = 1usize
            .checked_shl(depth)
            .ok_or_else(|| UctError::InvalidConfig(format!("depth {depth} is too large")))?;
        if leaf_values.len() != expected {
            return Err(UctError::InvalidConfig(format!(
                "a tree of depth {depth} needs {expected} leaf values, got {}",
                leaf_values.len()
            )));
        }
        Ok(Self { depth, leaf_values })
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn leaf_values(&self) -> &[f64] {
        &self.leaf_values
    }
}

impl Problem for DecisionTree {
    type State = Path;
    type Action = Branch;

    fn initial_state(&self) -> Path {
        Path::default()
    }

    fn possible_actions(&self, state: &Path) -> Vec<Branch> {
        if self.is_terminal(state) {
            Vec::new()
        } else {
            vec![Branch::Left, Branch::Right]
        }
    }

    fn apply_action(&self, state: &Path, action: &Branch) -> Option<Path> {
        if self.is_terminal(state) {
            return None;
        }
        Some(Path {
            bits: (state.bits << 1) | action.bit(),
            depth: state.depth + 1,
        })
    }

    fn is_terminal(&self, state: &Path) -> bool {
        state.depth >= self.depth
    }

    fn evaluate_terminal(&self, state: &Path) -> f64 {
        self.leaf_values[state.bits]
    }
}

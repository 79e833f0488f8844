//! Reference problems for validating and benchmarking the search.
//!
//! - [`DecisionTree`]: binary choices with known leaf values, small enough to
//!   reason about exactly
//! - [`SubsetSelection`]: 0/1 knapsack, a combinatorial optimisation problem
//!   with a computable optimum

pub mod decision_tree;
pub mod subset;

pub use decision_tree::{Branch, DecisionTree, Path};
pub use subset::{Item, SubsetSelection, SubsetState};

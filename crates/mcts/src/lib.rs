//! Generic Monte Carlo Tree Search (UCT).
//!
//! This crate provides a problem-agnostic MCTS engine that can be used with
//! any search problem implementing the `uct_core::Problem` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Problem` implementation
//! - **Pluggable bandits**: UCB1 and the Pedroso-Rei normalised bound
//! - **Pluggable rewards**: scalar running mean or a full running distribution
//! - **Termination criteria**: iteration count or wall-clock budget
//! - **Deterministic**: all randomness flows through one caller-supplied RNG
//!
//! # Example
//!
//! ```
//! use uct_mcts::problems::{Branch, DecisionTree};
//! use uct_mcts::{IterationBudget, Mcts, MctsConfig, Ucb1, UctSearch};
//! use uct_core::Problem;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let problem = DecisionTree::new(2, vec![10.0, 0.0, 0.0, 0.0]).unwrap();
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut mcts: UctSearch<DecisionTree, _> =
//!     Mcts::ucb1(MctsConfig::default(), Ucb1::default(), rng).unwrap();
//!
//! let mut budget = IterationBudget::new(500);
//! let result = mcts.search(&problem, problem.initial_state(), &mut budget).unwrap();
//! assert_eq!(result.iterations, 500);
//! assert_eq!(result.best_action, Some(Branch::Left));
//! ```

pub mod bandit;
pub mod config;
mod node;
pub mod policy;
pub mod problems;
pub mod reward;
pub mod search;
pub mod termination;
mod tree;

pub use bandit::{Bandit, PedrosoRei, SimulationBounds, Ucb1, NEUTRAL_SCORE};
pub use config::{InitialBounds, MctsConfig};
pub use node::{Node, NodeId};
pub use policy::{ExpansionOrder, RolloutPolicy, TieBreak, UniformRollout};
pub use reward::{Distribution, MeanReward, Reward, Statistic};
pub use search::{
    ChildSummary, Incumbent, Iteration, Mcts, PedrosoReiSearch, SearchResult, UctSearch,
};
pub use termination::{Budget, BudgetSpec, IterationBudget, TerminationCriterion, TimeBudget};
pub use tree::{Tree, TreeStats};

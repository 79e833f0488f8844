use std::fmt::Debug;
use std::hash::Hash;

/// A search problem for the MCTS kernel.
///
/// This trait is the only thing the engine knows about the domain. It is
/// deliberately small: a transition system with a terminal evaluation.
/// Single-agent optimisation problems (subset selection, scheduling, ...)
/// map onto it directly.
pub trait Problem {
    /// A point in the state space
    type State: Clone;

    /// A transition label. Must be unique among the legal actions of a state.
    type Action: Clone + Eq + Hash + Debug;

    /// Returns the state a search starts from when the caller has none
    fn initial_state(&self) -> Self::State;

    /// Returns all legal actions from the given state.
    ///
    /// May only be empty when `is_terminal(state)` holds.
    fn possible_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning the successor state.
    ///
    /// Returning `None` for an action that came from `possible_actions` is a
    /// contract violation and aborts the search.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Option<Self::State>;

    /// Returns true once no further actions should be taken
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Scores a terminal state. This is the update value backed up the tree.
    fn evaluate_terminal(&self, state: &Self::State) -> f64;
}

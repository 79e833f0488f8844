//! UCT Core - problem abstraction and shared types
//!
//! This crate provides the [`Problem`] trait that a state space must
//! implement to be searched by `uct-mcts`, plus the error type every crate
//! in the workspace reports through.
//!
//! # Types
//!
//! - [`Problem`] - Transition system with a terminal evaluation
//! - [`Objective`] - Whether terminal evaluations are maximised or minimised
//! - [`UctError`] - Contract violations and configuration errors

mod error;
mod problem;
mod types;

pub use error::{Result, UctError};
pub use problem::Problem;
pub use types::Objective;

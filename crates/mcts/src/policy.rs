//! Action-selection strategies used outside the bandit formula.
//!
//! - [`RolloutPolicy`]: picks moves during simulation (default policy)
//! - [`TieBreak`]: resolves equal bandit scores during selection
//! - [`ExpansionOrder`]: picks which untried action a frontier node expands

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Action-selection strategy for rollouts.
///
/// Returning `None` while `actions` is non-empty is a contract violation and
/// aborts the search with `UctError::NoActionSelected`.
pub trait RolloutPolicy<A> {
    fn select(&mut self, actions: &[A], rng: &mut dyn RngCore) -> Option<A>;
}

impl<A, F> RolloutPolicy<A> for F
where
    F: FnMut(&[A], &mut dyn RngCore) -> Option<A>,
{
    fn select(&mut self, actions: &[A], rng: &mut dyn RngCore) -> Option<A> {
        self(actions, rng)
    }
}

/// Uniformly random rollouts using the search's generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRollout;

impl<A: Clone> RolloutPolicy<A> for UniformRollout {
    fn select(&mut self, actions: &[A], rng: &mut dyn RngCore) -> Option<A> {
        actions.choose(rng).cloned()
    }
}

/// How equal selection scores are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First maximum in children order.
    #[default]
    First,
    /// Uniformly random among all maxima.
    Random,
}

/// Which untried action a frontier node expands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionOrder {
    /// Uniformly random among untried actions.
    #[default]
    Random,
    /// First untried action in legal-action order.
    InOrder,
}

impl ExpansionOrder {
    /// Remove and return the action to expand.
    pub(crate) fn pick<A, R: Rng + ?Sized>(self, untried: &mut Vec<A>, rng: &mut R) -> Option<A> {
        if untried.is_empty() {
            return None;
        }
        let idx = match self {
            ExpansionOrder::Random => rng.gen_range(0..untried.len()),
            ExpansionOrder::InOrder => 0,
        };
        Some(untried.swap_remove(idx))
    }
}

impl TieBreak {
    /// Return the item with the highest score.
    ///
    /// NaN scores never beat a real score. The generator is only consulted
    /// when `Random` actually faces a tie.
    pub(crate) fn argmax<T, R, I>(self, scored: I, rng: &mut R) -> Option<T>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut best: Vec<T> = Vec::new();
        let mut best_score = f64::NEG_INFINITY;

        for (item, score) in scored {
            if best.is_empty() || score > best_score || (best_score.is_nan() && !score.is_nan()) {
                best.clear();
                best.push(item);
                best_score = score;
            } else if score == best_score && self == TieBreak::Random {
                best.push(item);
            }
        }

        if best.len() > 1 {
            let idx = rng.gen_range(0..best.len());
            Some(best.swap_remove(idx))
        } else {
            best.pop()
        }
    }
}

//! Subset selection (0/1 knapsack).
//!
//! A state is the set of items chosen so far. Items are added in increasing
//! index order, so every subset is reached by exactly one path. An item is a
//! legal action only if its index is above the last chosen one and it still
//! fits the remaining capacity. A state is terminal once nothing else fits;
//! its evaluation is the total value of the chosen items.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uct_core::{Problem, Result, UctError};

/// One selectable item.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub weight: u64,
    pub value: f64,
}

/// Items chosen so far, plus running totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubsetState {
    chosen: Vec<usize>,
    weight: u64,
    value: f64,
}

impl SubsetState {
    /// Chosen item indices in increasing order.
    pub fn chosen(&self) -> &[usize] {
        &self.chosen
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    fn next_index(&self) -> usize {
        self.chosen.last().map_or(0, |&last| last + 1)
    }
}

/// A knapsack instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubsetSelection {
    items: Vec<Item>,
    capacity: u64,
}

impl SubsetSelection {
    /// # Errors
    /// Returns `UctError::InvalidConfig` if any item value is negative or
    /// not finite.
    pub fn new(items: Vec<Item>, capacity: u64) -> Result<Self> {
        if let Some((i, item)) = items
            .iter()
            .enumerate()
            .find(|(_, item)| !item.value.is_finite() || item.value < 0.0)
        {
            return Err(UctError::InvalidConfig(format!(
                "item {i} has invalid value {}",
                item.value
            )));
        }
        Ok(Self { items, capacity })
    }

    /// Random instance with `n` items, weights and values drawn from `1..=100`,
    /// and a capacity of `capacity_ratio` times the total weight.
    pub fn random<R: Rng + ?Sized>(n: usize, capacity_ratio: f64, rng: &mut R) -> Self {
        let items: Vec<Item> = (0..n)
            .map(|_| Item {
                weight: rng.gen_range(1..=100),
                value: f64::from(rng.gen_range(1u32..=100)),
            })
            .collect();
        let total: u64 = items.iter().map(|i| i.weight).sum();
        let capacity = (total as f64 * capacity_ratio.clamp(0.0, 1.0)).floor() as u64;
        Self { items, capacity }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Best achievable total value, by dynamic programming over capacity.
    ///
    /// Runs in `O(items * capacity)` time and `O(capacity)` memory, so it is
    /// only meant for small instances.
    pub fn optimum(&self) -> f64 {
        let cap = self.capacity as usize;
        let mut best = vec![0.0_f64; cap + 1];
        for item in &self.items {
            let w = item.weight as usize;
            if w > cap {
                continue;
            }
            for c in (w..=cap).rev() {
                let with = best[c - w] + item.value;
                if with > best[c] {
                    best[c] = with;
                }
            }
        }
        best[cap]
    }

    fn fits(&self, state: &SubsetState, index: usize) -> bool {
        self.items
            .get(index)
            .map_or(false, |item| state.weight + item.weight <= self.capacity)
    }
}

impl Problem for SubsetSelection {
    type State = SubsetState;
    type Action = usize;

    fn initial_state(&self) -> SubsetState {
        SubsetState::default()
    }

    fn possible_actions(&self, state: &SubsetState) -> Vec<usize> {
        (state.next_index()..self.items.len())
            .filter(|&i| self.fits(state, i))
            .collect()
    }

    fn apply_action(&self, state: &SubsetState, action: &usize) -> Option<SubsetState> {
        let index = *action;
        if index < state.next_index() || !self.fits(state, index) {
            return None;
        }
        let item = self.items[index];
        let mut next = state.clone();
        next.chosen.push(index);
        next.weight += item.weight;
        next.value += item.value;
        Some(next)
    }

    fn is_terminal(&self, state: &SubsetState) -> bool {
        !(state.next_index()..self.items.len()).any(|i| self.fits(state, i))
    }

    fn evaluate_terminal(&self, state: &SubsetState) -> f64 {
        state.value
    }
}

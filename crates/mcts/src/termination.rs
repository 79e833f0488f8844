//! Termination criteria for the search loop.
//!
//! The loop checks the criterion **before** every iteration, so a budget
//! that is already exhausted at `init()` performs no iterations at all.

use crate::reward::Reward;
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Decides whether the search should run another iteration.
pub trait TerminationCriterion {
    /// Called once by `search` before the first budget check.
    fn init(&mut self);

    /// True while another iteration may start.
    fn within_budget<S, A, R>(&mut self, tree: &Tree<S, A, R>) -> bool
    where
        A: Clone + PartialEq + Debug,
        R: Reward;
}

/// Stop once the root has been visited `threshold` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationBudget {
    threshold: u64,
}

impl IterationBudget {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl TerminationCriterion for IterationBudget {
    fn init(&mut self) {}

    fn within_budget<S, A, R>(&mut self, tree: &Tree<S, A, R>) -> bool
    where
        A: Clone + PartialEq + Debug,
        R: Reward,
    {
        tree.root().visits < self.threshold
    }
}

/// Stop once a wall-clock budget has elapsed since `init()`.
///
/// One clock read per check; a run may overrun by one iteration.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    budget: Duration,
    started: Option<Instant>,
}

impl TimeBudget {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time since `init()`, zero before it.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

impl TerminationCriterion for TimeBudget {
    fn init(&mut self) {
        self.started = Some(Instant::now());
    }

    fn within_budget<S, A, R>(&mut self, _tree: &Tree<S, A, R>) -> bool
    where
        A: Clone + PartialEq + Debug,
        R: Reward,
    {
        // A criterion that was never initialised starts its clock on first use
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() < self.budget
    }
}

/// Budget specification that can be chosen at runtime, e.g. from a CLI flag
/// or a config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSpec {
    Iterations(u64),
    Millis(u64),
}

impl BudgetSpec {
    pub fn build(self) -> Budget {
        match self {
            BudgetSpec::Iterations(n) => Budget::Iterations(IterationBudget::new(n)),
            BudgetSpec::Millis(ms) => Budget::Time(TimeBudget::from_millis(ms)),
        }
    }
}

/// Either built-in criterion.
#[derive(Clone, Copy, Debug)]
pub enum Budget {
    Iterations(IterationBudget),
    Time(TimeBudget),
}

impl TerminationCriterion for Budget {
    fn init(&mut self) {
        match self {
            Budget::Iterations(b) => b.init(),
            Budget::Time(b) => b.init(),
        }
    }

    fn within_budget<S, A, R>(&mut self, tree: &Tree<S, A, R>) -> bool
    where
        A: Clone + PartialEq + Debug,
        R: Reward,
    {
        match self {
            Budget::Iterations(b) => b.within_budget(tree),
            Budget::Time(b) => b.within_budget(tree),
        }
    }
}

//! MCTS configuration parameters.
//!
//! Exploration constants belong to the bandit value ([`crate::Ucb1`],
//! [`crate::PedrosoRei`]); this struct holds everything else a run needs.

use crate::policy::{ExpansionOrder, TieBreak};
use serde::{Deserialize, Serialize};
use uct_core::{Objective, Result, UctError};

/// Known best and worst terminal values used to seed a run's bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialBounds {
    pub best: f64,
    pub worst: f64,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Whether terminal evaluations are maximised or minimised.
    pub objective: Objective,

    /// How equal bandit scores are resolved during selection.
    pub tie_break: TieBreak,

    /// Which untried action a frontier node expands.
    pub expansion_order: ExpansionOrder,

    /// Maximum number of rollout steps before the run fails.
    /// `None` lets rollouts run until a terminal state.
    pub max_rollout_depth: Option<usize>,

    /// Seed values for the run's best/worst simulation bounds.
    /// `None` starts empty; the first simulation sets both ends.
    pub initial_bounds: Option<InitialBounds>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Maximize,
            tie_break: TieBreak::First,
            expansion_order: ExpansionOrder::Random,
            max_rollout_depth: None,
            initial_bounds: None,
        }
    }
}

impl MctsConfig {
    /// Config for a minimisation problem.
    pub fn minimize() -> Self {
        Self {
            objective: Objective::Minimize,
            ..Default::default()
        }
    }

    /// Builder pattern: set the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Builder pattern: set the tie-break rule.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Builder pattern: set the expansion order.
    pub fn with_expansion_order(mut self, order: ExpansionOrder) -> Self {
        self.expansion_order = order;
        self
    }

    /// Builder pattern: cap rollout length.
    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = Some(depth);
        self
    }

    /// Builder pattern: seed the simulation bounds.
    pub fn with_initial_bounds(mut self, best: f64, worst: f64) -> Self {
        self.initial_bounds = Some(InitialBounds { best, worst });
        self
    }

    /// Check the config before a run.
    ///
    /// # Errors
    /// Returns `UctError::InvalidConfig` for a zero rollout cap, non-finite
    /// initial bounds, or initial bounds ordered against the objective.
    pub fn validate(&self) -> Result<()> {
        if self.max_rollout_depth == Some(0) {
            return Err(UctError::InvalidConfig(
                "max_rollout_depth must be at least 1".to_string(),
            ));
        }

        if let Some(InitialBounds { best, worst }) = self.initial_bounds {
            if !best.is_finite() || !worst.is_finite() {
                return Err(UctError::InvalidConfig(format!(
                    "initial bounds must be finite, got best={best} worst={worst}"
                )));
            }
            if self.objective.improves(worst, best) {
                return Err(UctError::InvalidConfig(format!(
                    "initial worst {worst} is better than initial best {best} when we {}",
                    self.objective
                )));
            }
        }

        Ok(())
    }
}

//! Bandit functions used by the tree policy.
//!
//! A bandit scores a child for selection given its parent's visit count and
//! the run's [`SimulationBounds`]. Unvisited children always score
//! `f64::INFINITY` so every arm is pulled once before comparisons matter.
//!
//! Two formulas are provided:
//! - [`Ucb1`]: `x + C * sqrt(2 ln N / n)`
//! - [`PedrosoRei`]: rewards normalised against the best and worst
//!   simulation seen so far, then the same exploration term

use crate::node::Node;
use crate::reward::{Reward, Statistic};
use serde::{Deserialize, Serialize};
use uct_core::{Objective, Result, UctError};

/// Normalised value used while the bounds cannot tell rewards apart.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Best and worst terminal evaluations observed during one search run.
///
/// Owned by the search, folded in by backup before the tree is updated and
/// read by every score computation of the same run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationBounds {
    objective: Objective,
    best: Option<f64>,
    worst: Option<f64>,
}

impl SimulationBounds {
    /// Empty bounds; the first observation sets both ends.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            best: None,
            worst: None,
        }
    }

    /// Bounds seeded with known best and worst values.
    pub fn with_initial(objective: Objective, best: f64, worst: f64) -> Self {
        Self {
            objective,
            best: Some(best),
            worst: Some(worst),
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn best(&self) -> Option<f64> {
        self.best
    }

    pub fn worst(&self) -> Option<f64> {
        self.worst
    }

    /// Fold a terminal evaluation into the bounds. Non-finite values are ignored.
    pub fn observe(&mut self, update: f64) {
        if !update.is_finite() {
            return;
        }
        let objective = self.objective;
        self.best = Some(self.best.map_or(update, |b| objective.best_of(b, update)));
        self.worst = Some(self.worst.map_or(update, |w| objective.worst_of(w, update)));
    }

    /// Map `value` into `[0, 1]`, 1 being the best simulation seen.
    ///
    /// Returns [`NEUTRAL_SCORE`] while the bounds are unset, equal or
    /// non-finite.
    pub fn normalize(&self, value: f64) -> f64 {
        let (Some(best), Some(worst)) = (self.best, self.worst) else {
            return NEUTRAL_SCORE;
        };
        let spread = best - worst;
        if spread == 0.0 || !spread.is_finite() || !value.is_finite() {
            return NEUTRAL_SCORE;
        }
        ((value - worst) / spread).clamp(0.0, 1.0)
    }
}

/// Scoring rule for the tree policy and the final recommendation.
pub trait Bandit<R: Reward> {
    /// Selection score of `child` under a parent visited `parent_visits` times.
    fn score<S, A>(&self, child: &Node<S, A, R>, parent_visits: u64, bounds: &SimulationBounds)
        -> f64;

    /// Exploitation part of the score only, larger is better.
    fn exploitation<S, A>(&self, child: &Node<S, A, R>, bounds: &SimulationBounds) -> f64;
}

/// `sqrt(2 ln N / n)`; the caller handles `n == 0`.
fn exploration_term(parent_visits: u64, child_visits: u64) -> f64 {
    let parent = (parent_visits.max(1)) as f64;
    (2.0 * parent.ln() / child_visits as f64).sqrt()
}

fn check_coefficient(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(UctError::InvalidConfig(format!(
            "{name} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Standard UCB1.
///
/// `score = x + C * sqrt(2 ln N / n)` where `x` is the configured statistic of
/// the child's reward, oriented so that larger is better.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ucb1 {
    /// Exploration constant `C`.
    pub exploration: f64,
    /// Statistic used as the exploitation term.
    pub statistic: Statistic,
}

impl Default for Ucb1 {
    fn default() -> Self {
        Self {
            exploration: 1.0,
            statistic: Statistic::Mean,
        }
    }
}

impl Ucb1 {
    /// # Errors
    /// Returns `UctError::InvalidConfig` for a negative or non-finite constant.
    pub fn new(exploration: f64) -> Result<Self> {
        check_coefficient("exploration constant", exploration)?;
        Ok(Self {
            exploration,
            ..Default::default()
        })
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }
}

impl<R: Reward> Bandit<R> for Ucb1 {
    fn score<S, A>(
        &self,
        child: &Node<S, A, R>,
        parent_visits: u64,
        bounds: &SimulationBounds,
    ) -> f64 {
        if child.visits == 0 {
            return f64::INFINITY;
        }
        self.exploitation(child, bounds)
            + self.exploration * exploration_term(parent_visits, child.visits)
    }

    fn exploitation<S, A>(&self, child: &Node<S, A, R>, bounds: &SimulationBounds) -> f64 {
        bounds
            .objective()
            .orient(child.reward.statistic(self.statistic))
    }
}

/// UCT variant of Pedroso and Rei.
///
/// Rewards are normalised into `[0, 1]` against the best and worst
/// simulations of the run, which makes the exploration constant independent
/// of the problem's value scale:
///
/// `score = (x - worst) / (best - worst) + balance * Cp * sqrt(2 ln N / n)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PedrosoRei {
    /// Exploration coefficient `Cp`.
    pub exploration: f64,
    /// Search-balance coefficient scaling the exploration term.
    pub balance: f64,
    pub statistic: Statistic,
}

impl Default for PedrosoRei {
    fn default() -> Self {
        Self {
            exploration: std::f64::consts::FRAC_1_SQRT_2,
            balance: 1.0,
            statistic: Statistic::Mean,
        }
    }
}

impl PedrosoRei {
    /// # Errors
    /// Returns `UctError::InvalidConfig` for negative or non-finite coefficients.
    pub fn new(exploration: f64, balance: f64) -> Result<Self> {
        check_coefficient("exploration coefficient", exploration)?;
        check_coefficient("balance coefficient", balance)?;
        Ok(Self {
            exploration,
            balance,
            statistic: Statistic::Mean,
        })
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }
}

impl<R: Reward> Bandit<R> for PedrosoRei {
    fn score<S, A>(
        &self,
        child: &Node<S, A, R>,
        parent_visits: u64,
        bounds: &SimulationBounds,
    ) -> f64 {
        if child.visits == 0 {
            return f64::INFINITY;
        }
        self.exploitation(child, bounds)
            + self.balance * self.exploration * exploration_term(parent_visits, child.visits)
    }

    fn exploitation<S, A>(&self, child: &Node<S, A, R>, bounds: &SimulationBounds) -> f64 {
        bounds.normalize(child.reward.statistic(self.statistic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::reward::{Distribution, MeanReward};

    fn visited<R: Reward>(samples: &[f64]) -> Node<(), u8, R> {
        let mut node: Node<(), u8, R> = Node::child((), 0, NodeId::ROOT, 1);
        for &x in samples {
            node.visits += 1;
            node.reward.record(x, node.visits);
        }
        node
    }

    #[test]
    fn test_unvisited_child_scores_infinity() {
        let node: Node<(), u8, MeanReward> = visited(&[]);
        let bounds = SimulationBounds::new(Objective::Maximize);
        assert_eq!(Ucb1::default().score(&node, 10, &bounds), f64::INFINITY);
        assert_eq!(PedrosoRei::default().score(&node, 10, &bounds), f64::INFINITY);
    }

    #[test]
    fn test_ucb1_formula() {
        let node: Node<(), u8, MeanReward> = visited(&[1.0, 0.0]);
        let bounds = SimulationBounds::new(Objective::Maximize);
        let ucb = Ucb1::new(2.0).unwrap();

        let expected = 0.5 + 2.0 * (2.0 * 10f64.ln() / 2.0).sqrt();
        assert!((ucb.score(&node, 10, &bounds) - expected).abs() < 1e-12);
        assert!((ucb.exploitation(&node, &bounds) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ucb1_orients_for_minimization() {
        let node: Node<(), u8, MeanReward> = visited(&[3.0]);
        let bounds = SimulationBounds::new(Objective::Minimize);
        assert_eq!(Ucb1::default().exploitation(&node, &bounds), -3.0);
    }

    #[test]
    fn test_ucb1_with_distribution_statistic() {
        let node: Node<(), u8, Distribution> = visited(&[1.0, 5.0]);
        let bounds = SimulationBounds::new(Objective::Maximize);
        let ucb = Ucb1::default().with_statistic(Statistic::Max);
        assert_eq!(ucb.exploitation(&node, &bounds), 5.0);
    }

    #[test]
    fn test_rejects_bad_coefficients() {
        assert!(Ucb1::new(-1.0).is_err());
        assert!(Ucb1::new(f64::NAN).is_err());
        assert!(PedrosoRei::new(0.5, f64::INFINITY).is_err());
        assert!(PedrosoRei::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_bounds_track_objective() {
        let mut max = SimulationBounds::new(Objective::Maximize);
        let mut min = SimulationBounds::new(Objective::Minimize);
        for x in [3.0, -1.0, 7.0] {
            max.observe(x);
            min.observe(x);
        }
        assert_eq!((max.best(), max.worst()), (Some(7.0), Some(-1.0)));
        assert_eq!((min.best(), min.worst()), (Some(-1.0), Some(7.0)));
    }

    #[test]
    fn test_bounds_ignore_non_finite_updates() {
        let mut bounds = SimulationBounds::new(Objective::Maximize);
        bounds.observe(f64::NAN);
        assert_eq!((bounds.best(), bounds.worst()), (None, None));

        bounds.observe(1.0);
        bounds.observe(f64::INFINITY);
        bounds.observe(4.0);
        assert_eq!((bounds.best(), bounds.worst()), (Some(4.0), Some(1.0)));
        assert!((bounds.normalize(2.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize() {
        let mut bounds = SimulationBounds::new(Objective::Maximize);
        assert_eq!(bounds.normalize(4.0), NEUTRAL_SCORE);

        bounds.observe(2.0);
        // best == worst: no spread to normalise against
        assert_eq!(bounds.normalize(2.0), NEUTRAL_SCORE);

        bounds.observe(6.0);
        assert!((bounds.normalize(3.0) - 0.25).abs() < 1e-12);
        assert_eq!(bounds.normalize(100.0), 1.0);
    }

    #[test]
    fn test_normalize_minimization_prefers_low_values() {
        let bounds = SimulationBounds::with_initial(Objective::Minimize, 0.0, 10.0);
        assert_eq!(bounds.normalize(0.0), 1.0);
        assert_eq!(bounds.normalize(10.0), 0.0);
        assert!((bounds.normalize(2.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_pedroso_rei_degenerate_bounds_do_not_divide_by_zero() {
        let node: Node<(), u8, Distribution> = visited(&[5.0, 5.0]);
        let bounds = SimulationBounds::with_initial(Objective::Maximize, 5.0, 5.0);
        let bandit = PedrosoRei::new(1.0, 1.0).unwrap();

        let score = bandit.score(&node, 4, &bounds);
        assert!(score.is_finite());
        let expected = NEUTRAL_SCORE + (2.0 * 4f64.ln() / 2.0).sqrt();
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pedroso_rei_formula() {
        let node: Node<(), u8, MeanReward> = visited(&[8.0]);
        let bounds = SimulationBounds::with_initial(Objective::Maximize, 10.0, 0.0);
        let bandit = PedrosoRei::new(0.5, 2.0).unwrap();

        let expected = 0.8 + 2.0 * 0.5 * (2.0 * 3f64.ln()).sqrt();
        assert!((bandit.score(&node, 3, &bounds) - expected).abs() < 1e-12);
    }
}

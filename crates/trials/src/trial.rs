//! Independent seeded search trials and their aggregate statistics.

use anyhow::Result;
use clap::ValueEnum;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uct_core::Problem;
use uct_mcts::{
    BudgetSpec, Distribution, Mcts, MctsConfig, PedrosoRei, PedrosoReiSearch, SearchResult, Ucb1,
    UctSearch,
};

/// Which reward/bandit pairing a trial searches with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Running-mean rewards with UCB1.
    Ucb1,
    /// Distribution rewards with the Pedroso-Rei normalised bound.
    PedrosoRei,
}

/// Everything a trial needs besides the problem and its seed.
#[derive(Clone, Debug)]
pub struct TrialSettings {
    pub config: MctsConfig,
    pub variant: Variant,
    pub budget: BudgetSpec,
    /// Overrides the bandit's default exploration constant.
    pub exploration: Option<f64>,
}

/// Outcome of one trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    pub seed: u64,
    pub iterations: u64,
    pub elapsed_ms: f64,
    pub nodes: usize,
    pub max_depth: u32,
    /// Value of the best terminal state the trial found.
    pub incumbent: Option<f64>,
    pub best_action: Option<String>,
}

/// Aggregate statistics over all trials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trials: usize,
    pub incumbent_mean: Option<f64>,
    pub incumbent_std_dev: Option<f64>,
    pub incumbent_min: Option<f64>,
    pub incumbent_max: Option<f64>,
    pub iterations_mean: Option<f64>,
    pub elapsed_ms_mean: Option<f64>,
    /// Known optimum of the instance, when it can be computed.
    pub optimum: Option<f64>,
}

impl Summary {
    pub fn from_records(records: &[TrialRecord], optimum: Option<f64>) -> Self {
        let incumbents = Distribution::from_samples(records.iter().filter_map(|r| r.incumbent));
        let iterations = Distribution::from_samples(records.iter().map(|r| r.iterations as f64));
        let elapsed = Distribution::from_samples(records.iter().map(|r| r.elapsed_ms));

        Self {
            trials: records.len(),
            incumbent_mean: incumbents.mean(),
            incumbent_std_dev: incumbents.std_dev(),
            incumbent_min: incumbents.min(),
            incumbent_max: incumbents.max(),
            iterations_mean: iterations.mean(),
            elapsed_ms_mean: elapsed.mean(),
            optimum,
        }
    }
}

/// Full report written by `run --output`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialReport {
    pub problem: String,
    pub config: MctsConfig,
    pub variant: Variant,
    pub budget: BudgetSpec,
    pub base_seed: u64,
    pub trials: Vec<TrialRecord>,
    pub summary: Summary,
}

/// Run one search from the problem's initial state.
pub fn run_trial<P: Problem>(
    problem: &P,
    settings: &TrialSettings,
    index: usize,
    seed: u64,
) -> Result<TrialRecord> {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut budget = settings.budget.build();

    let result = match settings.variant {
        Variant::Ucb1 => {
            let bandit = match settings.exploration {
                Some(c) => Ucb1::new(c)?,
                None => Ucb1::default(),
            };
            let mut mcts: UctSearch<P, _> = Mcts::ucb1(settings.config.clone(), bandit, rng)?;
            mcts.search(problem, problem.initial_state(), &mut budget)?
        }
        Variant::PedrosoRei => {
            let defaults = PedrosoRei::default();
            let bandit = PedrosoRei::new(
                settings.exploration.unwrap_or(defaults.exploration),
                defaults.balance,
            )?;
            let mut mcts: PedrosoReiSearch<P, _> =
                Mcts::pedroso_rei(settings.config.clone(), bandit, rng)?;
            mcts.search(problem, problem.initial_state(), &mut budget)?
        }
    };

    Ok(record(index, seed, result))
}

/// Run `trials` independent searches in parallel, trial `i` seeded with
/// `base_seed + i`. Records come back in trial order.
pub fn run_trials<P>(
    problem: &P,
    settings: &TrialSettings,
    trials: usize,
    base_seed: u64,
) -> Result<Vec<TrialRecord>>
where
    P: Problem + Sync,
{
    (0..trials)
        .into_par_iter()
        .map(|i| run_trial(problem, settings, i, base_seed.wrapping_add(i as u64)))
        .collect()
}

fn record<S, A: Debug>(index: usize, seed: u64, result: SearchResult<S, A>) -> TrialRecord {
    TrialRecord {
        index,
        seed,
        iterations: result.iterations,
        elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
        nodes: result.tree.nodes,
        max_depth: result.tree.max_depth,
        incumbent: result.incumbent.map(|i| i.value),
        best_action: result.best_action.map(|a| format!("{a:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uct_mcts::problems::DecisionTree;

    fn settings(variant: Variant) -> TrialSettings {
        TrialSettings {
            config: MctsConfig::default(),
            variant,
            budget: BudgetSpec::Iterations(200),
            exploration: None,
        }
    }

    fn tree() -> DecisionTree {
        DecisionTree::new(3, vec![1.0, 2.0, 3.0, 9.0, 0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_trials_are_reproducible() {
        let problem = tree();
        for variant in [Variant::Ucb1, Variant::PedrosoRei] {
            let first = run_trials(&problem, &settings(variant), 4, 10).unwrap();
            let second = run_trials(&problem, &settings(variant), 4, 10).unwrap();

            assert_eq!(first.len(), 4);
            for (a, b) in first.iter().zip(&second) {
                assert_eq!(a.index, b.index);
                assert_eq!(a.seed, 10 + a.index as u64);
                assert_eq!(a.iterations, 200);
                assert_eq!(a.nodes, b.nodes);
                assert_eq!(a.incumbent, b.incumbent);
                assert_eq!(a.best_action, b.best_action);
            }
        }
    }

    #[test]
    fn test_invalid_exploration_is_an_error() {
        let mut bad = settings(Variant::Ucb1);
        bad.exploration = Some(-1.0);
        assert!(run_trial(&tree(), &bad, 0, 0).is_err());
    }

    #[test]
    fn test_summary() {
        let records: Vec<TrialRecord> = [Some(4.0), Some(8.0), None]
            .into_iter()
            .enumerate()
            .map(|(index, incumbent)| TrialRecord {
                index,
                seed: index as u64,
                iterations: 10,
                elapsed_ms: 2.0,
                nodes: 5,
                max_depth: 2,
                incumbent,
                best_action: None,
            })
            .collect();

        let summary = Summary::from_records(&records, Some(9.0));
        assert_eq!(summary.trials, 3);
        assert_eq!(summary.incumbent_mean, Some(6.0));
        assert_eq!(summary.incumbent_std_dev, Some(2.0));
        assert_eq!(summary.incumbent_min, Some(4.0));
        assert_eq!(summary.incumbent_max, Some(8.0));
        assert_eq!(summary.iterations_mean, Some(10.0));
        assert_eq!(summary.optimum, Some(9.0));

        let empty = Summary::from_records(&[], None);
        assert_eq!(empty.trials, 0);
        assert_eq!(empty.incumbent_mean, None);
    }

    #[test]
    fn test_variant_serde() {
        let json = serde_json::to_string(&Variant::PedrosoRei).unwrap();
        assert_eq!(json, "\"pedroso-rei\"");
        let back: Variant = serde_json::from_str("\"ucb1\"").unwrap();
        assert_eq!(back, Variant::Ucb1);
    }
}

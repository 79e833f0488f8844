//! Property-based tests for the search engine.
//!
//! These tests check the tree invariants that must hold after any run:
//! - The root is visited exactly once per iteration
//! - Parent/child links and depths are consistent
//! - Node rewards summarise exactly the updates backed up through them
//! - The same seed reproduces the same run

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use uct_core::Problem;
use uct_mcts::problems::SubsetSelection;
use uct_mcts::{
    Distribution, IterationBudget, Mcts, MctsConfig, NodeId, PedrosoRei, PedrosoReiSearch,
    TieBreak, Ucb1, UctSearch,
};

/// Relative tolerance for running-average comparisons
const TOLERANCE: f64 = 1e-9;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Number of iterations (kept small for fast tests)
fn arb_iterations() -> impl Strategy<Value = u64> {
    1u64..150
}

/// Random knapsack instance with 3-9 items
fn arb_problem() -> impl Strategy<Value = SubsetSelection> {
    (arb_seed(), 3usize..10, 0.2f64..0.9).prop_map(|(seed, n, ratio)| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        SubsetSelection::random(n, ratio, &mut rng)
    })
}

fn arb_tie_break() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::First), Just(TieBreak::Random)]
}

fn uct(seed: u64, tie_break: TieBreak) -> UctSearch<SubsetSelection, ChaCha8Rng> {
    let config = MctsConfig::default().with_tie_break(tie_break);
    Mcts::ucb1(config, Ucb1::default(), ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

fn pedroso_rei(seed: u64) -> PedrosoReiSearch<SubsetSelection, ChaCha8Rng> {
    Mcts::pedroso_rei(
        MctsConfig::default(),
        PedrosoRei::default(),
        ChaCha8Rng::seed_from_u64(seed),
    )
    .unwrap()
}

/// Parent, action, depth and visits of one arena slot
type NodeShape = (Option<NodeId>, Option<usize>, u32, u64);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

// =============================================================================
// Visit accounting and tree structure
// =============================================================================

proptest! {
    /// The root is visited once per completed iteration
    #[test]
    fn prop_root_visits_equal_iterations(
        seed in arb_seed(),
        iterations in arb_iterations(),
        problem in arb_problem(),
        tie_break in arb_tie_break(),
    ) {
        let mut mcts = uct(seed, tie_break);
        let mut budget = IterationBudget::new(iterations);
        let result = mcts.search(&problem, problem.initial_state(), &mut budget).unwrap();

        prop_assert_eq!(result.iterations, iterations);
        prop_assert_eq!(result.tree.root_visits, iterations);
        prop_assert_eq!(mcts.tree().unwrap().root().visits, iterations);
    }

    /// Every child is linked from its parent, one level deeper, and never
    /// visited more often than its parent
    #[test]
    fn prop_tree_links_consistent(
        seed in arb_seed(),
        iterations in arb_iterations(),
        problem in arb_problem(),
    ) {
        let mut mcts = uct(seed, TieBreak::First);
        let mut budget = IterationBudget::new(iterations);
        mcts.search(&problem, problem.initial_state(), &mut budget).unwrap();
        let tree = mcts.tree().unwrap();

        // One node per expansion at most, and never more than iterations + root
        prop_assert!(tree.len() as u64 <= iterations + 1);

        for id in tree.ids() {
            let node = tree.get(id);
            let child_visits: u64 = node.children.iter().map(|(_, c)| tree.get(*c).visits).sum();
            prop_assert!(child_visits <= node.visits);

            match node.parent {
                None => {
                    prop_assert_eq!(id, NodeId::ROOT);
                    prop_assert_eq!(node.depth, 0);
                }
                Some(parent_id) => {
                    let parent = tree.get(parent_id);
                    let action = node.action.as_ref().unwrap();
                    prop_assert_eq!(parent.child_for(action), Some(id));
                    prop_assert_eq!(node.depth, parent.depth + 1);
                    prop_assert!(node.visits >= 1);
                    let next = problem.apply_action(&parent.state, action);
                    prop_assert_eq!(next.as_ref(), Some(&node.state));
                }
            }

            // Children are unique per action
            let mut actions: Vec<usize> = node.children.iter().map(|(a, _)| *a).collect();
            actions.sort_unstable();
            actions.dedup();
            prop_assert_eq!(actions.len(), node.children.len());
        }
    }
}

// =============================================================================
// Reward bookkeeping
// =============================================================================

proptest! {
    /// A scalar reward equals the mean of every update backed up through it
    #[test]
    fn prop_mean_reward_matches_updates(
        seed in arb_seed(),
        iterations in 1usize..120,
        problem in arb_problem(),
    ) {
        let mut mcts = uct(seed, TieBreak::First);
        let mut seen: HashMap<NodeId, (u64, f64)> = HashMap::new();

        for _ in 0..iterations {
            let step = mcts.iterate(&problem).unwrap();
            let tree = mcts.tree().unwrap();
            for id in tree.path_to_root(step.node) {
                let entry = seen.entry(id).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += step.update;
            }
        }

        let tree = mcts.tree().unwrap();
        for id in tree.ids() {
            let node = tree.get(id);
            let (count, sum) = seen.get(&id).copied().unwrap_or((0, 0.0));
            prop_assert_eq!(node.visits, count);
            if count > 0 {
                let expected = sum / count as f64;
                prop_assert!(
                    close(node.reward.value(), expected),
                    "node {} mean {} expected {}",
                    id,
                    node.reward.value(),
                    expected
                );
            }
        }
    }

    /// A distribution reward matches a direct recomputation of its samples
    #[test]
    fn prop_distribution_matches_samples(
        seed in arb_seed(),
        iterations in 1usize..120,
        problem in arb_problem(),
    ) {
        let mut mcts = pedroso_rei(seed);
        let mut samples: HashMap<NodeId, Vec<f64>> = HashMap::new();

        for _ in 0..iterations {
            let step = mcts.iterate(&problem).unwrap();
            let tree = mcts.tree().unwrap();
            for id in tree.path_to_root(step.node) {
                samples.entry(id).or_default().push(step.update);
            }
        }

        let tree = mcts.tree().unwrap();
        for (id, values) in &samples {
            let reward: &Distribution = &tree.get(*id).reward;
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(reward.count(), values.len() as u64);
            prop_assert!(close(reward.mean().unwrap(), mean));
            prop_assert!((reward.variance().unwrap() - variance).abs() <= 1e-9 * max.abs().max(1.0).powi(2));
            prop_assert_eq!(reward.min(), Some(min));
            prop_assert_eq!(reward.max(), Some(max));
        }
    }

    /// Bounds always bracket every observed terminal value
    #[test]
    fn prop_bounds_bracket_updates(
        seed in arb_seed(),
        iterations in 1usize..100,
        problem in arb_problem(),
    ) {
        let mut mcts = pedroso_rei(seed);
        for _ in 0..iterations {
            let step = mcts.iterate(&problem).unwrap();
            let bounds = mcts.bounds();
            prop_assert!(bounds.best().unwrap() >= step.update);
            prop_assert!(bounds.worst().unwrap() <= step.update);
        }

        let incumbent = mcts.incumbent().unwrap();
        prop_assert_eq!(Some(incumbent.value), mcts.bounds().best());
        for child in mcts.root_children() {
            prop_assert!((0.0..=1.0).contains(&child.value));
        }
    }
}

// =============================================================================
// Determinism
// =============================================================================

proptest! {
    /// Same seed produces an identical run
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        iterations in arb_iterations(),
        problem in arb_problem(),
        tie_break in arb_tie_break(),
    ) {
        let run = || {
            let mut mcts = uct(seed, tie_break);
            let mut budget = IterationBudget::new(iterations);
            let result = mcts.search(&problem, problem.initial_state(), &mut budget).unwrap();
            let tree = mcts.tree().unwrap();
            let shape: Vec<NodeShape> = tree
                .ids()
                .map(|id| {
                    let node = tree.get(id);
                    (node.parent, node.action, node.depth, node.visits)
                })
                .collect();
            (result.best_action, shape, mcts.root_children())
        };

        let (best1, shape1, children1) = run();
        let (best2, shape2, children2) = run();

        prop_assert_eq!(best1, best2);
        prop_assert_eq!(shape1, shape2);
        prop_assert_eq!(children1, children2);
    }
}

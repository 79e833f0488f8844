//! Monte Carlo Tree Search implementation.
//!
//! Each iteration runs the four classic phases:
//! 1. Selection: descend with the bandit until a node has untried actions
//!    or its state is terminal
//! 2. Expansion: attach exactly one child for an untried action
//! 3. Simulation: roll out with the default policy to a terminal state
//! 4. Backup: fold the terminal evaluation into every node up to the root

use crate::{
    bandit::{Bandit, PedrosoRei, SimulationBounds, Ucb1},
    config::MctsConfig,
    node::NodeId,
    policy::{ExpansionOrder, RolloutPolicy, TieBreak, UniformRollout},
    reward::{Distribution, MeanReward, Reward},
    termination::TerminationCriterion,
    tree::{Tree, TreeStats},
};
use rand::{Rng, RngCore};
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use uct_core::{Problem, Result, UctError};

/// Best terminal state evaluated during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Incumbent<S> {
    pub state: S,
    pub value: f64,
}

/// Outcome of one completed iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Iteration {
    /// Node backup started from (the new child, or the terminal frontier).
    pub node: NodeId,
    /// Terminal evaluation that was backed up.
    pub update: f64,
    /// Whether a child was attached this iteration.
    pub expanded: bool,
}

/// Per-child summary of the root after a search.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildSummary<A> {
    pub action: A,
    pub visits: u64,
    /// Exploitation value under the search's bandit (larger is better).
    pub value: f64,
}

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct SearchResult<S, A> {
    /// Action of the root child with the best exploitation value.
    /// `None` when no child of the root was ever visited.
    pub best_action: Option<A>,

    /// Number of iterations completed by this search.
    pub iterations: u64,

    /// Shape of the final tree.
    pub tree: TreeStats,

    /// Wall-clock time spent in the loop.
    pub elapsed: Duration,

    /// Best terminal state seen by any simulation.
    pub incumbent: Option<Incumbent<S>>,

    /// Final best/worst simulation bounds.
    pub bounds: SimulationBounds,
}

/// Monte Carlo Tree Search.
///
/// Generic over:
/// - `P`: The problem being searched
/// - `R`: The reward representation stored at each node
/// - `B`: The bandit formula used for selection and recommendation
/// - `D`: The default (rollout) policy
/// - `G`: The random number generator
pub struct Mcts<P: Problem, R, B, D, G> {
    config: MctsConfig,
    bandit: B,
    rollout: D,
    rng: G,
    tree: Option<Tree<P::State, P::Action, R>>,
    bounds: SimulationBounds,
    incumbent: Option<Incumbent<P::State>>,
    _problem: PhantomData<P>,
}

/// Scalar running-average rewards scored with UCB1.
pub type UctSearch<P, G> = Mcts<P, MeanReward, Ucb1, UniformRollout, G>;

/// Distribution rewards scored with the Pedroso-Rei normalisation.
pub type PedrosoReiSearch<P, G> = Mcts<P, Distribution, PedrosoRei, UniformRollout, G>;

impl<P, G> Mcts<P, MeanReward, Ucb1, UniformRollout, G>
where
    P: Problem,
    G: Rng,
{
    /// Standard UCT: scalar rewards, UCB1, uniform rollouts.
    pub fn ucb1(config: MctsConfig, bandit: Ucb1, rng: G) -> Result<Self> {
        Self::new(config, bandit, UniformRollout, rng)
    }
}

impl<P, G> Mcts<P, Distribution, PedrosoRei, UniformRollout, G>
where
    P: Problem,
    G: Rng,
{
    /// Pedroso-Rei UCT: distribution rewards, normalised bandit, uniform rollouts.
    pub fn pedroso_rei(config: MctsConfig, bandit: PedrosoRei, rng: G) -> Result<Self> {
        Self::new(config, bandit, UniformRollout, rng)
    }
}

impl<P, R, B, D, G> Mcts<P, R, B, D, G>
where
    P: Problem,
    R: Reward,
    B: Bandit<R>,
    D: RolloutPolicy<P::Action>,
    G: Rng,
{
    /// Create a new MCTS instance.
    ///
    /// # Errors
    /// Returns `UctError::InvalidConfig` if the config fails validation.
    pub fn new(config: MctsConfig, bandit: B, rollout: D, rng: G) -> Result<Self> {
        config.validate()?;
        let bounds = initial_bounds(&config);
        Ok(Self {
            config,
            bandit,
            rollout,
            rng,
            tree: None,
            bounds,
            incumbent: None,
            _problem: PhantomData,
        })
    }

    /// Swap the rollout policy, keeping everything else.
    pub fn with_rollout<D2: RolloutPolicy<P::Action>>(self, rollout: D2) -> Mcts<P, R, B, D2, G> {
        Mcts {
            config: self.config,
            bandit: self.bandit,
            rollout,
            rng: self.rng,
            tree: self.tree,
            bounds: self.bounds,
            incumbent: self.incumbent,
            _problem: PhantomData,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn bandit(&self) -> &B {
        &self.bandit
    }

    /// The tree of the current (or last) run, if any.
    pub fn tree(&self) -> Option<&Tree<P::State, P::Action, R>> {
        self.tree.as_ref()
    }

    /// Best/worst simulation bounds of the current run.
    pub fn bounds(&self) -> &SimulationBounds {
        &self.bounds
    }

    pub fn incumbent(&self) -> Option<&Incumbent<P::State>> {
        self.incumbent.as_ref()
    }

    /// Discard the tree and per-run state, starting over from `root_state`.
    pub fn reset(&mut self, root_state: P::State) {
        match &mut self.tree {
            Some(tree) => tree.clear(root_state),
            None => self.tree = Some(Tree::new(root_state)),
        }
        self.bounds = initial_bounds(&self.config);
        self.incumbent = None;
    }

    /// Run MCTS from `state` until `termination` runs out.
    ///
    /// The budget is checked before every iteration. A contract violation
    /// aborts the run; the tree keeps every iteration completed before it.
    pub fn search<T: TerminationCriterion>(
        &mut self,
        problem: &P,
        state: P::State,
        termination: &mut T,
    ) -> Result<SearchResult<P::State, P::Action>> {
        self.reset(state);
        termination.init();
        debug!(objective = %self.config.objective, "search started");

        let started = Instant::now();
        let mut iterations: u64 = 0;

        while self.within_budget(termination) {
            if let Err(err) = self.iterate(problem) {
                warn!(%err, iterations, "search aborted");
                return Err(err);
            }
            iterations += 1;
        }

        let elapsed = started.elapsed();
        let result = SearchResult {
            best_action: self.best_action(),
            iterations,
            tree: self.tree.as_ref().map(Tree::stats).unwrap_or_default(),
            elapsed,
            incumbent: self.incumbent.clone(),
            bounds: self.bounds.clone(),
        };

        debug!(
            iterations,
            nodes = result.tree.nodes,
            max_depth = result.tree.max_depth,
            elapsed_ms = elapsed.as_millis() as u64,
            best_action = ?result.best_action,
            "search finished"
        );

        Ok(result)
    }

    /// Run a single iteration: select -> expand -> simulate -> backup.
    ///
    /// Starts a tree at `problem.initial_state()` if no run is in progress.
    pub fn iterate(&mut self, problem: &P) -> Result<Iteration> {
        let Self {
            config,
            bandit,
            rollout,
            rng,
            tree,
            bounds,
            incumbent,
            ..
        } = self;
        let tree = tree.get_or_insert_with(|| Tree::new(problem.initial_state()));

        // SELECT
        let (frontier, mut untried) = select(problem, tree, bandit, bounds, config.tie_break, rng);

        // EXPAND (a terminal frontier is simulated in place)
        let expansion = expand(problem, tree, frontier, &mut untried, config.expansion_order, rng)?;

        // SIMULATE
        let start = match &expansion {
            Some((_, state)) => state.clone(),
            None => tree.get(frontier).state.clone(),
        };
        let terminal = simulate(problem, start, rollout, rng, config.max_rollout_depth)?;
        let update = problem.evaluate_terminal(&terminal);

        // The new child is attached only once its rollout has succeeded
        let (node, expanded) = match expansion {
            Some((action, state)) => (tree.add_child(frontier, action, state)?, true),
            None => (frontier, false),
        };

        let improves = !update.is_nan()
            && incumbent
                .as_ref()
                .map_or(true, |inc| config.objective.improves(update, inc.value));
        if improves {
            *incumbent = Some(Incumbent {
                state: terminal,
                value: update,
            });
        }

        // BACKUP (bounds first, so they include this update)
        bounds.observe(update);
        tree.backup(node, update);

        trace!(
            node = node.index(),
            depth = tree.get(node).depth,
            expanded,
            update,
            "iteration complete"
        );

        Ok(Iteration {
            node,
            update,
            expanded,
        })
    }

    /// Action of the visited root child with the best exploitation value.
    ///
    /// The exploration term is dropped. Ties go to the first child in
    /// expansion order.
    pub fn best_action(&self) -> Option<P::Action> {
        let tree = self.tree.as_ref()?;
        let mut best: Option<(&P::Action, f64)> = None;

        for (action, id) in &tree.root().children {
            let child = tree.get(*id);
            if child.visits == 0 {
                continue;
            }
            let value = self.bandit.exploitation(child, &self.bounds);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((action, value));
            }
        }

        best.map(|(action, _)| action.clone())
    }

    /// Visits and exploitation value of every root child, in expansion order.
    pub fn root_children(&self) -> Vec<ChildSummary<P::Action>> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        tree.root()
            .children
            .iter()
            .map(|(action, id)| {
                let child = tree.get(*id);
                ChildSummary {
                    action: action.clone(),
                    visits: child.visits,
                    value: self.bandit.exploitation(child, &self.bounds),
                }
            })
            .collect()
    }

    fn within_budget<T: TerminationCriterion>(&self, termination: &mut T) -> bool {
        self.tree
            .as_ref()
            .map_or(false, |tree| termination.within_budget(tree))
    }
}

fn initial_bounds(config: &MctsConfig) -> SimulationBounds {
    match config.initial_bounds {
        Some(b) => SimulationBounds::with_initial(config.objective, b.best, b.worst),
        None => SimulationBounds::new(config.objective),
    }
}

/// Descend from the root to the frontier.
///
/// Returns the frontier node and its untried actions; an empty list means the
/// frontier is terminal (or has neither legal actions nor children).
fn select<P, R, B, G>(
    problem: &P,
    tree: &Tree<P::State, P::Action, R>,
    bandit: &B,
    bounds: &SimulationBounds,
    tie_break: TieBreak,
    rng: &mut G,
) -> (NodeId, Vec<P::Action>)
where
    P: Problem,
    R: Reward,
    B: Bandit<R>,
    G: Rng,
{
    let mut current = NodeId::ROOT;

    loop {
        let node = tree.get(current);
        if problem.is_terminal(&node.state) {
            return (current, Vec::new());
        }

        let legal = problem.possible_actions(&node.state);
        let untried = node.untried_actions(&legal);
        if !untried.is_empty() {
            return (current, untried);
        }

        let parent_visits = node.visits;
        let scored = node
            .children
            .iter()
            .map(|(_, id)| (*id, bandit.score(tree.get(*id), parent_visits, bounds)));

        match tie_break.argmax(scored, rng) {
            Some(child) => current = child,
            None => return (current, Vec::new()),
        }
    }
}

/// Pick an untried action of `frontier` and compute its successor state.
///
/// Returns `None` when nothing is left to expand. The tree is not modified.
fn expand<P, R, G>(
    problem: &P,
    tree: &Tree<P::State, P::Action, R>,
    frontier: NodeId,
    untried: &mut Vec<P::Action>,
    order: ExpansionOrder,
    rng: &mut G,
) -> Result<Option<(P::Action, P::State)>>
where
    P: Problem,
    R: Reward,
    G: Rng,
{
    let Some(action) = order.pick(untried, rng) else {
        return Ok(None);
    };

    let state = problem
        .apply_action(&tree.get(frontier).state, &action)
        .ok_or_else(|| UctError::IllegalTransition {
            action: format!("{action:?}"),
        })?;

    Ok(Some((action, state)))
}

/// Roll `state` forward with the default policy until it is terminal.
fn simulate<P, D>(
    problem: &P,
    mut state: P::State,
    policy: &mut D,
    rng: &mut dyn RngCore,
    max_depth: Option<usize>,
) -> Result<P::State>
where
    P: Problem,
    D: RolloutPolicy<P::Action>,
{
    let mut depth = 0;

    loop {
        if problem.is_terminal(&state) {
            return Ok(state);
        }
        let actions = problem.possible_actions(&state);
        if actions.is_empty() {
            return Ok(state);
        }
        if let Some(limit) = max_depth {
            if depth >= limit {
                return Err(UctError::RolloutLimit { depth: limit });
            }
        }

        let action = policy
            .select(&actions, rng)
            .ok_or(UctError::NoActionSelected {
                offered: actions.len(),
            })?;
        state = problem
            .apply_action(&state, &action)
            .ok_or_else(|| UctError::IllegalTransition {
                action: format!("{action:?}"),
            })?;
        depth += 1;
    }
}

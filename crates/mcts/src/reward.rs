//! Reward representations stored at each tree node.
//!
//! Two representations are provided:
//! - [`MeanReward`]: a scalar running average of the updates seen
//! - [`Distribution`]: count, mean, variance (Welford), min and max

use serde::{Deserialize, Serialize};

/// Statistic used to turn a reward into an exploitation value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Sample mean.
    #[default]
    Mean,
    /// Mean plus `k` standard errors.
    UpperConfidence(f64),
    /// Mean minus `k` standard errors.
    LowerConfidence(f64),
    /// Largest sample seen.
    Max,
    /// Smallest sample seen.
    Min,
}

/// Accumulated statistic at a tree node.
///
/// `record` is only ever called by backup, with the node's visit count
/// already incremented to include the new sample.
pub trait Reward: Clone + Default + std::fmt::Debug {
    /// Fold one update into the statistic.
    fn record(&mut self, update: f64, visits: u64);

    /// Evaluate the requested statistic. Unvisited rewards evaluate to 0.0.
    fn statistic(&self, statistic: Statistic) -> f64;
}

/// Scalar running average.
///
/// Carries only its mean, so every [`Statistic`] evaluates to the mean.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanReward(f64);

impl MeanReward {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Reward for MeanReward {
    fn record(&mut self, update: f64, visits: u64) {
        debug_assert!(visits > 0, "record called before the visit was counted");
        self.0 += (update - self.0) / visits as f64;
    }

    fn statistic(&self, _statistic: Statistic) -> f64 {
        self.0
    }
}

/// Sample distribution with a numerically stable running variance.
///
/// Invariant: `m2 >= 0`. An empty distribution (`count == 0`) answers
/// `None` to every query.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for Distribution {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution {
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Build a distribution from a sequence of samples.
    pub fn from_samples<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut dist = Self::new();
        for x in samples {
            dist.push(x);
        }
        dist
    }

    /// Add one sample (Welford's update).
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        // Rounding can push m2 a hair below zero when samples are identical
        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population variance (`m2 / n`).
    pub fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }

    /// Unbiased sample variance (`m2 / (n - 1)`), defined from two samples on.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Standard error of the mean, using the sample variance.
    pub fn std_error(&self) -> Option<f64> {
        self.sample_variance()
            .map(|var| (var / self.count as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

impl Reward for Distribution {
    fn record(&mut self, update: f64, visits: u64) {
        self.push(update);
        debug_assert_eq!(self.count, visits, "distribution count drifted from visits");
    }

    fn statistic(&self, statistic: Statistic) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let se = self.std_error().unwrap_or(0.0);
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::UpperConfidence(k) => self.mean + k * se,
            Statistic::LowerConfidence(k) => self.mean - k * se,
            Statistic::Max => self.max,
            Statistic::Min => self.min,
        }
    }
}

//! Small value types shared by every crate in the workspace.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Direction of optimisation for terminal evaluations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Maximize,
    Minimize,
}

impl Objective {
    /// Map a value so that larger is always better.
    ///
    /// # Example
    /// ```
    /// use uct_core::Objective;
    ///
    /// assert_eq!(Objective::Maximize.orient(3.0), 3.0);
    /// assert_eq!(Objective::Minimize.orient(3.0), -3.0);
    /// ```
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Objective::Maximize => value,
            Objective::Minimize => -value,
        }
    }

    /// Returns true if `candidate` is strictly better than `incumbent`.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        self.compare(candidate, incumbent) == Ordering::Greater
    }

    /// Compare two values under this objective (`Greater` = `a` is better).
    ///
    /// NaN compares equal to everything so it never displaces a real value.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        self.orient(a)
            .partial_cmp(&self.orient(b))
            .unwrap_or(Ordering::Equal)
    }

    /// The better of two values.
    pub fn best_of(self, a: f64, b: f64) -> f64 {
        if self.improves(b, a) {
            b
        } else {
            a
        }
    }

    /// The worse of two values.
    pub fn worst_of(self, a: f64, b: f64) -> f64 {
        if self.improves(b, a) {
            a
        } else {
            b
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Maximize => write!(f, "maximize"),
            Objective::Minimize => write!(f, "minimize"),
        }
    }
}

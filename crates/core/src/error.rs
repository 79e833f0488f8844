use thiserror::Error;

/// Errors raised by a search run.
///
/// Every variant except `InvalidConfig` is a contract violation by the
/// problem definition or one of its policies. They abort the run and are
/// never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UctError {
    #[error("action {action} was reported legal but produced no successor state")]
    IllegalTransition { action: String },

    #[error("rollout policy selected no action out of {offered} available")]
    NoActionSelected { offered: usize },

    #[error("node {parent} already has a child for action {action}")]
    DuplicateChild { parent: usize, action: String },

    #[error("rollout did not reach a terminal state within {depth} steps")]
    RolloutLimit { depth: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UctError {
    /// Whether the error signals a broken problem contract rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, UctError::InvalidConfig(_))
    }
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, UctError>;

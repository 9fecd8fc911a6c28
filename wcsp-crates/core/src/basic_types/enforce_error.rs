use thiserror::Error;

use super::Cost;
use super::EmptyDomain;

/// The reasons why enforcing virtual arc consistency did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnforceError {
    /// The current subproblem has no solution with a cost below the upper bound.
    #[error("the subproblem cannot improve on the upper bound")]
    Contradiction,
    /// The termination condition triggered; the state was restored to the entry checkpoint.
    #[error("enforcing virtual arc consistency was interrupted")]
    Interrupted,
}

impl From<EmptyDomain> for EnforceError {
    fn from(_: EmptyDomain) -> Self {
        EnforceError::Contradiction
    }
}

/// Summary of a successful call to enforce virtual arc consistency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tightened {
    /// How much the global lower bound increased.
    pub lower_bound_increase: Cost,
    /// The number of successful lower bound increases.
    pub num_increases: usize,
}

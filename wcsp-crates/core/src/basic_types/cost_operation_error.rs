use thiserror::Error;

use super::Cost;
use crate::cost_functions::CostFunctionId;

/// Errors related to adding cost functions or moving costs around.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CostOperationError {
    #[error("costs must be non-negative, got {0}")]
    NegativeCost(Cost),
    #[error("the value {0} is not in the domain of the variable")]
    UnknownValue(i32),
    #[error("a cost table of {rows}x{columns} does not match the domains of the scope")]
    TableShapeMismatch { rows: usize, columns: usize },
    #[error("a cost function cannot have the same variable twice in its scope")]
    RepeatedVariable,
    #[error("a linear cost function needs at least one variable")]
    EmptyScope,
    #[error("weights of a linear cost function must be non-negative, got {0}")]
    NegativeWeight(i64),
    #[error("cost functions can only be added at the root")]
    NotAtRoot,
    #[error("a variable needs at least one value")]
    EmptyVariable,
    #[error("an assignment needs a value for each of the {expected} variables, got {actual}")]
    AssignmentLength { expected: usize, actual: usize },
    #[error("{0} is not a pairwise cost function")]
    NotPairwise(CostFunctionId),
}

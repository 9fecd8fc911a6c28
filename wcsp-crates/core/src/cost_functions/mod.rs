//! The cost functions of the problem. Unary costs live in the [`crate::engine::State`]; every
//! function of larger arity is one of the variants of [`CostFunction`].
mod cost_function_id;
mod linear;
pub(crate) mod linear_relaxation;
mod pairwise;

pub use cost_function_id::CostFunctionId;
pub use linear::LinearTerm;
pub(crate) use linear::LinearCostFunction;
pub(crate) use pairwise::PairwiseCostFunction;
pub(crate) use pairwise::Side;

use crate::basic_types::Cost;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::variables::VariableId;
use crate::engine::State;

pub(crate) type CostFunctionStore = KeyedVec<CostFunctionId, CostFunction>;

#[derive(Debug, Clone)]
pub(crate) enum CostFunction {
    Pairwise(PairwiseCostFunction),
    Linear(LinearCostFunction),
}

impl CostFunction {
    pub(crate) fn scope(&self) -> Vec<VariableId> {
        match self {
            CostFunction::Pairwise(pairwise) => vec![
                pairwise.variable(Side::X),
                pairwise.variable(Side::Y),
            ],
            CostFunction::Linear(linear) => linear.scope().collect(),
        }
    }

    /// The local threshold used to break cycles, zero when unset.
    pub(crate) fn threshold(&self) -> Cost {
        match self {
            CostFunction::Pairwise(pairwise) => pairwise.threshold,
            CostFunction::Linear(linear) => linear.threshold,
        }
    }

    pub(crate) fn set_threshold(&mut self, threshold: Cost) {
        match self {
            CostFunction::Pairwise(pairwise) => pairwise.threshold = threshold,
            CostFunction::Linear(linear) => linear.threshold = threshold,
        }
    }

    /// The cost of a complete assignment, given as a value index per variable.
    pub(crate) fn assignment_cost(&self, state: &State, assignment: &[usize]) -> Cost {
        match self {
            CostFunction::Pairwise(pairwise) => {
                let own = assignment[pairwise.variable(Side::X).index()];
                let other = assignment[pairwise.variable(Side::Y).index()];
                pairwise.cost(state, Side::X, own, other)
            }
            CostFunction::Linear(linear) => linear.assignment_cost(state, assignment),
        }
    }
}

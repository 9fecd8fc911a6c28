use crate::basic_types::Cost;
use crate::containers::KeyedVec;
use crate::engine::ledger::is_vac_zero;
use crate::engine::variables::VariableId;
use crate::engine::State;

/// The thresholds which define Bool(P) for one forward pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Thresholds<'a> {
    pub(crate) global: Cost,
    /// Local thresholds raised on variables to break cycles.
    pub(crate) variables: &'a KeyedVec<VariableId, Cost>,
}

impl Thresholds<'_> {
    pub(crate) fn for_variable(&self, variable: VariableId) -> Cost {
        self.global.max(self.variables[variable])
    }

    /// The threshold of a cost function with the given local threshold.
    pub(crate) fn for_function(&self, local: Cost) -> Cost {
        self.global.max(local)
    }

    pub(crate) fn is_unary_zero(&self, state: &State, variable: VariableId, index: usize) -> bool {
        is_vac_zero(
            state.unary_cost(variable, index),
            self.for_variable(variable),
        )
    }
}

use crate::cost_functions::CostFunctionId;
use crate::engine::trailed::TrailedInteger;

/// A variable over a finite, sorted set of integer values.
///
/// Values are addressed by their position in `values`; all mutable parts (presence, unary costs,
/// the support) are trailed cells.
#[derive(Debug, Clone)]
pub(crate) struct Variable {
    pub(crate) name: String,
    pub(crate) values: Box<[i32]>,
    pub(crate) present: Box<[TrailedInteger]>,
    pub(crate) size: TrailedInteger,
    pub(crate) unary_costs: Box<[TrailedInteger]>,
    /// Index of a value with zero unary cost, when one exists.
    pub(crate) support: TrailedInteger,
    pub(crate) cost_functions: Vec<CostFunctionId>,
}

impl Variable {
    pub(crate) fn index_of(&self, value: i32) -> Option<usize> {
        self.values.binary_search(&value).ok()
    }
}

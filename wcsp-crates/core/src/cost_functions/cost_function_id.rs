use std::fmt::Display;

use crate::containers::StorageKey;

/// Identifies a (non-unary) cost function of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CostFunctionId(u32);

impl Display for CostFunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl StorageKey for CostFunctionId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        CostFunctionId(index as u32)
    }
}

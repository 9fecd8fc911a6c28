//! Equivalence-preserving cost moves between unary costs and the lower bound.
//!
//! The cost function side of a move (the deltas) is handled by the cost functions themselves;
//! they call into these operations for the unary side.
use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::EmptyDomain;
use crate::basic_types::EnforceError;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::wcsp_assert_simple;

/// Whether `cost` counts as zero in the relaxation at the given threshold.
pub(crate) fn is_vac_zero(cost: Cost, threshold: Cost) -> bool {
    cost == 0 || cost < threshold
}

impl State {
    /// Adds `cost` to the unary cost of a value. A value whose cost reaches the upper bound is
    /// removed.
    pub(crate) fn project_unary(
        &mut self,
        variable: VariableId,
        index: usize,
        cost: Cost,
    ) -> Result<(), EmptyDomain> {
        wcsp_assert_simple!(cost >= 0, "projecting a negative cost {cost}");
        if cost == 0 {
            return Ok(());
        }
        let new_cost = self.unary_cost(variable, index).add_saturating(cost);
        self.set_unary_cost(variable, index, new_cost);
        if self.is_cut(new_cost) {
            self.remove(variable, index)?;
        }
        Ok(())
    }

    /// Takes `cost` away from the unary cost of a value, to be added to a cost function.
    pub(crate) fn extend_unary(&mut self, variable: VariableId, index: usize, cost: Cost) {
        wcsp_assert_simple!(cost >= 0, "extending a negative cost {cost}");
        let current = self.unary_cost(variable, index);
        wcsp_assert_simple!(
            current >= cost,
            "extending {cost} from {}={} which only has {current}",
            self.name(variable),
            self.value(variable, index)
        );
        self.set_unary_cost(variable, index, current.sub_saturating(cost));
    }

    /// Takes `cost` away from every value in the domain of `variable`; paired with
    /// [`State::increase_lower_bound`].
    pub(crate) fn extend_all(&mut self, variable: VariableId, cost: Cost) {
        let domain = self.domain(variable).collect::<Vec<_>>();
        for index in domain {
            self.extend_unary(variable, index, cost);
        }
    }

    /// Adds `cost` to the global lower bound. Reaching the upper bound is a contradiction.
    pub(crate) fn increase_lower_bound(&mut self, cost: Cost) -> Result<(), EnforceError> {
        wcsp_assert_simple!(cost >= 0);
        let lower_bound = self.lower_bound().add_saturating(cost);
        let cell = self.lower_bound_cell();
        self.trailed_values.assign(cell, lower_bound);

        if lower_bound >= self.upper_bound() {
            return Err(EnforceError::Contradiction);
        }
        Ok(())
    }

    /// Removes every value whose unary cost on top of the lower bound reaches the upper bound.
    pub(crate) fn prune_forbidden_values(&mut self) -> Result<(), EmptyDomain> {
        for variable in self.variable_ids().collect::<Vec<_>>() {
            let domain = self.domain(variable).collect::<Vec<_>>();
            for index in domain {
                if self.is_cut(self.unary_cost(variable, index)) {
                    self.remove(variable, index)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_zero_only_accepts_zero() {
        assert!(is_vac_zero(0, 0));
        assert!(!is_vac_zero(1, 0));
        assert!(is_vac_zero(4, 5));
        assert!(!is_vac_zero(5, 5));
    }

    #[test]
    fn projection_past_the_upper_bound_removes_the_value() {
        let mut state = State::new(5);
        let x = state.new_variable(None, vec![0, 1]).expect("values");
        state.new_checkpoint();

        state.project_unary(x, 0, 5).expect("value 1 remains");

        assert!(!state.contains(x, 0));
        assert_eq!(Err(EmptyDomain), state.project_unary(x, 1, 7));
    }

    #[test]
    fn extend_all_and_lower_bound_preserve_costs() {
        let mut state = State::new(10);
        let x = state.new_variable(None, vec![0, 1]).expect("values");
        state.set_unary_cost(x, 0, 2);
        state.set_unary_cost(x, 1, 3);

        state.extend_all(x, 2);
        state.increase_lower_bound(2).expect("below the upper bound");

        assert_eq!(2, state.lower_bound());
        assert_eq!(0, state.unary_cost(x, 0));
        assert_eq!(1, state.unary_cost(x, 1));
    }

    #[test]
    fn reaching_the_upper_bound_is_a_contradiction() {
        let mut state = State::new(3);

        assert_eq!(
            Err(EnforceError::Contradiction),
            state.increase_lower_bound(3)
        );
    }

    #[test]
    fn pruning_follows_the_lower_bound() {
        let mut state = State::new(4);
        let x = state.new_variable(None, vec![0, 1, 2]).expect("values");
        state.set_unary_cost(x, 2, 2);
        state.increase_lower_bound(2).expect("below the upper bound");

        state.prune_forbidden_values().expect("two values remain");

        assert_eq!(vec![0, 1], state.domain(x).collect::<Vec<_>>());
    }
}

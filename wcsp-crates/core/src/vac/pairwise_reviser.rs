use crate::basic_types::Cost;
use crate::cost_functions::PairwiseCostFunction;
use crate::cost_functions::Side;
use crate::engine::ledger::is_vac_zero;
use crate::engine::State;

impl PairwiseCostFunction {
    /// Looks for a value of the other variable which forms a zero-cost pair with `own`, starting
    /// from the cached support and wrapping around. The other variable is expected to contain
    /// only values with zero unary cost in the relaxation.
    ///
    /// Returns whether a support exists; the cache is updated when one is found.
    pub(crate) fn find_relaxation_support(
        &mut self,
        state: &State,
        threshold: Cost,
        side: Side,
        own: usize,
    ) -> bool {
        let other_variable = self.variable(side.other());
        let size = state.initial_size(other_variable);
        let start = self.support(side, own);

        let found = (0..size)
            .map(|offset| (start + offset) % size)
            .filter(|&other| state.contains(other_variable, other))
            .find(|&other| is_vac_zero(self.cost(state, side, own, other), threshold));

        if let Some(other) = found {
            self.set_support(side, own, other);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(table: &[Vec<Cost>]) -> (State, PairwiseCostFunction) {
        let mut state = State::new(100);
        let x = state.new_variable(None, vec![0, 1, 2]).expect("values");
        let y = state.new_variable(None, vec![0, 1, 2]).expect("values");
        let function = PairwiseCostFunction::new(&mut state, x, y, table);
        (state, function)
    }

    #[test]
    fn support_search_wraps_around_the_cached_value() {
        let (state, mut function) =
            function(&[vec![0, 4, 4], vec![4, 4, 4], vec![4, 4, 0]]);
        function.set_support(Side::X, 0, 2);

        assert!(function.find_relaxation_support(&state, 1, Side::X, 0));
        assert_eq!(0, function.support(Side::X, 0));
        assert!(!function.find_relaxation_support(&state, 1, Side::X, 1));
        assert!(function.find_relaxation_support(&state, 1, Side::Y, 2));
        assert_eq!(2, function.support(Side::Y, 2));
    }

    #[test]
    fn costs_below_the_threshold_support() {
        let (state, mut function) =
            function(&[vec![3, 3, 3], vec![5, 5, 5], vec![0, 0, 0]]);

        assert!(!function.find_relaxation_support(&state, 3, Side::X, 0));
        assert!(function.find_relaxation_support(&state, 4, Side::X, 0));
        assert!(!function.find_relaxation_support(&state, 4, Side::X, 1));
    }

    #[test]
    fn removed_values_do_not_support() {
        let (mut state, mut function) =
            function(&[vec![0, 2, 2], vec![0, 0, 0], vec![0, 0, 0]]);
        state.new_checkpoint();
        state
            .remove(function.variable(Side::Y), 0)
            .expect("values remain");

        assert!(!function.find_relaxation_support(&state, 1, Side::X, 0));
        assert!(function.find_relaxation_support(&state, 3, Side::X, 0));
    }
}

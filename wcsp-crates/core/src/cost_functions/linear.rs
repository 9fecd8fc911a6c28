use super::linear_relaxation::RelaxationItem;
use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::EmptyDomain;
use crate::basic_types::EnforceError;
use crate::basic_types::FORBIDDEN;
use crate::containers::Stamp;
use crate::containers::Stamped;
use crate::containers::StorageKey;
use crate::engine::trailed::TrailedInteger;
use crate::engine::variables::VariableId;
use crate::engine::State;

/// One variable of a linear cost function with the weight of each of its values.
///
/// Values which are not listed get `default_weight`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearTerm {
    pub variable: VariableId,
    pub weights: Vec<(i32, i64)>,
    pub default_weight: i64,
}

impl LinearTerm {
    pub fn new(variable: VariableId, weights: Vec<(i32, i64)>, default_weight: i64) -> Self {
        LinearTerm {
            variable,
            weights,
            default_weight,
        }
    }
}

#[derive(Debug, Clone)]
struct ScopeEntry {
    variable: VariableId,
    /// Weight per value index of the variable.
    weights: Box<[i64]>,
    /// Net cost extended from each unary cost into the function.
    deltas: Box<[TrailedInteger]>,
    /// Per value, the quantum requested from it through this function in the backward pass.
    requested: Box<[Stamped]>,
    /// Per value, whether its requested quantum was extended in the current iteration.
    extended: Box<[Stamp]>,
}

/// A knapsack constraint `Σ weight(x_i) ≥ capacity` which accumulates soft costs.
///
/// An assignment reaching the capacity costs the sum of the deltas of its values minus the part
/// already moved to the global lower bound; any other assignment is forbidden.
#[derive(Debug, Clone)]
pub(crate) struct LinearCostFunction {
    scope: Box<[ScopeEntry]>,
    capacity: i64,
    /// The cost already projected from this function onto the global lower bound.
    lower_bound: TrailedInteger,
    /// Sum of the `k` counters of the removals explained through this function so far in the
    /// current backward pass.
    total_requests: Stamped,
    pub(crate) threshold: Cost,
}

impl LinearCostFunction {
    /// Builds the function; the terms are assumed to be validated and over distinct variables.
    pub(crate) fn new(state: &mut State, terms: &[LinearTerm], capacity: i64) -> Self {
        let scope = terms
            .iter()
            .map(|term| {
                let size = state.initial_size(term.variable);
                let weights = (0..size)
                    .map(|index| {
                        let value = state.value(term.variable, index);
                        term.weights
                            .iter()
                            .find(|(weighted_value, _)| *weighted_value == value)
                            .map_or(term.default_weight, |&(_, weight)| weight)
                    })
                    .collect();
                ScopeEntry {
                    variable: term.variable,
                    weights,
                    deltas: (0..size).map(|_| state.trailed_values.grow(0)).collect(),
                    requested: vec![Stamped::default(); size].into_boxed_slice(),
                    extended: vec![Stamp::default(); size].into_boxed_slice(),
                }
            })
            .collect();

        LinearCostFunction {
            scope,
            capacity,
            lower_bound: state.trailed_values.grow(0),
            total_requests: Stamped::default(),
            threshold: 0,
        }
    }

    pub(crate) fn arity(&self) -> usize {
        self.scope.len()
    }

    pub(crate) fn scope(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.scope.iter().map(|entry| entry.variable)
    }

    pub(crate) fn variable(&self, position: usize) -> VariableId {
        self.scope[position].variable
    }

    pub(crate) fn position_of(&self, variable: VariableId) -> Option<usize> {
        self.scope
            .iter()
            .position(|entry| entry.variable == variable)
    }

    /// The number of values in the initial domain of the variable at `position`.
    pub(crate) fn num_values(&self, position: usize) -> usize {
        self.scope[position].weights.len()
    }

    pub(crate) fn capacity(&self) -> i64 {
        self.capacity
    }

    pub(crate) fn weight(&self, position: usize, index: usize) -> i64 {
        self.scope[position].weights[index]
    }

    pub(crate) fn delta(&self, state: &State, position: usize, index: usize) -> Cost {
        state
            .trailed_values
            .read(self.scope[position].deltas[index])
    }

    pub(crate) fn lower_bound(&self, state: &State) -> Cost {
        state.trailed_values.read(self.lower_bound)
    }

    /// The cost of a complete assignment, given as a value index per variable of the problem.
    pub(crate) fn assignment_cost(&self, state: &State, assignment: &[usize]) -> Cost {
        let mut weight: i128 = 0;
        let mut cost: Cost = 0;
        for (position, entry) in self.scope.iter().enumerate() {
            let index = assignment[entry.variable.index()];
            weight += entry.weights[index] as i128;
            cost = cost.add_saturating(self.delta(state, position, index));
        }
        if weight < self.capacity as i128 {
            return FORBIDDEN;
        }
        cost.sub_saturating(self.lower_bound(state))
    }

    /// The items of the relaxation for the variable at `position`: one per value accepted by
    /// `admissible`, priced by its delta.
    pub(crate) fn relaxation_items(
        &self,
        state: &State,
        position: usize,
        admissible: impl Fn(usize) -> bool,
    ) -> Vec<RelaxationItem> {
        let variable = self.scope[position].variable;
        let support = state.support(variable);
        state
            .domain(variable)
            .filter(|&index| admissible(index))
            .map(|index| RelaxationItem {
                index,
                weight: self.weight(position, index),
                cost: self.delta(state, position, index),
                is_support: index == support,
            })
            .collect()
    }

    /// Moves `cost` from the unary cost of a value into the function.
    pub(crate) fn extend(&self, state: &mut State, position: usize, index: usize, cost: Cost) {
        if cost == 0 {
            return;
        }
        let entry = &self.scope[position];
        state.extend_unary(entry.variable, index, cost);
        state.trailed_values.add_assign(entry.deltas[index], cost);
    }

    /// Moves `cost` from every tuple containing the value to its unary cost.
    pub(crate) fn project(
        &self,
        state: &mut State,
        position: usize,
        index: usize,
        cost: Cost,
    ) -> Result<(), EmptyDomain> {
        if cost == 0 {
            return Ok(());
        }
        let entry = &self.scope[position];
        state.trailed_values.add_assign(entry.deltas[index], -cost);
        state.project_unary(entry.variable, index, cost)
    }

    /// Moves `cost` from every tuple to the global lower bound.
    pub(crate) fn project_lower_bound(
        &self,
        state: &mut State,
        cost: Cost,
    ) -> Result<(), EnforceError> {
        let lower_bound = self.lower_bound(state).add_saturating(cost);
        state.trailed_values.assign(self.lower_bound, lower_bound);
        state.increase_lower_bound(cost)
    }

    pub(crate) fn requested(&self, position: usize, index: usize, iteration: u64) -> u64 {
        self.scope[position].requested[index].get(iteration)
    }

    pub(crate) fn set_requested(
        &mut self,
        position: usize,
        index: usize,
        iteration: u64,
        quantum: u64,
    ) {
        self.scope[position].requested[index].set(iteration, quantum)
    }

    pub(crate) fn is_extended(&self, position: usize, index: usize, iteration: u64) -> bool {
        self.scope[position].extended[index].is_set(iteration)
    }

    pub(crate) fn mark_extended(&mut self, position: usize, index: usize, iteration: u64) {
        self.scope[position].extended[index].set(iteration)
    }

    pub(crate) fn total_requests(&self, iteration: u64) -> u64 {
        self.total_requests.get(iteration)
    }

    pub(crate) fn add_requests(&mut self, iteration: u64, amount: u64) {
        self.total_requests.add(iteration, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack(state: &mut State, capacity: i64) -> (LinearCostFunction, Vec<VariableId>) {
        let variables = (0..3)
            .map(|_| state.new_variable(None, vec![0, 1]).expect("values"))
            .collect::<Vec<_>>();
        let terms = variables
            .iter()
            .map(|&variable| LinearTerm::new(variable, vec![(1, 3)], 0))
            .collect::<Vec<_>>();
        (LinearCostFunction::new(state, &terms, capacity), variables)
    }

    #[test]
    fn unlisted_values_get_the_default_weight() {
        let mut state = State::new(100);
        let x = state.new_variable(None, vec![0, 1, 2]).expect("values");
        let function =
            LinearCostFunction::new(&mut state, &[LinearTerm::new(x, vec![(2, 5)], 1)], 4);

        assert_eq!(1, function.weight(0, 0));
        assert_eq!(1, function.weight(0, 1));
        assert_eq!(5, function.weight(0, 2));
    }

    #[test]
    fn assignments_below_capacity_are_forbidden() {
        let mut state = State::new(100);
        let (function, _) = knapsack(&mut state, 6);

        assert_eq!(FORBIDDEN, function.assignment_cost(&state, &[1, 0, 0]));
        assert_eq!(0, function.assignment_cost(&state, &[1, 1, 0]));
    }

    #[test]
    fn extension_and_lower_bound_projection_preserve_the_total() {
        let mut state = State::new(100);
        let (function, variables) = knapsack(&mut state, 6);
        for &variable in &variables {
            state.set_unary_cost(variable, 1, 1);
        }

        for position in 0..3 {
            function.extend(&mut state, position, 1, 1);
        }
        function
            .project_lower_bound(&mut state, 1)
            .expect("below the upper bound");

        // Two ones: 2 extended - 1 on the lower bound.
        assert_eq!(1, function.assignment_cost(&state, &[1, 1, 0]));
        assert_eq!(0, state.unary_cost(variables[0], 1));
        assert_eq!(1, state.lower_bound());
    }
}

use log::trace;

use crate::basic_types::is_cut;
use crate::basic_types::Cost;
use crate::basic_types::CostOperationError;
use crate::basic_types::EmptyDomain;
use crate::basic_types::FORBIDDEN;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::cost_functions::CostFunctionId;
use crate::create_statistics_struct;
use crate::engine::trailed::TrailedInteger;
use crate::engine::trailed::TrailedValues;
use crate::engine::variables::Variable;
use crate::engine::variables::VariableId;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::wcsp_assert_moderate;
use crate::wcsp_assert_simple;

/// The backtrackable part of a weighted constraint satisfaction problem: the domains, the unary
/// costs and the global lower bound.
///
/// Everything except the upper bound is stored in [`TrailedValues`], so that
/// [`State::restore_to`] brings all of it back to an earlier checkpoint at once.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) trailed_values: TrailedValues,
    pub(crate) variables: KeyedVec<VariableId, Variable>,
    /// The global lower bound, i.e. the cost paid by every complete assignment.
    lower_bound: TrailedInteger,
    /// The cost of the best known solution; not restored on backtracking.
    upper_bound: Cost,

    statistics: StateStatistics,
}

create_statistics_struct!(StateStatistics {
    num_value_removals: usize,
    num_restorations: usize,
});

impl State {
    pub(crate) fn new(upper_bound: Cost) -> State {
        let mut trailed_values = TrailedValues::default();
        let lower_bound = trailed_values.grow(0);
        State {
            trailed_values,
            variables: KeyedVec::default(),
            lower_bound,
            upper_bound: upper_bound.min(FORBIDDEN),
            statistics: StateStatistics::default(),
        }
    }

    pub(crate) fn new_variable(
        &mut self,
        name: Option<&str>,
        mut values: Vec<i32>,
    ) -> Result<VariableId, CostOperationError> {
        values.sort_unstable();
        values.dedup();
        if values.is_empty() {
            return Err(CostOperationError::EmptyVariable);
        }

        let present = values
            .iter()
            .map(|_| self.trailed_values.grow(1))
            .collect();
        let unary_costs = values
            .iter()
            .map(|_| self.trailed_values.grow(0))
            .collect();
        let size = self.trailed_values.grow(values.len() as i64);
        let support = self.trailed_values.grow(0);

        let id = VariableId::create_from_index(self.variables.len());
        let name = name.map_or_else(|| id.to_string(), str::to_owned);
        let _ = self.variables.push(Variable {
            name,
            values: values.into_boxed_slice(),
            present,
            size,
            unary_costs,
            support,
            cost_functions: Vec::new(),
        });
        Ok(id)
    }

    pub(crate) fn attach(&mut self, variable: VariableId, cost_function: CostFunctionId) {
        self.variables[variable].cost_functions.push(cost_function);
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn variable_ids(&self) -> impl Iterator<Item = VariableId> {
        self.variables.keys()
    }

    pub(crate) fn name(&self, variable: VariableId) -> &str {
        &self.variables[variable].name
    }

    pub(crate) fn cost_functions_of(&self, variable: VariableId) -> &[CostFunctionId] {
        &self.variables[variable].cost_functions
    }

    /// The number of values in the initial domain of `variable`.
    pub(crate) fn initial_size(&self, variable: VariableId) -> usize {
        self.variables[variable].values.len()
    }

    pub(crate) fn value(&self, variable: VariableId, index: usize) -> i32 {
        self.variables[variable].values[index]
    }

    pub(crate) fn index_of(&self, variable: VariableId, value: i32) -> Option<usize> {
        self.variables[variable].index_of(value)
    }

    pub(crate) fn contains(&self, variable: VariableId, index: usize) -> bool {
        self.trailed_values
            .read(self.variables[variable].present[index])
            != 0
    }

    pub(crate) fn domain_size(&self, variable: VariableId) -> usize {
        self.trailed_values.read(self.variables[variable].size) as usize
    }

    /// The indices of the values currently in the domain of `variable`.
    pub(crate) fn domain(&self, variable: VariableId) -> impl Iterator<Item = usize> + '_ {
        (0..self.initial_size(variable)).filter(move |&index| self.contains(variable, index))
    }

    /// Removes a value from a domain.
    ///
    /// Removing the last value fails with [`EmptyDomain`] and leaves the domain untouched.
    pub(crate) fn remove(&mut self, variable: VariableId, index: usize) -> Result<(), EmptyDomain> {
        if !self.contains(variable, index) {
            return Ok(());
        }
        let size = self.domain_size(variable);
        if size == 1 {
            return Err(EmptyDomain);
        }

        trace!(
            "removing {}={}",
            self.name(variable),
            self.value(variable, index)
        );
        self.statistics.num_value_removals += 1;

        let present = self.variables[variable].present[index];
        let size_cell = self.variables[variable].size;
        self.trailed_values.assign(present, 0);
        self.trailed_values.assign(size_cell, size as i64 - 1);
        Ok(())
    }

    pub(crate) fn unary_cost(&self, variable: VariableId, index: usize) -> Cost {
        self.trailed_values
            .read(self.variables[variable].unary_costs[index])
    }

    pub(crate) fn set_unary_cost(&mut self, variable: VariableId, index: usize, cost: Cost) {
        wcsp_assert_simple!(cost >= 0);
        let cell = self.variables[variable].unary_costs[index];
        self.trailed_values.assign(cell, cost);
    }

    pub(crate) fn support(&self, variable: VariableId) -> usize {
        self.trailed_values.read(self.variables[variable].support) as usize
    }

    pub(crate) fn set_support(&mut self, variable: VariableId, index: usize) {
        wcsp_assert_moderate!(self.contains(variable, index));
        let cell = self.variables[variable].support;
        self.trailed_values.assign(cell, index as i64);
    }

    /// Moves the unary support of `variable` to a value with zero unary cost, if any.
    pub(crate) fn find_support(&mut self, variable: VariableId) {
        let current = self.support(variable);
        if self.contains(variable, current) && self.unary_cost(variable, current) == 0 {
            return;
        }
        let zero_cost = self
            .domain(variable)
            .find(|&index| self.unary_cost(variable, index) == 0);
        if let Some(index) = zero_cost {
            self.set_support(variable, index);
        }
    }

    pub(crate) fn lower_bound(&self) -> Cost {
        self.trailed_values.read(self.lower_bound)
    }

    pub(crate) fn upper_bound(&self) -> Cost {
        self.upper_bound
    }

    pub(crate) fn set_upper_bound(&mut self, upper_bound: Cost) {
        self.upper_bound = upper_bound.min(FORBIDDEN);
    }

    /// Whether `cost` on top of the lower bound reaches the upper bound.
    pub(crate) fn is_cut(&self, cost: Cost) -> bool {
        is_cut(self.lower_bound(), cost, self.upper_bound)
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trailed_values.new_checkpoint();
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trailed_values.get_checkpoint()
    }

    /// Folds the changes made since the last checkpoint into the one before it.
    pub(crate) fn commit_checkpoint(&mut self) {
        wcsp_assert_simple!(self.get_checkpoint() > 0);
        self.trailed_values.commit_checkpoint();
    }

    /// Undoes every trailed change made since `checkpoint` was created.
    pub(crate) fn restore_to(&mut self, checkpoint: usize) {
        wcsp_assert_simple!(checkpoint < self.get_checkpoint());
        self.statistics.num_restorations += 1;
        self.trailed_values.synchronise(checkpoint);
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

impl State {
    /// Direct write access to the lower bound cell, for the ledger.
    pub(super) fn lower_bound_cell(&self) -> TrailedInteger {
        self.lower_bound
    }
}

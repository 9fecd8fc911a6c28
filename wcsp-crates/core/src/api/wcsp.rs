use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::CostOperationError;
use crate::basic_types::EmptyDomain;
use crate::basic_types::EnforceError;
use crate::basic_types::Tightened;
use crate::basic_types::FORBIDDEN;
use crate::containers::HashSet;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionId;
use crate::cost_functions::CostFunctionStore;
use crate::cost_functions::LinearCostFunction;
use crate::cost_functions::LinearTerm;
use crate::cost_functions::PairwiseCostFunction;
use crate::cost_functions::Side;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::statistics::log_statistic_postfix;
use crate::statistics::StatisticLogger;
use crate::vac::min_sum_diffusion::min_sum_diffusion;
use crate::vac::VacController;
use crate::vac::VacOptions;

/// A weighted constraint satisfaction problem together with the machinery to enforce virtual
/// arc consistency on it.
///
/// Variables range over explicit integer values. Costs are given per value (unary costs), per
/// pair of values (pairwise cost functions) or through knapsack constraints (linear cost
/// functions). Every change is trailed, so [`Wcsp::restore_to`] undoes everything done since a
/// checkpoint, including lower bound increases.
///
/// ```rust
/// # use wcsp_core::Wcsp;
/// # use wcsp_core::termination::Indefinite;
/// let mut wcsp = Wcsp::new(10);
/// let x = wcsp.new_variable([0, 1]).unwrap();
/// let y = wcsp.new_variable([0, 1]).unwrap();
/// wcsp.set_unary_cost(x, 0, 2).unwrap();
/// let _ = wcsp.add_pairwise(x, y, &[vec![0, 3], vec![3, 0]]).unwrap();
/// wcsp.set_unary_cost(y, 1, 1).unwrap();
///
/// let tightened = wcsp.enforce_vac(&mut Indefinite).unwrap();
///
/// assert_eq!(1, tightened.lower_bound_increase);
/// assert_eq!(1, wcsp.lower_bound());
/// ```
#[derive(Debug, Clone)]
pub struct Wcsp {
    state: State,
    cost_functions: CostFunctionStore,
    vac: VacController,
}

impl Default for Wcsp {
    fn default() -> Self {
        Wcsp::new(FORBIDDEN)
    }
}

impl Wcsp {
    /// Creates an empty problem in which assignments costing `upper_bound` or more are
    /// forbidden.
    pub fn new(upper_bound: Cost) -> Self {
        Wcsp::with_options(upper_bound, VacOptions::default())
    }

    pub fn with_options(upper_bound: Cost, options: VacOptions) -> Self {
        Wcsp {
            state: State::new(upper_bound),
            cost_functions: CostFunctionStore::default(),
            vac: VacController::new(options),
        }
    }

    pub fn options(&self) -> &VacOptions {
        self.vac.options()
    }

    /// Logs the statistics of the problem and of the enforcement so far.
    pub fn log_statistics(&self) {
        self.state.log_statistics(StatisticLogger::new(["wcsp"]));
        self.vac.log_statistics(StatisticLogger::new(["vac"]));
        log_statistic_postfix();
    }
}

/// Building the problem.
impl Wcsp {
    /// Creates a variable over the given values; duplicates are ignored.
    pub fn new_variable(
        &mut self,
        values: impl IntoIterator<Item = i32>,
    ) -> Result<VariableId, CostOperationError> {
        self.state
            .new_variable(None, values.into_iter().collect())
    }

    pub fn new_named_variable(
        &mut self,
        values: impl IntoIterator<Item = i32>,
        name: &str,
    ) -> Result<VariableId, CostOperationError> {
        self.state
            .new_variable(Some(name), values.into_iter().collect())
    }

    /// Sets the unary cost of `value`. Costs at or above [`FORBIDDEN`] are stored as
    /// [`FORBIDDEN`].
    pub fn set_unary_cost(
        &mut self,
        variable: VariableId,
        value: i32,
        cost: Cost,
    ) -> Result<(), CostOperationError> {
        if cost < 0 {
            return Err(CostOperationError::NegativeCost(cost));
        }
        let index = self.index_of(variable, value)?;
        self.vac.record_cost(cost);
        self.state
            .set_unary_cost(variable, index, cost.min(FORBIDDEN));
        Ok(())
    }

    /// Adds a cost function over `x` and `y`; `table[i][j]` is the cost of the `i`-th smallest
    /// value of `x` together with the `j`-th smallest value of `y`.
    pub fn add_pairwise(
        &mut self,
        x: VariableId,
        y: VariableId,
        table: &[Vec<Cost>],
    ) -> Result<CostFunctionId, CostOperationError> {
        self.check_at_root()?;
        if x == y {
            return Err(CostOperationError::RepeatedVariable);
        }
        let rows = self.state.initial_size(x);
        let columns = self.state.initial_size(y);
        if table.len() != rows || table.iter().any(|row| row.len() != columns) {
            return Err(CostOperationError::TableShapeMismatch {
                rows: table.len(),
                columns: table.first().map_or(0, Vec::len),
            });
        }
        if let Some(&negative) = table.iter().flatten().find(|&&cost| cost < 0) {
            return Err(CostOperationError::NegativeCost(negative));
        }

        for &cost in table.iter().flatten() {
            self.vac.record_cost(cost);
        }
        let pairwise = PairwiseCostFunction::new(&mut self.state, x, y, table);
        Ok(self.push_cost_function(CostFunction::Pairwise(pairwise)))
    }

    /// Adds the knapsack constraint `Σ weight(x_i) ≥ capacity`: assignments below the capacity
    /// are forbidden, the others cost nothing.
    pub fn add_linear(
        &mut self,
        terms: &[LinearTerm],
        capacity: i64,
    ) -> Result<CostFunctionId, CostOperationError> {
        self.check_at_root()?;
        if terms.is_empty() {
            return Err(CostOperationError::EmptyScope);
        }
        let mut seen: HashSet<VariableId> = HashSet::default();
        for term in terms {
            if !seen.insert(term.variable) {
                return Err(CostOperationError::RepeatedVariable);
            }
            if term.default_weight < 0 {
                return Err(CostOperationError::NegativeWeight(term.default_weight));
            }
            for &(value, weight) in &term.weights {
                if weight < 0 {
                    return Err(CostOperationError::NegativeWeight(weight));
                }
                let _ = self.index_of(term.variable, value)?;
            }
        }

        let linear = LinearCostFunction::new(&mut self.state, terms, capacity);
        Ok(self.push_cost_function(CostFunction::Linear(linear)))
    }

    fn push_cost_function(&mut self, cost_function: CostFunction) -> CostFunctionId {
        let scope = cost_function.scope();
        let id = self.cost_functions.push(cost_function);
        for variable in scope {
            self.state.attach(variable, id);
        }
        id
    }

    fn check_at_root(&self) -> Result<(), CostOperationError> {
        if self.state.get_checkpoint() > 0 {
            return Err(CostOperationError::NotAtRoot);
        }
        Ok(())
    }

    fn index_of(&self, variable: VariableId, value: i32) -> Result<usize, CostOperationError> {
        self.state
            .index_of(variable, value)
            .ok_or(CostOperationError::UnknownValue(value))
    }
}

/// Reading the problem.
impl Wcsp {
    pub fn num_variables(&self) -> usize {
        self.state.num_variables()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.state.variable_ids()
    }

    pub fn name(&self, variable: VariableId) -> &str {
        self.state.name(variable)
    }

    pub fn lower_bound(&self) -> Cost {
        self.state.lower_bound()
    }

    pub fn upper_bound(&self) -> Cost {
        self.state.upper_bound()
    }

    /// Sets a new upper bound, typically the cost of a newly found solution. It is not restored
    /// on backtracking.
    pub fn set_upper_bound(&mut self, upper_bound: Cost) {
        self.state.set_upper_bound(upper_bound)
    }

    pub fn contains(&self, variable: VariableId, value: i32) -> bool {
        self.state
            .index_of(variable, value)
            .is_some_and(|index| self.state.contains(variable, index))
    }

    /// The values currently in the domain of `variable`, in increasing order.
    pub fn domain(&self, variable: VariableId) -> impl Iterator<Item = i32> + '_ {
        self.state
            .domain(variable)
            .map(move |index| self.state.value(variable, index))
    }

    pub fn unary_cost(&self, variable: VariableId, value: i32) -> Result<Cost, CostOperationError> {
        let index = self.index_of(variable, value)?;
        Ok(self.state.unary_cost(variable, index))
    }

    /// The current cost of a pair of values in a pairwise cost function.
    pub fn pairwise_cost(
        &self,
        cost_function: CostFunctionId,
        value_x: i32,
        value_y: i32,
    ) -> Result<Cost, CostOperationError> {
        let CostFunction::Pairwise(pairwise) = &self.cost_functions[cost_function] else {
            return Err(CostOperationError::NotPairwise(cost_function));
        };
        let x = self.index_of(pairwise.variable(Side::X), value_x)?;
        let y = self.index_of(pairwise.variable(Side::Y), value_y)?;
        Ok(pairwise.cost(&self.state, Side::X, x, y))
    }

    /// The total cost of a complete assignment, one value per variable in creation order,
    /// including the lower bound. Assignments using a removed value are [`FORBIDDEN`].
    pub fn assignment_cost(&self, assignment: &[i32]) -> Result<Cost, CostOperationError> {
        if assignment.len() != self.num_variables() {
            return Err(CostOperationError::AssignmentLength {
                expected: self.num_variables(),
                actual: assignment.len(),
            });
        }

        let indices = self
            .state
            .variable_ids()
            .zip(assignment)
            .map(|(variable, &value)| self.index_of(variable, value))
            .collect::<Result<Vec<_>, _>>()?;

        let mut total = self.state.lower_bound();
        for (variable, &index) in self.state.variable_ids().zip(&indices) {
            if !self.state.contains(variable, index) {
                return Ok(FORBIDDEN);
            }
            total = total.add_saturating(self.state.unary_cost(variable, index));
        }
        for cost_function in self.cost_functions.iter() {
            total = total.add_saturating(cost_function.assignment_cost(&self.state, &indices));
        }
        Ok(total)
    }

    /// The value of `variable` which had zero unary cost in the last Bool(P) found consistent,
    /// usable as a value ordering hint.
    pub fn vac_support(&self, variable: VariableId) -> Option<i32> {
        self.vac
            .vac_support(variable)
            .map(|index| self.state.value(variable, index))
    }
}

/// Search support and enforcement.
impl Wcsp {
    pub fn new_checkpoint(&mut self) {
        self.state.new_checkpoint()
    }

    pub fn get_checkpoint(&self) -> usize {
        self.state.get_checkpoint()
    }

    /// Undoes every change made since `checkpoint` was created.
    pub fn restore_to(&mut self, checkpoint: usize) {
        self.state.restore_to(checkpoint)
    }

    /// Removes `value` from the domain of `variable`. Unknown values are ignored.
    pub fn remove_value(&mut self, variable: VariableId, value: i32) -> Result<(), EmptyDomain> {
        match self.state.index_of(variable, value) {
            Some(index) => self.state.remove(variable, index),
            None => Ok(()),
        }
    }

    /// Raises the lower bound by enforcing virtual arc consistency.
    ///
    /// [`EnforceError::Contradiction`] means that no assignment of the current domains costs less
    /// than the upper bound; the caller is expected to backtrack. On
    /// [`EnforceError::Interrupted`] the problem is left as it was before the call.
    pub fn enforce_vac(
        &mut self,
        termination: &mut impl TerminationCondition,
    ) -> Result<Tightened, EnforceError> {
        self.vac
            .enforce(&mut self.state, &mut self.cost_functions, termination)
    }

    /// Runs at most `max_iterations` rounds of min-sum diffusion over the pairwise cost
    /// functions, returning the number of rounds done.
    pub fn min_sum_diffusion(&mut self, max_iterations: usize) -> Result<usize, EmptyDomain> {
        min_sum_diffusion(&mut self.state, &self.cost_functions, max_iterations)
    }
}

#[cfg(test)]
impl Wcsp {
    pub(crate) fn vac_statistics(&self) -> crate::vac::VacStatistics {
        self.vac.statistics()
    }
}

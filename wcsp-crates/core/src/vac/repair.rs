use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::EmptyDomain;
use crate::basic_types::EnforceError;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionId;
use crate::cost_functions::CostFunctionStore;
use crate::cost_functions::LinearCostFunction;
use crate::engine::State;
use crate::vac::explanation::Explanation;
use crate::vac::explanation::ExplanationTracker;
use crate::vac::explanation::FailureRoot;
use crate::vac::explanation::ValueRef;

/// What a successful repair did.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RepairSummary {
    pub(crate) num_repaired: usize,
    pub(crate) max_k: u64,
}

/// Moves costs along the traced values, in removal order, so that the failure root can pay
/// `lambda` to the lower bound.
pub(crate) fn repair(
    state: &mut State,
    cost_functions: &mut CostFunctionStore,
    tracker: &mut ExplanationTracker,
    root: &FailureRoot,
    lambda: Cost,
) -> Result<RepairSummary, EnforceError> {
    let iteration = tracker.iteration();
    let mut summary = RepairSummary::default();

    while let Some(value) = tracker.pop_traced() {
        let k = tracker.k(value);
        summary.num_repaired += 1;
        summary.max_k = summary.max_k.max(k);

        match tracker.explanation(value) {
            Some(Explanation::Pairwise(cost_function)) => {
                let CostFunction::Pairwise(pairwise) = &mut cost_functions[*cost_function] else {
                    unreachable!("pairwise killers name pairwise cost functions")
                };
                let (variable, index) = value;
                let side = pairwise.side_of(variable);
                let other_side = side.other();
                let other_variable = pairwise.variable(other_side);

                for &other in tracker.zero_partners(value) {
                    let requested = pairwise.k(other_side, other, iteration);
                    if requested == 0 || !state.contains(other_variable, other) {
                        continue;
                    }
                    pairwise.extend(state, other_side, other, lambda.times(requested));
                    pairwise.set_k(other_side, other, iteration, 0);
                }
                pairwise.project(state, side, index, lambda.times(k))?;
            }
            Some(Explanation::Linear {
                cost_function,
                witnesses,
            }) => {
                let CostFunction::Linear(linear) = &mut cost_functions[*cost_function] else {
                    unreachable!("linear explanations name linear cost functions")
                };
                linear.repair(state, iteration, lambda, value, witnesses, k)?;
            }
            Some(Explanation::Unary) | None => {
                unreachable!("traced values are removed by a cost function")
            }
        }
    }

    match root {
        FailureRoot::Variable(variable) => {
            state.extend_all(*variable, lambda);
            state.increase_lower_bound(lambda)?;
        }
        FailureRoot::Linear {
            cost_function,
            witnesses,
            ..
        } => {
            let linear = linear_mut(cost_functions, *cost_function);
            linear.extend_witnesses(state, iteration, lambda, witnesses);
            linear.project_lower_bound(state, lambda)?;
        }
    }

    state.prune_forbidden_values()?;
    Ok(summary)
}

fn linear_mut(
    cost_functions: &mut CostFunctionStore,
    cost_function: CostFunctionId,
) -> &mut LinearCostFunction {
    match &mut cost_functions[cost_function] {
        CostFunction::Linear(linear) => linear,
        CostFunction::Pairwise(_) => unreachable!("failure roots only name linear cost functions"),
    }
}

impl LinearCostFunction {
    /// Extends the requested costs of the witnesses and projects `lambda * k` onto the removed
    /// value.
    fn repair(
        &mut self,
        state: &mut State,
        iteration: u64,
        lambda: Cost,
        (variable, index): ValueRef,
        witnesses: &[ValueRef],
        k: u64,
    ) -> Result<(), EmptyDomain> {
        self.extend_witnesses(state, iteration, lambda, witnesses);
        match self.position_of(variable) {
            Some(position) => self.project(state, position, index, lambda.times(k)),
            None => Ok(()),
        }
    }

    /// Each witness pays everything requested from it at most once per iteration.
    fn extend_witnesses(
        &mut self,
        state: &mut State,
        iteration: u64,
        lambda: Cost,
        witnesses: &[ValueRef],
    ) {
        for &(variable, index) in witnesses {
            let Some(position) = self.position_of(variable) else {
                continue;
            };
            if self.is_extended(position, index, iteration) {
                continue;
            }
            self.mark_extended(position, index, iteration);
            if state.contains(variable, index) {
                let requested = self.requested(position, index, iteration);
                self.extend(state, position, index, lambda.times(requested));
            }
        }
    }
}

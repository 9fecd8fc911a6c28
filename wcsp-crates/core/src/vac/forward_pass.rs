use log::trace;

use crate::basic_types::EnforceError;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionId;
use crate::cost_functions::CostFunctionStore;
use crate::cost_functions::PairwiseCostFunction;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::vac::explanation::Explanation;
use crate::vac::explanation::ExplanationTracker;
use crate::vac::explanation::FailureRoot;
use crate::vac::linear_reviser::LinearRevision;
use crate::vac::relaxation::Thresholds;
use crate::vac::worklist::VariableQueue;

/// Arc consistency on Bool(P): every removal is recorded with its explanation so that a wipeout
/// can be traced back.
///
/// The domains of `state` shrink while the pass runs; the caller restores them afterwards.
pub(crate) struct ForwardPass<'a> {
    pub(crate) state: &'a mut State,
    pub(crate) cost_functions: &'a mut CostFunctionStore,
    pub(crate) tracker: &'a mut ExplanationTracker,
    pub(crate) queue: &'a mut VariableQueue,
    /// Variables which lost values in this pass.
    pub(crate) seek_support: &'a mut VariableQueue,
    pub(crate) thresholds: Thresholds<'a>,
}

impl ForwardPass<'_> {
    /// Runs the pass to a fixpoint. Returns the element which could not be satisfied at zero cost,
    /// or `None` if Bool(P) is arc consistent.
    pub(crate) fn run(
        mut self,
        termination: &mut impl TerminationCondition,
    ) -> Result<Option<FailureRoot>, EnforceError> {
        self.queue.clear();
        self.seek_support.clear();
        for variable in self.state.variable_ids() {
            self.queue.push(variable);
        }

        loop {
            while let Some(variable) = self.queue.pop() {
                if termination.should_stop() {
                    return Err(EnforceError::Interrupted);
                }
                if let Some(root) = self.propagate_variable(variable) {
                    return Ok(Some(root));
                }
            }

            match self.revise_linear_functions() {
                LinearOutcome::Failed(root) => return Ok(Some(root)),
                LinearOutcome::Fixpoint => return Ok(None),
                LinearOutcome::Removed => {}
            }
        }
    }

    fn propagate_variable(&mut self, variable: VariableId) -> Option<FailureRoot> {
        if let Err(root) = self.remove_costly_values(variable) {
            return Some(root);
        }

        let incident = self.state.cost_functions_of(variable).to_vec();
        for cost_function_id in incident {
            let CostFunction::Pairwise(pairwise) = &mut self.cost_functions[cost_function_id]
            else {
                continue;
            };
            if let Err(root) = revise_towards(
                self.state,
                self.tracker,
                self.queue,
                self.seek_support,
                &self.thresholds,
                pairwise,
                cost_function_id,
                variable,
            ) {
                return Some(root);
            }
        }
        None
    }

    fn remove_costly_values(&mut self, variable: VariableId) -> Result<(), FailureRoot> {
        remove_costly_values(
            self.state,
            self.tracker,
            self.seek_support,
            &self.thresholds,
            variable,
        )
    }

    fn revise_linear_functions(&mut self) -> LinearOutcome {
        let mut outcome = LinearOutcome::Fixpoint;

        for cost_function_id in self.cost_functions.keys() {
            let CostFunction::Linear(linear) = &self.cost_functions[cost_function_id] else {
                continue;
            };
            let threshold = self.thresholds.for_function(linear.threshold);

            match linear.check_and_revise(self.state, self.tracker, threshold) {
                LinearRevision::Infeasible { witnesses } => {
                    trace!("{cost_function_id} cannot reach its capacity in Bool(P)");
                    return LinearOutcome::Failed(FailureRoot::Linear {
                        cost_function: cost_function_id,
                        gap: None,
                        witnesses,
                    });
                }
                LinearRevision::Violated { gap, witnesses } => {
                    trace!("{cost_function_id} costs at least {gap} in Bool(P)");
                    return LinearOutcome::Failed(FailureRoot::Linear {
                        cost_function: cost_function_id,
                        gap: Some(gap),
                        witnesses,
                    });
                }
                LinearRevision::Consistent { removals } => {
                    for ((variable, index), witnesses) in removals {
                        outcome = LinearOutcome::Removed;
                        self.tracker.record_removal(
                            (variable, index),
                            Explanation::Linear {
                                cost_function: cost_function_id,
                                witnesses,
                            },
                        );
                        if self.state.remove(variable, index).is_err() {
                            return LinearOutcome::Failed(FailureRoot::Variable(variable));
                        }
                        self.queue.push(variable);
                        self.seek_support.push(variable);
                    }
                }
            }
        }

        outcome
    }
}

enum LinearOutcome {
    Fixpoint,
    Removed,
    Failed(FailureRoot),
}

/// Removes the values whose unary cost is not zero in the relaxation.
fn remove_costly_values(
    state: &mut State,
    tracker: &mut ExplanationTracker,
    seek_support: &mut VariableQueue,
    thresholds: &Thresholds<'_>,
    variable: VariableId,
) -> Result<(), FailureRoot> {
    let domain = state.domain(variable).collect::<Vec<_>>();
    for index in domain {
        if thresholds.is_unary_zero(state, variable, index) {
            continue;
        }
        tracker.record_removal((variable, index), Explanation::Unary);
        if state.remove(variable, index).is_err() {
            return Err(FailureRoot::Variable(variable));
        }
        seek_support.push(variable);
    }
    Ok(())
}

/// Removes the values of the variable on the other side of `pairwise` which have no zero-cost
/// support left in `variable`.
#[allow(clippy::too_many_arguments, reason = "split borrows of the pass")]
fn revise_towards(
    state: &mut State,
    tracker: &mut ExplanationTracker,
    queue: &mut VariableQueue,
    seek_support: &mut VariableQueue,
    thresholds: &Thresholds<'_>,
    pairwise: &mut PairwiseCostFunction,
    cost_function_id: CostFunctionId,
    variable: VariableId,
) -> Result<(), FailureRoot> {
    let side = pairwise.side_of(variable).other();
    let other_variable = pairwise.variable(side);
    remove_costly_values(state, tracker, seek_support, thresholds, other_variable)?;

    let threshold = thresholds.for_function(pairwise.threshold);
    let domain = state.domain(other_variable).collect::<Vec<_>>();
    for index in domain {
        if pairwise.find_relaxation_support(state, threshold, side, index) {
            continue;
        }
        tracker.record_removal(
            (other_variable, index),
            Explanation::Pairwise(cost_function_id),
        );
        if state.remove(other_variable, index).is_err() {
            return Err(FailureRoot::Variable(other_variable));
        }
        queue.push(other_variable);
        seek_support.push(other_variable);
    }
    Ok(())
}

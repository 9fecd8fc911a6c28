use std::cmp::Ordering;

use log::trace;

use crate::basic_types::Cost;
use crate::basic_types::UNIT_COST;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionId;
use crate::cost_functions::CostFunctionStore;
use crate::cost_functions::LinearCostFunction;
use crate::cost_functions::PairwiseCostFunction;
use crate::cost_functions::Side;
use crate::engine::ledger::is_vac_zero;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::vac::explanation::Explanation;
use crate::vac::explanation::ExplanationTracker;
use crate::vac::explanation::FailureRoot;
use crate::vac::explanation::ValueRef;
use crate::vac::relaxation::Thresholds;
use crate::vac::BottleneckTieBreaking;

/// The element which limits the lower bound increase to zero. Ordered by id, cost functions
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Bottleneck {
    CostFunction(CostFunctionId),
    Variable(VariableId),
}

/// The outcome of tracing back a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Trace {
    /// The largest amount by which the lower bound can be raised.
    pub(crate) lambda: Cost,
    /// When `lambda` is zero, the element responsible together with its cost.
    pub(crate) bottleneck: Option<(Bottleneck, Cost)>,
}

/// The running minimum of the achievable increase.
#[derive(Debug)]
struct MinLambda {
    value: Cost,
    bottleneck: Option<(Bottleneck, Cost)>,
    tie_breaking: BottleneckTieBreaking,
}

impl MinLambda {
    fn bound(&mut self, cost: Cost, k: u64, element: Option<Bottleneck>) {
        let quotient = cost / (k.max(1) as Cost);
        let ordering = quotient.cmp(&self.value);
        if ordering == Ordering::Greater {
            return;
        }
        if ordering == Ordering::Less {
            self.value = quotient;
        }
        if quotient >= UNIT_COST {
            return;
        }
        let Some(element) = element else {
            return;
        };
        let replace = match (self.bottleneck, ordering) {
            (None, _) | (_, Ordering::Less) => true,
            (Some((current, _)), _) => {
                self.tie_breaking == BottleneckTieBreaking::LowestId && element < current
            }
        };
        if replace {
            self.bottleneck = Some((element, cost));
        }
    }
}

/// A costly pair whose other value is removed by the same cost function; it is checked once the
/// multipliers are final.
#[derive(Debug, Clone, Copy)]
struct DeferredPair {
    cost_function: CostFunctionId,
    side: Side,
    own: ValueRef,
    other: ValueRef,
}

/// Traces a failure of the forward pass back through the recorded explanations, computing how
/// often each value is needed (its k) and the largest achievable increase.
///
/// Runs on the domains as they were before the forward pass. Only cut entries of pairwise
/// functions are modified.
pub(crate) struct BackwardPass<'a> {
    pub(crate) state: &'a mut State,
    pub(crate) cost_functions: &'a mut CostFunctionStore,
    pub(crate) tracker: &'a mut ExplanationTracker,
    pub(crate) thresholds: Thresholds<'a>,
}

impl BackwardPass<'_> {
    pub(crate) fn run(mut self, root: &FailureRoot, tie_breaking: BottleneckTieBreaking) -> Trace {
        let mut lambda = MinLambda {
            value: self.state.upper_bound() - self.state.lower_bound(),
            bottleneck: None,
            tie_breaking,
        };
        let mut deferred = Vec::new();

        match root {
            FailureRoot::Variable(variable) => {
                let domain = self.state.domain(*variable).collect::<Vec<_>>();
                for index in domain {
                    let value = (*variable, index);
                    self.tracker.add_to_k(value, 1);
                    if self.thresholds.is_unary_zero(self.state, *variable, index) {
                        self.tracker.mark(value);
                    } else {
                        lambda.bound(self.state.unary_cost(*variable, index), 1, None);
                    }
                }
            }
            FailureRoot::Linear {
                cost_function,
                gap,
                witnesses,
            } => {
                let iteration = self.tracker.iteration();
                let CostFunction::Linear(linear) = &mut self.cost_functions[*cost_function] else {
                    unreachable!("failure roots only name linear cost functions")
                };
                linear.add_requests(iteration, 1);
                if let Some(gap) = gap {
                    lambda.bound(*gap, 1, Some(Bottleneck::CostFunction(*cost_function)));
                }
                request_witnesses(
                    self.state,
                    self.tracker,
                    &self.thresholds,
                    linear,
                    witnesses,
                    &mut lambda,
                );
            }
        }

        while let Some(value) = self.tracker.pop_removal() {
            if !self.tracker.is_marked(value) {
                continue;
            }
            self.tracker.push_traced(value);

            match self.tracker.explanation(value).cloned() {
                Some(Explanation::Pairwise(cost_function)) => {
                    self.trace_pairwise(cost_function, value, &mut lambda, &mut deferred)
                }
                Some(Explanation::Linear {
                    cost_function,
                    witnesses,
                }) => self.trace_linear(cost_function, value, &witnesses, &mut lambda),
                Some(Explanation::Unary) | None => {
                    unreachable!("marked values are removed by a cost function")
                }
            }
        }

        for pair in deferred {
            self.check_deferred(pair, &mut lambda);
        }

        trace!(
            "traced {} values, lambda {}",
            self.tracker.num_traced(),
            lambda.value
        );
        Trace {
            lambda: lambda.value,
            bottleneck: lambda.bottleneck,
        }
    }

    fn trace_pairwise(
        &mut self,
        cost_function: CostFunctionId,
        value: ValueRef,
        lambda: &mut MinLambda,
        deferred: &mut Vec<DeferredPair>,
    ) {
        let iteration = self.tracker.iteration();
        let CostFunction::Pairwise(pairwise) = &mut self.cost_functions[cost_function] else {
            unreachable!("pairwise killers name pairwise cost functions")
        };
        let (variable, index) = value;
        let side = pairwise.side_of(variable);
        let other_variable = pairwise.variable(side.other());
        let k = self.tracker.k(value);
        let threshold = self.thresholds.for_function(pairwise.threshold);

        let domain = self.state.domain(other_variable).collect::<Vec<_>>();
        for other in domain {
            let other_value = (other_variable, other);
            let cost = pairwise.cost(self.state, side, index, other);
            if !is_vac_zero(cost, threshold) {
                if self.tracker.explanation(other_value)
                    == Some(&Explanation::Pairwise(cost_function))
                {
                    deferred.push(DeferredPair {
                        cost_function,
                        side,
                        own: value,
                        other: other_value,
                    });
                    continue;
                }
                bound_pair(
                    self.state,
                    pairwise,
                    side,
                    index,
                    other,
                    k,
                    cost,
                    cost_function,
                    lambda,
                );
                continue;
            }

            self.tracker.add_zero_partner(value, other);
            let requested = pairwise.k(side.other(), other, iteration);
            if k <= requested {
                continue;
            }
            self.tracker.add_to_k(other_value, k - requested);
            pairwise.set_k(side.other(), other, iteration, k);
            request(
                self.state,
                self.tracker,
                &self.thresholds,
                other_value,
                lambda,
            );
        }
    }

    fn trace_linear(
        &mut self,
        cost_function: CostFunctionId,
        value: ValueRef,
        witnesses: &[ValueRef],
        lambda: &mut MinLambda,
    ) {
        let iteration = self.tracker.iteration();
        let CostFunction::Linear(linear) = &mut self.cost_functions[cost_function] else {
            unreachable!("linear explanations name linear cost functions")
        };
        let (variable, index) = value;
        let k = self.tracker.k(value);
        linear.add_requests(iteration, k);

        if let Some(position) = linear.position_of(variable) {
            if let Some(gap) = linear.explain_removal(self.state, position, index, witnesses) {
                lambda.bound(gap, k, Some(Bottleneck::CostFunction(cost_function)));
            }
        }

        request_witnesses(
            self.state,
            self.tracker,
            &self.thresholds,
            linear,
            witnesses,
            lambda,
        );
    }

    fn check_deferred(&mut self, pair: DeferredPair, lambda: &mut MinLambda) {
        let CostFunction::Pairwise(pairwise) = &self.cost_functions[pair.cost_function] else {
            unreachable!("deferred pairs belong to pairwise cost functions")
        };
        let mut k = self.tracker.k(pair.own);
        if self.tracker.is_marked(pair.other) {
            k += self.tracker.k(pair.other);
        }
        let cost = pairwise.cost(self.state, pair.side, pair.own.1, pair.other.1);
        bound_pair(
            self.state,
            pairwise,
            pair.side,
            pair.own.1,
            pair.other.1,
            k,
            cost,
            pair.cost_function,
            lambda,
        );
    }
}

/// Bounds the increase by a costly pair, or raises the pair if it is cut anyway.
#[allow(clippy::too_many_arguments, reason = "one pair of one function")]
fn bound_pair(
    state: &mut State,
    pairwise: &PairwiseCostFunction,
    side: Side,
    own: usize,
    other: usize,
    k: u64,
    cost: Cost,
    cost_function: CostFunctionId,
    lambda: &mut MinLambda,
) {
    if !state.is_cut(cost) {
        lambda.bound(cost, k, Some(Bottleneck::CostFunction(cost_function)));
    } else if cost / (k as Cost) < lambda.value {
        let needed = (k as Cost).saturating_mul(lambda.value);
        pairwise.inflate(state, side, own, other, needed - cost);
    }
}

/// Makes sure the linear function can extend its total request count from each witness.
fn request_witnesses(
    state: &State,
    tracker: &mut ExplanationTracker,
    thresholds: &Thresholds<'_>,
    linear: &mut LinearCostFunction,
    witnesses: &[ValueRef],
    lambda: &mut MinLambda,
) {
    let iteration = tracker.iteration();
    let total = linear.total_requests(iteration);
    for &(variable, index) in witnesses {
        let Some(position) = linear.position_of(variable) else {
            continue;
        };
        let requested = linear.requested(position, index, iteration);
        if total <= requested {
            continue;
        }
        tracker.add_to_k((variable, index), total - requested);
        linear.set_requested(position, index, iteration, total);
        request(state, tracker, thresholds, (variable, index), lambda);
    }
}

/// A value was asked for more cost: either it is traced further back, or its unary cost limits
/// the increase.
fn request(
    state: &State,
    tracker: &mut ExplanationTracker,
    thresholds: &Thresholds<'_>,
    value: ValueRef,
    lambda: &mut MinLambda,
) {
    let (variable, index) = value;
    if thresholds.is_unary_zero(state, variable, index) {
        tracker.mark(value);
    } else {
        lambda.bound(
            state.unary_cost(variable, index),
            tracker.k(value),
            Some(Bottleneck::Variable(variable)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    fn min_lambda(tie_breaking: BottleneckTieBreaking) -> MinLambda {
        MinLambda {
            value: 10,
            bottleneck: None,
            tie_breaking,
        }
    }

    #[test]
    fn the_smallest_quotient_wins() {
        let mut lambda = min_lambda(BottleneckTieBreaking::LowestId);
        lambda.bound(9, 2, None);
        lambda.bound(7, 1, None);

        assert_eq!(4, lambda.value);
        assert_eq!(None, lambda.bottleneck);
    }

    #[test]
    fn a_zero_quotient_names_its_bottleneck() {
        let c = CostFunctionId::create_from_index(3);
        let mut lambda = min_lambda(BottleneckTieBreaking::LowestId);
        lambda.bound(1, 2, Some(Bottleneck::CostFunction(c)));

        assert_eq!(0, lambda.value);
        assert_eq!(Some((Bottleneck::CostFunction(c), 1)), lambda.bottleneck);
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        let x = VariableId::create_from_index(0);
        let c1 = CostFunctionId::create_from_index(1);
        let c0 = CostFunctionId::create_from_index(0);
        let mut lambda = min_lambda(BottleneckTieBreaking::LowestId);

        lambda.bound(1, 3, Some(Bottleneck::Variable(x)));
        lambda.bound(2, 3, Some(Bottleneck::CostFunction(c1)));
        lambda.bound(1, 2, Some(Bottleneck::CostFunction(c0)));

        assert_eq!(Some((Bottleneck::CostFunction(c0), 1)), lambda.bottleneck);
    }

    #[test]
    fn first_found_keeps_the_first_bottleneck() {
        let x = VariableId::create_from_index(0);
        let c = CostFunctionId::create_from_index(0);
        let mut lambda = min_lambda(BottleneckTieBreaking::FirstFound);

        lambda.bound(1, 3, Some(Bottleneck::Variable(x)));
        lambda.bound(2, 3, Some(Bottleneck::CostFunction(c)));

        assert_eq!(Some((Bottleneck::Variable(x), 1)), lambda.bottleneck);
    }
}

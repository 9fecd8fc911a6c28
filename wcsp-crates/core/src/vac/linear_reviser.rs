use crate::basic_types::Cost;
use crate::cost_functions::linear_relaxation::solve;
use crate::cost_functions::linear_relaxation::RelaxationBound;
use crate::cost_functions::linear_relaxation::RelaxationItem;
use crate::cost_functions::LinearCostFunction;
use crate::engine::ledger::is_vac_zero;
use crate::engine::State;
use crate::vac::explanation::ValueRef;
use crate::vac::explanation::ExplanationTracker;

/// The outcome of checking a linear cost function against the relaxation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinearRevision {
    /// The function can be satisfied at zero cost; the listed values cannot be part of such an
    /// assignment. Each comes with the values whose earlier removal justifies it.
    Consistent {
        removals: Vec<(ValueRef, Box<[ValueRef]>)>,
    },
    /// Not even the heaviest remaining values reach the capacity.
    Infeasible { witnesses: Box<[ValueRef]> },
    /// Every assignment of the remaining values costs at least `gap`, which is not zero.
    Violated { gap: Cost, witnesses: Box<[ValueRef]> },
}

impl LinearCostFunction {
    /// Checks whether the function has a zero-cost assignment over the values remaining in the
    /// relaxation and removes the values which cannot take part in one.
    ///
    /// The state is not modified: removals are reported and handled by the caller. Checking stops
    /// after a removal which leaves a variable without remaining values.
    pub(crate) fn check_and_revise(
        &self,
        state: &State,
        tracker: &ExplanationTracker,
        threshold: Cost,
    ) -> LinearRevision {
        let mut removed_now: Vec<ValueRef> = Vec::new();
        let admissible = |removed_now: &[ValueRef], position: usize, index: usize| {
            let variable = self.variable(position);
            state.contains(variable, index) && !removed_now.contains(&(variable, index))
        };

        let mut max_weight = Vec::with_capacity(self.arity());
        for position in 0..self.arity() {
            let heaviest = state
                .domain(self.variable(position))
                .map(|index| self.weight(position, index))
                .max();
            match heaviest {
                Some(weight) => max_weight.push(weight),
                None => {
                    return LinearRevision::Infeasible {
                        witnesses: Box::new([]),
                    }
                }
            }
        }
        let total: i128 = max_weight.iter().map(|&weight| weight as i128).sum();
        if total < self.capacity() as i128 {
            let witnesses = self.removed_values(tracker, None, |position, index| {
                self.weight(position, index) > max_weight[position]
            });
            return LinearRevision::Infeasible { witnesses };
        }

        let lower_bound = self.lower_bound(state);
        let groups = (0..self.arity())
            .map(|position| {
                self.relaxation_items(state, position, |index| {
                    admissible(removed_now.as_slice(), position, index)
                })
            })
            .collect::<Vec<_>>();
        if let RelaxationBound::Bound(bound) = solve(&groups, self.capacity()) {
            let gap = (bound - lower_bound).max(0);
            if !is_vac_zero(gap, threshold) {
                let witnesses = self.removed_values(tracker, None, |_, _| true);
                return LinearRevision::Violated { gap, witnesses };
            }
        }

        let mut removals = Vec::new();
        for position in 0..self.arity() {
            let variable = self.variable(position);
            let candidates = state
                .domain(variable)
                .filter(|&index| admissible(removed_now.as_slice(), position, index))
                .collect::<Vec<_>>();

            for index in candidates {
                let gap = self.forced_gap(state, position, index, |other, other_index| {
                    admissible(removed_now.as_slice(), other, other_index)
                });
                let removable = match gap {
                    None => true,
                    Some(gap) => !is_vac_zero(gap, threshold),
                };
                if !removable {
                    continue;
                }

                let mut witnesses = self
                    .removed_values(tracker, Some(position), |_, _| true)
                    .into_vec();
                witnesses.extend(
                    removed_now
                        .iter()
                        .filter(|(removed_variable, _)| *removed_variable != variable),
                );
                removed_now.push((variable, index));
                removals.push(((variable, index), witnesses.into_boxed_slice()));

                let exhausted = state
                    .domain(variable)
                    .all(|remaining| !admissible(removed_now.as_slice(), position, remaining));
                if exhausted {
                    return LinearRevision::Consistent { removals };
                }
            }
        }

        LinearRevision::Consistent { removals }
    }

    /// The gap of the relaxation with the variable at `position` fixed to `index` and the other
    /// variables restricted to the values accepted by `admissible`. `None` when the capacity
    /// cannot be reached.
    pub(crate) fn forced_gap(
        &self,
        state: &State,
        position: usize,
        index: usize,
        admissible: impl Fn(usize, usize) -> bool,
    ) -> Option<Cost> {
        let groups = (0..self.arity())
            .map(|other| {
                if other == position {
                    vec![RelaxationItem {
                        index,
                        weight: self.weight(position, index),
                        cost: self.delta(state, position, index),
                        is_support: true,
                    }]
                } else {
                    self.relaxation_items(state, other, |other_index| {
                        admissible(other, other_index)
                    })
                }
            })
            .collect::<Vec<_>>();

        match solve(&groups, self.capacity()) {
            RelaxationBound::Infeasible => None,
            RelaxationBound::Bound(bound) => Some((bound - self.lower_bound(state)).max(0)),
        }
    }

    /// The gap justifying the removal of `index` at `position` once `witnesses` were gone,
    /// evaluated on the current domains.
    pub(crate) fn explain_removal(
        &self,
        state: &State,
        position: usize,
        index: usize,
        witnesses: &[ValueRef],
    ) -> Option<Cost> {
        self.forced_gap(state, position, index, |other, other_index| {
            !witnesses.contains(&(self.variable(other), other_index))
        })
    }

    /// The values of the scope removed from the relaxation in the current iteration, except for
    /// those of the variable at `skip`.
    fn removed_values(
        &self,
        tracker: &ExplanationTracker,
        skip: Option<usize>,
        keep: impl Fn(usize, usize) -> bool,
    ) -> Box<[ValueRef]> {
        (0..self.arity())
            .filter(|&position| Some(position) != skip)
            .flat_map(|position| {
                let variable = self.variable(position);
                (0..self.num_values(position))
                    .filter(move |&index| tracker.is_removed((variable, index)))
                    .filter(|&index| keep(position, index))
                    .map(move |index| (variable, index))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

use crate::basic_types::Cost;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::Stamp;
use crate::containers::Stamped;
use crate::cost_functions::CostFunctionId;
use crate::engine::variables::VariableId;

/// A value of a variable, by index.
pub(crate) type ValueRef = (VariableId, usize);

/// Why a value was removed from the relaxation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Explanation {
    /// Its own unary cost is not zero in the relaxation.
    Unary,
    /// It has no zero-cost support in a pairwise cost function.
    Pairwise(CostFunctionId),
    /// A linear cost function cannot be satisfied at zero cost with it, given that `witnesses`
    /// were already removed.
    Linear {
        cost_function: CostFunctionId,
        witnesses: Box<[ValueRef]>,
    },
}

/// The element the forward pass stopped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FailureRoot {
    /// Every value of the variable was removed.
    Variable(VariableId),
    /// A linear cost function cannot be satisfied at zero cost by the remaining values.
    Linear {
        cost_function: CostFunctionId,
        /// How far the relaxation is above zero; `None` if it is infeasible altogether.
        gap: Option<Cost>,
        witnesses: Box<[ValueRef]>,
    },
}

#[derive(Debug, Clone, Default)]
struct ValueRecord {
    removed: Stamp,
    explanation: Option<Explanation>,
    marked: Stamp,
    k: Stamped,
}

/// Per-iteration bookkeeping of the forward and backward passes.
///
/// Nothing in here is trailed; all records are tied to the iteration in which they were made.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExplanationTracker {
    values: KeyedVec<VariableId, Box<[ValueRecord]>>,
    iteration: u64,
    /// Values removed with a cost function as the reason, in removal order.
    removals: Vec<ValueRef>,
    /// Values traced by the backward pass; popping gives removal order again.
    traced: Vec<ValueRef>,
    /// For a traced value with a pairwise killer, the values of the other variable it relies on
    /// for its zero-cost pairs.
    zero_partners: HashMap<ValueRef, Vec<usize>>,
}

impl ExplanationTracker {
    pub(crate) fn register_variable(&mut self, variable: VariableId, size: usize) {
        self.values
            .accomodate(variable, Vec::new().into_boxed_slice());
        self.values[variable] = vec![ValueRecord::default(); size].into_boxed_slice();
    }

    pub(crate) fn iteration(&self) -> u64 {
        self.iteration
    }

    pub(crate) fn start_iteration(&mut self) {
        self.iteration += 1;
        self.removals.clear();
        self.traced.clear();
        self.zero_partners.clear();
    }

    pub(crate) fn record_removal(
        &mut self,
        (variable, index): ValueRef,
        explanation: Explanation,
    ) {
        let traceable = explanation != Explanation::Unary;
        let record = &mut self.values[variable][index];
        record.removed.set(self.iteration);
        record.explanation = Some(explanation);
        if traceable {
            self.removals.push((variable, index));
        }
    }

    pub(crate) fn is_removed(&self, (variable, index): ValueRef) -> bool {
        self.values[variable][index].removed.is_set(self.iteration)
    }

    pub(crate) fn explanation(&self, (variable, index): ValueRef) -> Option<&Explanation> {
        let record = &self.values[variable][index];
        if record.removed.is_set(self.iteration) {
            record.explanation.as_ref()
        } else {
            None
        }
    }

    /// The next value to trace back, latest removal first.
    pub(crate) fn pop_removal(&mut self) -> Option<ValueRef> {
        self.removals.pop()
    }

    pub(crate) fn num_removals(&self) -> usize {
        self.removals.len()
    }

    pub(crate) fn is_marked(&self, (variable, index): ValueRef) -> bool {
        self.values[variable][index].marked.is_set(self.iteration)
    }

    pub(crate) fn mark(&mut self, (variable, index): ValueRef) {
        self.values[variable][index].marked.set(self.iteration)
    }

    pub(crate) fn k(&self, (variable, index): ValueRef) -> u64 {
        self.values[variable][index].k.get(self.iteration)
    }

    pub(crate) fn add_to_k(&mut self, (variable, index): ValueRef, amount: u64) {
        self.values[variable][index].k.add(self.iteration, amount)
    }

    pub(crate) fn push_traced(&mut self, value: ValueRef) {
        self.traced.push(value)
    }

    /// The next traced value to repair, earliest removal first.
    pub(crate) fn pop_traced(&mut self) -> Option<ValueRef> {
        self.traced.pop()
    }

    pub(crate) fn num_traced(&self) -> usize {
        self.traced.len()
    }

    pub(crate) fn add_zero_partner(&mut self, value: ValueRef, other: usize) {
        self.zero_partners.entry(value).or_default().push(other)
    }

    pub(crate) fn zero_partners(&self, value: ValueRef) -> &[usize] {
        self.zero_partners.get(&value).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    fn tracker_with(sizes: &[usize]) -> ExplanationTracker {
        let mut tracker = ExplanationTracker::default();
        for (index, &size) in sizes.iter().enumerate() {
            tracker.register_variable(VariableId::create_from_index(index), size);
        }
        tracker.start_iteration();
        tracker
    }

    #[test]
    fn records_do_not_survive_the_iteration() {
        let x = VariableId::create_from_index(0);
        let mut tracker = tracker_with(&[2]);
        tracker.record_removal((x, 1), Explanation::Unary);
        tracker.add_to_k((x, 1), 3);
        tracker.mark((x, 0));

        assert!(tracker.is_removed((x, 1)));
        assert_eq!(3, tracker.k((x, 1)));

        tracker.start_iteration();

        assert!(!tracker.is_removed((x, 1)));
        assert_eq!(None, tracker.explanation((x, 1)));
        assert_eq!(0, tracker.k((x, 1)));
        assert!(!tracker.is_marked((x, 0)));
    }

    #[test]
    fn only_cost_function_removals_are_traced_back() {
        let x = VariableId::create_from_index(0);
        let y = VariableId::create_from_index(1);
        let c = CostFunctionId::create_from_index(0);
        let mut tracker = tracker_with(&[2, 2]);

        tracker.record_removal((x, 0), Explanation::Pairwise(c));
        tracker.record_removal((y, 1), Explanation::Unary);
        tracker.record_removal((y, 0), Explanation::Pairwise(c));

        assert_eq!(2, tracker.num_removals());
        assert_eq!(Some((y, 0)), tracker.pop_removal());
        assert_eq!(Some((x, 0)), tracker.pop_removal());
        assert_eq!(None, tracker.pop_removal());
    }

    #[test]
    fn traced_values_come_back_in_removal_order() {
        let x = VariableId::create_from_index(0);
        let mut tracker = tracker_with(&[3]);

        // The backward pass visits the latest removal first.
        tracker.push_traced((x, 2));
        tracker.push_traced((x, 0));

        assert_eq!(Some((x, 0)), tracker.pop_traced());
        assert_eq!(Some((x, 2)), tracker.pop_traced());
    }

    #[test]
    fn zero_partners_are_kept_per_value() {
        let x = VariableId::create_from_index(0);
        let mut tracker = tracker_with(&[2]);
        tracker.add_zero_partner((x, 1), 0);
        tracker.add_zero_partner((x, 1), 2);

        assert_eq!(&[0, 2], tracker.zero_partners((x, 1)));
        assert!(tracker.zero_partners((x, 0)).is_empty());

        tracker.start_iteration();
        assert!(tracker.zero_partners((x, 1)).is_empty());
    }
}

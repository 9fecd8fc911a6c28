use enum_map::Enum;
use enum_map::EnumMap;

use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::EmptyDomain;
use crate::basic_types::FORBIDDEN;
use crate::containers::Stamped;
use crate::engine::trailed::TrailedInteger;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::wcsp_assert_moderate;

/// The two positions in the scope of a [`PairwiseCostFunction`].
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    X,
    Y,
}

impl Side {
    pub(crate) fn other(self) -> Side {
        match self {
            Side::X => Side::Y,
            Side::Y => Side::X,
        }
    }
}

/// A cost table over two variables.
///
/// The current cost of a pair is the table entry minus the deltas of both values, where a delta
/// is the net amount projected from the function onto a unary cost. The table itself is trailed
/// so it can be raised temporarily during the backward pass.
#[derive(Debug, Clone)]
pub(crate) struct PairwiseCostFunction {
    scope: EnumMap<Side, VariableId>,
    sizes: EnumMap<Side, usize>,
    /// Row-major: the entry of `(a, b)` is at `a * sizes[Y] + b`.
    table: Box<[TrailedInteger]>,
    deltas: EnumMap<Side, Box<[TrailedInteger]>>,
    /// For each value, the index of the last known zero-cost partner (AC2001).
    supports: EnumMap<Side, Box<[usize]>>,
    /// How much of each value's Pass1 removal was requested through this function.
    k: EnumMap<Side, Box<[Stamped]>>,
    pub(crate) threshold: Cost,
}

impl PairwiseCostFunction {
    /// Creates the function from a table indexed by the value indices of `x` and `y`.
    pub(crate) fn new(
        state: &mut State,
        x: VariableId,
        y: VariableId,
        table: &[Vec<Cost>],
    ) -> PairwiseCostFunction {
        let size_x = state.initial_size(x);
        let size_y = state.initial_size(y);

        let cells = table
            .iter()
            .flatten()
            .map(|&cost| state.trailed_values.grow(cost.min(FORBIDDEN)))
            .collect();
        let mut deltas_for = |size: usize| -> Box<[TrailedInteger]> {
            (0..size).map(|_| state.trailed_values.grow(0)).collect()
        };
        let deltas = EnumMap::from_array([deltas_for(size_x), deltas_for(size_y)]);

        PairwiseCostFunction {
            scope: EnumMap::from_array([x, y]),
            sizes: EnumMap::from_array([size_x, size_y]),
            table: cells,
            deltas,
            supports: EnumMap::from_array([
                vec![0; size_x].into_boxed_slice(),
                vec![0; size_y].into_boxed_slice(),
            ]),
            k: EnumMap::from_array([
                vec![Stamped::default(); size_x].into_boxed_slice(),
                vec![Stamped::default(); size_y].into_boxed_slice(),
            ]),
            threshold: 0,
        }
    }

    pub(crate) fn variable(&self, side: Side) -> VariableId {
        self.scope[side]
    }

    pub(crate) fn side_of(&self, variable: VariableId) -> Side {
        if self.scope[Side::X] == variable {
            Side::X
        } else {
            wcsp_assert_moderate!(self.scope[Side::Y] == variable);
            Side::Y
        }
    }

    fn cell(&self, side: Side, own: usize, other: usize) -> TrailedInteger {
        let (a, b) = match side {
            Side::X => (own, other),
            Side::Y => (other, own),
        };
        self.table[a * self.sizes[Side::Y] + b]
    }

    /// The current cost of `own` on `side` together with `other` on the other side.
    pub(crate) fn cost(&self, state: &State, side: Side, own: usize, other: usize) -> Cost {
        let entry = state.trailed_values.read(self.cell(side, own, other));
        if entry.is_forbidden() {
            return FORBIDDEN;
        }
        let own_delta = state.trailed_values.read(self.deltas[side][own]);
        let other_delta = state.trailed_values.read(self.deltas[side.other()][other]);
        entry.sub_saturating(own_delta).sub_saturating(other_delta)
    }

    /// Moves `cost` from every pair containing `own` to its unary cost.
    pub(crate) fn project(
        &self,
        state: &mut State,
        side: Side,
        own: usize,
        cost: Cost,
    ) -> Result<(), EmptyDomain> {
        if cost == 0 {
            return Ok(());
        }
        state
            .trailed_values
            .add_assign(self.deltas[side][own], cost);
        state.project_unary(self.scope[side], own, cost)
    }

    /// Moves `cost` from the unary cost of `own` to every pair containing it.
    pub(crate) fn extend(&self, state: &mut State, side: Side, own: usize, cost: Cost) {
        if cost == 0 {
            return;
        }
        state.extend_unary(self.scope[side], own, cost);
        state
            .trailed_values
            .add_assign(self.deltas[side][own], -cost);
    }

    /// Raises a single entry by `amount`; only used on entries which are already cut.
    pub(crate) fn inflate(
        &self,
        state: &mut State,
        side: Side,
        own: usize,
        other: usize,
        amount: Cost,
    ) {
        let cell = self.cell(side, own, other);
        let raised = state.trailed_values.read(cell).add_saturating(amount);
        state.trailed_values.assign(cell, raised);
    }

    /// The smallest cost of `own` over the current domain of the other variable.
    pub(crate) fn min_cost(&self, state: &State, side: Side, own: usize) -> Cost {
        state
            .domain(self.scope[side.other()])
            .map(|other| self.cost(state, side, own, other))
            .min()
            .unwrap_or(FORBIDDEN)
    }

    pub(crate) fn support(&self, side: Side, own: usize) -> usize {
        self.supports[side][own]
    }

    pub(crate) fn set_support(&mut self, side: Side, own: usize, other: usize) {
        self.supports[side][own] = other;
    }

    pub(crate) fn reset_supports(&mut self) {
        self.supports
            .values_mut()
            .for_each(|supports| supports.fill(0));
    }

    pub(crate) fn k(&self, side: Side, own: usize, iteration: u64) -> u64 {
        self.k[side][own].get(iteration)
    }

    pub(crate) fn set_k(&mut self, side: Side, own: usize, iteration: u64, value: u64) {
        self.k[side][own].set(iteration, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_booleans(table: &[Vec<Cost>]) -> (State, PairwiseCostFunction) {
        let mut state = State::new(100);
        let x = state.new_variable(Some("x"), vec![0, 1]).expect("values");
        let y = state.new_variable(Some("y"), vec![0, 1]).expect("values");
        let function = PairwiseCostFunction::new(&mut state, x, y, table);
        (state, function)
    }

    #[test]
    fn costs_are_read_from_both_sides() {
        let (state, function) = two_booleans(&[vec![0, 3], vec![5, 0]]);

        assert_eq!(3, function.cost(&state, Side::X, 0, 1));
        assert_eq!(3, function.cost(&state, Side::Y, 1, 0));
        assert_eq!(5, function.cost(&state, Side::Y, 0, 1));
    }

    #[test]
    fn projection_and_extension_preserve_the_total() {
        let (mut state, function) = two_booleans(&[vec![2, 3], vec![5, 0]]);
        let x = function.variable(Side::X);

        function
            .project(&mut state, Side::X, 0, 2)
            .expect("no removal");
        assert_eq!(0, function.cost(&state, Side::X, 0, 0));
        assert_eq!(1, function.cost(&state, Side::X, 0, 1));
        assert_eq!(2, state.unary_cost(x, 0));

        function.extend(&mut state, Side::X, 0, 1);
        assert_eq!(1, function.cost(&state, Side::X, 0, 0));
        assert_eq!(1, state.unary_cost(x, 0));
    }

    #[test]
    fn forbidden_entries_ignore_deltas() {
        let (mut state, function) = two_booleans(&[vec![FORBIDDEN, 1], vec![1, 1]]);

        function
            .project(&mut state, Side::X, 0, 1)
            .expect("no removal");

        assert_eq!(FORBIDDEN, function.cost(&state, Side::X, 0, 0));
        assert_eq!(0, function.cost(&state, Side::X, 0, 1));
    }

    #[test]
    fn inflation_is_undone_by_restoring() {
        let (mut state, function) = two_booleans(&[vec![0, 7], vec![0, 0]]);
        state.new_checkpoint();

        function.inflate(&mut state, Side::Y, 1, 0, 5);
        assert_eq!(12, function.cost(&state, Side::X, 0, 1));

        state.restore_to(0);
        assert_eq!(7, function.cost(&state, Side::X, 0, 1));
    }

    #[test]
    fn minimum_follows_the_domain_of_the_other_variable() {
        let (mut state, function) = two_booleans(&[vec![1, 4], vec![0, 0]]);
        state.new_checkpoint();

        assert_eq!(1, function.min_cost(&state, Side::X, 0));
        state
            .remove(function.variable(Side::Y), 0)
            .expect("value 1 remains");
        assert_eq!(4, function.min_cost(&state, Side::X, 0));
    }
}

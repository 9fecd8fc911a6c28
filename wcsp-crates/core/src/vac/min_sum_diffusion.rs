use log::debug;

use crate::basic_types::EmptyDomain;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionStore;
use crate::engine::variables::VariableId;
use crate::engine::State;

/// Averages every unary cost with the smallest cost of its rows in the incident pairwise
/// functions, moving half of the difference. Stops after `max_iterations` rounds or once a round
/// changes nothing, and returns the number of rounds.
pub(crate) fn min_sum_diffusion(
    state: &mut State,
    cost_functions: &CostFunctionStore,
    max_iterations: usize,
) -> Result<usize, EmptyDomain> {
    let mut num_iterations = 0;
    while num_iterations < max_iterations {
        num_iterations += 1;
        let mut num_changed = 0;
        for variable in state.variable_ids().collect::<Vec<_>>() {
            if average(state, cost_functions, variable)? {
                num_changed += 1;
                state.find_support(variable);
            }
        }
        debug!("min-sum diffusion round {num_iterations} changed {num_changed} variables");
        if num_changed == 0 {
            break;
        }
    }
    Ok(num_iterations)
}

fn average(
    state: &mut State,
    cost_functions: &CostFunctionStore,
    variable: VariableId,
) -> Result<bool, EmptyDomain> {
    let mut changed = false;
    for cost_function in state.cost_functions_of(variable).to_vec() {
        let CostFunction::Pairwise(pairwise) = &cost_functions[cost_function] else {
            continue;
        };
        let side = pairwise.side_of(variable);
        let domain = state.domain(variable).collect::<Vec<_>>();
        for index in domain {
            let row_minimum = pairwise.min_cost(state, side, index);
            let unary = state.unary_cost(variable, index);
            if state.is_cut(row_minimum) || state.is_cut(unary) {
                continue;
            }
            let shift = (unary - row_minimum) / 2;
            if shift > 0 {
                pairwise.extend(state, side, index, shift);
                changed = true;
            } else if shift < 0 {
                pairwise.project(state, side, index, -shift)?;
                changed = true;
            }
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::KeyedVec;
    use crate::cost_functions::PairwiseCostFunction;
    use crate::cost_functions::Side;

    #[test]
    fn costs_meet_halfway() {
        let mut state = State::new(100);
        let x = state.new_variable(None, vec![0, 1]).expect("values");
        let y = state.new_variable(None, vec![0, 1]).expect("values");
        state.set_unary_cost(x, 0, 6);
        let pairwise = PairwiseCostFunction::new(&mut state, x, y, &[vec![0, 0], vec![4, 4]]);
        let mut cost_functions = KeyedVec::default();
        let id = cost_functions.push(CostFunction::Pairwise(pairwise));
        state.attach(x, id);
        state.attach(y, id);

        let rounds = min_sum_diffusion(&mut state, &cost_functions, 1).expect("no wipeout");

        let CostFunction::Pairwise(pairwise) = &cost_functions[id] else {
            unreachable!()
        };
        assert_eq!(1, rounds);
        assert_eq!(vec![3, 2], vec![state.unary_cost(x, 0), state.unary_cost(x, 1)]);
        assert_eq!(vec![1, 1], vec![state.unary_cost(y, 0), state.unary_cost(y, 1)]);
        assert_eq!(2, pairwise.cost(&state, Side::X, 0, 0));
        assert_eq!(2, pairwise.cost(&state, Side::X, 0, 1));
        assert_eq!(1, pairwise.cost(&state, Side::X, 1, 0));
        assert_eq!(1, pairwise.cost(&state, Side::X, 1, 1));
    }
}

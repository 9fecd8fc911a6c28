use log::debug;
use log::trace;
use log::warn;

use crate::basic_types::is_satisfaction_problem;
use crate::basic_types::Cost;
use crate::basic_types::EnforceError;
use crate::basic_types::Tightened;
use crate::basic_types::MIN_COST;
use crate::basic_types::UNIT_COST;
use crate::containers::KeyedVec;
use crate::cost_functions::CostFunction;
use crate::cost_functions::CostFunctionStore;
use crate::create_statistics_struct;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::VariableId;
use crate::engine::State;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::vac::backward_pass::BackwardPass;
use crate::vac::backward_pass::Bottleneck;
use crate::vac::explanation::ExplanationTracker;
use crate::vac::explanation::ValueRef;
use crate::vac::forward_pass::ForwardPass;
use crate::vac::relaxation::Thresholds;
use crate::vac::repair::repair;
use crate::vac::threshold::ThresholdSchedule;
use crate::vac::worklist::VariableQueue;
use crate::vac::VacOptions;

create_statistics_struct!(
    /// Counters of the virtual arc consistency enforcement.
    VacStatistics {
        num_iterations: usize,
        num_lower_bound_increases: usize,
        sum_lower_bound_increases: Cost,
        /// Total number of values moved through by successful repairs.
        sum_traced_values: usize,
        sum_max_k: u64,
        max_k: u64,
        num_times_vac: usize,
        num_cycle_breaks: usize,
        num_contradictions: usize,
    }
);

/// Enforces virtual arc consistency by repeatedly solving Bool(P) at decreasing thresholds and
/// turning each failure into a lower bound increase.
#[derive(Debug, Clone)]
pub(crate) struct VacController {
    options: VacOptions,
    schedule: ThresholdSchedule,
    tracker: ExplanationTracker,
    queue: VariableQueue,
    seek_support: VariableQueue,
    /// Local thresholds raised on variables to break cycles; reset on every call.
    variable_thresholds: KeyedVec<VariableId, Cost>,
    support_hints: Vec<ValueRef>,
    bool_p_supports: KeyedVec<VariableId, Option<usize>>,
    statistics: VacStatistics,
}

impl VacController {
    pub(crate) fn new(options: VacOptions) -> Self {
        VacController {
            options,
            schedule: ThresholdSchedule::default(),
            tracker: ExplanationTracker::default(),
            queue: VariableQueue::default(),
            seek_support: VariableQueue::default(),
            variable_thresholds: KeyedVec::default(),
            support_hints: Vec::new(),
            bool_p_supports: KeyedVec::default(),
            statistics: VacStatistics::default(),
        }
    }

    pub(crate) fn options(&self) -> &VacOptions {
        &self.options
    }

    /// Feeds a cost of the problem to the threshold schedule.
    pub(crate) fn record_cost(&mut self, cost: Cost) {
        self.schedule.record(cost);
    }

    /// The value with zero unary cost found in the last consistent Bool(P) of `variable`.
    pub(crate) fn vac_support(&self, variable: VariableId) -> Option<usize> {
        self.bool_p_supports.get(variable).copied().flatten()
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }

    #[cfg(test)]
    pub(crate) fn statistics(&self) -> VacStatistics {
        self.statistics
    }

    /// Raises the lower bound as far as virtual arc consistency allows.
    ///
    /// The changes are made inside the current checkpoint. When `termination` triggers, every
    /// change of this call is undone before [`EnforceError::Interrupted`] is returned.
    pub(crate) fn enforce(
        &mut self,
        state: &mut State,
        cost_functions: &mut CostFunctionStore,
        termination: &mut impl TerminationCondition,
    ) -> Result<Tightened, EnforceError> {
        let depth = state.get_checkpoint();
        if self.options.max_depth.is_some_and(|max_depth| depth >= max_depth) {
            trace!("skipping VAC at depth {depth}");
            return Ok(Tightened::default());
        }
        self.register_variables(state);

        state.new_checkpoint();
        let result = self.enforce_thresholds(state, cost_functions, termination, depth);
        match result {
            Err(EnforceError::Interrupted) => {
                debug!("VAC interrupted, restoring depth {depth}");
                state.restore_to(depth);
            }
            Err(EnforceError::Contradiction) => {
                self.statistics.num_contradictions += 1;
                state.commit_checkpoint();
            }
            Ok(_) => state.commit_checkpoint(),
        }
        result
    }

    fn register_variables(&mut self, state: &State) {
        for variable in state.variable_ids() {
            if self.variable_thresholds.get(variable).is_some() {
                continue;
            }
            self.tracker
                .register_variable(variable, state.initial_size(variable));
            self.variable_thresholds.accomodate(variable, MIN_COST);
            self.bool_p_supports.accomodate(variable, None);
        }
    }

    fn reset_supports(cost_functions: &mut CostFunctionStore) {
        for cost_function in cost_functions.iter_mut() {
            if let CostFunction::Pairwise(pairwise) = cost_function {
                pairwise.reset_supports();
            }
        }
    }

    fn enforce_thresholds(
        &mut self,
        state: &mut State,
        cost_functions: &mut CostFunctionStore,
        termination: &mut impl TerminationCondition,
        depth: usize,
    ) -> Result<Tightened, EnforceError> {
        if state.is_cut(MIN_COST) {
            return Err(EnforceError::Contradiction);
        }
        let at_root = depth == 0;
        let initial_lower_bound = state.lower_bound();

        self.reset_local_thresholds(cost_functions);
        Self::reset_supports(cost_functions);
        self.support_hints.clear();

        let mut threshold = self.schedule.initialise(state.upper_bound(), &self.options);
        let mut num_cycle_breaks = 0;
        let mut num_increases = 0;
        debug!(
            "enforcing VAC from threshold {threshold}, lb {initial_lower_bound}, ub {}",
            state.upper_bound()
        );

        while threshold > MIN_COST {
            self.statistics.num_iterations += 1;
            self.tracker.start_iteration();
            let iteration_checkpoint = state.get_checkpoint();
            state.new_checkpoint();

            let root = ForwardPass {
                state: &mut *state,
                cost_functions: &mut *cost_functions,
                tracker: &mut self.tracker,
                queue: &mut self.queue,
                seek_support: &mut self.seek_support,
                thresholds: Thresholds {
                    global: threshold,
                    variables: &self.variable_thresholds,
                },
            }
            .run(termination)?;

            let Some(root) = root else {
                if self.has_local_thresholds(cost_functions) {
                    // Consistent only because of broken cycles; retry without them.
                    state.restore_to(iteration_checkpoint);
                    num_cycle_breaks += 1;
                    self.reset_local_thresholds(cost_functions);
                    Self::reset_supports(cost_functions);
                    if num_cycle_breaks > self.options.max_cycle_breaks {
                        debug!("giving up on threshold {threshold} after {num_cycle_breaks} breaks");
                        threshold = MIN_COST;
                    } else {
                        debug!("Bool(P) is consistent with local thresholds, retrying {threshold}");
                    }
                    continue;
                }
                self.statistics.num_times_vac += 1;
                if self.options.value_heuristic {
                    self.collect_support_hints(state, depth <= 1);
                }
                state.restore_to(iteration_checkpoint);
                threshold = self.schedule.next(at_root, &self.options);
                Self::reset_supports(cost_functions);
                debug!("Bool(P) is consistent, next threshold {threshold}");
                continue;
            };
            trace!(
                "Bool(P) fails at {root:?} after {} removals",
                self.tracker.num_removals()
            );
            state.restore_to(iteration_checkpoint);

            if is_satisfaction_problem(state.lower_bound(), state.upper_bound()) {
                return Err(EnforceError::Contradiction);
            }

            let trace = BackwardPass {
                state: &mut *state,
                cost_functions: &mut *cost_functions,
                tracker: &mut self.tracker,
                thresholds: Thresholds {
                    global: threshold,
                    variables: &self.variable_thresholds,
                },
            }
            .run(&root, self.options.bottleneck_tie_breaking);

            if trace.lambda < UNIT_COST {
                num_cycle_breaks += 1;
                self.statistics.num_cycle_breaks += 1;
                if let Some((bottleneck, cost)) = trace.bottleneck {
                    debug!("breaking a cycle at {bottleneck:?} with threshold {}", cost + 1);
                    self.raise_local_threshold(cost_functions, bottleneck, cost + UNIT_COST);
                }
                if num_cycle_breaks > self.options.max_cycle_breaks {
                    debug!("giving up on threshold {threshold} after {num_cycle_breaks} breaks");
                    threshold = MIN_COST;
                }
                continue;
            }
            if state.is_cut(trace.lambda) {
                return Err(EnforceError::Contradiction);
            }

            let summary = repair(
                state,
                cost_functions,
                &mut self.tracker,
                &root,
                trace.lambda,
            )?;
            num_increases += 1;
            self.statistics.num_lower_bound_increases += 1;
            self.statistics.sum_lower_bound_increases += trace.lambda;
            self.statistics.sum_traced_values += summary.num_repaired;
            self.statistics.sum_max_k += summary.max_k;
            self.statistics.max_k = self.statistics.max_k.max(summary.max_k);
            debug!(
                "lb {} after an increase of {} through {} values",
                state.lower_bound(),
                trace.lambda,
                summary.num_repaired
            );
        }

        self.install_support_hints(state);

        Ok(Tightened {
            lower_bound_increase: state.lower_bound() - initial_lower_bound,
            num_increases,
        })
    }

    fn has_local_thresholds(&self, cost_functions: &CostFunctionStore) -> bool {
        self.variable_thresholds
            .iter()
            .any(|&threshold| threshold > MIN_COST)
            || cost_functions
                .iter()
                .any(|cost_function| cost_function.threshold() > MIN_COST)
    }

    fn reset_local_thresholds(&mut self, cost_functions: &mut CostFunctionStore) {
        self.variable_thresholds
            .iter_mut()
            .for_each(|threshold| *threshold = MIN_COST);
        for cost_function in cost_functions.iter_mut() {
            cost_function.set_threshold(MIN_COST);
        }
    }

    fn raise_local_threshold(
        &mut self,
        cost_functions: &mut CostFunctionStore,
        bottleneck: Bottleneck,
        threshold: Cost,
    ) {
        match bottleneck {
            Bottleneck::CostFunction(cost_function) => {
                cost_functions[cost_function].set_threshold(threshold)
            }
            Bottleneck::Variable(variable) => self.variable_thresholds[variable] = threshold,
        }
    }

    /// Remembers, in the Bool(P)-consistent state, a value with zero unary cost per variable.
    fn collect_support_hints(&mut self, state: &State, all_variables: bool) {
        self.support_hints.clear();
        let variables = if all_variables {
            self.seek_support.clear();
            state.variable_ids().collect::<Vec<_>>()
        } else {
            std::iter::from_fn(|| self.seek_support.pop()).collect()
        };

        for variable in variables {
            let zero_cost = state
                .domain(variable)
                .find(|&index| state.unary_cost(variable, index) == MIN_COST);
            if let Some(index) = zero_cost {
                self.support_hints.push((variable, index));
            }
        }
    }

    fn install_support_hints(&mut self, state: &mut State) {
        for (variable, index) in self.support_hints.drain(..) {
            if state.contains(variable, index) && state.unary_cost(variable, index) == MIN_COST {
                state.set_support(variable, index);
                self.bool_p_supports[variable] = Some(index);
            } else {
                warn!(
                    "rejected VAC support {}={}",
                    state.name(variable),
                    state.value(variable, index)
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    use crate::options::VacOptions;
    use crate::termination::Indefinite;
    use crate::termination::PollBudget;
    use crate::Cost;
    use crate::EnforceError;
    use crate::LinearTerm;
    use crate::VariableId;
    use crate::Wcsp;

    fn booleans(wcsp: &mut Wcsp, count: usize) -> Vec<VariableId> {
        (0..count)
            .map(|_| wcsp.new_variable([0, 1]).expect("two values"))
            .collect()
    }

    /// Four Booleans in a cycle where each function only charges (0, 1), with unary costs on
    /// x1 = 1 and x3 = 0. Every assignment costs at least one.
    fn unit_cycle(upper_bound: Cost, options: VacOptions) -> (Wcsp, Vec<VariableId>) {
        let mut wcsp = Wcsp::with_options(upper_bound, options);
        let x = booleans(&mut wcsp, 4);
        for i in 0..4 {
            let _ = wcsp
                .add_pairwise(x[i], x[(i + 1) % 4], &[vec![0, 1], vec![0, 0]])
                .expect("valid table");
        }
        wcsp.set_unary_cost(x[0], 1, 1).expect("known value");
        wcsp.set_unary_cost(x[2], 0, 1).expect("known value");
        (wcsp, x)
    }

    fn all_assignments(wcsp: &Wcsp) -> Vec<Vec<i32>> {
        wcsp.variables()
            .map(|variable| wcsp.domain(variable).collect::<Vec<_>>())
            .multi_cartesian_product()
            .collect()
    }

    fn assignment_costs(wcsp: &Wcsp) -> Vec<Cost> {
        all_assignments(wcsp)
            .iter()
            .map(|assignment| wcsp.assignment_cost(assignment).expect("complete assignment"))
            .collect()
    }

    #[test]
    fn diagonal_supports_beyond_the_upper_bound_move_nothing() {
        let mut wcsp = Wcsp::new(3);
        let x = booleans(&mut wcsp, 2);
        let _ = wcsp
            .add_pairwise(x[0], x[1], &[vec![0, 5], vec![5, 0]])
            .expect("valid table");

        let result = wcsp.enforce_vac(&mut Indefinite);

        assert_eq!(Ok(0), result.map(|tightened| tightened.lower_bound_increase));
        assert_eq!(0, wcsp.lower_bound());
    }

    #[test]
    fn satisfiable_diagonal_keeps_the_lower_bound() {
        let mut wcsp = Wcsp::new(1);
        let x = booleans(&mut wcsp, 2);
        let _ = wcsp
            .add_pairwise(x[0], x[1], &[vec![0, 2], vec![2, 0]])
            .expect("valid table");

        assert!(wcsp.enforce_vac(&mut Indefinite).is_ok());
        assert_eq!(0, wcsp.lower_bound());
        assert!(wcsp.domain(x[0]).eq([0, 1]));
    }

    #[test]
    fn unreachable_capacity_is_a_contradiction() {
        let mut wcsp = Wcsp::default();
        let x = booleans(&mut wcsp, 3);
        let terms = x
            .iter()
            .map(|&variable| LinearTerm::new(variable, vec![(1, 3)], 0))
            .collect::<Vec<_>>();
        let _ = wcsp.add_linear(&terms, 6).expect("valid linear function");
        for &variable in &x {
            wcsp.remove_value(variable, 1).expect("value 0 remains");
        }

        assert_eq!(
            Err(EnforceError::Contradiction),
            wcsp.enforce_vac(&mut Indefinite)
        );
    }

    #[test]
    fn a_cycle_raises_the_lower_bound_once() {
        let (mut wcsp, _) = unit_cycle(100, VacOptions::default());
        let before = assignment_costs(&wcsp);

        let tightened = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        assert_eq!(1, tightened.lower_bound_increase);
        assert_eq!(1, wcsp.lower_bound());
        assert_eq!(before, assignment_costs(&wcsp));
    }

    #[test]
    fn enforcing_twice_changes_nothing_more() {
        let (mut wcsp, _) = unit_cycle(100, VacOptions::default());
        let _ = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");
        let costs = assignment_costs(&wcsp);

        let tightened = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        assert_eq!(0, tightened.lower_bound_increase);
        assert_eq!(1, wcsp.lower_bound());
        assert_eq!(costs, assignment_costs(&wcsp));
    }

    #[test]
    fn knapsack_lower_bound_pays_for_the_cheapest_items() {
        let mut wcsp = Wcsp::default();
        let x = booleans(&mut wcsp, 3);
        for &variable in &x {
            wcsp.set_unary_cost(variable, 1, 1).expect("known value");
        }
        let terms = x
            .iter()
            .map(|&variable| LinearTerm::new(variable, vec![(1, 3)], 0))
            .collect::<Vec<_>>();
        let _ = wcsp.add_linear(&terms, 6).expect("valid linear function");

        let tightened = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        assert_eq!(2, tightened.lower_bound_increase);
        assert_eq!(2, wcsp.assignment_cost(&[1, 1, 0]).expect("complete"));
        assert_eq!(3, wcsp.assignment_cost(&[1, 1, 1]).expect("complete"));
    }

    #[test]
    fn a_failing_relaxation_below_the_upper_bound_is_a_contradiction() {
        let (mut wcsp, _) = unit_cycle(1, VacOptions::default());

        assert_eq!(
            Err(EnforceError::Contradiction),
            wcsp.enforce_vac(&mut Indefinite)
        );
    }

    #[test]
    fn interrupted_enforcement_leaves_the_problem_untouched() {
        let (mut wcsp, x) = unit_cycle(100, VacOptions::default());
        let costs = assignment_costs(&wcsp);
        let unary = x
            .iter()
            .map(|&variable| wcsp.unary_cost(variable, 0).expect("known value"))
            .collect::<Vec<_>>();

        let result = wcsp.enforce_vac(&mut PollBudget::new(0));

        assert_eq!(Err(EnforceError::Interrupted), result);
        assert_eq!(0, wcsp.get_checkpoint());
        assert_eq!(0, wcsp.lower_bound());
        assert_eq!(costs, assignment_costs(&wcsp));
        assert!(x
            .iter()
            .zip(unary)
            .all(|(&variable, cost)| wcsp.unary_cost(variable, 0) == Ok(cost)));
    }

    #[test]
    fn enforcement_is_skipped_beyond_the_maximum_depth() {
        let options = VacOptions {
            max_depth: Some(1),
            ..VacOptions::default()
        };
        let (mut wcsp, _) = unit_cycle(100, options);
        wcsp.new_checkpoint();

        let tightened = wcsp.enforce_vac(&mut Indefinite).expect("skipped");

        assert_eq!(0, tightened.num_increases);
        assert_eq!(0, wcsp.lower_bound());
    }

    #[test]
    fn changes_below_a_checkpoint_are_undone_by_restoring_it() {
        let (mut wcsp, x) = unit_cycle(100, VacOptions::default());
        wcsp.new_checkpoint();

        let _ = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");
        assert_eq!(1, wcsp.lower_bound());
        assert_eq!(1, wcsp.get_checkpoint());

        wcsp.restore_to(0);
        assert_eq!(0, wcsp.lower_bound());
        assert_eq!(Ok(1), wcsp.unary_cost(x[0], 1));
    }

    #[test]
    fn supports_have_zero_unary_cost() {
        let (mut wcsp, x) = unit_cycle(100, VacOptions::default());

        let _ = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        for &variable in &x {
            let support = wcsp.vac_support(variable).expect("consistent relaxation");
            assert_eq!(Ok(0), wcsp.unary_cost(variable, support));
        }
    }

    #[test]
    fn consistency_under_raised_local_thresholds_is_retried() {
        let options = VacOptions {
            max_cycle_breaks: 2,
            ..VacOptions::default()
        };
        let mut wcsp = Wcsp::with_options(100, options);
        let [p, v, y] = [(); 3].map(|_| wcsp.new_variable([0, 1]).expect("two values"));
        let _ = wcsp
            .add_pairwise(y, v, &[vec![0, 5], vec![5, 0]])
            .expect("valid table");
        let _ = wcsp
            .add_pairwise(y, v, &[vec![0, 0], vec![0, 5]])
            .expect("valid table");
        let _ = wcsp
            .add_pairwise(v, p, &[vec![1, 0], vec![0, 5]])
            .expect("valid table");
        wcsp.set_unary_cost(p, 1, 5).expect("known value");
        let before = assignment_costs(&wcsp);

        let tightened = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        // Bool(P) only becomes consistent once the (v, p) function hides its unit cost.
        let statistics = wcsp.vac_statistics();
        assert_eq!(0, statistics.num_times_vac);
        assert_eq!(2, statistics.num_cycle_breaks);
        assert_eq!(0, tightened.lower_bound_increase);
        assert_eq!(before, assignment_costs(&wcsp));
    }

    #[test]
    fn pairs_below_the_threshold_are_traced_as_zero_cost() {
        let options = VacOptions {
            histogram_packet_size: 1,
            ..VacOptions::default()
        };
        let mut wcsp = Wcsp::with_options(100, options);
        let [p, v, y] = [(); 3].map(|_| wcsp.new_variable([0, 1]).expect("two values"));
        let _ = wcsp
            .add_pairwise(y, v, &[vec![0, 5], vec![5, 0]])
            .expect("valid table");
        let _ = wcsp
            .add_pairwise(y, v, &[vec![0, 0], vec![0, 5]])
            .expect("valid table");
        let _ = wcsp
            .add_pairwise(v, p, &[vec![1, 5], vec![5, 0]])
            .expect("valid table");
        wcsp.set_unary_cost(p, 0, 5).expect("known value");
        let before = assignment_costs(&wcsp);

        let _ = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

        // At threshold 5 the unit cost of (v = 0, p = 0) is zero, so p = 0 pays instead of
        // turning the pair into a bottleneck.
        assert!(wcsp.lower_bound() >= 2);
        assert!(wcsp.lower_bound() <= 5);
        assert_eq!(before, assignment_costs(&wcsp));
    }

    #[test]
    fn random_problems_with_linear_functions_are_relaxed_soundly() {
        let options = VacOptions {
            max_cycle_breaks: 100,
            ..VacOptions::default()
        };
        let mut rng = SmallRng::seed_from_u64(172);
        let mut num_contradictions = 0;
        for _ in 0..100 {
            let upper_bound = if rng.gen_bool(0.5) {
                1000
            } else {
                rng.gen_range(4..16)
            };
            let mut wcsp = Wcsp::with_options(upper_bound, options);
            let x = (0..4)
                .map(|_| {
                    let size = rng.gen_range(2..=3);
                    wcsp.new_variable(0..size).expect("values")
                })
                .collect::<Vec<_>>();
            for &variable in &x {
                for value in 0..wcsp.domain(variable).count() as i32 {
                    wcsp.set_unary_cost(variable, value, rng.gen_range(0..4))
                        .expect("known value");
                }
            }
            for (i, j) in (0..4).tuple_combinations() {
                if rng.gen_bool(0.5) {
                    continue;
                }
                let table = (0..wcsp.domain(x[i]).count())
                    .map(|_| {
                        (0..wcsp.domain(x[j]).count())
                            .map(|_| rng.gen_range(0..4))
                            .collect::<Vec<Cost>>()
                    })
                    .collect::<Vec<_>>();
                let _ = wcsp.add_pairwise(x[i], x[j], &table).expect("valid table");
            }
            for _ in 0..rng.gen_range(1..=2) {
                let scope_size = rng.gen_range(2..=3);
                let first = rng.gen_range(0..4);
                let mut max_weight = 0;
                let mut terms = Vec::new();
                for offset in 0..scope_size {
                    let variable = x[(first + offset) % 4];
                    let weights = wcsp
                        .domain(variable)
                        .map(|value| (value, rng.gen_range(0..4)))
                        .collect::<Vec<(i32, i64)>>();
                    max_weight += weights.iter().map(|&(_, weight)| weight).max().unwrap_or(0);
                    terms.push(LinearTerm::new(variable, weights, 0));
                }
                let capacity = rng.gen_range(0..=max_weight + 1);
                let _ = wcsp.add_linear(&terms, capacity).expect("valid linear function");
            }

            let assignments = all_assignments(&wcsp);
            let cost_of = |wcsp: &Wcsp| {
                assignments
                    .iter()
                    .map(|assignment| {
                        wcsp.assignment_cost(assignment)
                            .expect("complete assignment")
                    })
                    .collect::<Vec<_>>()
            };
            let before = cost_of(&wcsp);
            let optimum = before.iter().copied().min().expect("assignments exist");

            match wcsp.enforce_vac(&mut Indefinite) {
                Err(EnforceError::Contradiction) => {
                    num_contradictions += 1;
                    assert!(optimum >= upper_bound);
                    continue;
                }
                Err(EnforceError::Interrupted) => panic!("enforcement cannot be interrupted"),
                Ok(_) => {}
            }

            let lower_bound = wcsp.lower_bound();
            assert!(optimum >= upper_bound || lower_bound <= optimum);
            for (&old, new) in before.iter().zip(cost_of(&wcsp)) {
                if old < upper_bound {
                    assert_eq!(old, new);
                } else {
                    assert!(new >= upper_bound);
                }
            }

            let again = wcsp.enforce_vac(&mut Indefinite);
            assert_eq!(Ok(0), again.map(|tightened| tightened.lower_bound_increase));
            assert_eq!(lower_bound, wcsp.lower_bound());
        }
        assert!(num_contradictions > 0);
    }

    #[test]
    fn random_problems_keep_their_costs_and_a_valid_lower_bound() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut wcsp = Wcsp::new(1000);
            let x = (0..4)
                .map(|_| {
                    let size = rng.gen_range(2..=3);
                    wcsp.new_variable(0..size).expect("values")
                })
                .collect::<Vec<_>>();
            for &variable in &x {
                let size = wcsp.domain(variable).count() as i32;
                for value in 0..size {
                    wcsp.set_unary_cost(variable, value, rng.gen_range(0..3))
                        .expect("known value");
                }
            }
            for (i, j) in (0..4).tuple_combinations() {
                if rng.gen_bool(0.3) {
                    continue;
                }
                let table = (0..wcsp.domain(x[i]).count())
                    .map(|_| {
                        (0..wcsp.domain(x[j]).count())
                            .map(|_| rng.gen_range(0..4))
                            .collect::<Vec<Cost>>()
                    })
                    .collect::<Vec<_>>();
                let _ = wcsp.add_pairwise(x[i], x[j], &table).expect("valid table");
            }

            let before = assignment_costs(&wcsp);
            let optimum = before.iter().copied().min().expect("assignments exist");

            let _ = wcsp.enforce_vac(&mut Indefinite).expect("no contradiction");

            assert!(wcsp.lower_bound() <= optimum);
            assert_eq!(before, assignment_costs(&wcsp));
        }
    }
}

use super::TerminationCondition;

/// Stops once it has been polled `budget` times.
///
/// Unlike a [`super::TimeBudget`] this is deterministic.
#[derive(Debug, Copy, Clone)]
pub struct PollBudget {
    budget: u64,
    num_polls: u64,
}

impl PollBudget {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            num_polls: 0,
        }
    }
}

impl TerminationCondition for PollBudget {
    fn should_stop(&mut self) -> bool {
        if self.num_polls >= self.budget {
            return true;
        }
        self.num_polls += 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::termination::Combinator;
    use crate::engine::termination::Indefinite;

    #[test]
    fn stops_after_the_budget_is_spent() {
        let mut budget = PollBudget::new(2);

        assert!(!budget.should_stop());
        assert!(!budget.should_stop());
        assert!(budget.should_stop());
        assert!(budget.should_stop());
    }

    #[test]
    fn combined_with_indefinite_keeps_the_budget() {
        let mut combined = Combinator::new(Indefinite, PollBudget::new(1));

        assert!(!combined.should_stop());
        assert!(combined.should_stop());
    }

    #[test]
    fn absent_condition_never_stops() {
        let mut condition: Option<PollBudget> = None;

        assert!(!condition.should_stop());
    }
}

use std::time::Duration;
use std::time::Instant;

use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers when the specified time budget has been exceeded.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    started_at: Instant,
    budget: Duration,
}

impl TimeBudget {
    /// Give the computation a time budget, starting now.
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            started_at: Instant::now(),
            budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        self.started_at.elapsed() >= self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_stops_immediately() {
        let mut budget = TimeBudget::starting_now(Duration::ZERO);

        assert!(budget.should_stop());
    }

    #[test]
    fn generous_budget_does_not_stop() {
        let mut budget = TimeBudget::starting_now(Duration::from_secs(3600));

        assert!(!budget.should_stop());
    }
}

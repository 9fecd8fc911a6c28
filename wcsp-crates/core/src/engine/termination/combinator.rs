use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers when one of two given [`TerminationCondition`]s
/// triggers.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<T1, T2> {
    t1: T1,
    t2: T2,
}

impl<T1, T2> Combinator<T1, T2> {
    pub fn new(t1: T1, t2: T2) -> Self {
        Combinator { t1, t2 }
    }
}

impl<T1: TerminationCondition, T2: TerminationCondition> TerminationCondition
    for Combinator<T1, T2>
{
    fn should_stop(&mut self) -> bool {
        // Both are polled so that counting conditions stay in sync.
        let first = self.t1.should_stop();
        let second = self.t2.should_stop();
        first || second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::termination::PollBudget;

    #[test]
    fn the_second_condition_is_polled_after_the_first_stops() {
        let mut combined = Combinator::new(PollBudget::new(1), PollBudget::new(2));

        assert!(!combined.should_stop());
        assert!(combined.should_stop());
        assert!(combined.should_stop());
        assert!(combined.t2.should_stop());
    }
}

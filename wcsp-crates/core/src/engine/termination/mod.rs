//! A [`TerminationCondition`] is polled while virtual arc consistency is enforced. When it
//! triggers, the enforcement gives up and restores the state it started from.

mod combinator;
mod indefinite;
mod poll_budget;
mod time_budget;

pub use combinator::Combinator;
pub use indefinite::Indefinite;
pub use poll_budget::PollBudget;
pub use time_budget::TimeBudget;

/// Decides when a long-running computation should stop.
pub trait TerminationCondition {
    /// Returns `true` when the computation should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }
}

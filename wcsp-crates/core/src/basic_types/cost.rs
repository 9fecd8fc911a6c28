/// Costs are non-negative integers; negative values only appear transiently in deltas.
pub type Cost = i64;

/// The saturating "infinite" cost. Any sum reaching it stays there.
pub const FORBIDDEN: Cost = i64::MAX / 4;

pub const MIN_COST: Cost = 0;
pub const UNIT_COST: Cost = 1;

/// Saturating arithmetic on [`Cost`]s.
pub trait CostExt: Sized {
    fn add_saturating(self, other: Cost) -> Cost;

    fn sub_saturating(self, other: Cost) -> Cost;

    fn times(self, multiplier: u64) -> Cost;

    fn is_forbidden(self) -> bool;
}

impl CostExt for Cost {
    fn add_saturating(self, other: Cost) -> Cost {
        if self >= FORBIDDEN || other >= FORBIDDEN {
            return FORBIDDEN;
        }
        self.saturating_add(other).min(FORBIDDEN)
    }

    /// A forbidden cost stays forbidden whatever is taken from it.
    fn sub_saturating(self, other: Cost) -> Cost {
        if self >= FORBIDDEN {
            return FORBIDDEN;
        }
        self.saturating_sub(other).min(FORBIDDEN)
    }

    fn times(self, multiplier: u64) -> Cost {
        let product = self as i128 * multiplier as i128;
        product.clamp(-(FORBIDDEN as i128), FORBIDDEN as i128) as Cost
    }

    fn is_forbidden(self) -> bool {
        self >= FORBIDDEN
    }
}

/// Returns whether `cost` on top of `lower_bound` reaches the upper bound, i.e. whether the cost
/// is effectively forbidden in the current subproblem.
pub(crate) fn is_cut(lower_bound: Cost, cost: Cost, upper_bound: Cost) -> bool {
    lower_bound.add_saturating(cost) >= upper_bound
}

/// Returns whether any further increase of the lower bound closes the gap to the upper bound.
pub(crate) fn is_satisfaction_problem(lower_bound: Cost, upper_bound: Cost) -> bool {
    is_cut(lower_bound, UNIT_COST, upper_bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_saturates_at_forbidden() {
        assert_eq!(FORBIDDEN, FORBIDDEN.add_saturating(1));
        assert_eq!(FORBIDDEN, (FORBIDDEN - 1).add_saturating(10));
        assert_eq!(7, 3_i64.add_saturating(4));
    }

    #[test]
    fn forbidden_is_absorbing_for_subtraction() {
        assert_eq!(FORBIDDEN, FORBIDDEN.sub_saturating(1_000));
        assert_eq!(-2, 3_i64.sub_saturating(5));
    }

    #[test]
    fn multiplication_saturates() {
        assert_eq!(FORBIDDEN, (FORBIDDEN / 2).times(3));
        assert_eq!(12, 4_i64.times(3));
        assert_eq!(0, 4_i64.times(0));
    }

    #[test]
    fn cut_compares_against_upper_bound() {
        assert!(is_cut(2, 3, 5));
        assert!(!is_cut(2, 2, 5));
        assert!(is_cut(0, FORBIDDEN, FORBIDDEN));
        assert!(is_satisfaction_problem(4, 5));
        assert!(!is_satisfaction_problem(3, 5));
    }
}

//! The continuous relaxation of a covering multiple-choice knapsack.
//!
//! Every group is a variable of a linear cost function and every item one of its admissible
//! values. The relaxation picks a convex combination of items per group, reaches the capacity
//! and minimises the cost. Its optimum is found greedily on the lower convex hull of each group.
use std::cmp::Ordering;

use crate::basic_types::Cost;
use crate::basic_types::FORBIDDEN;
use crate::math::num_ext::NumExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RelaxationItem {
    /// The value index this item stands for.
    pub(crate) index: usize,
    pub(crate) weight: i64,
    pub(crate) cost: Cost,
    pub(crate) is_support: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelaxationBound {
    /// Even the heaviest admissible items do not reach the capacity.
    Infeasible,
    /// The optimum of the relaxation, rounded up.
    Bound(Cost),
}

/// A move from one hull point of a group to the next.
#[derive(Debug, Clone, Copy)]
struct Upgrade {
    delta_weight: i128,
    delta_cost: i128,
    towards_support: bool,
    position: usize,
    step: usize,
}

impl Upgrade {
    /// Orders by cost per unit of weight, then prefers supports, then scope order.
    fn compare(&self, other: &Upgrade) -> Ordering {
        (self.delta_cost * other.delta_weight)
            .cmp(&(other.delta_cost * self.delta_weight))
            .then(other.towards_support.cmp(&self.towards_support))
            .then(self.position.cmp(&other.position))
            .then(self.step.cmp(&other.step))
    }
}

pub(crate) fn solve(groups: &[Vec<RelaxationItem>], capacity: i64) -> RelaxationBound {
    let mut max_weight: i128 = 0;
    for group in groups {
        match group.iter().map(|item| item.weight).max() {
            Some(weight) => max_weight += weight as i128,
            None => return RelaxationBound::Infeasible,
        }
    }
    let capacity = capacity as i128;
    if max_weight < capacity {
        return RelaxationBound::Infeasible;
    }

    let mut weight: i128 = 0;
    let mut cost: i128 = 0;
    let mut upgrades = Vec::new();
    for (position, group) in groups.iter().enumerate() {
        let hull = lower_hull(group);
        weight += hull[0].weight as i128;
        cost += hull[0].cost as i128;
        upgrades.extend(hull.windows(2).enumerate().map(|(step, pair)| Upgrade {
            delta_weight: (pair[1].weight - pair[0].weight) as i128,
            delta_cost: (pair[1].cost - pair[0].cost) as i128,
            towards_support: pair[1].is_support,
            position,
            step,
        }));
    }

    if weight < capacity {
        upgrades.sort_by(Upgrade::compare);
        for upgrade in upgrades {
            let missing = capacity - weight;
            if upgrade.delta_weight >= missing {
                cost += NumExt::div_ceil(upgrade.delta_cost * missing, upgrade.delta_weight);
                break;
            }
            weight += upgrade.delta_weight;
            cost += upgrade.delta_cost;
        }
    }

    RelaxationBound::Bound(cost.clamp(-(FORBIDDEN as i128), FORBIDDEN as i128) as Cost)
}

/// The cheapest item followed by the heavier items on the lower convex hull, by weight.
fn lower_hull(group: &[RelaxationItem]) -> Vec<RelaxationItem> {
    let prefer = |a: &RelaxationItem, b: &RelaxationItem| {
        b.is_support
            .cmp(&a.is_support)
            .then(a.index.cmp(&b.index))
    };
    let Some(base) = group.iter().copied().min_by(|a, b| {
        a.cost
            .cmp(&b.cost)
            .then(b.weight.cmp(&a.weight))
            .then_with(|| prefer(a, b))
    }) else {
        return Vec::new();
    };

    let mut heavier = group
        .iter()
        .copied()
        .filter(|item| item.weight > base.weight)
        .collect::<Vec<_>>();
    heavier.sort_by(|a, b| {
        a.weight
            .cmp(&b.weight)
            .then(a.cost.cmp(&b.cost))
            .then_with(|| prefer(a, b))
    });
    heavier.dedup_by_key(|item| item.weight);

    let mut hull = vec![base];
    for item in heavier {
        while hull.len() >= 2 {
            let first = hull[hull.len() - 2];
            let last = hull[hull.len() - 1];
            let slope_in = (last.cost - first.cost) as i128 * (item.weight - last.weight) as i128;
            let slope_out = (item.cost - last.cost) as i128 * (last.weight - first.weight) as i128;
            if slope_in < slope_out {
                break;
            }
            let _ = hull.pop();
        }
        hull.push(item);
    }
    hull
}

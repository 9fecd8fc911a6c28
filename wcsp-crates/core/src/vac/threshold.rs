use std::collections::BTreeMap;

use log::debug;

use crate::basic_types::Cost;
use crate::basic_types::CostExt;
use crate::basic_types::MIN_COST;
use crate::basic_types::UNIT_COST;
use crate::vac::VacOptions;

/// Chooses the sequence of decreasing global thresholds from the distribution of the costs in
/// the problem.
#[derive(Debug, Clone, Default)]
pub(crate) struct ThresholdSchedule {
    /// Number of occurrences of each non-zero cost given to the problem.
    histogram: BTreeMap<Cost, usize>,
    /// Candidate thresholds, largest first.
    scale: Vec<Cost>,
    needs_rebuild: bool,
    current: Cost,
}

impl ThresholdSchedule {
    pub(crate) fn record(&mut self, cost: Cost) {
        if cost == MIN_COST || cost.is_forbidden() {
            return;
        }
        *self.histogram.entry(cost).or_default() += 1;
        self.needs_rebuild = true;
    }

    pub(crate) fn current(&self) -> Cost {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn scale(&self) -> &[Cost] {
        &self.scale
    }

    /// Groups the costs into packets of cumulated occurrences; the largest cost of each packet is
    /// a candidate. Packets double in size until there are few enough candidates.
    fn rebuild(&mut self, options: &VacOptions) {
        let mut packet_size = options.histogram_packet_size.max(1);
        loop {
            self.scale.clear();
            let mut cumulus = 0;
            for (&cost, &occurrences) in &self.histogram {
                cumulus += occurrences;
                if cumulus > packet_size {
                    self.scale.push(cost);
                    cumulus = 0;
                }
            }
            if self.scale.len() <= options.max_scale_size {
                break;
            }
            packet_size *= 2;
        }
        self.scale.reverse();
        self.needs_rebuild = false;
        debug!("VAC threshold scale {:?}", self.scale);
    }

    /// Starts a new enforcement: the largest candidate below the upper bound, otherwise the unit
    /// cost.
    pub(crate) fn initialise(&mut self, upper_bound: Cost, options: &VacOptions) -> Cost {
        if self.needs_rebuild {
            self.rebuild(options);
        }
        self.current = self
            .scale
            .iter()
            .copied()
            .find(|&candidate| candidate < upper_bound)
            .unwrap_or(UNIT_COST);
        self.current
    }

    /// Moves to the largest candidate below the current threshold, otherwise halves it. Values
    /// below the configured cost threshold become zero.
    pub(crate) fn next(&mut self, at_root: bool, options: &VacOptions) -> Cost {
        let current = self.current;
        let mut next = self
            .scale
            .iter()
            .copied()
            .find(|&candidate| candidate < current)
            .unwrap_or(current / 2);

        let minimum = if at_root {
            options.preprocessing_cost_threshold
        } else {
            options.cost_threshold
        };
        if next < minimum {
            next = MIN_COST;
        }
        self.current = next;
        self.current
    }
}

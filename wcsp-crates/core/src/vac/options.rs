use crate::basic_types::Cost;
use crate::basic_types::UNIT_COST;

/// Options controlling when and how virtual arc consistency is enforced.
#[derive(Debug, Copy, Clone)]
pub struct VacOptions {
    /// Enforcement is skipped at checkpoint depths at or beyond this limit.
    pub max_depth: Option<usize>,
    /// During search, thresholds below this value are replaced by zero.
    pub cost_threshold: Cost,
    /// The same as `cost_threshold`, but at the root.
    pub preprocessing_cost_threshold: Cost,
    /// The number of failed cycle breaks after which a threshold level is abandoned.
    pub max_cycle_breaks: usize,
    /// The number of cost occurrences grouped into one candidate threshold.
    pub histogram_packet_size: usize,
    /// The largest number of candidate thresholds; packets are doubled until it fits.
    pub max_scale_size: usize,
    /// Whether to remember a Bool(P)-consistent support per variable as a value ordering hint.
    pub value_heuristic: bool,
    pub bottleneck_tie_breaking: BottleneckTieBreaking,
}

impl Default for VacOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            cost_threshold: UNIT_COST,
            preprocessing_cost_threshold: UNIT_COST,
            max_cycle_breaks: 5,
            histogram_packet_size: 50,
            max_scale_size: 20,
            value_heuristic: true,
            bottleneck_tie_breaking: BottleneckTieBreaking::default(),
        }
    }
}

/// Which of several equally limiting elements becomes the bottleneck of a backward pass.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BottleneckTieBreaking {
    /// The element with the smallest id; cost functions before variables.
    #[default]
    LowestId,
    /// The first element encountered while tracing back.
    FirstFound,
}

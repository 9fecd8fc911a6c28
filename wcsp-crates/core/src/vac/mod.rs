//! Virtual arc consistency.
//!
//! Enforcement works on Bool(P), the classical constraint network which only keeps the tuples
//! whose cost is below a threshold. Each round runs three passes:
//! - a forward pass establishing arc consistency on Bool(P) while recording why each value was
//!   removed;
//! - when a domain or a linear function fails, a backward pass tracing the failure back through
//!   the recorded explanations and computing by how much the lower bound can be raised;
//! - a repair moving exactly those costs, ending with an increase of the lower bound.
//!
//! The threshold starts high and decreases towards zero as Bool(P) becomes consistent.
mod backward_pass;
mod controller;
mod explanation;
mod forward_pass;
mod linear_reviser;
pub(crate) mod min_sum_diffusion;
mod options;
mod pairwise_reviser;
mod relaxation;
mod repair;
mod threshold;
mod worklist;

pub(crate) use controller::VacController;
#[cfg(test)]
pub(crate) use controller::VacStatistics;
pub use options::BottleneckTieBreaking;
pub use options::VacOptions;

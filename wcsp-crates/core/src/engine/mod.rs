//! The backtrackable substrate: trailed integers, domains, unary costs and the bounds.
pub(crate) mod ledger;
mod state;
pub mod termination;
pub(crate) mod trailed;
pub mod variables;

pub(crate) use state::State;

//! # wcsp-core
//! Virtual arc consistency (VAC) for weighted constraint satisfaction problems.
//!
//! A [`Wcsp`] holds variables over finite integer domains together with unary costs, pairwise cost
//! tables and linear knapsack cost functions. [`Wcsp::enforce_vac`] raises the global lower bound
//! by repeatedly solving the classical relaxation Bool(P) and moving costs along the chains of
//! value removals which make it fail. All changes are trailed, so a search procedure can create a
//! checkpoint, enforce, and undo everything with [`Wcsp::restore_to`].
//!
//! ```rust
//! # use wcsp_core::LinearTerm;
//! # use wcsp_core::Wcsp;
//! # use wcsp_core::termination::Indefinite;
//! let mut wcsp = Wcsp::default();
//! let items = (0..3)
//!     .map(|_| wcsp.new_variable([0, 1]).unwrap())
//!     .collect::<Vec<_>>();
//! for &item in &items {
//!     wcsp.set_unary_cost(item, 1, 1).unwrap();
//! }
//! // At least two of the three items have to be taken.
//! let terms = items
//!     .iter()
//!     .map(|&item| LinearTerm::new(item, vec![(1, 3)], 0))
//!     .collect::<Vec<_>>();
//! let _ = wcsp.add_linear(&terms, 6).unwrap();
//!
//! let _ = wcsp.enforce_vac(&mut Indefinite).unwrap();
//! assert_eq!(2, wcsp.lower_bound());
//! ```
pub(crate) mod asserts;
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod cost_functions;
pub(crate) mod engine;
pub(crate) mod math;
pub mod statistics;
pub(crate) mod vac;

pub use convert_case;

// Everything from the api module is exported at the root of the crate.
mod api;

pub use api::*;

pub use crate::basic_types::Cost;
pub use crate::basic_types::CostExt;
pub use crate::basic_types::CostOperationError;
pub use crate::basic_types::EmptyDomain;
pub use crate::basic_types::EnforceError;
pub use crate::basic_types::Tightened;
pub use crate::basic_types::FORBIDDEN;
pub use crate::basic_types::MIN_COST;
pub use crate::basic_types::UNIT_COST;
pub use crate::cost_functions::CostFunctionId;
pub use crate::cost_functions::LinearTerm;
pub use crate::engine::variables::VariableId;

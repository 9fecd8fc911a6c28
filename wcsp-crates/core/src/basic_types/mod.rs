mod cost;
mod cost_operation_error;
mod empty_domain;
mod enforce_error;
mod trail;

pub use cost::*;
pub use cost_operation_error::CostOperationError;
pub use empty_domain::EmptyDomain;
pub use enforce_error::EnforceError;
pub use enforce_error::Tightened;
pub(crate) use trail::Trail;

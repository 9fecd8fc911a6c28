use thiserror::Error;

/// A domain operation would have left a variable without any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the domain of a variable became empty")]
pub struct EmptyDomain;

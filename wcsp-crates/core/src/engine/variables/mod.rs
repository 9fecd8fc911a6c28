mod variable;
mod variable_id;

pub(crate) use variable::Variable;
pub use variable_id::VariableId;

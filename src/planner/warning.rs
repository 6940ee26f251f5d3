//! Planner warnings
//!
//! The compiler never fails a report over one bad clause. Every fallback it
//! takes is recorded here so the caller can show it next to the SQL.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileWarning {
    #[error("Unknown filter operator '{operator}' on '{column}', treated as equals")]
    UnknownOperator { column: String, operator: String },
    #[error("Filter '{operator}' on '{column}' has no value, filter skipped")]
    MissingValue { column: String, operator: String },
    #[error("Unknown column '{column}' in {context}, ignored")]
    UnknownColumn { column: String, context: &'static str },
    #[error("Unknown metric function '{function}', counting rows instead")]
    UnknownFunction { function: String },
    #[error("Metric '{alias}' has no usable column for '{function}', counting rows instead")]
    MissingMetricColumn { alias: String, function: String },
    #[error("Parameter '{key}' collides with '{kept}' after sanitizing, ignored")]
    DuplicateParameter { key: String, kept: String },
    #[error("Interactive filter on custom attribute '{column}' is not supported, skipped")]
    InteractiveAttribute { column: String },
    #[error("Order column '{column}' is not an output column, using default order")]
    UnknownOrderColumn { column: String },
    #[error("Metric alias '{alias}' is not a valid identifier, using '{replacement}'")]
    InvalidAlias { alias: String, replacement: String },
    #[error("Output column '{name}' appears more than once, keeping the first")]
    DuplicateOutput { name: String },
}

/// Collects warnings and mirrors each one to the log
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    items: Vec<CompileWarning>,
}

impl Warnings {
    pub fn push(&mut self, warning: CompileWarning) {
        tracing::warn!(%warning, "query compiler fallback");
        self.items.push(warning);
    }

    pub fn into_vec(self) -> Vec<CompileWarning> {
        self.items
    }
}

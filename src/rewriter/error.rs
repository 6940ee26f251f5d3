//! Rewriter errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Invalid variable name '{0}': expected letters, digits and '_'")]
    InvalidName(String),
    #[error("Variable '{0}' already exists in the query")]
    NameTaken(String),
}

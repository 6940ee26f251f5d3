//! Variable rewriter (verb module)
//!
//! Turns literal filters in compiled SQL into BI tool placeholders (`{{name}}`)
//! and back. The SQL is parsed line by line into a [`Document`]: lines that are
//! exactly one known filter shape become typed [`Clause`]s, everything else is
//! kept as raw text. Rewrites operate on clauses and render text last.
//!
//! Binding two variables to the same column keeps the first binding on the
//! original literal line; the second finds no literal and gets an optional
//! clause of its own.

mod clause;
mod document;
mod error;
mod lexer;
mod rewrite;
mod variable;

pub use clause::{Clause, ColumnName, Connective, Predicate};
pub use document::{ClauseLine, Document, Line};
pub use error::RewriteError;
pub use lexer::{contains_placeholder, replace_placeholder};
pub use rewrite::{bind, rename, unbind};
pub use variable::{Variable, VariableKind};

//! Query plan types (nouns)
//!
//! Typed SQL fragments produced by the planner and serialized by the emitter.

mod expr;
mod query;

pub use expr::{Aggregation, BinaryOperator, Column, Expr, Literal};
pub use query::{Cte, FilterClause, Join, JoinType, SelectItem, SelectQuery, SortKey, Source};

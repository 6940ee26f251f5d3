//! Query planner (verb module)
//!
//! Transforms a report definition (website, filters, parameters, config) into a
//! SelectQuery over the umami event tables, and compiles it to SQL.

mod attributes;
mod base;
mod compile;
mod filters;
mod joins;
mod resolve;
mod select;
mod warning;

pub use compile::{compile, CompiledQuery, Compiler};
pub use warning::CompileWarning;

/// Name of the CTE every report reads from
pub const BASE_NAME: &str = "base";

/// Output name of the date bucket column
pub const DATE_ALIAS: &str = "dato";

/// Column of the website row-scope filter; never rewritten or removed
pub const SCOPE_COLUMN: &str = "website_id";

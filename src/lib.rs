//! umami-sql - Compile event-analytics reports to BigQuery SQL for a BI tool
//!
//! This library provides:
//! - Schema registry types (columns, source tables, computed columns)
//! - Report input types (QueryConfig, Filter, Parameter, Metric)
//! - Logical plan generation over a `base` CTE with custom attributes (EAV)
//! - SQL emission with inline literals or bound parameters
//! - Variable rewriting: `{{name}}` placeholders and `[[ ]]` optional clauses
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `schema/` - column registry and warehouse settings
//! - `query/` - report input types (QueryConfig, Filter, Parameter, Metric)
//! - `plan/` - logical SQL types (SelectQuery, Expr, Column)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → SchemaRegistry, JSON → report inputs
//! - `planner/` - report → SelectQuery → CompiledQuery
//! - `emitter/` - SelectQuery → SQL text
//! - `rewriter/` - SQL text + Variable → SQL text
//!
//! # Example
//!
//! ```ignore
//! use umami_sql::{compile, bind, Filter, Metric, QueryConfig, Variable, Website};
//!
//! let website = Website::new("35abb2b7-3f97-42ce-931b-cf547d40d967", "nav.no");
//! let filters = vec![Filter::starts_with("url_path", "/soknad")];
//! let config = QueryConfig::new(vec![Metric::count()]).with_group_by(vec!["created_at".into()]);
//! let compiled = compile(Some(&website), &filters, &[], &config);
//! let sql = bind(&compiled.sql, &Variable::field_filter("sti", "url_path"));
//! ```

pub mod schema;
pub mod query;
pub mod plan;
pub mod planner;
pub mod emitter;
pub mod rewriter;
pub mod parser;
pub mod error;

// Re-export commonly used types
pub use schema::{ColumnDef, CompilerSettings, DataType, SchemaRegistry, SourceTable};
pub use query::{
    DateFormat, Filter, FilterOperator, Metric, MetricFunction, OrderBy, Parameter, ParameterType,
    QueryConfig, SortDirection, Website,
};
pub use plan::{Expr, Column, SelectQuery};
pub use planner::{compile, CompileWarning, CompiledQuery, Compiler};
pub use emitter::{emit_sql, emit_template, BoundParam, ParamValue};
pub use rewriter::{bind, rename, unbind, RewriteError, Variable, VariableKind};
pub use error::ParseError;

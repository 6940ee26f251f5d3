//! SQL emitter (verb module)
//!
//! Transforms a SelectQuery into SQL text, either with escaped inline literals
//! or as a parameter-bound template.

pub mod escape;
mod params;
mod sql;

pub use params::{BoundParam, BoundValues, InlineValues, ParamValue, ValueSink};
pub use sql::{emit_sql, emit_template};

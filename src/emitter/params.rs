//! Parameter binding for user-supplied values.
//!
//! The emitter writes user values through a [`ValueSink`]: either inlined as
//! escaped literals (the BI export text) or replaced by named query parameters
//! (`@p0`, `@p1`, ...) collected alongside the template.

use serde::Serialize;
use crate::plan::Literal;
use super::escape::render_literal;

/// Typed value of a bound parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&Literal> for ParamValue {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Null => ParamValue::Null,
            Literal::Bool(b) => ParamValue::Bool(*b),
            Literal::Int(i) => ParamValue::Int(*i),
            Literal::Float(f) => ParamValue::Float(*f),
            Literal::String(s) => ParamValue::String(s.clone()),
        }
    }
}

impl ParamValue {
    /// BigQuery parameter type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null | ParamValue::String(_) => "STRING",
            ParamValue::Bool(_) => "BOOL",
            ParamValue::Int(_) => "INT64",
            ParamValue::Float(_) => "FLOAT64",
        }
    }
}

/// A named query parameter referenced from a template as `@name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParam {
    pub name: String,
    pub value: ParamValue,
}

/// Destination for user-supplied values during emission
pub trait ValueSink {
    /// Return the SQL text standing in for the value
    fn value(&mut self, lit: &Literal) -> String;
}

/// Inline every value as an escaped literal
#[derive(Debug, Default)]
pub struct InlineValues;

impl ValueSink for InlineValues {
    fn value(&mut self, lit: &Literal) -> String {
        render_literal(lit)
    }
}

/// Replace every value with a positional named parameter
#[derive(Debug, Default)]
pub struct BoundValues {
    params: Vec<BoundParam>,
}

impl BoundValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_params(self) -> Vec<BoundParam> {
        self.params
    }
}

impl ValueSink for BoundValues {
    fn value(&mut self, lit: &Literal) -> String {
        let name = format!("p{}", self.params.len());
        let placeholder = format!("@{}", name);
        self.params.push(BoundParam {
            name,
            value: ParamValue::from(lit),
        });
        placeholder
    }
}

//! Input parser (verb module)
//!
//! Loads the column registry and compiler settings from YAML, and report
//! inputs (config, filters, parameters, variables) from the dashboard's JSON.

use std::path::Path;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::error::ParseError;
use crate::planner::Compiler;
use crate::query::{Filter, Parameter, QueryConfig};
use crate::rewriter::Variable;
use crate::schema::{CompilerSettings, SchemaRegistry};

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a schema registry from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SchemaRegistry, ParseError> {
    parse_str(&read(path.as_ref())?)
}

/// Parse a schema registry from a YAML string
pub fn parse_str(yaml: &str) -> Result<SchemaRegistry, ParseError> {
    let registry: SchemaRegistry = serde_yaml::from_str(yaml)?;
    registry.validate()?;
    Ok(registry)
}

/// A registry file that also carries warehouse settings
#[derive(Deserialize)]
struct CompilerFile {
    #[serde(default)]
    settings: CompilerSettings,
    #[serde(flatten)]
    registry: SchemaRegistry,
}

/// Parse a registry plus optional `settings:` block into a compiler
pub fn parse_compiler_str(yaml: &str) -> Result<Compiler, ParseError> {
    let file: CompilerFile = serde_yaml::from_str(yaml)?;
    file.registry.validate()?;
    Ok(Compiler::new(file.registry, file.settings))
}

/// Like [`parse_compiler_str`], reading from a file
pub fn parse_compiler_file<P: AsRef<Path>>(path: P) -> Result<Compiler, ParseError> {
    parse_compiler_str(&read(path.as_ref())?)
}

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T, ParseError> {
    serde_json::from_str(json).map_err(ParseError::from)
}

/// Parse a report configuration from dashboard JSON
pub fn parse_config(json: &str) -> Result<QueryConfig, ParseError> {
    parse_json(json)
}

pub fn parse_filters(json: &str) -> Result<Vec<Filter>, ParseError> {
    parse_json(json)
}

pub fn parse_parameters(json: &str) -> Result<Vec<Parameter>, ParseError> {
    parse_json(json)
}

pub fn parse_variables(json: &str) -> Result<Vec<Variable>, ParseError> {
    parse_json(json)
}

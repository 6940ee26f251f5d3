//! Error types for umami-sql

use thiserror::Error;

/// Errors that can occur while loading configuration or query input
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
    /// JSON deserialization error
    #[error("Invalid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    /// A column declared as computed has no known expression
    #[error("Unknown computed column '{0}'")]
    UnknownComputedColumn(String),
    /// Two registry columns share a name
    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),
    /// Column names must be plain SQL identifiers
    #[error("Invalid column name '{0}', expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidColumnName(String),
    /// The configured timestamp field is missing from the registry
    #[error("Timestamp field '{0}' is not a registry column")]
    MissingTimestampField(String),
}

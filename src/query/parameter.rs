//! Custom event attribute definitions
//!
//! Attribute values live in the per-event key/value table. Each parameter is
//! exposed to reports as a synthesized column `param_<sanitized key>`.

use serde::{Deserialize, Serialize};

/// Prefix of every custom-attribute column identifier
pub const PARAM_PREFIX: &str = "param_";

/// Declared value type of a custom attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Number,
}

/// A custom event attribute the report may reference
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Parameter {
    /// Raw attribute key as stored in the key/value table
    pub key: String,
    #[serde(rename = "type", default)]
    pub param_type: ParameterType,
}

impl Parameter {
    pub fn new(key: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            key: key.into(),
            param_type,
        }
    }

    /// Sanitized identifier for the key
    pub fn sanitized_key(&self) -> String {
        sanitize_key(&self.key)
    }

    /// Column identifier used by filters, group-by fields and metrics
    pub fn column_id(&self) -> String {
        format!("{}{}", PARAM_PREFIX, self.sanitized_key())
    }
}

/// Map a free-text attribute key to a safe identifier fragment
///
/// ASCII alphanumerics and `_` are kept, everything else becomes `_`, and the
/// result is lower-cased (warehouse column names are case-insensitive).
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Whether a column identifier names a custom attribute
pub fn is_parameter_column(column: &str) -> bool {
    column.starts_with(PARAM_PREFIX)
}

//! Column data types for the event schema

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Data types a registry column can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Free text
    #[default]
    String,
    /// Integer or decimal number
    Number,
    /// Point in time (UTC)
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Number => write!(f, "number"),
            DataType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Error when parsing a data type string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid data type '{input}'. Valid options: string, number, timestamp")]
pub struct ParseDataTypeError {
    pub input: String,
}

impl FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" | "varchar" => Ok(DataType::String),
            "number" | "int" | "integer" | "int64" | "float" | "float64" | "numeric" => {
                Ok(DataType::Number)
            }
            "timestamp" | "datetime" => Ok(DataType::Timestamp),
            _ => Err(ParseDataTypeError {
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DataType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl DataType {
    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Number)
    }
}

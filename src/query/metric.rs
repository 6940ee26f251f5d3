//! Aggregate metrics

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Aggregate function of a metric
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MetricFunction {
    /// Row count
    #[default]
    Count,
    CountDistinct,
    Sum,
    Average,
    Median,
    Min,
    Max,
    /// Unrecognised function name; compiled as a row count
    Unknown(String),
}

impl MetricFunction {
    /// Parse a function name, keeping unrecognised input as `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "count" => MetricFunction::Count,
            "count_distinct" | "distinct" | "distinct_count" => MetricFunction::CountDistinct,
            "sum" => MetricFunction::Sum,
            "average" | "avg" => MetricFunction::Average,
            "median" => MetricFunction::Median,
            "min" | "minimum" => MetricFunction::Min,
            "max" | "maximum" => MetricFunction::Max,
            _ => MetricFunction::Unknown(s.to_string()),
        }
    }

    /// Whether the function aggregates over a target column
    pub fn needs_column(&self) -> bool {
        !matches!(self, MetricFunction::Count | MetricFunction::Unknown(_))
    }
}

impl fmt::Display for MetricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricFunction::Count => write!(f, "count"),
            MetricFunction::CountDistinct => write!(f, "count-distinct"),
            MetricFunction::Sum => write!(f, "sum"),
            MetricFunction::Average => write!(f, "average"),
            MetricFunction::Median => write!(f, "median"),
            MetricFunction::Min => write!(f, "min"),
            MetricFunction::Max => write!(f, "max"),
            MetricFunction::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

impl<'de> Deserialize<'de> for MetricFunction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(MetricFunction::parse(&s))
    }
}

impl Serialize for MetricFunction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// An aggregate output column of the report
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Metric {
    pub function: MetricFunction,
    /// Registry column or custom-attribute column the function aggregates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Metric {
    pub fn count() -> Self {
        Self::default()
    }

    pub fn new(function: MetricFunction, column: impl Into<String>) -> Self {
        Self {
            function,
            column: Some(column.into()),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Positional alias used when none is given
    pub fn positional_alias(index: usize) -> String {
        format!("metric_{}", index + 1)
    }
}

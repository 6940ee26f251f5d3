//! Report filters

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter
///
/// Unrecognised operator strings deserialize to `Unknown` instead of failing,
/// so one bad clause never rejects a whole report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    IsNull,
    IsNotNull,
    StartsWith,
    EndsWith,
    /// Value list membership
    In,
    /// The column is exposed as a BI variable instead of a literal filter
    Interactive,
    Unknown(String),
}

impl FilterOperator {
    /// Whether the operator needs a literal value
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            FilterOperator::IsNull | FilterOperator::IsNotNull | FilterOperator::Interactive
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOperator::Equals => write!(f, "equals"),
            FilterOperator::NotEquals => write!(f, "not-equals"),
            FilterOperator::Contains => write!(f, "contains"),
            FilterOperator::NotContains => write!(f, "not-contains"),
            FilterOperator::IsNull => write!(f, "is-null"),
            FilterOperator::IsNotNull => write!(f, "is-not-null"),
            FilterOperator::StartsWith => write!(f, "starts-with"),
            FilterOperator::EndsWith => write!(f, "ends-with"),
            FilterOperator::In => write!(f, "in"),
            FilterOperator::Interactive => write!(f, "interactive"),
            FilterOperator::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

impl FilterOperator {
    /// Parse an operator name, keeping unrecognised input as `Unknown`
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "equals" | "eq" | "=" => FilterOperator::Equals,
            "not-equals" | "ne" | "!=" | "<>" => FilterOperator::NotEquals,
            "contains" | "like" => FilterOperator::Contains,
            "not-contains" | "not-like" => FilterOperator::NotContains,
            "is-null" => FilterOperator::IsNull,
            "is-not-null" => FilterOperator::IsNotNull,
            "starts-with" => FilterOperator::StartsWith,
            "ends-with" => FilterOperator::EndsWith,
            "in" => FilterOperator::In,
            "interactive" => FilterOperator::Interactive,
            _ => FilterOperator::Unknown(s.to_string()),
        }
    }
}

impl FromStr for FilterOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FilterOperator::parse(s))
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(FilterOperator::parse(&s))
    }
}

impl Serialize for FilterOperator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// A single report filter
///
/// `column` is either a registry column or a custom-attribute column
/// (`param_<key>`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Values for the `in` operator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: Option<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
            values: Vec::new(),
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Equals, Some(value.into()))
    }

    pub fn starts_with(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::StartsWith, Some(value.into()))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::IsNull, None)
    }

    pub fn is_in(column: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::In,
            value: None,
            values,
        }
    }

    pub fn interactive(column: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Interactive, None)
    }

    /// Values to compare against; a lone `value` counts as a one-element list
    pub fn value_list(&self) -> Vec<&str> {
        if self.values.is_empty() {
            self.value.as_deref().into_iter().collect()
        } else {
            self.values.iter().map(String::as_str).collect()
        }
    }
}

/// Accept `"x"`, `42`, `true` or `null` for a filter value
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "filter value must be a scalar, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_aliases() {
        assert_eq!("STARTS_WITH".parse::<FilterOperator>().unwrap(), FilterOperator::StartsWith);
        assert_eq!("is_not_null".parse::<FilterOperator>().unwrap(), FilterOperator::IsNotNull);
        assert_eq!("!=".parse::<FilterOperator>().unwrap(), FilterOperator::NotEquals);
    }

    #[test]
    fn test_unknown_operator_is_preserved() {
        let op = "REGEXP".parse::<FilterOperator>().unwrap();
        assert_eq!(op, FilterOperator::Unknown("REGEXP".into()));
        assert_eq!(op.to_string(), "REGEXP");
    }

    #[test]
    fn test_requires_value() {
        assert!(FilterOperator::Equals.requires_value());
        assert!(!FilterOperator::IsNull.requires_value());
        assert!(!FilterOperator::Interactive.requires_value());
    }

    #[test]
    fn test_deserialize_numeric_value() {
        let filter: Filter = serde_json::from_value(json!({
            "column": "event_type",
            "operator": "equals",
            "value": 2
        }))
        .unwrap();
        assert_eq!(filter.value.as_deref(), Some("2"));
    }

    #[test]
    fn test_deserialize_without_value() {
        let filter: Filter = serde_json::from_value(json!({
            "column": "referrer_domain",
            "operator": "is-null"
        }))
        .unwrap();
        assert_eq!(filter.operator, FilterOperator::IsNull);
        assert!(filter.value.is_none());
        assert!(filter.values.is_empty());
    }

    #[test]
    fn test_value_list() {
        assert_eq!(Filter::equals("a", "x").value_list(), vec!["x"]);
        assert_eq!(Filter::is_in("a", vec!["x".into(), "y".into()]).value_list(), vec!["x", "y"]);
        assert!(Filter::is_null("a").value_list().is_empty());
    }
}

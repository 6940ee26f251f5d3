use serde::{Deserialize, Serialize};
use super::metric::Metric;

/// The dataset a report runs against
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Website {
    /// Row-scope value matched against the event table's `website_id`
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Website {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain: None,
        }
    }
}

/// Granularity of the `dato` bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Year,
    Month,
    #[default]
    Day,
    Hour,
    Minute,
}

impl DateFormat {
    /// `FORMAT_TIMESTAMP` pattern for the bucket
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Year => "%Y",
            DateFormat::Month => "%Y-%m",
            DateFormat::Day => "%Y-%m-%d",
            DateFormat::Hour => "%Y-%m-%d %H:00",
            DateFormat::Minute => "%Y-%m-%d %H:%M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Explicit report ordering
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderBy {
    /// Output column: a group-by field, the timestamp field or a metric alias
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// A report definition as edited in the dashboard
///
/// The compiler treats an empty metric list as a single row count.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryConfig {
    pub metrics: Vec<Metric>,
    pub group_by: Vec<String>,
    pub order_by: Option<OrderBy>,
    pub date_format: Option<DateFormat>,
}

impl QueryConfig {
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self {
            metrics,
            ..Default::default()
        }
    }

    pub fn with_group_by(mut self, fields: Vec<String>) -> Self {
        self.group_by = fields;
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = Some(format);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_config() {
        let config: QueryConfig = serde_json::from_value(json!({
            "metrics": [{"function": "count"}],
            "groupBy": ["created_at"],
            "dateFormat": "day",
            "orderBy": {"column": "metric_1"}
        }))
        .unwrap();
        assert_eq!(config.metrics.len(), 1);
        assert_eq!(config.group_by, vec!["created_at"]);
        assert_eq!(config.date_format, Some(DateFormat::Day));
        assert_eq!(config.order_by.unwrap().direction, SortDirection::Desc);
    }

    #[test]
    fn test_date_patterns() {
        assert_eq!(DateFormat::Month.pattern(), "%Y-%m");
        assert_eq!(DateFormat::Hour.pattern(), "%Y-%m-%d %H:00");
    }
}

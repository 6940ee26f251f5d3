//! BI tool variables

use serde::{Deserialize, Serialize};
use crate::schema::DEFAULT_TIMESTAMP_FIELD;

/// How the BI tool substitutes a variable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VariableKind {
    /// Free text compared with `=`
    Text,
    /// Number compared with `=`
    Number,
    /// Calendar date compared against the event timestamp
    Date,
    /// The BI tool renders the whole predicate for `column`
    FieldFilter { column: String },
}

/// A named interactive variable, rendered as `{{name}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(flatten)]
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            kind,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Date)
    }

    pub fn field_filter(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, VariableKind::FieldFilter { column: column.into() })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Column whose literal filter the variable replaces
    pub fn target_column(&self) -> &str {
        match &self.kind {
            VariableKind::FieldFilter { column } => column,
            VariableKind::Date => DEFAULT_TIMESTAMP_FIELD,
            VariableKind::Text | VariableKind::Number => &self.name,
        }
    }

    /// The placeholder token, `{{name}}`
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_column() {
        assert_eq!(Variable::field_filter("sti", "url_path").target_column(), "url_path");
        assert_eq!(Variable::date("dag").target_column(), "created_at");
        assert_eq!(Variable::text("event_name").target_column(), "event_name");
    }

    #[test]
    fn test_token() {
        assert_eq!(Variable::text("sti").token(), "{{sti}}");
    }

    #[test]
    fn test_deserialize_from_ui_json() {
        let v: Variable = serde_json::from_value(json!({
            "name": "sti",
            "displayName": "URL-sti",
            "type": "field-filter",
            "column": "url_path"
        }))
        .unwrap();
        assert_eq!(v, Variable::field_filter("sti", "url_path").with_display_name("URL-sti"));

        let v: Variable = serde_json::from_value(json!({ "name": "dag", "type": "date" })).unwrap();
        assert_eq!(v.kind, VariableKind::Date);
        assert_eq!(v.display_name, "");
    }
}

//! Column resolution against the registry and the report's parameters

use std::collections::HashMap;
use crate::query::{is_parameter_column, Parameter};
use crate::schema::{ColumnDef, SchemaRegistry, SourceTable};
use super::warning::{CompileWarning, Warnings};

/// What a column identifier in the report refers to
#[derive(Debug, Clone, Copy)]
pub(crate) enum ColumnRef<'a> {
    /// Registry column
    Schema(&'a ColumnDef),
    /// Custom event attribute
    Attribute(&'a Parameter),
}

/// Parameters deduplicated by sanitized key
///
/// Collision policy: the first parameter seen for a column identifier wins;
/// later ones are dropped with a warning.
#[derive(Debug)]
pub(crate) struct ParameterSet<'a> {
    by_column: HashMap<String, &'a Parameter>,
}

impl<'a> ParameterSet<'a> {
    pub fn build(parameters: &'a [Parameter], warnings: &mut Warnings) -> Self {
        let mut by_column: HashMap<String, &'a Parameter> = HashMap::new();
        for param in parameters {
            let column = param.column_id();
            match by_column.get(&column) {
                Some(kept) => warnings.push(CompileWarning::DuplicateParameter {
                    key: param.key.clone(),
                    kept: kept.key.clone(),
                }),
                None => {
                    by_column.insert(column, param);
                }
            }
        }
        Self { by_column }
    }

    pub fn get(&self, column: &str) -> Option<&'a Parameter> {
        self.by_column.get(column).copied()
    }
}

/// Resolves report column identifiers
pub(crate) struct Resolver<'a> {
    pub registry: &'a SchemaRegistry,
    pub parameters: ParameterSet<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, parameters: ParameterSet<'a>) -> Self {
        Self { registry, parameters }
    }

    /// Registry columns take precedence over attribute columns
    pub fn resolve(&self, column: &str) -> Option<ColumnRef<'a>> {
        if let Some(def) = self.registry.get(column) {
            return Some(ColumnRef::Schema(def));
        }
        if is_parameter_column(column) {
            return self.parameters.get(column).map(ColumnRef::Attribute);
        }
        None
    }

    /// Whether the column is read from the session table
    pub fn is_session_column(&self, column: &str) -> bool {
        self.registry.table_of(column) == Some(SourceTable::Session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ParameterType;

    #[test]
    fn test_first_seen_parameter_wins() {
        let params = vec![
            Parameter::new("skjemaNavn", ParameterType::String),
            Parameter::new("SkjemaNavn", ParameterType::Number),
        ];
        let mut warnings = Warnings::default();
        let set = ParameterSet::build(&params, &mut warnings);
        let kept = set.get("param_skjemanavn").unwrap();
        assert_eq!(kept.key, "skjemaNavn");
        assert_eq!(kept.param_type, ParameterType::String);
        assert_eq!(
            warnings.into_vec(),
            vec![CompileWarning::DuplicateParameter {
                key: "SkjemaNavn".into(),
                kept: "skjemaNavn".into(),
            }]
        );
    }

    #[test]
    fn test_resolve_prefers_registry() {
        let registry = SchemaRegistry::umami();
        let params = vec![Parameter::new("steg", ParameterType::Number)];
        let mut warnings = Warnings::default();
        let resolver = Resolver::new(&registry, ParameterSet::build(&params, &mut warnings));

        assert!(matches!(resolver.resolve("url_path"), Some(ColumnRef::Schema(_))));
        assert!(matches!(resolver.resolve("param_steg"), Some(ColumnRef::Attribute(p)) if p.key == "steg"));
        assert!(resolver.resolve("param_missing").is_none());
        assert!(resolver.resolve("nonsense").is_none());
        assert!(resolver.is_session_column("country"));
    }
}

//! Custom event attributes (EAV)
//!
//! Attributes live in a key/value table with one row per event and key. The
//! outer query left-joins a pivot of that table: one row per event, one column
//! per referenced key. Every base row matches at most one pivot row, so joining
//! never repeats events.

use crate::plan::{Aggregation, Column, Expr, FilterClause, Join, JoinType, Literal, SelectItem, SelectQuery, Source};
use crate::query::{Parameter, ParameterType, QueryConfig, Website};
use crate::schema::CompilerSettings;
use super::resolve::{ColumnRef, Resolver};
use super::{BASE_NAME, SCOPE_COLUMN};

/// Alias of the joined attribute pivot
pub(crate) const ATTRIBUTE_ALIAS: &str = "event_data";

/// Alias of the attribute table inside the pivot
const PIVOT_SOURCE_ALIAS: &str = "d";

/// Parameters referenced by group-by fields and metrics, first reference first
pub(crate) fn referenced_attributes<'a>(resolver: &Resolver<'a>, config: &QueryConfig) -> Vec<&'a Parameter> {
    let columns = config
        .group_by
        .iter()
        .map(String::as_str)
        .chain(config.metrics.iter().filter_map(|m| m.column.as_deref()));

    let mut seen: Vec<&'a Parameter> = Vec::new();
    for column in columns {
        if let Some(ColumnRef::Attribute(param)) = resolver.resolve(column) {
            if !seen.iter().any(|p| p.column_id() == param.column_id()) {
                seen.push(param);
            }
        }
    }
    seen
}

/// The key's value on attribute rows carrying it, `NULL` elsewhere
fn keyed_value(param: &Parameter) -> Expr {
    let key_matches = Expr::eq(
        Expr::column(PIVOT_SOURCE_ALIAS, "data_key"),
        Expr::Literal(Literal::String(param.key.clone())),
    );
    let value = match param.param_type {
        ParameterType::String => Expr::column(PIVOT_SOURCE_ALIAS, "string_value"),
        ParameterType::Number => Expr::Cast {
            expr: Box::new(Expr::column(PIVOT_SOURCE_ALIAS, "number_value")),
            type_name: "NUMERIC",
        },
    };
    Expr::Case {
        when_then: vec![(key_matches, value)],
        else_result: None,
    }
}

/// One pivot column per attribute: its single value for the event
fn pivot_column(param: &Parameter) -> SelectItem {
    let value = keyed_value(param);
    let expr = match param.param_type {
        ParameterType::String => {
            let first = Aggregation::FirstString {
                order_by: Column::new(PIVOT_SOURCE_ALIAS, "created_at"),
            };
            Expr::function("NULLIF", vec![Expr::aggregate(first, value), Expr::string("")])
        }
        ParameterType::Number => Expr::aggregate(Aggregation::Max, value),
    };
    SelectItem::aliased(expr, param.column_id())
}

/// `LEFT JOIN` of the per-event attribute pivot
///
/// The pivot reads only the website's rows with the referenced keys. Its
/// `WHERE` is a single line so text rewriting never takes it for a filter.
pub(crate) fn attribute_join(settings: &CompilerSettings, website: &Website, params: &[&Parameter]) -> Join {
    let event_id = Expr::column(PIVOT_SOURCE_ALIAS, "website_event_id");
    let keys = params
        .iter()
        .map(|p| Expr::Literal(Literal::String(p.key.clone())))
        .collect();

    let mut pivot = SelectQuery::new(Source::Table {
        name: settings.event_data_table.clone(),
        alias: PIVOT_SOURCE_ALIAS.to_string(),
    });
    pivot.select = std::iter::once(SelectItem::bare(event_id.clone()))
        .chain(params.iter().map(|p| pivot_column(p)))
        .collect();
    pivot.filters = vec![FilterClause::Predicate(Expr::And(vec![
        Expr::eq(
            Expr::column(PIVOT_SOURCE_ALIAS, SCOPE_COLUMN),
            Expr::Value(Literal::String(website.id.clone())),
        ),
        Expr::In {
            expr: Box::new(Expr::column(PIVOT_SOURCE_ALIAS, "data_key")),
            values: keys,
        },
    ]))];
    pivot.group_by = vec![event_id];

    Join {
        join_type: JoinType::Left,
        source: Source::Derived {
            query: Box::new(pivot),
            alias: ATTRIBUTE_ALIAS.to_string(),
        },
        on: Expr::eq(
            Expr::column(ATTRIBUTE_ALIAS, "website_event_id"),
            Expr::column(BASE_NAME, "event_id"),
        ),
    }
}

/// The attribute's per-event value in the outer query
pub(crate) fn attribute_value(param: &Parameter) -> Expr {
    Expr::column(ATTRIBUTE_ALIAS, param.column_id())
}

/// Outer output column for an attribute, named `param_<key>`
///
/// A grouped attribute is a plain group key. An attribute referenced only by
/// metrics folds to one value per group: the first string by event time, or the
/// largest number.
pub(crate) fn attribute_column(param: &Parameter, grouped: bool, timestamp: &str) -> SelectItem {
    let value = attribute_value(param);
    if grouped {
        return SelectItem::bare(value);
    }
    let expr = match param.param_type {
        ParameterType::String => {
            let first = Aggregation::FirstString {
                order_by: Column::new(BASE_NAME, timestamp),
            };
            Expr::aggregate(first, value)
        }
        ParameterType::Number => Expr::aggregate(Aggregation::Max, value),
    };
    SelectItem::aliased(expr, param.column_id())
}

//! Filter rendering
//!
//! Static filters become one clause each in the base CTE. Custom-attribute
//! filters become correlated `EXISTS` subqueries against the attribute table in
//! the outer query, so they never multiply result rows.

use crate::emitter::escape::{like_contains, like_prefix, like_suffix};
use crate::plan::{Column, Expr, FilterClause, Literal};
use crate::query::{Filter, FilterOperator, Parameter, ParameterType};
use crate::schema::{ColumnDef, CompilerSettings};
use super::warning::{CompileWarning, Warnings};
use super::BASE_NAME;

/// Alias of the attribute table inside `EXISTS` subqueries
const EXISTS_ALIAS: &str = "d";

/// Settle the operator a filter is rendered with
///
/// Unknown operators fall back to `equals` when a value is present. Filters
/// missing a required value are dropped. Both cases are reported.
fn effective_operator(filter: &Filter, warnings: &mut Warnings) -> Option<FilterOperator> {
    let has_value = !filter.value_list().is_empty();
    match &filter.operator {
        FilterOperator::Unknown(raw) if has_value => {
            warnings.push(CompileWarning::UnknownOperator {
                column: filter.column.clone(),
                operator: raw.clone(),
            });
            Some(FilterOperator::Equals)
        }
        op if (op.requires_value() || matches!(op, FilterOperator::Unknown(_))) && !has_value => {
            warnings.push(CompileWarning::MissingValue {
                column: filter.column.clone(),
                operator: filter.operator.to_string(),
            });
            None
        }
        op => Some(op.clone()),
    }
}

fn value(raw: &str, numeric: bool) -> Expr {
    Expr::Value(Literal::for_value(raw, numeric))
}

fn like(target: Expr, pattern: String, numeric: bool, negated: bool) -> Expr {
    let target = if numeric {
        Expr::Cast { expr: Box::new(target), type_name: "STRING" }
    } else {
        target
    };
    Expr::Like {
        expr: Box::new(target),
        pattern: Box::new(Expr::Value(Literal::String(pattern))),
        negated,
    }
}

/// Comparison of `target` against the filter values
///
/// `values` is non-empty for every operator that requires a value.
fn compare(target: Expr, op: &FilterOperator, values: &[&str], numeric: bool) -> Option<Expr> {
    let first = values.first().copied().unwrap_or_default();
    let expr = match op {
        FilterOperator::Equals => Expr::eq(target, value(first, numeric)),
        FilterOperator::NotEquals => Expr::not_eq(target, value(first, numeric)),
        FilterOperator::Contains => like(target, like_contains(first), numeric, false),
        FilterOperator::NotContains => like(target, like_contains(first), numeric, true),
        FilterOperator::StartsWith => like(target, like_prefix(first), numeric, false),
        FilterOperator::EndsWith => like(target, like_suffix(first), numeric, false),
        FilterOperator::In => Expr::In {
            expr: Box::new(target),
            values: values.iter().map(|v| value(v, numeric)).collect(),
        },
        FilterOperator::IsNull => Expr::IsNull(Box::new(target)),
        FilterOperator::IsNotNull => Expr::IsNotNull(Box::new(target)),
        FilterOperator::Interactive | FilterOperator::Unknown(_) => return None,
    };
    Some(expr)
}

/// Render a filter on a registry column as a base clause
pub(crate) fn static_clause(def: &ColumnDef, filter: &Filter, warnings: &mut Warnings) -> Option<FilterClause> {
    if filter.operator == FilterOperator::Interactive {
        return Some(FilterClause::Optional(Expr::Placeholder(def.name.clone())));
    }
    let op = effective_operator(filter, warnings)?;
    let target = Expr::Column(Column::unqualified(def.name.clone()));
    compare(target, &op, &filter.value_list(), def.data_type.is_numeric()).map(FilterClause::Predicate)
}

/// Render a filter on a custom attribute as an outer-query clause
///
/// Negative operators are expressed as `NOT EXISTS` over the positive match, so
/// events without the attribute pass a `not-equals` filter.
pub(crate) fn attribute_clause(
    param: &Parameter,
    filter: &Filter,
    settings: &CompilerSettings,
    warnings: &mut Warnings,
) -> Option<FilterClause> {
    if filter.operator == FilterOperator::Interactive {
        warnings.push(CompileWarning::InteractiveAttribute {
            column: filter.column.clone(),
        });
        return None;
    }
    let op = effective_operator(filter, warnings)?;

    let mut predicates = vec![
        Expr::eq(
            Expr::column(EXISTS_ALIAS, "website_event_id"),
            Expr::column(BASE_NAME, "event_id"),
        ),
        Expr::eq(
            Expr::column(EXISTS_ALIAS, "data_key"),
            Expr::Literal(Literal::String(param.key.clone())),
        ),
    ];

    let (negated, positive) = match op {
        FilterOperator::IsNull => (true, None),
        FilterOperator::IsNotNull => (false, None),
        FilterOperator::NotEquals => (true, Some(FilterOperator::Equals)),
        FilterOperator::NotContains => (true, Some(FilterOperator::Contains)),
        other => (false, Some(other)),
    };

    if let Some(positive) = positive {
        let numeric = param.param_type == ParameterType::Number;
        let value_column = if numeric { "number_value" } else { "string_value" };
        let target = Expr::column(EXISTS_ALIAS, value_column);
        predicates.push(compare(target, &positive, &filter.value_list(), numeric)?);
    }

    Some(FilterClause::Predicate(Expr::Exists {
        negated,
        table: settings.event_data_table.clone(),
        alias: EXISTS_ALIAS.to_string(),
        predicates,
    }))
}

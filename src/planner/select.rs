//! Outer projection: output columns, GROUP BY and ORDER BY

use std::collections::HashSet;
use crate::emitter::escape::{is_identifier, sanitize_identifier};
use crate::plan::{Aggregation, Column, Expr, Literal, SelectItem, SortKey};
use crate::query::{Metric, MetricFunction, Parameter, QueryConfig, SortDirection};
use crate::schema::CompilerSettings;
use super::attributes::{attribute_column, attribute_value};
use super::resolve::{ColumnRef, Resolver};
use super::warning::{CompileWarning, Warnings};
use super::{BASE_NAME, DATE_ALIAS};

/// The outer query's clauses apart from FROM, joins and filters
#[derive(Debug, Default)]
pub(crate) struct Projection {
    pub select: Vec<SelectItem>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<SortKey>,
}

/// Output names already taken, in projection order
#[derive(Default)]
struct Outputs {
    names: HashSet<String>,
}

impl Outputs {
    /// Claim a name, reporting a duplicate instead of projecting it twice
    fn claim(&mut self, name: &str, warnings: &mut Warnings) -> bool {
        if self.names.insert(name.to_string()) {
            true
        } else {
            warnings.push(CompileWarning::DuplicateOutput { name: name.to_string() });
            false
        }
    }
}

fn date_bucket(config: &QueryConfig, timestamp: &str, settings: &CompilerSettings) -> Expr {
    let pattern = config.date_format.unwrap_or_default().pattern();
    let mut args = vec![Expr::string(pattern), Expr::column(BASE_NAME, timestamp)];
    if let Some(tz) = &settings.timezone {
        args.push(Expr::Literal(Literal::String(tz.clone())));
    }
    Expr::function("FORMAT_TIMESTAMP", args)
}

fn metric_alias(metric: &Metric, index: usize, warnings: &mut Warnings) -> String {
    match metric.alias.as_deref().map(str::trim) {
        None | Some("") => Metric::positional_alias(index),
        Some(alias) if is_identifier(alias) => alias.to_string(),
        Some(alias) => {
            let replacement = sanitize_identifier(alias).unwrap_or_else(|| Metric::positional_alias(index));
            warnings.push(CompileWarning::InvalidAlias {
                alias: alias.to_string(),
                replacement: replacement.clone(),
            });
            replacement
        }
    }
}

fn metric_expr(metric: &Metric, alias: &str, resolver: &Resolver<'_>, warnings: &mut Warnings) -> Expr {
    let aggregation = match &metric.function {
        MetricFunction::Count => return Expr::count_rows(),
        MetricFunction::Unknown(raw) => {
            warnings.push(CompileWarning::UnknownFunction { function: raw.clone() });
            return Expr::count_rows();
        }
        MetricFunction::CountDistinct => Aggregation::CountDistinct,
        MetricFunction::Sum => Aggregation::Sum,
        MetricFunction::Average => Aggregation::Avg,
        MetricFunction::Median => Aggregation::Median,
        MetricFunction::Min => Aggregation::Min,
        MetricFunction::Max => Aggregation::Max,
    };

    let target = match metric.column.as_deref().map(|c| (c, resolver.resolve(c))) {
        Some((_, Some(ColumnRef::Schema(def)))) => Expr::column(BASE_NAME, def.name.clone()),
        Some((_, Some(ColumnRef::Attribute(param)))) => attribute_value(param),
        Some((column, None)) => {
            warnings.push(CompileWarning::UnknownColumn {
                column: column.to_string(),
                context: "metric",
            });
            return Expr::count_rows();
        }
        None => {
            warnings.push(CompileWarning::MissingMetricColumn {
                alias: alias.to_string(),
                function: metric.function.to_string(),
            });
            return Expr::count_rows();
        }
    };
    Expr::aggregate(aggregation, target)
}

fn order_keys(
    config: &QueryConfig,
    resolver: &Resolver<'_>,
    outputs: &Outputs,
    grouped: bool,
    warnings: &mut Warnings,
) -> Vec<SortKey> {
    if let Some(order) = &config.order_by {
        let column = if resolver.registry.is_timestamp(&order.column) {
            DATE_ALIAS
        } else {
            order.column.as_str()
        };
        if outputs.names.contains(column) {
            return vec![SortKey::new(column, order.direction)];
        }
        warnings.push(CompileWarning::UnknownOrderColumn {
            column: order.column.clone(),
        });
    }

    if outputs.names.contains(DATE_ALIAS) {
        vec![SortKey::new(DATE_ALIAS, SortDirection::Desc)]
    } else if grouped {
        vec![SortKey::position(1, SortDirection::Desc)]
    } else {
        Vec::new()
    }
}

/// Plan the outer projection
///
/// Column order is group-by fields, then metrics, then attribute columns.
/// Grouped attributes are group keys like any other field.
pub(crate) fn plan_projection(
    resolver: &Resolver<'_>,
    settings: &CompilerSettings,
    config: &QueryConfig,
    attributes: &[&Parameter],
    warnings: &mut Warnings,
) -> Projection {
    let mut projection = Projection::default();
    let mut outputs = Outputs::default();
    let mut grouped_attributes = HashSet::new();
    let timestamp = resolver.registry.timestamp_field.as_str();

    for field in &config.group_by {
        if resolver.registry.is_timestamp(field) {
            if outputs.claim(DATE_ALIAS, warnings) {
                projection
                    .select
                    .push(SelectItem::aliased(date_bucket(config, timestamp, settings), DATE_ALIAS));
                projection.group_by.push(Expr::Column(Column::unqualified(DATE_ALIAS)));
            }
            continue;
        }
        match resolver.resolve(field) {
            Some(ColumnRef::Schema(def)) => {
                if outputs.claim(&def.name, warnings) {
                    let column = Expr::column(BASE_NAME, def.name.clone());
                    projection.select.push(SelectItem::bare(column.clone()));
                    projection.group_by.push(column);
                }
            }
            // Projected with the other attribute columns
            Some(ColumnRef::Attribute(param)) => {
                grouped_attributes.insert(param.column_id());
            }
            None => warnings.push(CompileWarning::UnknownColumn {
                column: field.clone(),
                context: "group by",
            }),
        }
    }

    let default_metrics = [Metric::count()];
    let metrics: &[Metric] = if config.metrics.is_empty() {
        &default_metrics
    } else {
        &config.metrics
    };

    for (index, metric) in metrics.iter().enumerate() {
        let alias = metric_alias(metric, index, warnings);
        if !outputs.claim(&alias, warnings) {
            continue;
        }
        let expr = metric_expr(metric, &alias, resolver, warnings);
        projection.select.push(SelectItem::aliased(expr, alias));
    }

    for param in attributes {
        let column_id = param.column_id();
        if !outputs.claim(&column_id, warnings) {
            continue;
        }
        let grouped = grouped_attributes.contains(&column_id);
        projection.select.push(attribute_column(param, grouped, timestamp));
        if grouped {
            projection.group_by.push(attribute_value(param));
        }
    }

    let grouped = !projection.group_by.is_empty();
    projection.order_by = order_keys(config, resolver, &outputs, grouped, warnings);

    tracing::debug!(
        columns = projection.select.len(),
        group_by = projection.group_by.len(),
        attributes = attributes.len(),
        "planned outer projection"
    );
    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::attributes::referenced_attributes;
    use crate::planner::resolve::ParameterSet;
    use crate::query::{DateFormat, OrderBy, ParameterType};
    use crate::schema::SchemaRegistry;

    fn project(config: &QueryConfig, params: &[Parameter]) -> (Projection, Vec<CompileWarning>) {
        let registry = SchemaRegistry::umami();
        let mut warnings = Warnings::default();
        let resolver = Resolver::new(&registry, ParameterSet::build(params, &mut warnings));
        let attributes = referenced_attributes(&resolver, config);
        let projection = plan_projection(&resolver, &CompilerSettings::default(), config, &attributes, &mut warnings);
        (projection, warnings.into_vec())
    }

    fn names(projection: &Projection) -> Vec<&str> {
        projection.select.iter().filter_map(SelectItem::output_name).collect()
    }

    #[test]
    fn test_positional_aliases_are_stable() {
        let config = QueryConfig::new(vec![
            Metric::count(),
            Metric::new(MetricFunction::CountDistinct, "session_id").with_alias("x"),
            Metric::new(MetricFunction::Sum, "event_type"),
        ]);
        let (projection, warnings) = project(&config, &[]);
        assert_eq!(names(&projection), vec!["metric_1", "x", "metric_3"]);
        assert!(projection.group_by.is_empty());
        assert!(projection.order_by.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_timestamp_group_defaults_to_day_and_dato_desc() {
        let config = QueryConfig::new(vec![Metric::count()]).with_group_by(vec!["created_at".into()]);
        let (projection, _) = project(&config, &[]);
        assert_eq!(names(&projection), vec!["dato", "metric_1"]);
        assert_eq!(projection.group_by.len(), 1);
        assert_eq!(projection.order_by[0].column, "dato");
        assert_eq!(projection.order_by[0].direction, SortDirection::Desc);
        let SelectItem::Expr { expr: Expr::Function { args, .. }, .. } = &projection.select[0] else {
            panic!("expected FORMAT_TIMESTAMP");
        };
        assert!(matches!(&args[0], Expr::Literal(Literal::String(p)) if p == "%Y-%m-%d"));
    }

    #[test]
    fn test_explicit_order_and_unknown_order() {
        let config = QueryConfig::new(vec![Metric::count()])
            .with_group_by(vec!["created_at".into(), "url_path".into()])
            .with_date_format(DateFormat::Month)
            .with_order_by(OrderBy::new("url_path", SortDirection::Asc));
        let (projection, _) = project(&config, &[]);
        assert_eq!(projection.order_by[0].column, "url_path");
        assert_eq!(projection.order_by[0].direction, SortDirection::Asc);

        let config = config.with_order_by(OrderBy::new("nope", SortDirection::Asc));
        let (projection, warnings) = project(&config, &[]);
        assert_eq!(projection.order_by[0].column, "dato");
        assert!(warnings.contains(&CompileWarning::UnknownOrderColumn { column: "nope".into() }));
    }

    #[test]
    fn test_grouping_orders_by_first_output_column() {
        let config = QueryConfig::new(vec![Metric::count().with_alias("antall")])
            .with_group_by(vec!["url_path".into()]);
        let (projection, _) = project(&config, &[]);
        assert_eq!(names(&projection), vec!["url_path", "antall"]);
        assert_eq!(projection.order_by[0].column, "1");
        assert_eq!(projection.order_by[0].direction, SortDirection::Desc);

        let config = config.with_order_by(OrderBy::new("antall", SortDirection::Desc));
        let (projection, _) = project(&config, &[]);
        assert_eq!(projection.order_by[0].column, "antall");
    }

    #[test]
    fn test_grouped_attribute_is_a_group_key() {
        let params = vec![Parameter::new("skjema", ParameterType::String)];
        let config = QueryConfig::new(vec![Metric::count()]).with_group_by(vec!["param_skjema".into()]);
        let (projection, _) = project(&config, &params);
        assert_eq!(names(&projection), vec!["metric_1", "param_skjema"]);
        assert!(matches!(&projection.group_by[..], [Expr::Column(c)] if c.qualified_name() == "event_data.param_skjema"));
        assert_eq!(projection.order_by[0].column, "1");
        let SelectItem::Expr { expr, .. } = &projection.select[0] else {
            panic!("expected expression");
        };
        assert!(matches!(expr, Expr::Aggregate { func: Aggregation::CountRows, .. }));
    }

    #[test]
    fn test_metric_only_attribute_is_aggregated() {
        let params = vec![Parameter::new("steg", ParameterType::Number)];
        let config = QueryConfig::new(vec![Metric::count(), Metric::new(MetricFunction::Sum, "param_steg")]);
        let (projection, _) = project(&config, &params);
        assert_eq!(names(&projection), vec!["metric_1", "metric_2", "param_steg"]);
        assert!(projection.group_by.is_empty());
        assert!(projection.order_by.is_empty());
        let SelectItem::Expr { expr, .. } = &projection.select[2] else {
            panic!("expected expression");
        };
        assert!(matches!(expr, Expr::Aggregate { func: Aggregation::Max, .. }));
    }

    #[test]
    fn test_fallbacks_are_reported() {
        let config = QueryConfig::new(vec![
            Metric { function: MetricFunction::Unknown("p99".into()), column: None, alias: None },
            Metric { function: MetricFunction::Sum, column: None, alias: Some("total sum".into()) },
            Metric::new(MetricFunction::Max, "nonexistent"),
        ])
        .with_group_by(vec!["url_path".into(), "url_path".into(), "bogus".into()]);
        let (projection, warnings) = project(&config, &[]);
        assert_eq!(names(&projection), vec!["url_path", "metric_1", "total_sum", "metric_3"]);
        assert!(warnings.contains(&CompileWarning::UnknownFunction { function: "p99".into() }));
        assert!(warnings.contains(&CompileWarning::InvalidAlias {
            alias: "total sum".into(),
            replacement: "total_sum".into()
        }));
        assert!(warnings.contains(&CompileWarning::MissingMetricColumn {
            alias: "total_sum".into(),
            function: "sum".into()
        }));
        assert!(warnings.contains(&CompileWarning::UnknownColumn {
            column: "nonexistent".into(),
            context: "metric"
        }));
        assert!(warnings.contains(&CompileWarning::DuplicateOutput { name: "url_path".into() }));
        assert!(warnings.contains(&CompileWarning::UnknownColumn {
            column: "bogus".into(),
            context: "group by"
        }));
    }

    #[test]
    fn test_empty_metrics_count_rows() {
        let (projection, _) = project(&QueryConfig::default(), &[]);
        assert_eq!(names(&projection), vec!["metric_1"]);
    }
}

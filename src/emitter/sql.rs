//! SQL emitter
//!
//! Serializes a SelectQuery into BigQuery SQL text. Layout is part of the
//! contract with the rewriter: each filter clause sits on its own line starting
//! with `WHERE` or `AND`, and the outermost `GROUP BY`, `ORDER BY` and `LIMIT`
//! start at column 0.

use crate::plan::{
    Aggregation, Cte, Expr, FilterClause, Join, JoinType, Literal, SelectItem, SelectQuery,
    SortKey, Source,
};
use super::escape::{quote_table, render_literal};
use super::params::{BoundParam, BoundValues, InlineValues, ValueSink};

/// Emit SQL with every user value inlined as an escaped literal.
pub fn emit_sql(query: &SelectQuery) -> String {
    let mut sink = InlineValues;
    emit_query(query, 0, &mut sink).join("\n")
}

/// Emit SQL with user values replaced by named parameters.
pub fn emit_template(query: &SelectQuery) -> (String, Vec<BoundParam>) {
    let mut sink = BoundValues::new();
    let sql = emit_query(query, 0, &mut sink).join("\n");
    (sql, sink.into_params())
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

fn emit_query(query: &SelectQuery, indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let p = pad(indent);
    let mut lines = Vec::new();

    lines.extend(emit_ctes(&query.ctes, indent, sink));
    lines.extend(emit_select_list(&query.select, indent, sink));
    lines.extend(emit_from(&query.from, indent, sink));

    for join in &query.joins {
        lines.extend(emit_join(join, indent, sink));
    }

    lines.extend(emit_filters(&query.filters, indent, sink));

    if !query.group_by.is_empty() {
        let cols: Vec<String> = query.group_by.iter().map(|e| emit_expr(e, sink)).collect();
        lines.push(format!("{p}GROUP BY {}", cols.join(", ")));
    }

    if !query.order_by.is_empty() {
        lines.push(format!("{p}ORDER BY {}", emit_sort_keys(&query.order_by)));
    }

    if let Some(limit) = query.limit {
        lines.push(format!("{p}LIMIT {limit}"));
    }

    lines
}

fn emit_ctes(ctes: &[Cte], indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let p = pad(indent);
    let mut lines = Vec::new();
    for (i, cte) in ctes.iter().enumerate() {
        if i == 0 {
            lines.push(format!("{p}WITH {} AS (", cte.name));
        } else {
            lines.push(format!("{p}{} AS (", cte.name));
        }
        lines.extend(emit_query(&cte.query, indent + 1, sink));
        if i + 1 < ctes.len() {
            lines.push(format!("{p}),"));
        } else {
            lines.push(format!("{p})"));
        }
    }
    lines
}

fn emit_select_list(items: &[SelectItem], indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let p = pad(indent);
    if let [SelectItem::Wildcard { qualifier }] = items {
        if qualifier.is_empty() {
            return vec![format!("{p}SELECT *")];
        }
    }

    let mut lines = vec![format!("{p}SELECT")];
    let last = items.len().saturating_sub(1);
    for (i, item) in items.iter().enumerate() {
        let sql = emit_select_item(item, sink);
        let comma = if i < last { "," } else { "" };
        lines.push(format!("{p}  {sql}{comma}"));
    }
    lines
}

fn emit_select_item(item: &SelectItem, sink: &mut dyn ValueSink) -> String {
    match item {
        SelectItem::Wildcard { qualifier } if qualifier.is_empty() => "*".to_string(),
        SelectItem::Wildcard { qualifier } => format!("{qualifier}.*"),
        SelectItem::Expr { expr, alias: Some(alias) } => {
            format!("{} AS {}", emit_expr(expr, sink), alias)
        }
        SelectItem::Expr { expr, alias: None } => emit_expr(expr, sink),
    }
}

fn emit_from(source: &Source, indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    emit_source("FROM", source, indent, sink)
}

/// `<keyword> source`; a subquery opens a parenthesized block on its own lines
fn emit_source(keyword: &str, source: &Source, indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let p = pad(indent);
    let (inner, alias) = match source {
        Source::Table { name, alias } => {
            return vec![format!("{p}{keyword} {} {}", quote_table(name), alias)];
        }
        Source::Named(name) => return vec![format!("{p}{keyword} {name}")],
        Source::Subquery(inner) => (inner, None),
        Source::Derived { query, alias } => (query, Some(alias)),
    };

    let mut lines = vec![format!("{p}{keyword} (")];
    lines.extend(emit_query(inner, indent + 1, sink));
    match alias {
        Some(alias) => lines.push(format!("{p}) {alias}")),
        None => lines.push(format!("{p})")),
    }
    lines
}

fn emit_join(join: &Join, indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let kw = match join.join_type {
        JoinType::Inner => "INNER JOIN",
        JoinType::Left => "LEFT JOIN",
    };
    let mut lines = emit_source(kw, &join.source, indent, sink);
    lines.push(format!("{}  ON {}", pad(indent), emit_expr(&join.on, sink)));
    lines
}

fn emit_filters(filters: &[FilterClause], indent: usize, sink: &mut dyn ValueSink) -> Vec<String> {
    let p = pad(indent);
    let mut lines = Vec::new();
    for (i, clause) in filters.iter().enumerate() {
        match clause {
            FilterClause::Predicate(expr) if i == 0 => {
                lines.push(format!("{p}WHERE {}", emit_expr(expr, sink)));
            }
            FilterClause::Predicate(expr) => {
                lines.push(format!("{p}  AND {}", emit_expr(expr, sink)));
            }
            FilterClause::Optional(expr) => {
                if i == 0 {
                    lines.push(format!("{p}WHERE 1 = 1"));
                }
                lines.push(format!("{p}  [[AND {}]]", emit_expr(expr, sink)));
            }
        }
    }
    lines
}

fn emit_sort_keys(keys: &[SortKey]) -> String {
    keys.iter()
        .map(|k| format!("{} {}", k.column, k.direction.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn emit_list(exprs: &[Expr], sink: &mut dyn ValueSink) -> Vec<String> {
    exprs.iter().map(|e| emit_expr(e, sink)).collect()
}

fn emit_expr(expr: &Expr, sink: &mut dyn ValueSink) -> String {
    match expr {
        Expr::Column(col) => col.qualified_name(),
        Expr::Literal(lit) => render_literal(lit),
        Expr::Value(lit) => sink.value(lit),
        Expr::Placeholder(name) => format!("{{{{{}}}}}", name),
        Expr::BinaryOp { left, op, right } => {
            let l = emit_expr(left, sink);
            let r = emit_expr(right, sink);
            format!("{} {} {}", l, op.as_str(), r)
        }
        Expr::Like { expr, pattern, negated } => {
            let e = emit_expr(expr, sink);
            let pat = emit_expr(pattern, sink);
            let kw = if *negated { "NOT LIKE" } else { "LIKE" };
            format!("{} {} {}", e, kw, pat)
        }
        Expr::In { expr, values } => {
            let needle = emit_expr(expr, sink);
            let vals = emit_list(values, sink);
            format!("{} IN ({})", needle, vals.join(", "))
        }
        Expr::And(exprs) => {
            if exprs.is_empty() {
                return "TRUE".to_string();
            }
            emit_list(exprs, sink).join(" AND ")
        }
        Expr::IsNull(inner) => format!("{} IS NULL", emit_expr(inner, sink)),
        Expr::IsNotNull(inner) => format!("{} IS NOT NULL", emit_expr(inner, sink)),
        Expr::Case { when_then, else_result } => {
            let mut sql = String::from("CASE");
            for (cond, then) in when_then {
                let c = emit_expr(cond, sink);
                let t = emit_expr(then, sink);
                sql.push_str(&format!(" WHEN {} THEN {}", c, t));
            }
            if let Some(el) = else_result {
                sql.push_str(&format!(" ELSE {}", emit_expr(el, sink)));
            }
            sql.push_str(" END");
            sql
        }
        Expr::Function { name, args } => {
            format!("{}({})", name, emit_list(args, sink).join(", "))
        }
        Expr::Cast { expr, type_name } => {
            format!("CAST({} AS {})", emit_expr(expr, sink), type_name)
        }
        Expr::Aggregate { func, arg } => emit_aggregate(func, arg.as_deref(), sink),
        Expr::Exists { negated, table, alias, predicates } => {
            let kw = if *negated { "NOT EXISTS" } else { "EXISTS" };
            let preds = emit_list(predicates, sink);
            format!(
                "{} (SELECT 1 FROM {} {} WHERE {})",
                kw,
                quote_table(table),
                alias,
                preds.join(" AND ")
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

fn emit_aggregate(func: &Aggregation, arg: Option<&Expr>, sink: &mut dyn ValueSink) -> String {
    let Some(arg) = arg else {
        return "COUNT(*)".to_string();
    };
    let inner = emit_expr(arg, sink);
    match func {
        Aggregation::CountRows => "COUNT(*)".to_string(),
        Aggregation::CountDistinct => format!("COUNT(DISTINCT {})", inner),
        Aggregation::Sum => format!("SUM({})", inner),
        Aggregation::Avg => format!("AVG({})", inner),
        Aggregation::Median => format!("APPROX_QUANTILES({}, 2)[OFFSET(1)]", inner),
        Aggregation::Min => format!("MIN({})", inner),
        Aggregation::Max => format!("MAX({})", inner),
        Aggregation::FirstString { order_by } => format!(
            "STRING_AGG({}, {} ORDER BY {} LIMIT 1)",
            inner,
            render_literal(&Literal::String(",".into())),
            order_by.qualified_name()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Column, Literal};
    use crate::query::SortDirection;

    fn scan(table: &str, alias: &str) -> Source {
        Source::Table { name: table.into(), alias: alias.into() }
    }

    // -- unit: select ---------------------------------------------------------

    #[test]
    fn test_sql_select_from_table() {
        let mut q = SelectQuery::new(scan("p.d.events", "e"));
        q.select = vec![
            SelectItem::Wildcard { qualifier: "e".into() },
            SelectItem::aliased(Expr::column("e", "url_path"), "sti"),
        ];
        let sql = emit_sql(&q);
        assert_eq!(sql, "SELECT\n  e.*,\n  e.url_path AS sti\nFROM `p.d.events` e");
    }

    #[test]
    fn test_sql_select_star_from_subquery_is_indented() {
        let mut inner = SelectQuery::new(scan("t", "t"));
        inner.select = vec![SelectItem::bare(Expr::column("t", "a"))];
        let mut outer = SelectQuery::new(Source::Subquery(Box::new(inner)));
        outer.select = vec![SelectItem::Wildcard { qualifier: String::new() }];
        let sql = emit_sql(&outer);
        assert_eq!(sql, "SELECT *\nFROM (\n  SELECT\n    t.a\n  FROM `t` t\n)");
    }

    // -- unit: filters --------------------------------------------------------

    #[test]
    fn test_sql_filters_one_per_line() {
        let mut q = SelectQuery::new(Source::Named("base".into()));
        q.select = vec![SelectItem::Wildcard { qualifier: String::new() }];
        q.filters = vec![
            FilterClause::Predicate(Expr::eq(
                Expr::Column(Column::unqualified("website_id")),
                Expr::Value(Literal::String("abc".into())),
            )),
            FilterClause::Predicate(Expr::IsNull(Box::new(Expr::Column(Column::unqualified("x"))))),
            FilterClause::Optional(Expr::Placeholder("url".into())),
        ];
        let sql = emit_sql(&q);
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[2], "WHERE website_id = 'abc'");
        assert_eq!(lines[3], "  AND x IS NULL");
        assert_eq!(lines[4], "  [[AND {{url}}]]");
    }

    #[test]
    fn test_sql_optional_first_gets_where() {
        let mut q = SelectQuery::new(Source::Named("base".into()));
        q.select = vec![SelectItem::Wildcard { qualifier: String::new() }];
        q.filters = vec![FilterClause::Optional(Expr::Placeholder("v".into()))];
        let sql = emit_sql(&q);
        assert!(sql.contains("WHERE 1 = 1\n  [[AND {{v}}]]"));
    }

    // -- unit: template -------------------------------------------------------

    #[test]
    fn test_template_binds_values_not_constants() {
        let mut q = SelectQuery::new(Source::Named("base".into()));
        q.select = vec![SelectItem::aliased(
            Expr::function("FORMAT_TIMESTAMP", vec![Expr::string("%Y"), Expr::column("base", "created_at")]),
            "dato",
        )];
        q.filters = vec![FilterClause::Predicate(Expr::Like {
            expr: Box::new(Expr::Column(Column::unqualified("url_path"))),
            pattern: Box::new(Expr::Value(Literal::String("/a%".into()))),
            negated: false,
        })];
        let (sql, params) = emit_template(&q);
        assert!(sql.contains("FORMAT_TIMESTAMP('%Y', base.created_at) AS dato"));
        assert!(sql.contains("WHERE url_path LIKE @p0"));
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "p0");
    }

    // -- unit: expressions ----------------------------------------------------

    #[test]
    fn test_sql_case_expr() {
        let expr = Expr::Case {
            when_then: vec![(
                Expr::eq(Expr::column("d", "data_key"), Expr::string("k")),
                Expr::column("d", "string_value"),
            )],
            else_result: None,
        };
        let sql = emit_expr(&expr, &mut InlineValues);
        assert_eq!(sql, "CASE WHEN d.data_key = 'k' THEN d.string_value END");
    }

    #[test]
    fn test_sql_in_expr() {
        let expr = Expr::In {
            expr: Box::new(Expr::column("t", "status")),
            values: vec![
                Expr::Value(Literal::String("active".into())),
                Expr::Value(Literal::String("pending".into())),
            ],
        };
        assert_eq!(emit_expr(&expr, &mut InlineValues), "t.status IN ('active', 'pending')");
    }

    #[test]
    fn test_sql_exists_is_single_line() {
        let expr = Expr::Exists {
            negated: true,
            table: "p.d.event_data".into(),
            alias: "d".into(),
            predicates: vec![
                Expr::eq(Expr::column("d", "website_event_id"), Expr::column("base", "event_id")),
                Expr::eq(Expr::column("d", "data_key"), Expr::string("k")),
            ],
        };
        let sql = emit_expr(&expr, &mut InlineValues);
        assert_eq!(
            sql,
            "NOT EXISTS (SELECT 1 FROM `p.d.event_data` d WHERE d.website_event_id = base.event_id AND d.data_key = 'k')"
        );
    }

    #[test]
    fn test_sql_aggregates() {
        let col = Expr::column("base", "x");
        let mut sink = InlineValues;
        assert_eq!(emit_expr(&Expr::count_rows(), &mut sink), "COUNT(*)");
        assert_eq!(
            emit_expr(&Expr::aggregate(Aggregation::CountDistinct, col.clone()), &mut sink),
            "COUNT(DISTINCT base.x)"
        );
        assert_eq!(
            emit_expr(&Expr::aggregate(Aggregation::Median, col.clone()), &mut sink),
            "APPROX_QUANTILES(base.x, 2)[OFFSET(1)]"
        );
        let first = Aggregation::FirstString { order_by: Column::new("base", "created_at") };
        assert_eq!(
            emit_expr(&Expr::aggregate(first, col), &mut sink),
            "STRING_AGG(base.x, ',' ORDER BY base.created_at LIMIT 1)"
        );
    }

    #[test]
    fn test_sql_group_order_limit_at_column_zero() {
        let mut q = SelectQuery::new(Source::Named("base".into()));
        q.select = vec![
            SelectItem::bare(Expr::column("base", "url_path")),
            SelectItem::aliased(Expr::count_rows(), "metric_1"),
        ];
        q.group_by = vec![Expr::column("base", "url_path")];
        q.order_by = vec![SortKey::new("metric_1", SortDirection::Desc)];
        q.limit = Some(1000);
        let sql = emit_sql(&q);
        assert!(sql.ends_with("GROUP BY base.url_path\nORDER BY metric_1 DESC\nLIMIT 1000"));

        q.order_by = vec![SortKey::position(1, SortDirection::Desc)];
        assert!(emit_sql(&q).ends_with("\nORDER BY 1 DESC\nLIMIT 1000"));
    }

    #[test]
    fn test_sql_join_derived_table() {
        let mut pivot = SelectQuery::new(scan("p.d.event_data", "d"));
        pivot.select = vec![SelectItem::bare(Expr::column("d", "website_event_id"))];
        pivot.group_by = vec![Expr::column("d", "website_event_id")];

        let mut q = SelectQuery::new(Source::Named("base".into()));
        q.select = vec![SelectItem::Wildcard { qualifier: String::new() }];
        q.joins = vec![Join {
            join_type: JoinType::Left,
            source: Source::Derived { query: Box::new(pivot), alias: "event_data".into() },
            on: Expr::eq(Expr::column("event_data", "website_event_id"), Expr::column("base", "event_id")),
        }];
        assert_eq!(
            emit_sql(&q),
            "SELECT *\nFROM base\nLEFT JOIN (\n  SELECT\n    d.website_event_id\n  FROM `p.d.event_data` d\n  GROUP BY d.website_event_id\n) event_data\n  ON event_data.website_event_id = base.event_id"
        );
    }
}

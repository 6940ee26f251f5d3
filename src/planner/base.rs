//! Base projection
//!
//! Builds the `base` CTE: raw event columns, computed URL and referrer columns,
//! optionally the session columns, and the static filters. The raw projection
//! sits in an inner subquery so filters can address computed columns by name.

use crate::plan::{Column, Cte, Expr, FilterClause, Join, JoinType, Literal, SelectItem, SelectQuery, Source};
use crate::query::Website;
use crate::schema::{CompilerSettings, ComputedColumn, SchemaRegistry, SourceTable};
use super::{BASE_NAME, SCOPE_COLUMN};

const EVENT_ALIAS: &str = "e";
const SESSION_ALIAS: &str = "s";

/// `path` followed by `?query` when the query string is non-empty
fn full_path(path: &str, query: &str) -> Expr {
    let query_col = Expr::column(EVENT_ALIAS, query);
    let has_query = Expr::And(vec![
        Expr::IsNotNull(Box::new(query_col.clone())),
        Expr::not_eq(query_col.clone(), Expr::string("")),
    ]);
    Expr::function(
        "CONCAT",
        vec![
            Expr::column(EVENT_ALIAS, path),
            Expr::Case {
                when_then: vec![(has_query, Expr::function("CONCAT", vec![Expr::string("?"), query_col]))],
                else_result: Some(Box::new(Expr::string(""))),
            },
        ],
    )
}

/// Expression for a computed base column
pub(crate) fn computed_expr(column: ComputedColumn) -> Expr {
    match column {
        ComputedColumn::UrlFullpath => full_path("url_path", "url_query"),
        ComputedColumn::UrlFullurl => Expr::function(
            "CONCAT",
            vec![
                Expr::string("https://"),
                Expr::column(EVENT_ALIAS, "hostname"),
                full_path("url_path", "url_query"),
            ],
        ),
        ComputedColumn::ReferrerFullpath => full_path("referrer_path", "referrer_query"),
        ComputedColumn::ReferrerFullurl => {
            let domain = Expr::column(EVENT_ALIAS, "referrer_domain");
            let missing = Expr::IsNull(Box::new(Expr::function(
                "NULLIF",
                vec![domain.clone(), Expr::string("")],
            )));
            Expr::Case {
                when_then: vec![(missing, Expr::Literal(Literal::Null))],
                else_result: Some(Box::new(Expr::function(
                    "CONCAT",
                    vec![
                        Expr::string("https://"),
                        domain,
                        full_path("referrer_path", "referrer_query"),
                    ],
                ))),
            }
        }
    }
}

/// Row-scope filter for the selected website; always the first base clause
pub(crate) fn website_scope(website: &Website) -> FilterClause {
    FilterClause::Predicate(Expr::eq(
        Expr::Column(Column::unqualified(SCOPE_COLUMN)),
        Expr::Value(Literal::String(website.id.clone())),
    ))
}

/// Build the `base` CTE
///
/// `filters` are the already-rendered static clauses, in report order.
pub(crate) fn build_base(
    registry: &SchemaRegistry,
    settings: &CompilerSettings,
    website: &Website,
    filters: Vec<FilterClause>,
    join_session: bool,
) -> Cte {
    let mut select = vec![SelectItem::Wildcard { qualifier: EVENT_ALIAS.to_string() }];

    select.extend(
        registry
            .columns_in(SourceTable::Computed)
            .filter_map(|c| c.computed().map(|kind| (c, kind)))
            .map(|(c, kind)| SelectItem::aliased(computed_expr(kind), c.name.clone())),
    );

    let mut joins = Vec::new();
    if join_session {
        select.extend(
            registry
                .columns_in(SourceTable::Session)
                .map(|c| SelectItem::bare(Expr::column(SESSION_ALIAS, c.name.clone()))),
        );
        joins.push(Join {
            join_type: JoinType::Left,
            source: Source::Table {
                name: settings.session_table.clone(),
                alias: SESSION_ALIAS.to_string(),
            },
            on: Expr::eq(
                Expr::column(SESSION_ALIAS, "session_id"),
                Expr::column(EVENT_ALIAS, "session_id"),
            ),
        });
    }

    let mut raw = SelectQuery::new(Source::Table {
        name: settings.event_table.clone(),
        alias: EVENT_ALIAS.to_string(),
    });
    raw.select = select;
    raw.joins = joins;

    let mut scoped = SelectQuery::new(Source::Subquery(Box::new(raw)));
    scoped.select = vec![SelectItem::Wildcard { qualifier: String::new() }];
    scoped.filters = std::iter::once(website_scope(website)).chain(filters).collect();

    Cte {
        name: BASE_NAME.to_string(),
        query: scoped,
    }
}

//! Integration tests for variable rewriting on compiled SQL

mod common;

use common::{base_cte, outer_query, run};
use umami_sql::{bind, rename, unbind, Filter, Metric, QueryConfig, RewriteError, Variable};

fn compiled_sql() -> String {
    let filters = vec![
        Filter::starts_with("url_path", "/soknad"),
        Filter::equals("event_name", "skjema-startet"),
    ];
    let config = QueryConfig::new(vec![Metric::count()]).with_group_by(vec!["created_at".into()]);
    run(&filters, &[], &config).sql
}

#[test]
fn test_bind_field_filter_on_compiled_sql() {
    let sql = compiled_sql();
    let bound = bind(&sql, &Variable::field_filter("sti", "url_path"));
    let base = base_cte(&bound);
    assert!(base.contains("\n    AND {{sti}}\n    AND event_name = 'skjema-startet'"));
    assert!(!bound.contains("/soknad"));
    assert_eq!(outer_query(&bound), outer_query(&sql));
}

#[test]
fn test_bind_without_literal_appends_optional_clause() {
    let sql = compiled_sql();
    let bound = bind(&sql, &Variable::date("dag"));
    assert!(outer_query(&bound).contains("FROM base\nWHERE 1 = 1\n  [[AND DATE(base.created_at) = {{dag}}]]\nGROUP BY dato\n"));
    assert_eq!(base_cte(&bound), base_cte(&sql));
}

#[test]
fn test_bind_twice_is_unchanged() {
    let v = Variable::field_filter("hendelse", "event_name");
    let once = bind(&compiled_sql(), &v);
    assert_eq!(bind(&once, &v), once);
    assert_eq!(once.matches("{{hendelse}}").count(), 1);
}

#[test]
fn test_round_trip_removes_placeholder_and_literal() {
    let sql = compiled_sql();
    for v in [
        Variable::field_filter("sti", "url_path"),
        Variable::text("event_name"),
        Variable::date("dag"),
    ] {
        let restored = unbind(&bind(&sql, &v), &v);
        assert!(!restored.contains(&v.token()), "{} left in:\n{}", v.token(), restored);
        assert!(restored.contains("\n  WHERE website_id = "));
    }

    let v = Variable::field_filter("sti", "url_path");
    let restored = unbind(&bind(&sql, &v), &v);
    assert!(!restored.contains("url_path LIKE"));
}

#[test]
fn test_same_column_binds_first_match_only() {
    let sql = compiled_sql();
    let first = bind(&sql, &Variable::field_filter("a", "url_path"));
    let second = bind(&first, &Variable::field_filter("b", "url_path"));
    assert!(base_cte(&second).contains("\n    AND {{a}}\n"));
    assert!(outer_query(&second).contains("\nWHERE 1 = 1\n  [[AND {{b}}]]\n"));
}

#[test]
fn test_website_scope_survives_bind_and_unbind() {
    let sql = compiled_sql();
    let v = Variable::field_filter("site", "website_id");
    let bound = bind(&sql, &v);
    assert_eq!(base_cte(&bound), base_cte(&sql));
    assert!(outer_query(&bound).contains("\nWHERE 1 = 1\n  [[AND {{site}}]]\nGROUP BY dato\n"));

    let restored = unbind(&bound, &v);
    assert_eq!(base_cte(&restored), base_cte(&sql));
    assert!(base_cte(&restored).contains(&format!("\n  WHERE website_id = '{}'\n", common::WEBSITE_ID)));
}

#[test]
fn test_independent_variables_commute() {
    let sql = compiled_sql();
    let a = Variable::field_filter("sti", "url_path");
    let b = Variable::field_filter("hendelse", "event_name");
    assert_eq!(bind(&bind(&sql, &a), &b), bind(&bind(&sql, &b), &a));
    assert_eq!(
        unbind(&bind(&bind(&sql, &a), &b), &a),
        unbind(&bind(&bind(&sql, &b), &a), &a)
    );
}

#[test]
fn test_rename_is_exact() {
    let sql = compiled_sql();
    let bound = bind(&bind(&sql, &Variable::field_filter("sti", "url_path")), &Variable::text("sti_2"));
    let renamed = rename(&bound, "sti", "path").unwrap();
    assert!(renamed.contains("{{path}}"));
    assert!(renamed.contains("{{sti_2}}"));
    assert!(!renamed.contains("{{sti}}"));

    assert_eq!(rename(&bound, "sti", "sti_2"), Err(RewriteError::NameTaken("sti_2".into())));
    assert_eq!(rename(&bound, "sti", "{{x}}"), Err(RewriteError::InvalidName("{{x}}".into())));
}

//! Join inference
//!
//! A static column-to-table lookup: the session table is joined into the base
//! projection only when a filter, group-by field or metric reads one of its
//! columns.

use crate::query::{Filter, QueryConfig};
use super::resolve::Resolver;

/// Every column identifier the report touches, in report order
fn referenced_columns<'q>(filters: &'q [Filter], config: &'q QueryConfig) -> impl Iterator<Item = &'q str> {
    filters
        .iter()
        .map(|f| f.column.as_str())
        .chain(config.group_by.iter().map(String::as_str))
        .chain(config.metrics.iter().filter_map(|m| m.column.as_deref()))
}

/// Determine whether the session table must be joined
pub(crate) fn needs_session_join(resolver: &Resolver<'_>, filters: &[Filter], config: &QueryConfig) -> bool {
    referenced_columns(filters, config).any(|c| resolver.is_session_column(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::resolve::ParameterSet;
    use crate::planner::warning::Warnings;
    use crate::query::{Metric, MetricFunction};
    use crate::schema::SchemaRegistry;

    fn with_resolver(check: impl FnOnce(&Resolver<'_>)) {
        let registry = SchemaRegistry::umami();
        let mut warnings = Warnings::default();
        let resolver = Resolver::new(&registry, ParameterSet::build(&[], &mut warnings));
        check(&resolver);
    }

    #[test]
    fn test_no_session_columns() {
        with_resolver(|resolver| {
            let config = QueryConfig::new(vec![Metric::count()]).with_group_by(vec!["url_path".into()]);
            let filters = vec![Filter::equals("event_name", "klikk")];
            assert!(!needs_session_join(resolver, &filters, &config));
        });
    }

    #[test]
    fn test_session_column_in_each_position() {
        with_resolver(|resolver| {
            let base = QueryConfig::new(vec![Metric::count()]);

            let filters = vec![Filter::equals("country", "NO")];
            assert!(needs_session_join(resolver, &filters, &base));

            let grouped = base.clone().with_group_by(vec!["browser".into()]);
            assert!(needs_session_join(resolver, &[], &grouped));

            let metric = QueryConfig::new(vec![Metric::new(MetricFunction::CountDistinct, "device")]);
            assert!(needs_session_join(resolver, &[], &metric));
        });
    }
}

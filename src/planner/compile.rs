//! Compiler entry points

use serde::Serialize;
use crate::emitter::{emit_sql, emit_template, BoundParam};
use crate::plan::{FilterClause, SelectQuery, Source};
use crate::query::{Filter, Parameter, QueryConfig, Website};
use crate::schema::{CompilerSettings, SchemaRegistry};
use super::attributes::{attribute_join, referenced_attributes};
use super::base::build_base;
use super::filters::{attribute_clause, static_clause};
use super::joins::needs_session_join;
use super::resolve::{ColumnRef, ParameterSet, Resolver};
use super::select::plan_projection;
use super::warning::{CompileWarning, Warnings};
use super::BASE_NAME;

/// Result of compiling one report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// SQL with every value inlined as an escaped literal
    pub sql: String,
    /// The same query with user values replaced by `@p0`, `@p1`, ...
    pub template: String,
    /// Values for the template's named parameters
    pub params: Vec<BoundParam>,
    #[serde(skip)]
    pub warnings: Vec<CompileWarning>,
}

impl CompiledQuery {
    /// The "not ready" result: no website has been selected yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Report compiler bound to a schema and warehouse settings
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    registry: SchemaRegistry,
    settings: CompilerSettings,
}

impl Compiler {
    pub fn new(registry: SchemaRegistry, settings: CompilerSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Build the query plan for a report
    ///
    /// Never fails: clauses that cannot be compiled are dropped and reported in
    /// the returned warnings.
    pub fn plan(
        &self,
        website: &Website,
        filters: &[Filter],
        parameters: &[Parameter],
        config: &QueryConfig,
    ) -> (SelectQuery, Vec<CompileWarning>) {
        let mut warnings = Warnings::default();
        let resolver = Resolver::new(&self.registry, ParameterSet::build(parameters, &mut warnings));

        let join_session = needs_session_join(&resolver, filters, config);
        tracing::debug!(website = %website.id, join_session, "join inference");

        let mut base_filters = Vec::new();
        let mut outer_filters: Vec<FilterClause> = Vec::new();
        for filter in filters {
            match resolver.resolve(&filter.column) {
                Some(ColumnRef::Schema(def)) => {
                    base_filters.extend(static_clause(def, filter, &mut warnings));
                }
                Some(ColumnRef::Attribute(param)) => {
                    outer_filters.extend(attribute_clause(param, filter, &self.settings, &mut warnings));
                }
                None => warnings.push(CompileWarning::UnknownColumn {
                    column: filter.column.clone(),
                    context: "filter",
                }),
            }
        }
        tracing::debug!(
            base = base_filters.len(),
            attribute = outer_filters.len(),
            "rendered filters"
        );

        let attributes = referenced_attributes(&resolver, config);
        let projection = plan_projection(&resolver, &self.settings, config, &attributes, &mut warnings);

        let mut query = SelectQuery::new(Source::Named(BASE_NAME.to_string()));
        query.ctes = vec![build_base(&self.registry, &self.settings, website, base_filters, join_session)];
        query.select = projection.select;
        if !attributes.is_empty() {
            query.joins.push(attribute_join(&self.settings, website, &attributes));
        }
        query.filters = outer_filters;
        query.group_by = projection.group_by;
        query.order_by = projection.order_by;
        query.limit = Some(self.settings.row_limit);

        (query, warnings.into_vec())
    }

    /// Compile a report to SQL
    ///
    /// Returns [`CompiledQuery::empty`] until a website with an id is selected.
    pub fn compile(
        &self,
        website: Option<&Website>,
        filters: &[Filter],
        parameters: &[Parameter],
        config: &QueryConfig,
    ) -> CompiledQuery {
        let Some(website) = website.filter(|w| !w.id.trim().is_empty()) else {
            tracing::debug!("no website selected, nothing to compile");
            return CompiledQuery::empty();
        };

        let (query, warnings) = self.plan(website, filters, parameters, config);
        let sql = emit_sql(&query);
        let (template, params) = emit_template(&query);
        CompiledQuery {
            sql,
            template,
            params,
            warnings,
        }
    }
}

/// Compile a report against the default umami schema and settings
pub fn compile(
    website: Option<&Website>,
    filters: &[Filter],
    parameters: &[Parameter],
    config: &QueryConfig,
) -> CompiledQuery {
    Compiler::default().compile(website, filters, parameters, config)
}

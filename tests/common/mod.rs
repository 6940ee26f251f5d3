//! Shared test utilities for integration tests

#![allow(dead_code)]

use umami_sql::{compile, parser, CompiledQuery, Filter, Parameter, QueryConfig, SchemaRegistry, Website};

pub const WEBSITE_ID: &str = "35abb2b7-3f97-42ce-931b-cf547d40d967";

/// Install a test subscriber once so `RUST_LOG=umami_sql=debug` shows planner logs
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn website() -> Website {
    Website::new(WEBSITE_ID, "nav.no")
}

/// Load a registry fixture from the test_data directory
pub fn load_test_data(name: &str) -> SchemaRegistry {
    let path = format!("test_data/{}", name);
    parser::parse_file(&path).unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Compile against the default schema for the test website
pub fn run(filters: &[Filter], parameters: &[Parameter], config: &QueryConfig) -> CompiledQuery {
    init_tracing();
    let compiled = compile(Some(&website()), filters, parameters, config);
    assert!(!compiled.is_empty(), "compilation produced no SQL");
    compiled
}

/// The outer query: everything after the base CTE
pub fn outer_query(sql: &str) -> &str {
    let start = sql.find("\n)\nSELECT").map(|i| i + 3).unwrap_or_else(|| panic!("no base CTE in:\n{sql}"));
    &sql[start..]
}

/// The base CTE up to its closing parenthesis
pub fn base_cte(sql: &str) -> &str {
    let end = sql.find("\n)\nSELECT").unwrap_or_else(|| panic!("no base CTE in:\n{sql}"));
    &sql[..end]
}

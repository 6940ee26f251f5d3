//! Compiler settings

use serde::Deserialize;

/// Safety cap appended to every compiled query
pub const DEFAULT_ROW_LIMIT: u32 = 1000;

/// Warehouse-level settings that are not part of a single report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerSettings {
    /// Per-event table (`project.dataset.table`)
    pub event_table: String,
    /// Per-session table
    pub session_table: String,
    /// Per-event key/value attribute table
    pub event_data_table: String,
    pub row_limit: u32,
    /// IANA timezone for date bucketing; UTC when unset
    pub timezone: Option<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            event_table: "team-researchops-prod-01d6.umami.public_website_event".to_string(),
            session_table: "team-researchops-prod-01d6.umami.public_session".to_string(),
            event_data_table: "team-researchops-prod-01d6.umami.public_event_data".to_string(),
            row_limit: DEFAULT_ROW_LIMIT,
            timezone: None,
        }
    }
}

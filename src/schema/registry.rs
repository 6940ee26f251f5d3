//! Schema registry: column identifier -> {table, label, type}

use std::collections::HashSet;
use serde::Deserialize;
use super::column::{ColumnDef, SourceTable};
use super::types::DataType;
use crate::emitter::escape::is_identifier;
use crate::error::ParseError;

/// Event timestamp column of the umami schema
pub const DEFAULT_TIMESTAMP_FIELD: &str = "created_at";

fn default_timestamp_field() -> String {
    DEFAULT_TIMESTAMP_FIELD.to_string()
}

/// The explicit column registry shared by the dashboard and the compiler
///
/// Every static filter, group-by field and metric target is looked up here.
/// Columns not found in the registry are treated as unknown by the compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRegistry {
    /// Event timestamp column, bucketed as `dato` when grouped
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,
    pub columns: Vec<ColumnDef>,
}

impl SchemaRegistry {
    /// Get a column by name
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Table the column lives in, if it is a registry column
    pub fn table_of(&self, name: &str) -> Option<SourceTable> {
        self.get(name).map(|c| c.table)
    }

    pub fn is_timestamp(&self, name: &str) -> bool {
        name == self.timestamp_field
    }

    /// Columns read from the given table, in registry order
    pub fn columns_in(&self, table: SourceTable) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(move |c| c.table == table)
    }

    /// Check names, uniqueness, computed expressions and the timestamp field
    pub fn validate(&self) -> Result<(), ParseError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_identifier(&column.name) {
                return Err(ParseError::InvalidColumnName(column.name.clone()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ParseError::DuplicateColumn(column.name.clone()));
            }
            if column.table == SourceTable::Computed && column.computed().is_none() {
                return Err(ParseError::UnknownComputedColumn(column.name.clone()));
            }
        }
        match self.get(&self.timestamp_field) {
            Some(c) if c.table == SourceTable::Event => Ok(()),
            _ => Err(ParseError::MissingTimestampField(self.timestamp_field.clone())),
        }
    }

    /// The umami event schema as exposed by the warehouse views
    pub fn umami() -> Self {
        use DataType::{Number, String as Text, Timestamp};
        use SourceTable::{Computed, Event, Session};

        let columns = vec![
            ColumnDef::new("event_id", Event, "Hendelse-ID", Text),
            ColumnDef::new("website_id", Event, "Nettsted-ID", Text),
            ColumnDef::new("session_id", Event, "Økt-ID", Text),
            ColumnDef::new("visit_id", Event, "Besøk-ID", Text),
            ColumnDef::new(DEFAULT_TIMESTAMP_FIELD, Event, "Tidspunkt", Timestamp),
            ColumnDef::new("hostname", Event, "Vertsnavn", Text),
            ColumnDef::new("url_path", Event, "URL-sti", Text),
            ColumnDef::new("url_query", Event, "URL-parametere", Text),
            ColumnDef::new("referrer_path", Event, "Henvisningssti", Text),
            ColumnDef::new("referrer_query", Event, "Henvisningsparametere", Text),
            ColumnDef::new("referrer_domain", Event, "Henvisningsdomene", Text),
            ColumnDef::new("page_title", Event, "Sidetittel", Text),
            ColumnDef::new("event_type", Event, "Hendelsestype", Number),
            ColumnDef::new("event_name", Event, "Hendelsesnavn", Text),
            ColumnDef::new("url_fullpath", Computed, "URL-sti med parametere", Text),
            ColumnDef::new("url_fullurl", Computed, "Full URL", Text),
            ColumnDef::new("referrer_fullpath", Computed, "Henvisningssti med parametere", Text),
            ColumnDef::new("referrer_fullurl", Computed, "Full henvisnings-URL", Text),
            ColumnDef::new("browser", Session, "Nettleser", Text),
            ColumnDef::new("os", Session, "Operativsystem", Text),
            ColumnDef::new("device", Session, "Enhet", Text),
            ColumnDef::new("screen", Session, "Skjermstørrelse", Text),
            ColumnDef::new("language", Session, "Språk", Text),
            ColumnDef::new("country", Session, "Land", Text),
            ColumnDef::new("subdivision1", Session, "Region", Text),
            ColumnDef::new("city", Session, "By", Text),
        ];

        Self {
            timestamp_field: default_timestamp_field(),
            columns,
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::umami()
    }
}

//! Column definitions for the event schema

use serde::Deserialize;
use super::types::DataType;

/// The physical table a column is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTable {
    /// The per-event table (always present in the base projection)
    Event,
    /// The per-session table, joined only when one of its columns is referenced
    Session,
    /// Derived in the base projection from event columns
    Computed,
}

/// Columns derived from raw URL and referrer parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputedColumn {
    /// Path plus `?query` when the query string is non-empty
    UrlFullpath,
    /// Scheme, hostname and full path
    UrlFullurl,
    /// Referrer path plus `?query` when the query string is non-empty
    ReferrerFullpath,
    /// Scheme, referrer domain and full referrer path; NULL without a referrer domain
    ReferrerFullurl,
}

impl ComputedColumn {
    pub const ALL: [ComputedColumn; 4] = [
        ComputedColumn::UrlFullpath,
        ComputedColumn::UrlFullurl,
        ComputedColumn::ReferrerFullpath,
        ComputedColumn::ReferrerFullurl,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Output column name in the base projection
    pub fn name(&self) -> &'static str {
        match self {
            ComputedColumn::UrlFullpath => "url_fullpath",
            ComputedColumn::UrlFullurl => "url_fullurl",
            ComputedColumn::ReferrerFullpath => "referrer_fullpath",
            ComputedColumn::ReferrerFullurl => "referrer_fullurl",
        }
    }
}

/// A column the compiler may filter, group or aggregate on
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub table: SourceTable,
    /// Human readable label shown by the dashboard
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(
        name: impl Into<String>,
        table: SourceTable,
        label: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            label: label.into(),
            data_type,
        }
    }

    /// Get the computed expression kind, if this is a computed column
    pub fn computed(&self) -> Option<ComputedColumn> {
        match self.table {
            SourceTable::Computed => ComputedColumn::from_name(&self.name),
            _ => None,
        }
    }
}

//! Select statement types

use super::expr::Expr;
use crate::query::SortDirection;

/// A complete SELECT statement, optionally with CTEs
///
/// Clause lists are accumulated as values by the planner and joined once by
/// the emitter.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub ctes: Vec<Cte>,
    pub select: Vec<SelectItem>,
    pub from: Source,
    pub joins: Vec<Join>,
    /// One line per clause: the first renders with `WHERE`, the rest with `AND`
    pub filters: Vec<FilterClause>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new(from: Source) -> Self {
        Self {
            ctes: Vec::new(),
            select: Vec::new(),
            from,
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Output names of the projection, in order
    pub fn output_names(&self) -> Vec<&str> {
        self.select.iter().filter_map(SelectItem::output_name).collect()
    }
}

/// A named common table expression
#[derive(Debug, Clone)]
pub struct Cte {
    pub name: String,
    pub query: SelectQuery,
}

/// Relation a query reads from
#[derive(Debug, Clone)]
pub enum Source {
    /// Warehouse table with an alias
    Table { name: String, alias: String },
    /// A CTE defined earlier in the statement
    Named(String),
    /// Inline subquery
    Subquery(Box<SelectQuery>),
    /// Inline subquery with an alias, e.g. a joined derived table
    Derived { query: Box<SelectQuery>, alias: String },
}

/// One projected item
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// `qualifier.*`
    Wildcard { qualifier: String },
    /// `expr [AS alias]`
    Expr { expr: Expr, alias: Option<String> },
}

impl SelectItem {
    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        SelectItem::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    pub fn bare(expr: Expr) -> Self {
        SelectItem::Expr { expr, alias: None }
    }

    /// Name the item is visible as in the result set
    pub fn output_name(&self) -> Option<&str> {
        match self {
            SelectItem::Wildcard { .. } => None,
            SelectItem::Expr { alias: Some(alias), .. } => Some(alias),
            SelectItem::Expr { expr: Expr::Column(col), alias: None } => Some(&col.name),
            SelectItem::Expr { .. } => None,
        }
    }
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
}

/// `LEFT JOIN source ON condition`; the condition renders on a single line
#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub source: Source,
    pub on: Expr,
}

/// A filter line in a WHERE block
#[derive(Debug, Clone)]
pub enum FilterClause {
    /// Always applied
    Predicate(Expr),
    /// Wrapped in `[[ ]]` so the BI tool drops it when its variable is unset
    Optional(Expr),
}

/// A sort key with direction
#[derive(Debug, Clone)]
pub struct SortKey {
    /// Output column name, or its 1-based position in the select list
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Sort by the select list item at `position` (1-based)
    pub fn position(position: usize, direction: SortDirection) -> Self {
        Self::new(position.to_string(), direction)
    }
}

//! bind, unbind and rename over a parsed document

use crate::emitter::escape::is_identifier;
use crate::planner::{BASE_NAME, SCOPE_COLUMN};
use super::clause::{Clause, ColumnName, Connective, Predicate};
use super::document::{ClauseLine, Document, Line};
use super::error::RewriteError;
use super::lexer::{contains_placeholder, replace_placeholder};
use super::variable::{Variable, VariableKind};

const CLAUSE_INDENT: &str = "  ";

/// Placeholder predicate standing in for a filter on `column`
fn placeholder_predicate(variable: &Variable, column: ColumnName) -> Predicate {
    let name = variable.name.clone();
    match variable.kind {
        VariableKind::FieldFilter { .. } => Predicate::Variable { name },
        VariableKind::Text | VariableKind::Number => Predicate::ColumnVariable { column, name },
        VariableKind::Date => Predicate::DateVariable { column, name },
    }
}

/// Bind a variable into the SQL
///
/// Replaces the first literal filter on the variable's column with its
/// placeholder, or appends an optional clause when there is none. A text that
/// already references the variable is returned unchanged. The website
/// row-scope filter is never replaced.
pub fn bind(sql: &str, variable: &Variable) -> String {
    if !is_identifier(&variable.name) {
        tracing::warn!(name = %variable.name, "invalid variable name, not binding");
        return sql.to_string();
    }
    if contains_placeholder(sql, &variable.name) {
        return sql.to_string();
    }

    let mut doc = Document::parse(sql);
    let target = variable.target_column();

    let replacement = doc.lines.iter().enumerate().find_map(|(i, line)| {
        let Line::Clause(line) = line else {
            return None;
        };
        let column = line.clause.predicate.literal_column()?;
        if column.matches(SCOPE_COLUMN) {
            return None;
        }
        column.matches(target).then(|| {
            let clause = Clause {
                predicate: placeholder_predicate(variable, column.clone()),
                ..line.clause.clone()
            };
            (i, line.with_clause(clause))
        })
    });

    if let Some((i, line)) = replacement {
        tracing::debug!(name = %variable.name, line = i, "replaced literal filter");
        doc.lines[i] = Line::Clause(line);
        return doc.render();
    }

    let column = ColumnName::new(format!("{}.{}", BASE_NAME, target));
    let clause = Clause {
        connective: Connective::And,
        optional: true,
        predicate: placeholder_predicate(variable, column),
    };
    let at = doc.tail_start();
    let mut inserted = vec![Line::Clause(ClauseLine::new(CLAUSE_INDENT, clause))];
    if !doc.has_top_level_where(at) {
        inserted.insert(0, Line::Raw("WHERE 1 = 1".to_string()));
    }
    tracing::debug!(name = %variable.name, line = at, "appended optional filter");
    doc.lines.splice(at..at, inserted);
    doc.render()
}

/// The line following a removed `WHERE` clause, adjusted to carry the `WHERE`
///
/// Returns the lines to emit in its place.
fn promote_where(line: Line, indent: &str) -> Vec<Line> {
    let one_equals_one = || Line::Raw(format!("{}WHERE 1 = 1", indent));
    match line {
        Line::Clause(cl) if cl.clause.connective == Connective::And && !cl.clause.optional => {
            let clause = Clause {
                connective: Connective::Where,
                ..cl.clause.clone()
            };
            vec![Line::Clause(ClauseLine::new(indent, clause))]
        }
        Line::Clause(cl) if cl.clause.optional => vec![one_equals_one(), Line::Clause(cl)],
        Line::Raw(text) => {
            let body = text.trim_start();
            let first = body.split_whitespace().next().unwrap_or_default();
            if body.starts_with("[[") {
                vec![one_equals_one(), Line::Raw(text)]
            } else if first.eq_ignore_ascii_case("AND") {
                vec![Line::Raw(format!("{}WHERE{}", indent, &body[3..]))]
            } else {
                vec![Line::Raw(text)]
            }
        }
        other => vec![other],
    }
}

/// Remove a variable from the SQL
///
/// Every clause referencing the placeholder is dropped; a dropped `WHERE` moves
/// to the next clause. Remaining occurrences become the empty literal `''`.
pub fn unbind(sql: &str, variable: &Variable) -> String {
    let name = variable.name.as_str();
    let doc = Document::parse(sql);

    let mut lines = Vec::with_capacity(doc.lines.len());
    let mut pending_where: Option<String> = None;
    let mut removed = 0usize;

    for line in doc.lines {
        if let Line::Clause(cl) = &line {
            if cl.clause.predicate.variable() == Some(name) {
                removed += 1;
                if cl.clause.connective == Connective::Where {
                    pending_where = Some(cl.indent.clone());
                }
                continue;
            }
        }
        match pending_where.take() {
            Some(indent) => lines.extend(promote_where(line, &indent)),
            None => lines.push(line),
        }
    }

    tracing::debug!(name, removed, "removed variable clauses");
    let text = Document { lines }.render();
    replace_placeholder(&text, name, "''")
}

/// Rename a variable's placeholder
///
/// Only exact `{{from}}` tokens change; names sharing a prefix are untouched.
pub fn rename(sql: &str, from: &str, to: &str) -> Result<String, RewriteError> {
    for name in [from, to] {
        if !is_identifier(name) {
            return Err(RewriteError::InvalidName(name.to_string()));
        }
    }
    if from == to {
        return Ok(sql.to_string());
    }
    if contains_placeholder(sql, to) {
        return Err(RewriteError::NameTaken(to.to_string()));
    }
    Ok(replace_placeholder(sql, from, &format!("{{{{{}}}}}", to)))
}

//! SQL text as a sequence of clause and raw lines

use super::clause::Clause;

/// A recognised filter line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseLine {
    /// Leading whitespace, kept as written
    pub indent: String,
    pub clause: Clause,
    /// Original text; lines are re-rendered only when their clause changes
    raw: String,
}

impl ClauseLine {
    pub fn new(indent: impl Into<String>, clause: Clause) -> Self {
        let indent = indent.into();
        let raw = format!("{}{}", indent, clause);
        Self { indent, clause, raw }
    }

    /// Same indentation, different clause
    pub fn with_clause(&self, clause: Clause) -> Self {
        Self::new(self.indent.clone(), clause)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Clause(ClauseLine),
    Raw(String),
}

impl Line {
    pub fn parse(text: &str) -> Self {
        let body = text.trim_end_matches('\r');
        match Clause::parse(body) {
            Some(clause) => {
                let indent_len = body.len() - body.trim_start().len();
                Line::Clause(ClauseLine {
                    indent: body[..indent_len].to_string(),
                    clause,
                    raw: text.to_string(),
                })
            }
            None => Line::Raw(text.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Line::Clause(line) => line.raw(),
            Line::Raw(text) => text,
        }
    }

    pub fn clause(&self) -> Option<&Clause> {
        match self {
            Line::Clause(line) => Some(&line.clause),
            Line::Raw(_) => None,
        }
    }

    /// Whether the line starts at column 0 with the given keyword sequence
    pub fn starts_top_level(&self, keywords: &[&str]) -> bool {
        let text = self.text();
        if text.starts_with(char::is_whitespace) {
            return false;
        }
        let mut words = text.split_whitespace();
        keywords
            .iter()
            .all(|k| words.next().is_some_and(|w| w.eq_ignore_ascii_case(k)))
    }
}

/// A SQL text split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub lines: Vec<Line>,
}

impl Document {
    pub fn parse(sql: &str) -> Self {
        Self {
            lines: sql.split('\n').map(Line::parse).collect(),
        }
    }

    pub fn render(&self) -> String {
        self.lines.iter().map(Line::text).collect::<Vec<_>>().join("\n")
    }

    /// Index of the first top-level `GROUP BY`, `ORDER BY` or `LIMIT` line,
    /// or of the end of text ignoring trailing blank lines and `;`
    pub fn tail_start(&self) -> usize {
        let tail = self.lines.iter().position(|l| {
            l.starts_top_level(&["GROUP", "BY"])
                || l.starts_top_level(&["ORDER", "BY"])
                || l.starts_top_level(&["LIMIT"])
        });
        tail.unwrap_or_else(|| {
            let trailing = self
                .lines
                .iter()
                .rev()
                .take_while(|l| matches!(l.text().trim(), "" | ";"))
                .count();
            self.lines.len() - trailing
        })
    }

    /// Whether the outermost query has a `WHERE` before line `end`
    ///
    /// Looks for a column-0 `WHERE` after the last column-0 `SELECT`.
    pub fn has_top_level_where(&self, end: usize) -> bool {
        let lines = &self.lines[..end];
        let start = lines
            .iter()
            .rposition(|l| l.starts_top_level(&["SELECT"]))
            .unwrap_or(0);
        lines[start..].iter().any(|l| l.starts_top_level(&["WHERE"]))
    }
}

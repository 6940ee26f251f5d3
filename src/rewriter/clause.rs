//! Filter clause shapes the rewriter understands
//!
//! A clause is one whole line: a connective, one predicate of a known shape,
//! optionally wrapped in `[[ ]]`. Anything else stays raw text.

use std::fmt;
use super::lexer::{tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    Where,
    And,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::Where => "WHERE",
            Connective::And => "AND",
        }
    }
}

/// Column reference as written, e.g. `base.url_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(spelling: impl Into<String>) -> Self {
        Self(spelling.into())
    }

    /// Unqualified column name without backticks
    pub fn name(&self) -> &str {
        let last = self.0.rsplit('.').next().unwrap_or(&self.0);
        last.trim_matches('`')
    }

    /// Whole-identifier match, ignoring qualifier and case
    pub fn matches(&self, column: &str) -> bool {
        self.name().eq_ignore_ascii_case(column)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recognised predicate shapes; literals are kept exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `col = <literal>`
    Equals { column: ColumnName, value: String },
    /// `col IN (<literal>, ...)`
    In { column: ColumnName, values: Vec<String> },
    /// `col LIKE <literal>`
    Like { column: ColumnName, pattern: String },
    /// `{{name}}`, a field filter rendered by the BI tool
    Variable { name: String },
    /// `col = {{name}}`
    ColumnVariable { column: ColumnName, name: String },
    /// `DATE(col) = {{name}}`
    DateVariable { column: ColumnName, name: String },
}

impl Predicate {
    /// Column of a literal comparison
    pub fn literal_column(&self) -> Option<&ColumnName> {
        match self {
            Predicate::Equals { column, .. }
            | Predicate::In { column, .. }
            | Predicate::Like { column, .. } => Some(column),
            _ => None,
        }
    }

    /// Name of the placeholder the predicate references
    pub fn variable(&self) -> Option<&str> {
        match self {
            Predicate::Variable { name }
            | Predicate::ColumnVariable { name, .. }
            | Predicate::DateVariable { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals { column, value } => write!(f, "{} = {}", column, value),
            Predicate::In { column, values } => write!(f, "{} IN ({})", column, values.join(", ")),
            Predicate::Like { column, pattern } => write!(f, "{} LIKE {}", column, pattern),
            Predicate::Variable { name } => write!(f, "{{{{{}}}}}", name),
            Predicate::ColumnVariable { column, name } => write!(f, "{} = {{{{{}}}}}", column, name),
            Predicate::DateVariable { column, name } => write!(f, "DATE({}) = {{{{{}}}}}", column, name),
        }
    }
}

/// One filter line without its indentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub connective: Connective,
    /// Wrapped in `[[ ]]`
    pub optional: bool,
    pub predicate: Predicate,
}

impl Clause {
    /// Parse a line that consists of exactly one clause
    pub fn parse(line: &str) -> Option<Self> {
        let tokens = tokenize(line)?;
        let mut cursor = Cursor { tokens: &tokens, pos: 0 };

        let optional = cursor.eat(|t| *t == Token::OpenOptional);
        let connective = if cursor.eat(|t| t.is_keyword("WHERE")) {
            Connective::Where
        } else if cursor.eat(|t| t.is_keyword("AND")) {
            Connective::And
        } else {
            return None;
        };
        let predicate = cursor.predicate()?;
        if optional && !cursor.eat(|t| *t == Token::CloseOptional) {
            return None;
        }
        cursor.at_end().then_some(Clause {
            connective,
            optional,
            predicate,
        })
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "[[{} {}]]", self.connective.as_str(), self.predicate)
        } else {
            write!(f, "{} {}", self.connective.as_str(), self.predicate)
        }
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, pred: impl Fn(&Token) -> bool) -> bool {
        match self.peek() {
            Some(t) if pred(t) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Option<()> {
        self.eat(|t| t.is_symbol(symbol)).then_some(())
    }

    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }

    fn placeholder(&mut self) -> Option<String> {
        match self.advance()? {
            Token::Placeholder(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// `ident(.ident)*`
    fn column(&mut self) -> Option<ColumnName> {
        let mut spelling = match self.advance()? {
            Token::Word(w) => w.clone(),
            _ => return None,
        };
        while self.peek().is_some_and(|t| t.is_symbol(".")) {
            self.pos += 1;
            match self.advance()? {
                Token::Word(w) => {
                    spelling.push('.');
                    spelling.push_str(w);
                }
                _ => return None,
            }
        }
        Some(ColumnName::new(spelling))
    }

    fn literal(&mut self) -> Option<String> {
        match self.advance()? {
            Token::Str(s) | Token::Number(s) => Some(s.clone()),
            Token::Word(w) if w.eq_ignore_ascii_case("TRUE") || w.eq_ignore_ascii_case("FALSE") => {
                Some(w.clone())
            }
            Token::Symbol(s) if s == "-" => match self.advance()? {
                Token::Number(n) => Some(format!("-{}", n)),
                _ => None,
            },
            _ => None,
        }
    }

    fn predicate(&mut self) -> Option<Predicate> {
        if let Some(Token::Placeholder(name)) = self.peek() {
            self.pos += 1;
            return Some(Predicate::Variable { name: name.clone() });
        }

        let date_call = self.peek().is_some_and(|t| t.is_keyword("DATE"))
            && self.peek_at(1).is_some_and(|t| t.is_symbol("("));
        if date_call {
            self.pos += 2;
            let column = self.column()?;
            self.expect_symbol(")")?;
            self.expect_symbol("=")?;
            let name = self.placeholder()?;
            return Some(Predicate::DateVariable { column, name });
        }

        let column = self.column()?;
        if self.eat(|t| t.is_symbol("=")) {
            if let Some(Token::Placeholder(name)) = self.peek() {
                self.pos += 1;
                return Some(Predicate::ColumnVariable { column, name: name.clone() });
            }
            let value = self.literal()?;
            return Some(Predicate::Equals { column, value });
        }
        if self.eat(|t| t.is_keyword("LIKE")) {
            let pattern = self.literal()?;
            return Some(Predicate::Like { column, pattern });
        }
        if self.eat(|t| t.is_keyword("IN")) {
            self.expect_symbol("(")?;
            let mut values = vec![self.literal()?];
            while self.eat(|t| t.is_symbol(",")) {
                values.push(self.literal()?);
            }
            self.expect_symbol(")")?;
            return Some(Predicate::In { column, values });
        }
        None
    }
}

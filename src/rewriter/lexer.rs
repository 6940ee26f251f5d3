//! Tokenizer for single SQL lines, plus placeholder scanning over whole texts

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or keyword; backtick-quoted identifiers keep their backticks
    Word(String),
    /// String literal, exactly as written including quotes
    Str(String),
    Number(String),
    /// `{{name}}`, holding the trimmed name
    Placeholder(String),
    /// `[[`
    OpenOptional,
    /// `]]`
    CloseOptional,
    Symbol(String),
}

impl Token {
    /// Whether the token is the given keyword, ignoring case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Token::Symbol(s) if s == symbol)
    }
}

const TWO_CHAR_SYMBOLS: [&str; 4] = ["!=", "<>", "<=", ">="];

/// Split one line into tokens
///
/// Returns `None` for lines the clause grammar cannot describe: unterminated
/// literals or placeholders, and trailing comments.
pub fn tokenize(line: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match (c, next) {
            ('{', Some('{')) => {
                let start = i + 2;
                let end = (start..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == '}' && chars[j + 1] == '}')?;
                let name: String = chars[start..end].iter().collect();
                tokens.push(Token::Placeholder(name.trim().to_string()));
                i = end + 2;
            }
            ('[', Some('[')) => {
                tokens.push(Token::OpenOptional);
                i += 2;
            }
            (']', Some(']')) => {
                tokens.push(Token::CloseOptional);
                i += 2;
            }
            ('-', Some('-')) | ('#', _) => return None,
            ('\'', _) | ('"', _) => {
                let mut j = i + 1;
                loop {
                    match chars.get(j).copied() {
                        None => return None,
                        Some('\\') => j += 2,
                        Some(q) if q == c => break,
                        Some(_) => j += 1,
                    }
                }
                tokens.push(Token::Str(chars[i..=j].iter().collect()));
                i = j + 1;
            }
            ('`', _) => {
                let end = (i + 1..chars.len()).find(|&j| chars[j] == '`')?;
                tokens.push(Token::Word(chars[i..=end].iter().collect()));
                i = end + 1;
            }
            (c, _) if c.is_ascii_digit() => {
                let end = (i..chars.len())
                    .find(|&j| !(chars[j].is_ascii_digit() || chars[j] == '.'))
                    .unwrap_or(chars.len());
                tokens.push(Token::Number(chars[i..end].iter().collect()));
                i = end;
            }
            (c, _) if c.is_alphabetic() || c == '_' => {
                let end = (i..chars.len())
                    .find(|&j| !(chars[j].is_alphanumeric() || chars[j] == '_'))
                    .unwrap_or(chars.len());
                tokens.push(Token::Word(chars[i..end].iter().collect()));
                i = end;
            }
            (c, Some(n)) if TWO_CHAR_SYMBOLS.contains(&format!("{c}{n}").as_str()) => {
                tokens.push(Token::Symbol(format!("{c}{n}")));
                i += 2;
            }
            (c, _) => {
                tokens.push(Token::Symbol(c.to_string()));
                i += 1;
            }
        }
    }
    Some(tokens)
}

/// Every `{{name}}` occurrence in `text`: byte range and trimmed name
pub fn placeholders(text: &str) -> Vec<(Range<usize>, &str)> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find("{{") {
        let start = pos + offset;
        let Some(len) = text[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len;
        found.push((start..end + 2, text[start + 2..end].trim()));
        pos = end + 2;
    }
    found
}

/// Whether `{{name}}` occurs in `text`
pub fn contains_placeholder(text: &str, name: &str) -> bool {
    placeholders(text).iter().any(|(_, n)| *n == name)
}

/// Replace exactly the `{{name}}` occurrences in `text`
pub fn replace_placeholder(text: &str, name: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (range, found) in placeholders(text) {
        if found == name {
            out.push_str(&text[last..range.start]);
            out.push_str(replacement);
            last = range.end;
        }
    }
    out.push_str(&text[last..]);
    out
}

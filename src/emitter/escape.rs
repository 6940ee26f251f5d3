//! Literal and identifier escaping for BigQuery standard SQL.
//!
//! Every literal the emitter writes goes through [`render_literal`]; nothing
//! else in the crate builds quoted strings.

use crate::plan::Literal;

/// Render a literal as SQL text
pub fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "NULL".to_string(),
        Literal::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) if f.is_finite() => format!("{}", f),
        Literal::Float(_) => "NULL".to_string(),
        Literal::String(s) => quote_string(s),
    }
}

/// Quote a string as a single-quoted BigQuery literal.
///
/// Handles:
/// - Backslashes (\) → \\
/// - Single quotes (') → \'
/// - Newline, carriage return, tab → \n, \r, \t
/// - Other control characters → \uXXXX
/// - Null bytes → removed
pub fn quote_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    for c in s.chars() {
        match c {
            '\0' => {}
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('\'');
    result
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Pattern matching values containing `s`
pub fn like_contains(s: &str) -> String {
    format!("%{}%", escape_like(s))
}

/// Pattern matching values starting with `s`
pub fn like_prefix(s: &str) -> String {
    format!("{}%", escape_like(s))
}

/// Pattern matching values ending with `s`
pub fn like_suffix(s: &str) -> String {
    format!("%{}", escape_like(s))
}

/// Quote a `project.dataset.table` path with backticks
pub fn quote_table(name: &str) -> String {
    let clean: String = name
        .chars()
        .filter(|c| *c != '`' && !c.is_control())
        .collect();
    format!("`{}`", clean)
}

/// Check for a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turn free text into an identifier, or `None` if nothing usable remains
pub fn sanitize_identifier(s: &str) -> Option<String> {
    let mapped: String = s
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if mapped.chars().all(|c| c == '_') {
        return None;
    }
    if mapped.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("_{}", mapped))
    } else {
        Some(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_quote_string_basic() {
        assert_eq!(quote_string("hello"), "'hello'");
    }

    #[test]
    fn test_quote_string_prevents_injection() {
        let quoted = quote_string("x'; DROP TABLE events; --");
        assert_eq!(quoted, r"'x\'; DROP TABLE events; --'");
    }

    #[test]
    fn test_quote_string_backslash_before_quote() {
        // A trailing backslash must not escape the closing quote
        assert_eq!(quote_string(r"a\"), r"'a\\'");
        assert_eq!(quote_string(r"a\'"), r"'a\\\''");
    }

    #[test]
    fn test_quote_string_control_characters() {
        assert_eq!(quote_string("a\nb\0c"), r"'a\nbc'");
        assert_eq!(quote_string("\u{7}"), r"'\u0007'");
    }

    #[rstest]
    #[case("/soknad", like_prefix, "/soknad%")]
    #[case("/soknad", like_suffix, "%/soknad")]
    #[case("/soknad", like_contains, "%/soknad%")]
    #[case("100%_sikker", like_contains, r"%100\%\_sikker%")]
    fn test_like_patterns(#[case] input: &str, #[case] build: fn(&str) -> String, #[case] expected: &str) {
        assert_eq!(build(input), expected);
    }

    #[test]
    fn test_render_literal() {
        assert_eq!(render_literal(&Literal::Int(-3)), "-3");
        assert_eq!(render_literal(&Literal::Float(f64::NAN)), "NULL");
        assert_eq!(render_literal(&Literal::Bool(true)), "TRUE");
        assert_eq!(render_literal(&Literal::String("it's".into())), r"'it\'s'");
    }

    #[test]
    fn test_quote_table_strips_backticks() {
        assert_eq!(quote_table("p.d.t`; DROP"), "`p.d.t; DROP`");
    }

    #[rstest]
    #[case("url_path", true)]
    #[case("_x1", true)]
    #[case("1x", false)]
    #[case("a-b", false)]
    #[case("", false)]
    fn test_is_identifier(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(input), expected);
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Antall besøk").as_deref(), Some("Antall_bes_k"));
        assert_eq!(sanitize_identifier("2024").as_deref(), Some("_2024"));
        assert_eq!(sanitize_identifier(" - ").as_deref(), None);
    }
}

//! Search-index query fragments.
//!
//! Identifiers are escaped for the Lucene/Solr query parser and grouped into
//! `field:(a b c)` OR-clauses.

/// Characters with meaning to the query parser.
const SPECIAL_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    ';', '/',
];

fn needs_escape(c: char) -> bool {
    SPECIAL_CHARS.contains(&c) || c.is_whitespace()
}

/// Backslash-escape query syntax in `input`.
///
/// An existing backslash followed by an escapable character is left alone,
/// so escaping twice gives the same result as escaping once.
pub fn escape_query_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if needs_escape(next) {
                    out.push('\\');
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `field:(t1 t2 ...)` over escaped terms, or `None` when there are none.
pub fn or_clause<'a>(field: &str, terms: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let escaped: Vec<String> = terms.into_iter().map(escape_query_chars).collect();
    if escaped.is_empty() {
        None
    } else {
        Some(format!("{}:({})", field, escaped.join(" ")))
    }
}

/// Join the non-empty clauses with single spaces.
pub fn join_clauses(clauses: impl IntoIterator<Item = Option<String>>) -> String {
    clauses.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

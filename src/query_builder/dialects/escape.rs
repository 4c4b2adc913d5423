//! Identifier and string escaping primitives
//!
//! Pure functions with no shared state. Whatever the input, the output is a
//! single quoted token: the closing delimiter can never appear unescaped
//! inside it.

use super::{DatabaseBackend, EscapeStyle, LikeEscape, QuoteStyle};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Quote an identifier for the backend; `schema.table` is quoted per part and `*` is left bare
pub fn quote_identifier(backend: DatabaseBackend, identifier: &str) -> String {
    let style = backend.profile().quote;
    identifier
        .split('.')
        .map(|part| {
            if part == "*" {
                part.to_string()
            } else {
                quote_part(style, part)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_part(style: QuoteStyle, part: &str) -> String {
    match style {
        QuoteStyle::Brackets => format!("[{}]", part.replace(']', "]]")),
        QuoteStyle::Backticks => format!("`{}`", part.replace('`', "``")),
        QuoteStyle::DoubleQuotes => format!("\"{}\"", part.replace('"', "\"\"")),
    }
}

/// Escape and quote a string literal for the backend
pub fn escape_string(backend: DatabaseBackend, value: &str) -> String {
    let profile = backend.profile();
    match profile.escape {
        EscapeStyle::Standard => {
            format!(
                "{}'{}'",
                profile.string_prefix,
                strip_comments(&strip_controls(value)).replace('\'', "''")
            )
        }
        EscapeStyle::Backslash => {
            format!(
                "{}'{}'",
                profile.string_prefix,
                strip_comments(&strip_controls(value))
                    .replace('\\', "\\\\")
                    .replace('\'', "''")
            )
        }
        EscapeStyle::DollarQuoted => dollar_quote(&value.replace('\0', "")),
    }
}

/// Drop control characters other than tab, CR and LF
pub fn strip_controls(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Remove `--`, `/*` and `*/` until none remain
pub fn strip_comments(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let next = current
            .replace("--", "")
            .replace("/*", "")
            .replace("*/", "");
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Wrap in `$qTAG$ ... $qTAG$`, picking a tag that does not occur in the value
pub fn dollar_quote(value: &str) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let tag: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let delimiter = format!("$q{}$", tag);
        if !value.contains(&delimiter) {
            return format!("{}{}{}", delimiter, value, delimiter);
        }
    }
}

/// Escape LIKE wildcards so the value matches only itself
pub fn escape_like(backend: DatabaseBackend, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    match backend.profile().like_escape {
        LikeEscape::Brackets => {
            for c in value.chars() {
                match c {
                    '%' | '_' | '[' => {
                        escaped.push('[');
                        escaped.push(c);
                        escaped.push(']');
                    }
                    _ => escaped.push(c),
                }
            }
        }
        LikeEscape::Backslash | LikeEscape::BackslashClause => {
            for c in value.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
        }
    }
    escaped
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

//! Default-value classification.
//!
//! Raw default text is either SQL syntax (quoted literals, bare numbers,
//! expressions) or unquoted literal text, depending on the engine. The result
//! is one of:
//!
//! - absent (no default, or a bare SQL `NULL`)
//! - a literal parsed into its native value for the column type
//! - an opaque expression, kept as raw text and never evaluated
//!
//! A literal that does not parse for its column type falls back to an
//! expression and is reported, so one odd default never fails an entity.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::catalog::RawDefault;
use crate::schema::{DefaultValue, FieldType};

static NUMERIC_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Trailing Postgres cast such as `character varying`, `numeric(10,2)[]`.
static CAST_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?[A-Za-z_][\w ."]*(\(\s*\d+(\s*,\s*\d+)?\s*\))?(\[\])*$"#).unwrap()
});

/// Outcome of classifying one raw default.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub value: Option<DefaultValue>,
    /// Set when a literal could not be parsed for the column type.
    pub parse_failed: bool,
}

impl Classified {
    fn absent() -> Self {
        Self {
            value: None,
            parse_failed: false,
        }
    }

    fn literal(value: Value) -> Self {
        Self {
            value: Some(DefaultValue::Literal(value)),
            parse_failed: false,
        }
    }

    fn expression(raw: &str) -> Self {
        Self {
            value: Some(DefaultValue::expression(raw)),
            parse_failed: false,
        }
    }

    fn unparsable(raw: &str) -> Self {
        Self {
            value: Some(DefaultValue::expression(raw)),
            parse_failed: true,
        }
    }
}

/// Classify a raw default for a column of type `ty`.
pub fn classify_default(raw: Option<&RawDefault>, ty: &FieldType) -> Classified {
    match raw {
        None => Classified::absent(),
        Some(RawDefault::Expression(text)) => Classified::expression(text),
        Some(RawDefault::Text(text)) => classify_text(text, ty),
        Some(RawDefault::Sql(text)) => classify_sql(text, ty),
    }
}

/// Unquoted literal text, as MySQL reports it.
fn classify_text(text: &str, ty: &FieldType) -> Classified {
    if ty.is_string() {
        // Quoting is lost, so `NULL` here is the four-letter string
        return Classified::literal(Value::String(text.to_string()));
    }
    if text.eq_ignore_ascii_case("NULL") {
        return Classified::absent();
    }

    match ty {
        FieldType::Boolean => match parse_boolean(text) {
            Some(b) => Classified::literal(Value::Bool(b)),
            None => Classified::unparsable(text),
        },
        FieldType::Json | FieldType::Jsonb => match serde_json::from_str::<Value>(text) {
            Ok(value) => Classified::literal(value),
            Err(_) => Classified::unparsable(text),
        },
        ty if ty.is_numeric() => match parse_number(text) {
            Some(n) => Classified::literal(n),
            // Unquoted non-numbers on numeric columns are functions
            None => Classified::expression(text),
        },
        FieldType::Date | FieldType::DateOnly | FieldType::Time => {
            if text.starts_with(|c: char| c.is_ascii_digit()) {
                Classified::literal(Value::String(text.to_string()))
            } else {
                Classified::expression(text)
            }
        }
        _ => Classified::literal(Value::String(text.to_string())),
    }
}

/// SQL default clause text.
fn classify_sql(raw: &str, ty: &FieldType) -> Classified {
    let text = strip_wrapping(raw);
    if text.is_empty() {
        return Classified::absent();
    }

    // A string literal is always quoted here, so a bare NULL is no default
    if text.eq_ignore_ascii_case("NULL") {
        return Classified::absent();
    }

    if let Some(inner) = unquote(text) {
        return convert_quoted(&inner, raw, ty);
    }

    if let Some(bit) = bit_literal(text) {
        return match ty {
            FieldType::Boolean => Classified::literal(Value::Bool(bit)),
            _ => Classified::literal(Value::from(u8::from(bit))),
        };
    }

    if NUMERIC_LITERAL.is_match(text) {
        return match ty {
            FieldType::Boolean => match text {
                "0" => Classified::literal(Value::Bool(false)),
                "1" => Classified::literal(Value::Bool(true)),
                _ => Classified::unparsable(raw),
            },
            ty if ty.is_string() => Classified::literal(Value::String(text.to_string())),
            _ => match parse_number(text) {
                Some(n) => Classified::literal(n),
                None => Classified::unparsable(raw),
            },
        };
    }

    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        return Classified::literal(Value::Bool(text.eq_ignore_ascii_case("true")));
    }

    if ty.is_json() && (text.starts_with('[') || text.starts_with('{')) {
        return match serde_json::from_str::<Value>(text) {
            Ok(value) => Classified::literal(value),
            Err(_) => Classified::unparsable(raw),
        };
    }

    Classified::expression(raw)
}

/// Convert the contents of a quoted literal for the column type.
fn convert_quoted(inner: &str, raw: &str, ty: &FieldType) -> Classified {
    match ty {
        FieldType::Boolean => match parse_boolean(inner) {
            Some(b) => Classified::literal(Value::Bool(b)),
            None => Classified::unparsable(raw),
        },
        FieldType::Json | FieldType::Jsonb => match serde_json::from_str::<Value>(inner) {
            Ok(value) => Classified::literal(value),
            Err(_) => Classified::unparsable(raw),
        },
        ty if ty.is_numeric() => match parse_number(inner.trim()) {
            Some(n) => Classified::literal(n),
            None => Classified::unparsable(raw),
        },
        _ => Classified::literal(Value::String(inner.to_string())),
    }
}

/// Remove SQL Server parentheses, Postgres casts and the national prefix.
fn strip_wrapping(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text;
        if is_wrapped_in_parens(text) {
            text = text[1..text.len() - 1].trim();
        }
        if let Some(stripped) = strip_cast(text) {
            text = stripped;
        }
        if text.len() > 1 && (text.starts_with("N'") || text.starts_with("n'")) {
            text = &text[1..];
        }
        if text == before {
            return text;
        }
    }
}

/// Whether the first `(` closes at the last character.
fn is_wrapped_in_parens(text: &str) -> bool {
    if !text.starts_with('(') || !text.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Strip one trailing `::type` outside of quotes.
fn strip_cast(text: &str) -> Option<&str> {
    let mut in_quote = false;
    let mut last = None;
    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b':' if !in_quote && bytes.get(i + 1) == Some(&b':') => last = Some(i),
            _ => {}
        }
    }
    let pos = last?;
    let target = &text[pos + 2..];
    CAST_TARGET
        .is_match(target.trim())
        .then(|| text[..pos].trim_end())
}

/// Contents of a single quoted SQL literal, with `''` unescaped.
fn unquote(text: &str) -> Option<String> {
    let body = text.strip_prefix('\'')?;
    let mut out = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if chars.peek().map(|(_, n)| *n) == Some('\'') {
                chars.next();
                out.push('\'');
                continue;
            }
            // Closing quote must end the text
            return (i == body.len() - 1).then_some(out);
        }
        out.push(c);
    }
    None
}

/// `b'0'` / `b'1'`.
fn bit_literal(text: &str) -> Option<bool> {
    match text {
        "b'0'" | "B'0'" => Some(false),
        "b'1'" | "B'1'" => Some(true),
        _ => None,
    }
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "1" | "on" => Some(true),
        "f" | "false" | "n" | "no" | "0" | "off" => Some(false),
        _ => bit_literal(text.trim()),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::from(i));
    }
    if !NUMERIC_LITERAL.is_match(text) {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

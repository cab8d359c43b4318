//! Named input transforms applied before validation.
//!
//! The sanitization pre-pass runs over raw input before it reaches the
//! engine: each field with a declared transform is rewritten, every other
//! field passes through unchanged, and a null value is never transformed.
//! Every transform is a pure `Value -> Value` function.

use crate::Data;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// A transform token that is not part of the fixed vocabulary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sanitizer `{0}`")]
pub struct UnknownSanitizer(pub String);

/// The fixed transform vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Plain text: strip markup, collapse whitespace. The default.
    Text,
    /// Multi-line text: strip markup but keep line structure.
    RichText,
    /// Keep only characters legal in an email address.
    Email,
    /// Keep only characters legal in a URL.
    Url,
    /// Coerce to a signed integer, `0` when unparseable.
    Int,
    /// Coerce to the absolute value of an integer.
    UnsignedInt,
    /// Coerce to a float, `0.0` when unparseable.
    Float,
    /// Coerce to a boolean; `"1"`, `"true"`, `"on"`, `"yes"` are truthy.
    Bool,
    /// Lowercase, alphanumerics and dashes only.
    Slug,
    /// Lowercase key: alphanumerics, dashes, underscores.
    Key,
}

impl FromStr for Sanitizer {
    type Err = UnknownSanitizer;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "text" => Self::Text,
            "richtext" => Self::RichText,
            "email" => Self::Email,
            "url" => Self::Url,
            "int" => Self::Int,
            "unsigned-int" => Self::UnsignedInt,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "slug" => Self::Slug,
            "key" => Self::Key,
            other => return Err(UnknownSanitizer(other.to_string())),
        })
    }
}

impl Sanitizer {
    /// Apply the transform. Null always passes through untouched.
    pub fn apply(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }

        match self {
            Self::Text => Value::String(text(&stringify(value))),
            Self::RichText => Value::String(rich_text(&stringify(value))),
            Self::Email => Value::String(keep_chars(&stringify(value), is_email_char)),
            Self::Url => Value::String(keep_chars(&stringify(value), is_url_char)),
            Self::Int => Value::from(to_int(value)),
            Self::UnsignedInt => Value::from(to_int(value).unsigned_abs()),
            Self::Float => Number::from_f64(to_float(value))
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0)),
            Self::Bool => Value::Bool(to_bool(value)),
            Self::Slug => Value::String(slug(&stringify(value))),
            Self::Key => Value::String(key(&stringify(value))),
        }
    }
}

/// Apply declared transforms to raw input.
///
/// Fields without a declared transform pass through unchanged; declared
/// transforms for fields absent from the input are ignored.
pub fn sanitize_all(input: &Data, transforms: &HashMap<String, Sanitizer>) -> Data {
    input
        .iter()
        .map(|(field, value)| {
            let value = match transforms.get(field) {
                Some(sanitizer) => sanitizer.apply(value),
                None => value.clone(),
            };
            (field.clone(), value)
        })
        .collect()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn text(input: &str) -> String {
    // Markup gone, whitespace runs collapsed to single spaces.
    strip_tags(input).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rich_text(input: &str) -> String {
    strip_tags(input)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn keep_chars(input: &str, keep: fn(char) -> bool) -> String {
    input.chars().filter(|c| keep(*c)).collect()
}

fn is_email_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.@-[]".contains(c)
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=%".contains(c)
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        _ => false,
    }
}

fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in strip_tags(input).to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.push(ch);
            pending_dash = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }
    out
}

fn key(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

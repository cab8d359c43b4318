//! The built-in rule set.
//!
//! A closed, compile-time enumerated dispatch table: rule names resolve to
//! a [`BuiltinRule`] variant via [`BuiltinRule::from_name`]. Extensions are
//! looked up before this table, never instead of it.

use crate::Data;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

// Pre-compiled patterns shared by every validator in the process.
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHA_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHA_NUM_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified email regex
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .unwrap()
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap())
}

fn alpha_regex() -> &'static Regex {
    ALPHA_REGEX.get_or_init(|| Regex::new(r"^[\pL\pM]+$").unwrap())
}

fn alpha_num_regex() -> &'static Regex {
    ALPHA_NUM_REGEX.get_or_init(|| Regex::new(r"^[\pL\pM\pN]+$").unwrap())
}

pub(crate) fn is_alpha_numeric(value: &str) -> bool {
    alpha_num_regex().is_match(value)
}

/// The fixed set of built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRule {
    Required,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Email,
    Url,
    Min,
    Max,
    Between,
    In,
    Regex,
    Alpha,
    AlphaNum,
    Confirmed,
}

impl BuiltinRule {
    /// Resolve a rule name to its built-in implementation.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "required" => Self::Required,
            "string" => Self::String,
            "integer" | "int" => Self::Integer,
            "numeric" => Self::Numeric,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "email" => Self::Email,
            "url" => Self::Url,
            "min" => Self::Min,
            "max" => Self::Max,
            "between" => Self::Between,
            "in" => Self::In,
            "regex" => Self::Regex,
            "alpha" => Self::Alpha,
            "alpha_num" => Self::AlphaNum,
            "confirmed" => Self::Confirmed,
            _ => return None,
        })
    }

    /// Evaluate the rule against a field's value.
    pub fn passes(&self, field: &str, value: &Value, parameters: &[String], data: &Data) -> bool {
        match self {
            Self::Required => is_present(value),
            Self::String => value.is_string(),
            Self::Integer => is_integer(value),
            Self::Numeric => is_numeric(value),
            Self::Boolean => is_boolean(value),
            Self::Array => value.is_array() || value.is_object(),
            Self::Email => value.as_str().is_some_and(|s| email_regex().is_match(s)),
            Self::Url => value.as_str().is_some_and(|s| url_regex().is_match(s)),
            Self::Min => {
                let min = int_param(parameters, 0) as f64;
                size_of(value).is_some_and(|size| size >= min)
            }
            Self::Max => {
                let max = int_param(parameters, 0) as f64;
                size_of(value).is_some_and(|size| size <= max)
            }
            Self::Between => {
                let min = int_param(parameters, 0) as f64;
                let max = int_param(parameters, 1) as f64;
                size_of(value).is_some_and(|size| size >= min && size <= max)
            }
            // Strict type-and-value equality: the parameter list is
            // strings, so only string values can match.
            Self::In => value
                .as_str()
                .is_some_and(|s| parameters.iter().any(|p| p == s)),
            Self::Regex => {
                let pattern = parameters.first().map(String::as_str).unwrap_or("");
                matches_pattern(value, pattern)
            }
            Self::Alpha => value.as_str().is_some_and(|s| alpha_regex().is_match(s)),
            Self::AlphaNum => value.as_str().is_some_and(is_alpha_numeric),
            Self::Confirmed => {
                let sibling = format!("{field}_confirmation");
                data.get(&sibling) == Some(value)
            }
        }
    }

    /// Default message template for the rule.
    ///
    /// The `in` template enumerates one `:paramN` placeholder per allowed
    /// value, so substitution lists every option.
    pub fn default_message(&self, parameters: &[String]) -> String {
        if let Self::In = self {
            let placeholders: Vec<String> = (0..parameters.len().max(1))
                .map(|index| format!(":param{index}"))
                .collect();
            return format!(
                "The :attribute field must be one of: {}.",
                placeholders.join(", ")
            );
        }

        let template = match self {
            Self::Required => "The :attribute field is required.",
            Self::String => "The :attribute field must be a string.",
            Self::Integer => "The :attribute field must be an integer.",
            Self::Numeric => "The :attribute field must be a number.",
            Self::Boolean => "The :attribute field must be true or false.",
            Self::Array => "The :attribute field must be an array.",
            Self::Email => "The :attribute field must be a valid email address.",
            Self::Url => "The :attribute field must be a valid URL.",
            Self::Min => "The :attribute field must be at least :param0.",
            Self::Max => "The :attribute field must be at most :param0.",
            Self::Between => "The :attribute field must be between :param0 and :param1.",
            Self::Regex => "The :attribute field format is invalid.",
            Self::Alpha => "The :attribute field must only contain letters.",
            Self::AlphaNum => "The :attribute field must only contain letters and numbers.",
            Self::Confirmed => "The :attribute confirmation does not match.",
            Self::In => "The :attribute field is invalid.",
        };
        template.to_string()
    }
}

/// Non-null, non-empty-string, non-empty sequence.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Integer number, or a string that parses as an integer literal.
fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

/// Number, or a string that parses as a finite number.
fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

/// Strict membership in {true, false, 0, 1, "0", "1", "true", "false"}.
/// No cross-type coercion: integer 1 passes, float 1.0 does not.
fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0) | Some(1)),
        Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    }
}

/// The size a value is compared with for `min`/`max`/`between`:
/// strings by Unicode codepoint count, sequences by element count,
/// numbers by numeric value. Other shapes have no size and fail.
fn size_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Malformed numeric parameters degrade to 0 rather than erroring.
fn int_param(parameters: &[String], index: usize) -> i64 {
    parameters
        .get(index)
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(0)
}

/// Full-string match of `pattern` against the value coerced to a string.
/// A pattern that fails to compile fails the rule.
fn matches_pattern(value: &Value, pattern: &str) -> bool {
    let text = coerce_to_string(value);
    Regex::new(&format!("^(?:{pattern})$"))
        .map(|re| re.is_match(&text))
        .unwrap_or(false)
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

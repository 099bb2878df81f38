//! Option values and best-effort coercion of raw tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed option value.
///
/// Serialized untagged so it maps onto plain JSON scalars, both when
/// defaults are read from the catalog and when options are handed to the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Guess a value's type from its text.
///
/// Order: a `.` means float, all digits (optional leading `-`) means int,
/// `true`/`false` in any case means bool. Anything that fails to parse on
/// the way stays a raw string.
pub fn infer(token: &str) -> OptionValue {
    if token.contains('.') {
        return token
            .parse::<f64>()
            .map(OptionValue::Float)
            .unwrap_or_else(|_| OptionValue::Str(token.to_string()));
    }

    if is_integer_literal(token) {
        return token
            .parse::<i64>()
            .map(OptionValue::Int)
            .unwrap_or_else(|_| OptionValue::Str(token.to_string()));
    }

    if token.eq_ignore_ascii_case("true") {
        return OptionValue::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return OptionValue::Bool(false);
    }

    OptionValue::Str(token.to_string())
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

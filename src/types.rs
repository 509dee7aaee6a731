//! Core types shared by the scanners and validators.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Operation keys under an OpenAPI path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render an optional contract value for a violation message.
///
/// Strings are shown bare, absent values as `none`, everything else as JSON.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "none".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Approximate source line of a token in the raw contract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    /// 1-based line number of the first occurrence.
    At(usize),
    /// The token does not appear verbatim in the text.
    Unknown,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::At(n) => write!(f, "{}", n),
            Line::Unknown => f.write_str("unknown"),
        }
    }
}

/// Which check produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ReservedPath,
    ReservedHeader,
    ReservedQueryParameter,
    Info,
    SpecialCharacter,
    Header,
    QueryParameter,
    Response,
}

/// One non-conformance between the contract and the policy.
///
/// The message is self-contained: it names the location, the expected value
/// and what was actually found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub category: Category,
    pub message: String,
}

impl Violation {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! Typed project policy, built from the JSON rule document.
//!
//! ```json
//! {
//!   "reserved_paths": ["internal", "admin"],
//!   "reserved_headers": ["X-Internal"],
//!   "reserved_query_parameters": ["debug"],
//!   "special_characters": ["$", "&"],
//!   "GET": {
//!     "headers": [{ "name": "Authorization", "type": "string", "required": true,
//!                   "description": "Bearer token", "x-example": "Bearer abc" }],
//!     "query_parameters": [{ "name": "limit", "type": "integer", "value": 10 }],
//!     "responses": [{ "response_code": 200, "format": { "type": "object" } }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RulesError;
use crate::loader::{load_rules_auto, load_rules_document};
use crate::types::json_type_name;

/// Top-level keys holding global word lists rather than a method policy.
pub const LIST_KEYS: &[&str] = &[
    "reserved_paths",
    "reserved_headers",
    "reserved_query_parameters",
    "special_characters",
];

/// The full project policy.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub reserved_paths: Vec<String>,
    pub reserved_headers: Vec<String>,
    pub reserved_query_parameters: Vec<String>,
    pub special_characters: Vec<String>,
    /// Per-method policies keyed by upper-case method name.
    pub methods: BTreeMap<String, MethodPolicy>,
}

/// Expectations for every operation of one HTTP method.
#[derive(Debug, Clone, Default)]
pub struct MethodPolicy {
    pub headers: Vec<FieldRule>,
    pub query_parameters: Vec<FieldRule>,
    pub responses: Vec<ResponseRule>,
}

/// Expected shape of a header or query parameter.
///
/// Attributes left out of the rule are not checked.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawFieldRule")]
pub struct FieldRule {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub example: Option<Value>,
}

/// Field rule as written. Headers conventionally use `x-example`, query
/// parameters `value`; when several are given, `example` wins, then
/// `x-example`, then `value`.
#[derive(Deserialize)]
struct RawFieldRule {
    name: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    example: Option<Value>,
    #[serde(rename = "x-example", default)]
    x_example: Option<Value>,
    #[serde(default)]
    value: Option<Value>,
}

impl From<RawFieldRule> for FieldRule {
    fn from(raw: RawFieldRule) -> Self {
        Self {
            name: raw.name,
            field_type: raw.field_type,
            required: raw.required,
            description: raw.description,
            example: raw.example.or(raw.x_example).or(raw.value),
        }
    }
}

/// Expected response for a status code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseRule {
    #[serde(deserialize_with = "deserialize_code")]
    pub response_code: String,
    /// Expected schema fragment: `type`, `properties`, `items`.
    #[serde(default = "empty_object")]
    pub format: Value,
}

impl MethodPolicy {
    /// Build a method policy entry by entry.
    ///
    /// A malformed entry, or a rule list that is not a list, is skipped with
    /// a warning; the other entries of the method are kept.
    pub fn from_map(method: &str, map: &Map<String, Value>) -> Self {
        Self {
            headers: entries(method, map, "headers"),
            query_parameters: entries(method, map, "query_parameters"),
            responses: entries(method, map, "responses"),
        }
    }
}

fn entries<T: DeserializeOwned>(method: &str, map: &Map<String, Value>, key: &str) -> Vec<T> {
    let items = match map.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(
                method,
                key,
                actual = json_type_name(other),
                "rule list is not a list, skipping"
            );
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(method, key, index, error = %e, "malformed rule entry, skipping");
                None
            }
        })
        .collect()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Response codes may be written as `200` or `"200"`.
fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "response_code must be a number or string, got {}",
            json_type_name(&other)
        ))),
    }
}

impl RuleSet {
    /// Build a rule set from a parsed rule document.
    ///
    /// Per-method entries that are not objects are skipped with a warning.
    /// Inside a method, each malformed rule entry is skipped on its own.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if the document is not an object or a global
    /// list has the wrong shape.
    pub fn from_value(document: &Value) -> Result<Self, RulesError> {
        let Value::Object(map) = document else {
            return Err(RulesError::NotAnObject {
                actual: json_type_name(document).to_string(),
            });
        };

        let mut rules = RuleSet {
            reserved_paths: string_list(map, "reserved_paths")?,
            reserved_headers: string_list(map, "reserved_headers")?,
            reserved_query_parameters: string_list(map, "reserved_query_parameters")?,
            special_characters: string_list(map, "special_characters")?,
            methods: BTreeMap::new(),
        };

        for (key, value) in map {
            if LIST_KEYS.contains(&key.as_str()) {
                continue;
            }

            let Value::Object(policy) = value else {
                tracing::warn!(
                    method = %key,
                    actual = json_type_name(value),
                    "rules for method are not an object, skipping"
                );
                continue;
            };

            rules
                .methods
                .insert(key.to_uppercase(), MethodPolicy::from_map(key, policy));
        }

        Ok(rules)
    }

    /// Load a rule set from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let document = load_rules_document(path)?;
        Self::from_value(&document)
    }

    /// Load a rule set from a file path or URL.
    pub fn load_auto(source: &str) -> Result<Self, RulesError> {
        let document = load_rules_auto(source)?;
        Self::from_value(&document)
    }

    /// Policy for a method, matched case-insensitively.
    pub fn method(&self, method: &str) -> Option<&MethodPolicy> {
        self.methods.get(&method.to_uppercase())
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> Result<Vec<String>, RulesError> {
    let invalid = |actual: &Value| RulesError::InvalidList {
        key: key.to_string(),
        actual: json_type_name(actual).to_string(),
    };

    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item)))
            .collect(),
        Some(other) => Err(invalid(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_lists_and_methods() {
        let rules = RuleSet::from_value(&json!({
            "reserved_paths": ["internal"],
            "reserved_headers": ["X-Debug"],
            "special_characters": ["$"],
            "get": {
                "headers": [{ "name": "Authorization", "type": "string", "x-example": "Bearer abc" }],
                "query_parameters": [{ "name": "limit", "value": 10 }],
                "responses": [{ "response_code": 200, "format": { "type": "object" } }]
            }
        }))
        .unwrap();

        assert_eq!(rules.reserved_paths, ["internal"]);
        assert_eq!(rules.reserved_headers, ["X-Debug"]);
        assert!(rules.reserved_query_parameters.is_empty());
        assert_eq!(rules.special_characters, ["$"]);

        let get = rules.method("GET").unwrap();
        assert_eq!(get.headers[0].example, Some(json!("Bearer abc")));
        assert_eq!(get.headers[0].field_type.as_deref(), Some("string"));
        assert_eq!(get.query_parameters[0].example, Some(json!(10)));
        assert_eq!(get.responses[0].response_code, "200");
        assert!(rules.method("get").is_some());
        assert!(rules.method("POST").is_none());
    }

    #[test]
    fn string_response_code() {
        let rules = RuleSet::from_value(&json!({
            "POST": { "responses": [{ "response_code": "201" }] }
        }))
        .unwrap();
        let response = &rules.method("POST").unwrap().responses[0];
        assert_eq!(response.response_code, "201");
        assert_eq!(response.format, json!({}));
    }

    #[test]
    fn skips_non_object_method_entry() {
        let rules = RuleSet::from_value(&json!({
            "GET": ["not", "an", "object"],
            "version": "1.0",
            "POST": { "headers": [] }
        }))
        .unwrap();
        assert_eq!(rules.methods.len(), 1);
        assert!(rules.method("POST").is_some());
    }

    #[test]
    fn malformed_entry_keeps_rest_of_method() {
        let rules = RuleSet::from_value(&json!({
            "GET": {
                "headers": [
                    { "type": "string" },
                    { "name": "X-Trace", "required": "true" },
                    { "name": "Authorization", "x-example": "Bearer abc" }
                ],
                "query_parameters": "not a list",
                "responses": [{ "format": {} }, { "response_code": 200 }]
            }
        }))
        .unwrap();

        let get = rules.method("GET").unwrap();
        assert_eq!(get.headers.len(), 1);
        assert_eq!(get.headers[0].name, "Authorization");
        assert!(get.query_parameters.is_empty());
        assert_eq!(get.responses.len(), 1);
        assert_eq!(get.responses[0].response_code, "200");
    }

    #[test]
    fn several_example_keys_prefer_example() {
        let rules = RuleSet::from_value(&json!({
            "GET": {
                "headers": [{
                    "name": "Authorization",
                    "x-example": "Bearer xyz",
                    "example": "Bearer abc"
                }],
                "query_parameters": [{ "name": "limit", "x-example": 5, "value": 10 }]
            }
        }))
        .unwrap();

        let get = rules.method("GET").unwrap();
        assert_eq!(get.headers[0].example, Some(json!("Bearer abc")));
        assert_eq!(get.query_parameters[0].example, Some(json!(5)));
    }

    #[test]
    fn rejects_non_object_document() {
        let err = RuleSet::from_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, RulesError::NotAnObject { .. }));
    }

    #[test]
    fn rejects_bad_list() {
        let err = RuleSet::from_value(&json!({ "reserved_paths": "internal" })).unwrap_err();
        assert!(matches!(err, RulesError::InvalidList { .. }));

        let err = RuleSet::from_value(&json!({ "special_characters": ["$", 3] })).unwrap_err();
        assert!(matches!(err, RulesError::InvalidList { ref actual, .. } if actual == "number"));
    }

    #[test]
    fn empty_document_is_empty_rule_set() {
        let rules = RuleSet::from_value(&json!({})).unwrap();
        assert!(rules.methods.is_empty());
        assert!(rules.reserved_paths.is_empty());
    }
}

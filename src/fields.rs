//! Field rules for headers and query parameters.
//!
//! For every operation whose method has a policy, each expected field is
//! looked up among the operation's parameters. A missing field yields one
//! violation. A present field is compared on type, example and description
//! independently, so it can yield up to three violations. Every violation
//! repeats the expected declaration as a remediation hint.

use serde_json::Value;

use crate::locator::SourceText;
use crate::operations::{operations, Operation, ParameterLocation};
use crate::resolver::RefResolver;
use crate::rules::{FieldRule, RuleSet};
use crate::types::{render_value, Violation};

/// Checks expected headers or query parameters against the contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldRuleValidator<'r> {
    location: ParameterLocation,
    rules: &'r RuleSet,
}

impl<'r> FieldRuleValidator<'r> {
    pub fn new(location: ParameterLocation, rules: &'r RuleSet) -> Self {
        Self { location, rules }
    }

    pub fn headers(rules: &'r RuleSet) -> Self {
        Self::new(ParameterLocation::Header, rules)
    }

    pub fn query_parameters(rules: &'r RuleSet) -> Self {
        Self::new(ParameterLocation::Query, rules)
    }

    pub fn validate(&self, document: &Value, text: &SourceText) -> Vec<Violation> {
        let resolver = RefResolver::new(document);
        let mut violations = Vec::new();

        for op in operations(document) {
            let Some(policy) = self.rules.method(op.method) else {
                continue;
            };
            let expected = match self.location {
                ParameterLocation::Header => &policy.headers,
                ParameterLocation::Query => &policy.query_parameters,
            };

            for rule in expected {
                match op.find_parameter(&resolver, self.location, &rule.name) {
                    Some(param) => {
                        self.check_field(&op, &param, rule, &resolver, text, &mut violations)
                    }
                    None => violations.push(Violation::new(
                        self.location.field_category(),
                        format!(
                            "{} '{}' is missing in {}. It should be declared as:\n{}",
                            self.location.label(),
                            rule.name,
                            op.describe(),
                            render_template(rule)
                        ),
                    )),
                }
            }
        }

        violations
    }

    fn check_field(
        &self,
        op: &Operation<'_>,
        param: &Value,
        rule: &FieldRule,
        resolver: &RefResolver<'_>,
        text: &SourceText,
        violations: &mut Vec<Violation>,
    ) {
        let schema = param
            .get("schema")
            .map(|s| resolver.deref(s).into_owned())
            .unwrap_or(Value::Null);
        let observed_name = param
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&rule.name);
        let line = text.find_line(observed_name);

        let mut mismatch = |attribute: &str, found: String, expected: String| {
            violations.push(Violation::new(
                self.location.field_category(),
                format!(
                    "{} '{}' in {} has {} '{}', expected '{}' (line {}).\n{} '{}' in {} should be declared as:\n{}",
                    self.location.label(),
                    rule.name,
                    op.describe(),
                    attribute,
                    found,
                    expected,
                    line,
                    self.location.label(),
                    rule.name,
                    op.describe(),
                    render_template(rule)
                ),
            ));
        };

        if let Some(expected_type) = rule.field_type.as_deref().filter(|t| !t.is_empty()) {
            // OpenAPI 3 puts the type on the schema, Swagger 2 on the parameter.
            let observed = schema.get("type").or_else(|| param.get("type"));
            if observed.and_then(Value::as_str) != Some(expected_type) {
                mismatch("type", render_value(observed), expected_type.to_string());
            }
        }

        if let Some(expected_example) = rule
            .example
            .as_ref()
            .filter(|e| !e.is_null() && e.as_str() != Some(""))
        {
            let observed = schema
                .get("example")
                .or_else(|| param.get("example"))
                .or_else(|| param.get("x-example"));
            if observed != Some(expected_example) {
                mismatch(
                    "example",
                    render_value(observed),
                    render_value(Some(expected_example)),
                );
            }
        }

        if let Some(expected_description) = rule.description.as_deref().filter(|d| !d.is_empty()) {
            let observed = param.get("description").and_then(Value::as_str);
            if observed.map(normalize_text) != Some(normalize_text(expected_description)) {
                mismatch(
                    "description",
                    observed.unwrap_or("none").to_string(),
                    expected_description.to_string(),
                );
            }
        }
    }
}

/// Trim and decode HTML entities so formatting-only differences compare equal.
fn normalize_text(text: &str) -> String {
    html_escape::decode_html_entities(text.trim())
        .trim()
        .to_string()
}

/// Render the expected declaration of a field as a YAML-like snippet.
pub fn render_template(rule: &FieldRule) -> String {
    format!(
        "  - name: '{}'\n    type: '{}'\n    required: {}\n    description: '{}'\n    example: '{}'\n",
        rule.name,
        rule.field_type.as_deref().unwrap_or("none"),
        rule.required
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".to_string()),
        rule.description.as_deref().unwrap_or("none"),
        render_value(rule.example.as_ref())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> RuleSet {
        RuleSet::from_value(&json!({
            "GET": {
                "headers": [{
                    "name": "Authorization",
                    "type": "string",
                    "required": true,
                    "description": "Bearer token",
                    "x-example": "Bearer abc"
                }],
                "query_parameters": [{
                    "name": "limit",
                    "type": "integer",
                    "description": "Page size",
                    "value": 10
                }]
            }
        }))
        .unwrap()
    }

    fn with_parameters(parameters: Value) -> Value {
        json!({ "paths": { "/pets": { "get": { "parameters": parameters } } } })
    }

    fn correct_header() -> Value {
        json!({
            "name": "authorization",
            "in": "header",
            "description": "Bearer token",
            "schema": { "type": "string", "example": "Bearer abc" }
        })
    }

    #[test]
    fn missing_header_renders_template() {
        let rules = rules();
        let doc = with_parameters(json!([]));
        let violations = FieldRuleValidator::headers(&rules).validate(&doc, &SourceText::default());

        assert_eq!(violations.len(), 1);
        let message = &violations[0].message;
        assert!(message.starts_with("Header 'Authorization' is missing in GET /pets."));
        assert!(message.contains("  - name: 'Authorization'\n"));
        assert!(message.contains("    type: 'string'\n"));
        assert!(message.contains("    required: true\n"));
        assert!(message.contains("    description: 'Bearer token'\n"));
        assert!(message.contains("    example: 'Bearer abc'\n"));
    }

    #[test]
    fn matching_header_passes() {
        let rules = rules();
        let doc = with_parameters(json!([correct_header()]));
        assert!(FieldRuleValidator::headers(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }

    #[test]
    fn each_attribute_reported_independently() {
        let rules = rules();
        let doc = with_parameters(json!([{
            "name": "Authorization",
            "in": "header",
            "description": "Wrong",
            "schema": { "type": "integer", "example": "nope" }
        }]));
        let violations = FieldRuleValidator::headers(&rules).validate(&doc, &SourceText::default());
        assert_eq!(violations.len(), 3);
        assert!(violations[0].message.contains("has type 'integer', expected 'string'"));
        assert!(violations[1].message.contains("has example 'nope', expected 'Bearer abc'"));
        assert!(violations[2].message.contains("has description 'Wrong', expected 'Bearer token'"));
        assert!(violations
            .iter()
            .all(|v| v.message.contains("should be declared as:\n  - name: 'Authorization'")));

        // Changing only the type drops exactly one violation
        let mut param = correct_header();
        param["schema"]["type"] = json!("integer");
        let doc = with_parameters(json!([param]));
        assert_eq!(
            FieldRuleValidator::headers(&rules)
                .validate(&doc, &SourceText::default())
                .len(),
            1
        );
    }

    #[test]
    fn example_falls_back_to_parameter_level() {
        let rules = rules();
        let mut param = correct_header();
        param["schema"] = json!({ "type": "string" });
        param["example"] = json!("Bearer abc");
        let doc = with_parameters(json!([param]));
        assert!(FieldRuleValidator::headers(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }

    #[test]
    fn description_ignores_whitespace_and_entities() {
        let rules = RuleSet::from_value(&json!({
            "GET": { "headers": [{ "name": "Accept", "description": "Tom & Jerry" }] }
        }))
        .unwrap();
        let doc = with_parameters(json!([{
            "name": "Accept",
            "in": "header",
            "description": "  Tom &amp; Jerry\n"
        }]));
        assert!(FieldRuleValidator::headers(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }

    #[test]
    fn swagger2_query_parameter() {
        let rules = rules();
        let doc = with_parameters(json!([{
            "name": "limit",
            "in": "query",
            "type": "integer",
            "x-example": 10,
            "description": "Page size"
        }]));
        assert!(FieldRuleValidator::query_parameters(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }

    #[test]
    fn query_parameter_with_line() {
        let rules = rules();
        let doc = with_parameters(json!([{
            "name": "limit",
            "in": "query",
            "description": "Page size",
            "example": 10,
            "schema": { "type": "string" }
        }]));
        let text = SourceText::new("paths:\n  /pets:\n    get:\n      parameters:\n        - name: limit\n");
        let violations = FieldRuleValidator::query_parameters(&rules).validate(&doc, &text);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with(
            "Query parameter 'limit' in GET /pets has type 'string', expected 'integer' (line 5)."
        ));
    }

    #[test]
    fn empty_rule_attributes_are_not_checked() {
        let rules = RuleSet::from_value(&json!({
            "GET": {
                "headers": [{
                    "name": "Accept",
                    "type": "",
                    "description": "",
                    "x-example": ""
                }]
            }
        }))
        .unwrap();
        let doc = with_parameters(json!([{ "name": "Accept", "in": "header" }]));
        assert!(FieldRuleValidator::headers(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }

    #[test]
    fn methods_without_policy_are_skipped() {
        let rules = rules();
        let doc = json!({ "paths": { "/pets": { "post": { "parameters": [] } } } });
        assert!(FieldRuleValidator::headers(&rules)
            .validate(&doc, &SourceText::default())
            .is_empty());
    }
}

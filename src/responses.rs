//! Expected response codes and body shapes.

use serde_json::{Map, Value};

use crate::locator::SourceText;
use crate::operations::{operations, Operation};
use crate::resolver::RefResolver;
use crate::rules::{ResponseRule, RuleSet};
use crate::types::{render_value, Category, Violation};

/// Checks each expected response of each operation against its policy.
#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator<'r> {
    rules: &'r RuleSet,
}

/// What a single response comparison reports against.
struct ResponseScope<'a> {
    operation: String,
    rule: &'a ResponseRule,
    line: String,
}

impl ResponseScope<'_> {
    fn violation(&self, summary: String) -> Violation {
        Violation::new(
            Category::Response,
            format!(
                "{} (line {})\nResponse '{}' in {} should match: {}",
                summary, self.line, self.rule.response_code, self.operation, self.rule.format
            ),
        )
    }
}

impl<'r> ResponseValidator<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn validate(&self, document: &Value, text: &SourceText) -> Vec<Violation> {
        let resolver = RefResolver::new(document);
        let mut violations = Vec::new();

        for op in operations(document) {
            let Some(policy) = self.rules.method(op.method) else {
                continue;
            };
            for rule in &policy.responses {
                self.check_response(&op, rule, &resolver, text, &mut violations);
            }
        }

        violations
    }

    fn check_response(
        &self,
        op: &Operation<'_>,
        rule: &ResponseRule,
        resolver: &RefResolver<'_>,
        text: &SourceText,
        violations: &mut Vec<Violation>,
    ) {
        let code = rule.response_code.as_str();
        let response = op
            .responses()
            .and_then(|responses| responses.get(code))
            .map(|response| resolver.deref(response));

        let response = match response {
            Some(response) if !is_empty(&response) => response,
            _ => {
                violations.push(Violation::new(
                    Category::Response,
                    format!("Response '{}' is missing in {}.", code, op.describe()),
                ));
                return;
            }
        };

        let scope = ResponseScope {
            operation: op.describe(),
            rule,
            line: text.find_line(code).to_string(),
        };

        let observed = body_schema(&response)
            .map(|schema| resolver.deref(schema).into_owned())
            .unwrap_or_else(|| Value::Object(Map::new()));

        compare_schema(&scope, &observed, &rule.format, "", resolver, violations);
    }
}

/// Body schema of a response: the first media type's schema (OpenAPI 3),
/// else the response's own `schema` (Swagger 2).
fn body_schema(response: &Value) -> Option<&Value> {
    if let Some(content) = response.get("content").and_then(Value::as_object) {
        return content.values().next().and_then(|media| media.get("schema"));
    }
    response.get("schema")
}

/// Compare an observed schema to an expected fragment.
///
/// The expected fragment drives the recursion, so depth is bounded by the
/// rule document. An empty expected fragment accepts only an empty
/// observed schema.
fn compare_schema(
    scope: &ResponseScope<'_>,
    observed: &Value,
    expected: &Value,
    field: &str,
    resolver: &RefResolver<'_>,
    violations: &mut Vec<Violation>,
) {
    let expected_type = expected.get("type");
    let observed_type = observed.get("type");
    let both_empty = is_empty(observed) && is_empty(expected);

    if !both_empty && (expected_type.is_some() || is_empty(expected)) && observed_type != expected_type
    {
        violations.push(scope.violation(format!(
            "{} of response '{}' in {} has type '{}', expected '{}'.",
            describe_field(field),
            scope.rule.response_code,
            scope.operation,
            render_value(observed_type),
            render_value(expected_type)
        )));
    }

    if let Some(expected_props) = expected.get("properties").and_then(Value::as_object) {
        let observed_props = observed.get("properties").and_then(Value::as_object);

        for (name, expected_prop) in expected_props {
            let child = child_field(field, name);
            match observed_props.and_then(|props| props.get(name)) {
                None => violations.push(scope.violation(format!(
                    "Field '{}' is missing in response '{}' in {}.",
                    child, scope.rule.response_code, scope.operation
                ))),
                Some(observed_prop) => {
                    if !is_empty(expected_prop) {
                        let observed_prop = resolver.deref(observed_prop);
                        compare_schema(
                            scope,
                            &observed_prop,
                            expected_prop,
                            &child,
                            resolver,
                            violations,
                        );
                    }
                }
            }
        }
    }

    if let Some(expected_items) = expected.get("items").filter(|items| !is_empty(items)) {
        let observed_items = observed
            .get("items")
            .map(|items| resolver.deref(items).into_owned())
            .unwrap_or_else(|| Value::Object(Map::new()));
        compare_schema(
            scope,
            &observed_items,
            expected_items,
            &format!("{}[]", field),
            resolver,
            violations,
        );
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn child_field(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn describe_field(field: &str) -> String {
    if field.is_empty() {
        "Body".to_string()
    } else {
        format!("Field '{}'", field)
    }
}

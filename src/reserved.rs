//! Reserved-word checks on path segments, header names and query parameter names.
//!
//! Path segments are compared exactly. Header and query parameter names are
//! compared case-insensitively, since HTTP header names are case-insensitive
//! and query parameter names are treated the same way by the field rules.

use serde_json::Value;

use crate::locator::SourceText;
use crate::operations::{names_match, path_items, ParameterLocation};
use crate::resolver::RefResolver;
use crate::types::{Category, Violation};

/// Flags paths with a segment equal to a reserved word.
#[derive(Debug, Clone, Copy)]
pub struct ReservedPathScanner<'r> {
    reserved: &'r [String],
}

impl<'r> ReservedPathScanner<'r> {
    pub fn new(reserved: &'r [String]) -> Self {
        Self { reserved }
    }

    /// One violation per (path, reserved word) pair that matches.
    pub fn scan(&self, document: &Value, text: &SourceText) -> Vec<Violation> {
        let mut violations = Vec::new();

        for item in path_items(document) {
            for reserved in self.reserved {
                if item.path.split('/').any(|segment| segment == reserved) {
                    violations.push(Violation::new(
                        Category::ReservedPath,
                        format!(
                            "Path '{}' contains a reserved word '{}' (line {})",
                            item.path,
                            reserved,
                            text.find_line(item.path)
                        ),
                    ));
                }
            }
        }

        violations
    }
}

/// Flags header or query parameter names equal to a reserved word.
#[derive(Debug, Clone, Copy)]
pub struct ReservedParameterScanner<'r> {
    location: ParameterLocation,
    reserved: &'r [String],
}

impl<'r> ReservedParameterScanner<'r> {
    pub fn new(location: ParameterLocation, reserved: &'r [String]) -> Self {
        Self { location, reserved }
    }

    pub fn headers(reserved: &'r [String]) -> Self {
        Self::new(ParameterLocation::Header, reserved)
    }

    pub fn query_parameters(reserved: &'r [String]) -> Self {
        Self::new(ParameterLocation::Query, reserved)
    }

    /// Scan path-level parameters, then each operation's parameters.
    pub fn scan(&self, document: &Value, text: &SourceText) -> Vec<Violation> {
        let resolver = RefResolver::new(document);
        let mut violations = Vec::new();

        for item in path_items(document) {
            self.scan_parameters(
                item.parameters(),
                item.path,
                &resolver,
                text,
                &mut violations,
            );

            for op in item.operations() {
                self.scan_parameters(
                    op.parameters(),
                    &op.describe(),
                    &resolver,
                    text,
                    &mut violations,
                );
            }
        }

        violations
    }

    fn scan_parameters(
        &self,
        parameters: &[Value],
        scope: &str,
        resolver: &RefResolver<'_>,
        text: &SourceText,
        violations: &mut Vec<Violation>,
    ) {
        for param in parameters {
            let param = resolver.deref(param);
            if param.get("in").and_then(Value::as_str) != Some(self.location.as_str()) {
                continue;
            }
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                continue;
            };

            for reserved in self.reserved {
                if names_match(reserved, name) {
                    violations.push(Violation::new(
                        self.location.reserved_category(),
                        format!(
                            "{} '{}' contains a reserved word '{}' (line {}) in {}",
                            self.location.label(),
                            name,
                            reserved,
                            text.find_line(name),
                            scope
                        ),
                    ));
                }
            }
        }
    }
}

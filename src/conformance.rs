//! Conformance to the OpenAPI/Swagger specification itself.
//!
//! This crate does not ship the OpenAPI meta-schema. [`ConformanceChecker`]
//! is the seam for a checker that does; [`MetaSchemaChecker`] adapts any
//! JSON Schema supplied by the caller. Checker output is treated as opaque
//! text, with a best-effort source line layered on top by
//! [`annotate_errors`].

use std::path::Path;

use serde_json::Value;

use crate::error::ConformanceError;
use crate::loader::load_rules_document;
use crate::locator::SourceText;
use crate::types::Line;

/// Report text when the checker found nothing.
pub const CONFORMANCE_SATISFIED: &str = "The contract conforms to the OpenAPI specification.";

/// Pass/fail plus raw error strings from a conformance checker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConformanceOutcome {
    pub passed: bool,
    pub errors: Vec<String>,
}

impl ConformanceOutcome {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
        }
    }

    /// Errors joined by single newlines, or the success sentence.
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            CONFORMANCE_SATISFIED.to_string()
        } else {
            self.errors.join("\n")
        }
    }

    /// Prefix each error with its approximate source line.
    pub fn annotated(self, text: &SourceText) -> Self {
        Self {
            passed: self.passed,
            errors: annotate_errors(&self.errors, text),
        }
    }
}

/// A generic OpenAPI/Swagger conformance checker.
pub trait ConformanceChecker {
    fn check(&self, document: &Value) -> ConformanceOutcome;
}

/// Checks documents against a caller-supplied JSON Schema.
pub struct MetaSchemaChecker {
    validator: jsonschema::Validator,
}

impl MetaSchemaChecker {
    /// # Errors
    ///
    /// Returns `ConformanceError::InvalidMetaSchema` if the schema does not
    /// compile.
    pub fn new(meta_schema: &Value) -> Result<Self, ConformanceError> {
        let validator = jsonschema::validator_for(meta_schema).map_err(|e| {
            ConformanceError::InvalidMetaSchema {
                message: e.to_string(),
            }
        })?;
        Ok(Self { validator })
    }

    /// Load the meta-schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConformanceError> {
        let meta_schema = load_rules_document(path)?;
        Self::new(&meta_schema)
    }
}

impl ConformanceChecker for MetaSchemaChecker {
    fn check(&self, document: &Value) -> ConformanceOutcome {
        if document.get("swagger").is_none() && document.get("openapi").is_none() {
            return ConformanceOutcome::from_errors(vec![
                "OpenAPI/Swagger version not specified".to_string(),
            ]);
        }

        let errors = self
            .validator
            .iter_errors(document)
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();
        ConformanceOutcome::from_errors(errors)
    }
}

/// Attach a best-effort line to each error.
///
/// The text before the first `:` is taken as the error's location; when it
/// is a JSON pointer, its last segment is searched for. Found errors are
/// prefixed `Line N: `, the rest `Error: `.
pub fn annotate_errors(errors: &[String], text: &SourceText) -> Vec<String> {
    errors
        .iter()
        .map(|error| {
            let token = location_token(error);
            match text.find_line(&token) {
                Line::At(n) if !token.is_empty() => format!("Line {}: {}", n, error),
                _ => format!("Error: {}", error),
            }
        })
        .collect()
}

fn location_token(error: &str) -> String {
    let head = error.split(':').next().unwrap_or("").trim();
    if !head.starts_with('/') {
        return head.to_string();
    }
    head.rsplit('/')
        .next()
        .unwrap_or("")
        .replace("~1", "/")
        .replace("~0", "~")
}

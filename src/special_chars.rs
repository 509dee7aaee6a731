//! Generic scan of every string leaf for disallowed characters.

use regex::Regex;
use serde_json::Value;

use crate::error::RulesError;
use crate::types::{Category, Violation};

/// Walks a JSON tree and flags string values containing any configured
/// character. Keys are not checked, and neither are non-string scalars.
#[derive(Debug, Clone)]
pub struct SpecialCharacterScanner {
    pattern: Option<Regex>,
}

impl SpecialCharacterScanner {
    /// Compile the disallowed characters into a single pattern.
    ///
    /// Entries are matched literally. An empty list disables the scan.
    pub fn new(characters: &[String]) -> Result<Self, RulesError> {
        let alternatives: Vec<String> = characters
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| regex::escape(c))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&alternatives.join("|"))
            .map_err(|source| RulesError::InvalidPattern { source })?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// One violation per offending string, named by its dotted path
    /// (`root.paths./pets.get.summary`, `root.tags[0].name`).
    pub fn scan(&self, document: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        if let Some(pattern) = &self.pattern {
            check_value(pattern, document, "root", &mut violations);
        }
        violations
    }
}

fn check_value(pattern: &Regex, value: &Value, path: &str, violations: &mut Vec<Violation>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let child_path = format!("{}.{}", path, key);
                check_value(pattern, val, &child_path, violations);
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}[{}]", path, i);
                check_value(pattern, item, &child_path, violations);
            }
        }
        Value::String(s) if pattern.is_match(s) => {
            violations.push(Violation::new(
                Category::SpecialCharacter,
                format!(
                    "Value '{}' at '{}' contains disallowed special characters.",
                    s, path
                ),
            ));
        }
        _ => {}
    }
}

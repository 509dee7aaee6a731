//! Checks on the top-level `info` block and the base path.

use serde_json::Value;

use crate::locator::SourceText;
use crate::types::{Category, Violation};

/// Four independent metadata checks; none depends on another's outcome.
#[derive(Debug, Clone, Copy)]
pub struct InfoValidator<'a> {
    document: &'a Value,
    text: &'a SourceText,
}

impl<'a> InfoValidator<'a> {
    pub fn new(document: &'a Value, text: &'a SourceText) -> Self {
        Self { document, text }
    }

    /// Run every check, in order: title, version, description, base path.
    pub fn validate(&self) -> Vec<Violation> {
        [
            self.validate_title(),
            self.validate_version(),
            self.validate_description(),
            self.validate_base_path(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn validate_title(&self) -> Option<Violation> {
        if self.info_str("title").is_empty() {
            return Some(Violation::new(
                Category::Info,
                "The contract has no title in its 'info' section.",
            ));
        }
        None
    }

    /// The version must start with `v` followed by a digit (`v1`, `v2.3`).
    pub fn validate_version(&self) -> Option<Violation> {
        let version = self.info_str("version");
        if is_prefixed_version(version) {
            return None;
        }
        Some(Violation::new(
            Category::Info,
            format!(
                "The contract version '{}' must start with 'v' followed by a digit (line {}).",
                version,
                self.text.find_line("version")
            ),
        ))
    }

    pub fn validate_description(&self) -> Option<Violation> {
        if self.info_str("description").trim().is_empty() {
            return Some(Violation::new(
                Category::Info,
                "The contract has an empty or missing description in its 'info' section.",
            ));
        }
        None
    }

    /// The base path must be exactly `/<title>/<version>`.
    ///
    /// Swagger 2 declares it as `basePath`. OpenAPI 3 documents without one
    /// use the path portion of the first server URL.
    pub fn validate_base_path(&self) -> Option<Violation> {
        let expected = format!("/{}/{}", self.info_str("title"), self.info_str("version"));
        let (found, token) = self.observed_base_path();
        if found == expected {
            return None;
        }
        Some(Violation::new(
            Category::Info,
            format!(
                "The basePath is incorrect: expected '{}', found '{}' (line {}).",
                expected,
                found,
                self.text.find_line(token)
            ),
        ))
    }

    /// The observed base path and the token to locate it by.
    fn observed_base_path(&self) -> (String, &'a str) {
        if let Some(base_path) = self.document.get("basePath").and_then(Value::as_str) {
            return (base_path.to_string(), "basePath");
        }

        let server_url = self
            .document
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str);

        match server_url {
            Some(url) => (url_path(url).to_string(), url),
            None => (String::new(), "basePath"),
        }
    }

    fn info_str(&self, key: &str) -> &'a str {
        self.document
            .get("info")
            .and_then(|info| info.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

fn is_prefixed_version(version: &str) -> bool {
    version
        .strip_prefix('v')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Path portion of a server URL.
///
/// E.g., "https://api.example.com/Pets/v2" -> "/Pets/v2"
fn url_path(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        // URL with scheme - path starts after the host
        Some(after_scheme) => after_scheme
            .find('/')
            .map(|idx| &after_scheme[idx..])
            .unwrap_or(""),
        // Relative server URL, already a path
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(document: Value) -> Vec<Violation> {
        let text = SourceText::default();
        InfoValidator::new(&document, &text).validate()
    }

    #[test]
    fn valid_swagger2_info() {
        let violations = check(json!({
            "info": { "title": "Pets", "version": "v2", "description": "Pet store" },
            "basePath": "/Pets/v2"
        }));
        assert!(violations.is_empty());
    }

    #[test]
    fn missing_title_and_description() {
        let violations = check(json!({
            "info": { "version": "v1", "description": "   " },
            "basePath": "//v1"
        }));
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("no title"));
        assert!(violations[1].message.contains("empty or missing description"));
    }

    #[test]
    fn version_pattern() {
        assert!(is_prefixed_version("v1"));
        assert!(is_prefixed_version("v10.2"));
        assert!(!is_prefixed_version("1.0"));
        assert!(!is_prefixed_version("v"));
        assert!(!is_prefixed_version("V1"));
        assert!(!is_prefixed_version("version1"));
    }

    #[test]
    fn base_path_must_match_title_and_version() {
        let document = json!({
            "info": { "title": "Pets", "version": "v2", "description": "d" },
            "basePath": "/pets/v2"
        });
        let text = SourceText::new("basePath: /pets/v2\n");
        let violation = InfoValidator::new(&document, &text)
            .validate_base_path()
            .unwrap();
        assert_eq!(
            violation.message,
            "The basePath is incorrect: expected '/Pets/v2', found '/pets/v2' (line 1)."
        );
    }

    #[test]
    fn base_path_from_openapi3_servers() {
        let violations = check(json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets", "version": "v2", "description": "d" },
            "servers": [{ "url": "https://api.example.com/Pets/v2" }]
        }));
        assert!(violations.is_empty());
    }

    #[test]
    fn missing_base_path() {
        let violations = check(json!({
            "info": { "title": "Pets", "version": "v2", "description": "d" }
        }));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected '/Pets/v2', found ''"));
    }

    #[test]
    fn url_path_forms() {
        assert_eq!(url_path("https://host/a/b"), "/a/b");
        assert_eq!(url_path("http://host"), "");
        assert_eq!(url_path("/a/b"), "/a/b");
    }
}

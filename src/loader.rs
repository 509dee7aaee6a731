//! Contract and rule document loading from files, strings and HTTP URLs.

use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::LoadError;
use crate::locator::SourceText;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Serialization format of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    Json,
    Yaml,
}

impl ContractFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(ContractFormat::Json),
            Some("yaml") | Some("yml") => Some(ContractFormat::Yaml),
            _ => None,
        }
    }

    /// Guess the format from content: JSON documents start with `{`.
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            ContractFormat::Json
        } else {
            ContractFormat::Yaml
        }
    }
}

/// A parsed contract together with its raw text.
///
/// The raw text is only used for best-effort line lookup; it has no
/// guaranteed structural correspondence with the document.
#[derive(Debug, Clone)]
pub struct Contract {
    pub document: Value,
    pub text: SourceText,
}

impl Contract {
    /// Build a contract from an already parsed document and its source text.
    pub fn new(document: Value, text: &str) -> Self {
        Self {
            document,
            text: SourceText::new(text),
        }
    }
}

/// Load a contract from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::UnsupportedFormat` for other extensions, or a parse error.
pub fn load_contract(path: &Path) -> Result<Contract, LoadError> {
    let format = ContractFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = read_file(path)?;
    load_contract_str(&content, format)
}

/// Parse a contract from a string in the given format.
pub fn load_contract_str(content: &str, format: ContractFormat) -> Result<Contract, LoadError> {
    let document = parse_document(content, format)?;
    Ok(Contract::new(document, content))
}

/// Load a rule document (JSON) from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_rules_document(path: &Path) -> Result<Value, LoadError> {
    let content = read_file(path)?;
    load_rules_str(&content)
}

/// Parse a rule document from a JSON string.
pub fn load_rules_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_document(content: &str, format: ContractFormat) -> Result<Value, LoadError> {
    match format {
        ContractFormat::Json => {
            serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
        }
        ContractFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?;
            Ok(yaml_to_json(yaml))
        }
    }
}

/// Convert a YAML tree to a JSON tree, keeping mapping order.
///
/// YAML allows non-string keys (`200:` under `responses` is an integer);
/// scalar keys are rendered as their text so lookups by code still work.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, val) in mapping {
                map.insert(yaml_key(key), yaml_to_json(val));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => yaml_to_json(other).to_string(),
    }
}

/// Fetch a document body from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status.
#[cfg(feature = "remote")]
pub fn fetch_url(url: &str) -> Result<String, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before reading the body
    let response = response.error_for_status().map_err(network_error)?;

    response.text().map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a contract from a file path or URL.
///
/// URLs are parsed by the extension of their path when it has one,
/// otherwise by sniffing the content. URL loading requires the `remote`
/// feature.
pub fn load_contract_auto(source: &str) -> Result<Contract, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            let content = fetch_url(source)?;
            let format = ContractFormat::from_path(Path::new(source))
                .unwrap_or_else(|| ContractFormat::sniff(&content));
            load_contract_str(&content, format)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_contract(Path::new(source))
    }
}

/// Load a rule document from a file path or URL.
pub fn load_rules_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_rules_str(&fetch_url(source)?)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_rules_document(Path::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn load_yaml_contract_keeps_key_order() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "swagger: '2.0'\npaths:\n  /zebra:\n    get: {{}}\n  /apple:\n    get: {{}}"
        )
        .unwrap();

        let contract = load_contract(file.path()).unwrap();
        let keys: Vec<&String> = contract.document["paths"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["/zebra", "/apple"]);
        assert_eq!(contract.text.line_count(), 6);
    }

    #[test]
    fn yaml_integer_keys_become_strings() {
        let contract = load_contract_str(
            "responses:\n  200:\n    description: ok\n  404:\n    description: missing\n",
            ContractFormat::Yaml,
        )
        .unwrap();
        assert_eq!(contract.document["responses"]["200"]["description"], "ok");
        assert_eq!(
            contract.document["responses"]["404"]["description"],
            "missing"
        );
    }

    #[test]
    fn load_json_contract() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"openapi": "3.0.0", "info": {{"title": "Pets"}}}}"#).unwrap();

        let contract = load_contract(file.path()).unwrap();
        assert_eq!(contract.document["info"]["title"], "Pets");
    }

    #[test]
    fn load_contract_file_not_found() {
        let result = load_contract(Path::new("/nonexistent/petstore.yaml"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_contract_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = load_contract(file.path());
        assert!(matches!(result, Err(LoadError::UnsupportedFormat { .. })));
    }

    #[test]
    fn load_contract_invalid_yaml() {
        let result = load_contract_str("paths: [unclosed", ContractFormat::Yaml);
        assert!(matches!(result, Err(LoadError::InvalidYaml { .. })));
    }

    #[test]
    fn load_rules_invalid_json() {
        let result = load_rules_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn sniff_format() {
        assert_eq!(ContractFormat::sniff("  {\"a\": 1}"), ContractFormat::Json);
        assert_eq!(ContractFormat::sniff("openapi: 3.0.0"), ContractFormat::Yaml);
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/openapi.yaml"));
        assert!(is_url("http://example.com/rules.json"));
        assert!(!is_url("./openapi.yaml"));
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_contract_url_by_extension() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/specs/petstore.yaml")
                .with_status(200)
                .with_body("openapi: 3.0.0\ninfo:\n  title: Pets\n")
                .create();

            let url = format!("{}/specs/petstore.yaml", server.url());
            let contract = load_contract_auto(&url).unwrap();
            assert_eq!(contract.document["info"]["title"], "Pets");
            mock.assert();
        }

        #[test]
        fn load_rules_url() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/rules")
                .with_status(200)
                .with_body(r#"{"reserved_paths": ["internal"]}"#)
                .create();

            let rules = load_rules_auto(&format!("{}/rules", server.url())).unwrap();
            assert_eq!(rules["reserved_paths"][0], "internal");
        }

        #[test]
        fn fetch_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let result = fetch_url(&format!("{}/missing.json", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }
    }
}

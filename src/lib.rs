//! Contract Policy
//!
//! Checks an OpenAPI/Swagger contract against a project policy: reserved
//! words, disallowed characters, expected headers, query parameters and
//! responses per HTTP method, and `info` metadata conventions.
//!
//! # Example
//!
//! ```
//! use contract_policy::{load_contract_str, validate_policy, ContractFormat, RuleSet};
//! use serde_json::json;
//!
//! let contract = load_contract_str(
//!     "swagger: '2.0'\n\
//!      info:\n  title: Pets\n  version: v1\n  description: Pet store\n\
//!      basePath: /Pets/v1\n\
//!      paths:\n  /internal/users:\n    get: {}\n",
//!     ContractFormat::Yaml,
//! )
//! .unwrap();
//!
//! let rules = RuleSet::from_value(&json!({ "reserved_paths": ["internal"] })).unwrap();
//! let report = validate_policy(&contract, &rules).unwrap();
//!
//! assert!(!report.compliant);
//! assert!(report.message().contains("contains a reserved word 'internal'"));
//! ```
//!
//! # Checks
//!
//! | Check | Driven by | Matching |
//! |-------|-----------|----------|
//! | Reserved path segments | `reserved_paths` | exact, per `/` segment |
//! | Reserved headers | `reserved_headers` | case-insensitive |
//! | Reserved query parameters | `reserved_query_parameters` | case-insensitive |
//! | Info metadata | always | title, `v<digit>` version, description, `/<title>/<version>` base path |
//! | Special characters | `special_characters` | exact, any string value |
//! | Header rules | `<METHOD>.headers` | type, example, description |
//! | Query parameter rules | `<METHOD>.query_parameters` | type, example, description |
//! | Response rules | `<METHOD>.responses` | code, body type, properties, items |
//!
//! Violations carry an approximate source line found by plain text search.
//! It is the first line containing the token, so repeated or reformatted
//! tokens may point at the wrong line or at none.

mod conformance;
mod error;
mod fields;
mod info;
mod loader;
mod locator;
mod operations;
mod policy;
mod reserved;
mod resolver;
mod responses;
mod rules;
mod special_chars;
mod types;

pub use conformance::{
    annotate_errors, ConformanceChecker, ConformanceOutcome, MetaSchemaChecker,
    CONFORMANCE_SATISFIED,
};
pub use error::{ConformanceError, LoadError, RulesError};
pub use fields::{render_template, FieldRuleValidator};
pub use info::InfoValidator;
pub use loader::{
    load_contract, load_contract_auto, load_contract_str, load_rules_auto, load_rules_document,
    load_rules_str, Contract, ContractFormat,
};
pub use locator::SourceText;
pub use operations::{operations, path_items, Operation, ParameterLocation, PathItem};
pub use policy::{validate_policy, PolicyReport, PolicyValidator, POLICY_SATISFIED};
pub use reserved::{ReservedParameterScanner, ReservedPathScanner};
pub use resolver::{RefResolver, MAX_REF_DEPTH};
pub use responses::ResponseValidator;
pub use rules::{FieldRule, MethodPolicy, ResponseRule, RuleSet};
pub use special_chars::SpecialCharacterScanner;
pub use types::{Category, Line, Violation};

#[cfg(feature = "remote")]
pub use loader::fetch_url;

//! Runs every policy check over one contract and aggregates the result.

use serde::Serialize;

use crate::error::RulesError;
use crate::fields::FieldRuleValidator;
use crate::info::InfoValidator;
use crate::loader::Contract;
use crate::reserved::{ReservedParameterScanner, ReservedPathScanner};
use crate::responses::ResponseValidator;
use crate::rules::RuleSet;
use crate::special_chars::SpecialCharacterScanner;
use crate::types::Violation;

/// Report text when no check found anything.
pub const POLICY_SATISFIED: &str = "The contract satisfies the project policy.";

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PolicyReport {
    pub compliant: bool,
    pub violations: Vec<Violation>,
}

impl PolicyReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            compliant: violations.is_empty(),
            violations,
        }
    }

    /// Violations joined by single newlines, or the success sentence.
    pub fn message(&self) -> String {
        if self.violations.is_empty() {
            return POLICY_SATISFIED.to_string();
        }
        self.violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `(compliant, report)` pair.
    pub fn verdict(&self) -> (bool, String) {
        (self.compliant, self.message())
    }
}

/// Checks contracts against one rule set.
///
/// Holds no state between calls, so one validator can check many contracts,
/// including from several threads.
#[derive(Debug, Clone)]
pub struct PolicyValidator<'r> {
    rules: &'r RuleSet,
    special_characters: SpecialCharacterScanner,
}

impl<'r> PolicyValidator<'r> {
    /// # Errors
    ///
    /// Returns `RulesError::InvalidPattern` if the special characters cannot
    /// be compiled into a pattern.
    pub fn new(rules: &'r RuleSet) -> Result<Self, RulesError> {
        Ok(Self {
            rules,
            special_characters: SpecialCharacterScanner::new(&rules.special_characters)?,
        })
    }

    /// Run every check exactly once, in this order:
    ///
    /// 1. reserved path segments
    /// 2. reserved header names
    /// 3. reserved query parameter names
    /// 4. info title, version, description and base path
    /// 5. special characters in string values
    /// 6. header field rules
    /// 7. query parameter field rules
    /// 8. response rules
    ///
    /// No check's result affects whether another runs.
    ///
    /// The info checks are not driven by the rule set, so an empty rule set
    /// does not make every well-formed contract compliant: a contract still
    /// needs a title, a description, a `v<digit>` version and a matching
    /// base path.
    pub fn validate(&self, contract: &Contract) -> PolicyReport {
        let document = &contract.document;
        let text = &contract.text;
        let rules = self.rules;

        let stages: [(&str, Vec<Violation>); 8] = [
            (
                "reserved_paths",
                ReservedPathScanner::new(&rules.reserved_paths).scan(document, text),
            ),
            (
                "reserved_headers",
                ReservedParameterScanner::headers(&rules.reserved_headers).scan(document, text),
            ),
            (
                "reserved_query_parameters",
                ReservedParameterScanner::query_parameters(&rules.reserved_query_parameters)
                    .scan(document, text),
            ),
            ("info", InfoValidator::new(document, text).validate()),
            ("special_characters", self.special_characters.scan(document)),
            (
                "headers",
                FieldRuleValidator::headers(rules).validate(document, text),
            ),
            (
                "query_parameters",
                FieldRuleValidator::query_parameters(rules).validate(document, text),
            ),
            (
                "responses",
                ResponseValidator::new(rules).validate(document, text),
            ),
        ];

        let mut violations = Vec::new();
        for (stage, found) in stages {
            tracing::debug!(stage, violations = found.len(), "policy check finished");
            violations.extend(found);
        }

        PolicyReport::new(violations)
    }
}

/// Check a contract against a rule set in one call.
pub fn validate_policy(contract: &Contract, rules: &RuleSet) -> Result<PolicyReport, RulesError> {
    Ok(PolicyValidator::new(rules)?.validate(contract))
}

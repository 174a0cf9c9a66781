//! Configuration evaluator for Convex Guardian
//!
//! CDD Principle: Domain Services - The evaluator applies a rule set to one configuration file
//! - Loads JSON-with-comments files and converts load failures into synthetic violations
//! - Resolves rule paths totally: a missing key is "absent", never an error
//! - Skips compiler option rules for configs that only reference other projects

pub mod jsonc;

use crate::domain::rules::{Rule, RuleCheck, RuleKind, RuleSet, COMPILER_OPTIONS};
use crate::domain::violations::{EvaluationResult, Severity, Violation};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Rule id of the synthetic violation for unreadable files
pub const READ_ERROR_RULE_ID: &str = "config-read-error";

/// Rule id of the synthetic violation for malformed files
pub const PARSE_ERROR_RULE_ID: &str = "config-parse-error";

/// Evaluates configuration files against a rule set
#[derive(Debug, Clone)]
pub struct ConfigEvaluator {
    rules: RuleSet,
}

impl ConfigEvaluator {
    /// Create an evaluator for the given rules
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Rules applied by this evaluator
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Load and evaluate a configuration file.
    ///
    /// Never fails: unreadable or malformed files produce a single Error violation.
    pub fn evaluate<P: AsRef<Path>>(&self, config_path: P) -> EvaluationResult {
        let config_path = config_path.as_ref();

        match fs::read_to_string(config_path) {
            Ok(content) => self.evaluate_str(config_path, &content),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                let mut result = EvaluationResult::new(config_path);
                result.add_violation(
                    Violation::new(
                        READ_ERROR_RULE_ID,
                        Severity::Error,
                        config_path.to_path_buf(),
                        format!("Failed to read {}: {e}", config_path.display()),
                    )
                    .with_suggestion("Check that the file exists and is readable"),
                );
                result
            }
        }
    }

    /// Evaluate configuration text that was loaded from `config_path`
    pub fn evaluate_str(&self, config_path: &Path, content: &str) -> EvaluationResult {
        match jsonc::parse(content) {
            Ok(config) => self.evaluate_value(config_path, &config),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                let mut result = EvaluationResult::new(config_path);
                result.add_violation(
                    Violation::new(
                        PARSE_ERROR_RULE_ID,
                        Severity::Error,
                        config_path.to_path_buf(),
                        format!("Failed to parse {}: {e}", config_path.display()),
                    )
                    .with_suggestion("Fix the JSON syntax of the configuration file"),
                );
                result
            }
        }
    }

    /// Evaluate an already-parsed configuration
    pub fn evaluate_value(&self, config_path: &Path, config: &JsonValue) -> EvaluationResult {
        let mut result = EvaluationResult::new(config_path);
        let references_only = is_references_only(config);

        for rule in &self.rules {
            if references_only && rule.targets_compiler_options() {
                tracing::debug!(
                    "Skipping rule '{}' for references-only config {}",
                    rule.id,
                    config_path.display()
                );
                result.add_skipped(rule.id.clone());
                continue;
            }

            match evaluate_rule(rule, config, config_path) {
                Some(violation) => result.add_violation(violation),
                None => result.add_passed(rule.clone()),
            }
        }

        result
    }
}

/// Follow `path` through nested objects. Any missing key or non-object step yields `None`.
pub fn resolve_path<'a>(config: &'a JsonValue, path: &[String]) -> Option<&'a JsonValue> {
    path.iter().try_fold(config, |value, key| value.as_object()?.get(key))
}

/// A config that lists project references and has no compiler options of its own
pub fn is_references_only(config: &JsonValue) -> bool {
    config
        .as_object()
        .is_some_and(|map| map.contains_key("references") && !map.contains_key(COMPILER_OPTIONS))
}

/// Apply one rule to a parsed configuration
pub fn evaluate_rule(rule: &Rule, config: &JsonValue, config_path: &Path) -> Option<Violation> {
    let actual = resolve_path(config, &rule.path);
    let recommended = rule.kind == RuleKind::Recommended;

    let message = match &rule.check {
        RuleCheck::ExpectedValue(expected) => {
            if actual == Some(expected) {
                return None;
            }
            if recommended {
                format!(
                    "{}. Recommended: {}, Got: {}",
                    rule.description,
                    expected,
                    render_value(actual)
                )
            } else {
                format!(
                    "{}. Expected: {}, Got: {}",
                    rule.description,
                    expected,
                    render_value(actual)
                )
            }
        }
        RuleCheck::Validator(validator) => {
            if validator.accepts(actual) {
                return None;
            }
            if recommended {
                format!(
                    "{}. Recommendation not followed for value: {}",
                    rule.description,
                    render_value(actual)
                )
            } else {
                format!("{}. Validation failed for value: {}", rule.description, render_value(actual))
            }
        }
        RuleCheck::ForbiddenValue(forbidden) => {
            if actual != Some(forbidden) {
                return None;
            }
            format!("{}. Forbidden value found: {}", rule.description, render_value(actual))
        }
    };

    Some(Violation::for_rule(rule, config_path, actual, message))
}

/// Compact JSON rendering of a resolved value
pub fn render_value(value: Option<&JsonValue>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(not set)".to_string(),
    }
}

//! Core domain models for configuration violations and evaluation results
//!
//! Architecture: Rich Domain Models - Violations are entities with behavior, not just data
//! - Violations carry the identity of the rule that produced them and the value that was found
//! - EvaluationResult is the per-file aggregate of violations and passed rules
//! - ProjectReport acts as an aggregate root over every evaluated configuration file

use crate::domain::rules::{Rule, RuleKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

/// Severity levels for rule violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Positive confirmation, never affects the verdict
    Success,
    /// Informational messages and suggestions
    Info,
    /// Warnings that should be addressed but don't fail the evaluation
    Warning,
    /// Errors that fail the evaluation
    Error,
}

impl Severity {
    /// Whether this severity level should cause evaluation to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Severities shown in grouped violation listings, most severe first
    pub fn display_order() -> [Severity; 4] {
        [Self::Error, Self::Warning, Self::Info, Self::Success]
    }
}

/// A rule violation found while evaluating a configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Identifier of the rule that produced this violation
    pub rule_id: String,
    /// Kind of the triggering rule
    pub kind: RuleKind,
    /// Severity level of this violation
    pub severity: Severity,
    /// Configuration file that was evaluated
    pub config_file: PathBuf,
    /// Value found at the rule's path, `None` when absent
    pub actual_value: Option<JsonValue>,
    /// Human-readable description of the violation
    pub message: String,
    /// Suggested fix for the violation (if available)
    pub suggested_fix: Option<String>,
    /// When this violation was detected
    pub detected_at: DateTime<Utc>,
}

impl Violation {
    /// Create a new violation that is not tied to an extracted rule
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        config_file: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            kind: RuleKind::Required,
            severity,
            config_file,
            actual_value: None,
            message: message.into(),
            suggested_fix: None,
            detected_at: Utc::now(),
        }
    }

    /// Create a violation of `rule` carrying the rule's identity and fix suggestion
    pub fn for_rule(
        rule: &Rule,
        config_file: &Path,
        actual_value: Option<&JsonValue>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule.id.clone(),
            kind: rule.kind,
            severity: rule.severity,
            config_file: config_file.to_path_buf(),
            actual_value: actual_value.cloned(),
            message: message.into(),
            suggested_fix: rule.fix_suggestion.clone(),
            detected_at: Utc::now(),
        }
    }

    /// Add a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggestion.into());
        self
    }

    /// Whether this violation is blocking (fails the evaluation)
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

/// Count of violations by severity level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub success: usize,
}

impl ViolationCounts {
    /// Total number of violations across all severities
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info + self.success
    }

    /// Whether there are any blocking violations
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Add a violation to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
            Severity::Success => self.success += 1,
        }
    }

    /// Fold another set of counts into this one
    pub fn merge(&mut self, other: &ViolationCounts) {
        self.error += other.error;
        self.warning += other.warning;
        self.info += other.info;
        self.success += other.success;
    }
}

/// Overall outcome for a file or a whole project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No violations at all
    Passed,
    /// Only non-blocking violations
    PassedWithWarnings,
    /// At least one Error-severity violation
    Failed,
}

impl Verdict {
    /// Derive the verdict from violation counts
    pub fn from_counts(counts: &ViolationCounts) -> Self {
        if counts.has_blocking() {
            Self::Failed
        } else if counts.error + counts.warning + counts.info > 0 {
            Self::PassedWithWarnings
        } else {
            Self::Passed
        }
    }

    /// Whether the verdict maps to a successful exit
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::PassedWithWarnings => "passed_with_warnings",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of evaluating one configuration file against one rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Display name of the evaluated target (e.g. "Main TypeScript Config")
    pub target_name: Option<String>,
    /// Configuration file that was evaluated
    pub config_file: PathBuf,
    /// Violations in rule order
    pub violations: Vec<Violation>,
    /// Rules that were satisfied, in rule order
    pub passed_rules: Vec<Rule>,
    /// Ids of rules that were not applicable to this file
    pub skipped_rules: Vec<String>,
}

impl EvaluationResult {
    /// Create an empty result for a configuration file
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            target_name: None,
            config_file: config_file.into(),
            violations: Vec::new(),
            passed_rules: Vec::new(),
            skipped_rules: Vec::new(),
        }
    }

    /// Attach a display name
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    /// Record a violation
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Record a satisfied rule
    pub fn add_passed(&mut self, rule: Rule) {
        self.passed_rules.push(rule);
    }

    /// Record a rule that did not apply to this file
    pub fn add_skipped(&mut self, rule_id: impl Into<String>) {
        self.skipped_rules.push(rule_id.into());
    }

    /// Number of rules that were actually evaluated
    pub fn total_rules(&self) -> usize {
        self.violations.len() + self.passed_rules.len()
    }

    /// Violation counts by severity
    pub fn counts(&self) -> ViolationCounts {
        let mut counts = ViolationCounts::default();
        for violation in &self.violations {
            counts.add(violation.severity);
        }
        counts
    }

    /// Whether the file has any Error-severity violation
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(Violation::is_blocking)
    }

    /// Verdict for this file
    pub fn verdict(&self) -> Verdict {
        Verdict::from_counts(&self.counts())
    }

    /// Get violations of a specific severity
    pub fn violations_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }
}

/// Summary statistics for a project report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Number of configuration files evaluated
    pub files_evaluated: usize,
    /// Number of rules in the rule set
    pub rule_count: usize,
    /// Number of violations by severity level
    pub violations_by_severity: ViolationCounts,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when evaluation was performed
    pub validated_at: DateTime<Utc>,
}

/// Complete report over every configuration file of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Rules document the rule set was extracted from
    pub rules_file: Option<PathBuf>,
    /// Per-file evaluation results in evaluation order
    pub results: Vec<EvaluationResult>,
    /// Summary statistics
    pub summary: ProjectSummary,
}

impl ProjectReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            rules_file: None,
            results: Vec::new(),
            summary: ProjectSummary {
                validated_at: Utc::now(),
                ..Default::default()
            },
        }
    }

    /// Add a file result to the report
    pub fn add_result(&mut self, result: EvaluationResult) {
        self.summary.violations_by_severity.merge(&result.counts());
        self.summary.files_evaluated += 1;
        self.results.push(result);
    }

    /// Whether any evaluated file has an Error-severity violation
    pub fn has_errors(&self) -> bool {
        self.summary.violations_by_severity.has_blocking()
    }

    /// Overall verdict across all files
    pub fn verdict(&self) -> Verdict {
        Verdict::from_counts(&self.summary.violations_by_severity)
    }

    /// Set the rules document path
    pub fn set_rules_file(&mut self, path: impl Into<PathBuf>) {
        self.rules_file = Some(path.into());
    }

    /// Set the number of rules evaluated
    pub fn set_rule_count(&mut self, count: usize) {
        self.summary.rule_count = count;
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }
}

impl Default for ProjectReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types that can occur while loading inputs
#[derive(Debug, thiserror::Error)]
pub enum GuardianError {
    /// Tool configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Rules document could not be read
    #[error("Document error in {file}: {message}")]
    Document { file: String, message: String },

    /// Rule set is inconsistent
    #[error("Rule error: {message}")]
    Rule { message: String },

    /// Required inputs could not be located
    #[error("Discovery error: {message}")]
    Discovery { message: String },

    /// Report could not be rendered
    #[error("Report error: {message}")]
    Report { message: String },
}

impl GuardianError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a document error
    pub fn document(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule {
            message: message.into(),
        }
    }

    /// Create a discovery error
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }
}

/// Result type for Guardian operations
pub type GuardianResult<T> = Result<T, GuardianError>;

//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - EvaluationResult and ProjectReport (domain) are converted to external representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Display filtering never changes counts or verdicts

use crate::domain::rules::{Rule, RuleSet};
use crate::domain::violations::{
    EvaluationResult, GuardianError, GuardianResult, ProjectReport, Severity, Verdict, Violation,
};
use serde_json::{json, Value as JsonValue};
use std::io::Write;

const RULE_WIDTH: usize = 80;
const GROUP_WIDTH: usize = 40;

/// Supported output formats for evaluation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and grouping
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// GitHub Actions workflow annotations
    GitHub,
}

impl OutputFormat {
    /// Parse format from its name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to show fix suggestions
    pub show_suggestions: bool,
    /// Passed rules listed per file before truncating
    pub passed_rules_limit: usize,
    /// Minimum severity level to display
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_suggestions: true,
            passed_rules_limit: 5,
            min_severity: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Red,
    Yellow,
    Cyan,
    Green,
    Bold,
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Format a whole project report in the specified format
    pub fn format_report(&self, report: &ProjectReport, format: OutputFormat) -> GuardianResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_human(report)),
            OutputFormat::Json => self.format_json(report),
            OutputFormat::GitHub => Ok(self.format_github(report)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &ProjectReport,
        format: OutputFormat,
        mut writer: W,
    ) -> GuardianResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Human-readable block for a single evaluated file
    pub fn format_result(&self, result: &EvaluationResult) -> String {
        let mut out = String::new();
        let counts = result.counts();
        let rule_line = "=".repeat(RULE_WIDTH);
        let group_line = "-".repeat(GROUP_WIDTH);

        out.push_str(&format!("\n{rule_line}\n"));
        out.push_str(&format!("📋 {}\n", self.paint("Convex Rules Evaluation Report", Tone::Bold)));
        if let Some(name) = &result.target_name {
            out.push_str(&format!("🔍 {name}\n"));
        }
        out.push_str(&format!("📁 Config File: {}\n", result.config_file.display()));
        out.push_str(&format!("{rule_line}\n\n"));

        out.push_str("📊 Summary:\n");
        out.push_str(&format!("   Total Rules Evaluated: {}\n", result.total_rules()));
        out.push_str(&format!("   ✅ Passed: {}\n", result.passed_rules.len()));
        out.push_str(&format!("   ❌ Violations: {}\n", result.violations.len()));
        if !result.violations.is_empty() {
            out.push_str(&format!("      - Errors: {}\n", counts.error));
            out.push_str(&format!("      - Warnings: {}\n", counts.warning));
            out.push_str(&format!("      - Info: {}\n", counts.info));
        }
        if !result.skipped_rules.is_empty() {
            out.push_str(&format!("   ⏭️  Skipped: {}\n", result.skipped_rules.len()));
        }
        out.push('\n');

        let shown = self.filter_violations(&result.violations);
        if !shown.is_empty() {
            out.push_str("⚠️  Violations Found:\n\n");

            for severity in Severity::display_order() {
                let group: Vec<&Violation> =
                    shown.iter().copied().filter(|v| v.severity == severity).collect();
                if group.is_empty() {
                    continue;
                }

                let heading = format!("{} ({}):", group_label(severity), group.len());
                out.push_str(&format!("{} {}\n", severity_icon(severity), self.paint(&heading, severity_tone(severity))));
                out.push_str(&format!("{group_line}\n"));

                for violation in group {
                    out.push_str(&format!("  Rule ID: {}\n", violation.rule_id));
                    out.push_str(&format!("  Message: {}\n", violation.message));
                    if self.options.show_suggestions {
                        if let Some(fix) = &violation.suggested_fix {
                            out.push_str(&format!("  💡 Fix: {fix}\n"));
                        }
                    }
                    out.push('\n');
                }
            }
        }

        if !result.passed_rules.is_empty() {
            out.push_str(&format!("✅ Passed Rules ({}):\n", result.passed_rules.len()));
            out.push_str(&format!("{group_line}\n"));
            let limit = self.options.passed_rules_limit;
            for rule in result.passed_rules.iter().take(limit) {
                out.push_str(&format!("  ✓ {}: {}\n", rule.id, rule.description));
            }
            if result.passed_rules.len() > limit {
                out.push_str(&format!("  ... and {} more\n", result.passed_rules.len() - limit));
            }
            out.push('\n');
        }

        out.push_str(&format!("{rule_line}\n"));
        out.push_str(&format!("{}\n", self.verdict_line(result.verdict())));
        out
    }

    /// Listing of a rule set
    pub fn format_rules(&self, rules: &RuleSet, format: OutputFormat) -> GuardianResult<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(rules)
                .map_err(|e| GuardianError::report(format!("JSON serialization failed: {e}"))),
            OutputFormat::Human | OutputFormat::GitHub => {
                let mut out = String::new();
                out.push_str(&format!("📜 {}\n", self.paint(&format!("Extracted Rules ({}):", rules.len()), Tone::Bold)));
                for rule in rules {
                    out.push_str(&format!(
                        "  - {}: {} ({})\n",
                        rule.id,
                        rule.description,
                        self.paint(rule.severity.as_str(), severity_tone(rule.severity))
                    ));
                }
                Ok(out)
            }
        }
    }

    /// Detailed description of one rule
    pub fn format_rule_details(&self, rule: &Rule) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.paint(&format!("Rule: {}", rule.id), Tone::Bold)));
        out.push_str(&format!("Description: {}\n", rule.description));
        out.push_str(&format!("Kind: {}\n", rule.kind.as_str()));
        out.push_str(&format!("Severity: {}\n", self.paint(rule.severity.as_str(), severity_tone(rule.severity))));
        out.push_str(&format!("Path: {}\n", rule.path_display()));
        out.push_str(&format!("Check: {}\n", rule.check.describe()));
        if let Some(fix) = &rule.fix_suggestion {
            out.push_str(&format!("Fix: {fix}\n"));
        }
        out
    }

    fn format_human(&self, report: &ProjectReport) -> String {
        let mut out = String::new();
        let rule_line = "=".repeat(RULE_WIDTH);

        for result in &report.results {
            out.push_str(&self.format_result(result));
        }

        let counts = &report.summary.violations_by_severity;
        out.push_str(&format!("\n{rule_line}\n"));
        out.push_str(&format!("📊 {}\n", self.paint("OVERALL EVALUATION RESULT", Tone::Bold)));
        out.push_str(&format!("{rule_line}\n"));
        out.push_str(&format!(
            "Files evaluated: {} | Rules: {} | Errors: {} | Warnings: {} | Info: {} ({:.1}s)\n",
            report.summary.files_evaluated,
            report.summary.rule_count,
            counts.error,
            counts.warning,
            counts.info,
            report.summary.execution_time_ms as f64 / 1000.0
        ));

        if report.has_errors() {
            out.push_str(&format!(
                "❌ {}\n",
                self.paint("FAILURE: Some configurations have critical issues that need fixing.", Tone::Red)
            ));
        } else {
            out.push_str(&format!(
                "✅ {}\n",
                self.paint("SUCCESS: All TypeScript configurations meet Convex requirements!", Tone::Green)
            ));
        }

        out
    }

    fn format_json(&self, report: &ProjectReport) -> GuardianResult<String> {
        let files: Vec<JsonValue> = report
            .results
            .iter()
            .map(|result| {
                let violations: Vec<JsonValue> = self
                    .filter_violations(&result.violations)
                    .into_iter()
                    .map(|v| {
                        json!({
                            "rule_id": v.rule_id,
                            "kind": v.kind.as_str(),
                            "severity": v.severity.as_str(),
                            "message": v.message,
                            "actual_value": v.actual_value,
                            "suggested_fix": v.suggested_fix,
                            "detected_at": v.detected_at.to_rfc3339()
                        })
                    })
                    .collect();

                json!({
                    "name": result.target_name,
                    "config_file": result.config_file.display().to_string(),
                    "verdict": result.verdict().as_str(),
                    "violations": violations,
                    "passed_rules": result.passed_rules.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
                    "skipped_rules": result.skipped_rules.len()
                })
            })
            .collect();

        let counts = &report.summary.violations_by_severity;
        let json_report = json!({
            "rules_file": report.rules_file.as_ref().map(|p| p.display().to_string()),
            "passed": report.verdict().is_success(),
            "verdict": report.verdict().as_str(),
            "files": files,
            "summary": {
                "files_evaluated": report.summary.files_evaluated,
                "rule_count": report.summary.rule_count,
                "violations_by_severity": {
                    "error": counts.error,
                    "warning": counts.warning,
                    "info": counts.info
                },
                "execution_time_ms": report.summary.execution_time_ms,
                "validated_at": report.summary.validated_at.to_rfc3339()
            }
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| GuardianError::report(format!("JSON serialization failed: {e}")))
    }

    fn format_github(&self, report: &ProjectReport) -> String {
        let mut out = String::new();

        for result in &report.results {
            for violation in self.filter_violations(&result.violations) {
                let level = match violation.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Info | Severity::Success => "notice",
                };

                out.push_str(&format!(
                    "::{} file={},title={}::{}\n",
                    level,
                    violation.config_file.display(),
                    violation.rule_id,
                    violation.message
                ));
            }
        }

        out
    }

    fn filter_violations<'a>(&self, violations: &'a [Violation]) -> Vec<&'a Violation> {
        violations
            .iter()
            .filter(|v| self.options.min_severity.map_or(true, |min| v.severity >= min))
            .collect()
    }

    fn verdict_line(&self, verdict: Verdict) -> String {
        match verdict {
            Verdict::Failed => format!(
                "❌ {}",
                self.paint("FAILED: Critical errors found. Please fix the issues above.", Tone::Red)
            ),
            Verdict::PassedWithWarnings => format!(
                "⚠️  {}",
                self.paint("PASSED WITH WARNINGS: Consider addressing the issues above.", Tone::Yellow)
            ),
            Verdict::Passed => format!("✅ {}", self.paint("PASSED: All rules satisfied!", Tone::Green)),
        }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if self.options.use_colors {
            colorize(text, tone)
        } else {
            text.to_string()
        }
    }
}

#[cfg(feature = "colors")]
fn colorize(text: &str, tone: Tone) -> String {
    use colored::Colorize;

    match tone {
        Tone::Red => text.red().to_string(),
        Tone::Yellow => text.yellow().to_string(),
        Tone::Cyan => text.cyan().to_string(),
        Tone::Green => text.green().to_string(),
        Tone::Bold => text.bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn colorize(text: &str, _tone: Tone) -> String {
    text.to_string()
}

fn severity_tone(severity: Severity) -> Tone {
    match severity {
        Severity::Error => Tone::Red,
        Severity::Warning => Tone::Yellow,
        Severity::Info => Tone::Cyan,
        Severity::Success => Tone::Green,
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
        Severity::Success => "🟢",
    }
}

fn group_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERRORS",
        Severity::Warning => "WARNINGS",
        Severity::Info => "INFO",
        Severity::Success => "SUCCESS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::{RuleCheck, RuleKind};
    use std::path::PathBuf;

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    fn passing_rule(id: &str) -> Rule {
        Rule::new(
            id,
            format!("{id} description"),
            RuleKind::Required,
            Severity::Error,
            ["compilerOptions", id],
            RuleCheck::ExpectedValue(json!(true)),
        )
    }

    fn create_test_report() -> ProjectReport {
        let mut result = EvaluationResult::new("tsconfig.json").with_target_name("Main TypeScript Config");
        result.add_violation(
            Violation::new(
                "ts-strict-types",
                Severity::Error,
                PathBuf::from("tsconfig.json"),
                "TypeScript strict mode should be enabled. Expected: true, Got: false",
            )
            .with_suggestion("Set 'strict': true in compilerOptions"),
        );
        result.add_violation(Violation::new(
            "convex-jsx",
            Severity::Info,
            PathBuf::from("tsconfig.json"),
            "JSX should be configured for React. Recommendation not followed for value: (not set)",
        ));
        result.add_passed(passing_rule("noEmit"));

        let mut report = ProjectReport::new();
        report.set_rules_file("convex_rules.mdc");
        report.set_rule_count(3);
        report.add_result(result);
        report.set_execution_time(1200);
        report
    }

    #[test]
    fn test_human_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Human).unwrap();

        assert!(output.contains("Main TypeScript Config"));
        assert!(output.contains("📁 Config File: tsconfig.json"));
        assert!(output.contains("Total Rules Evaluated: 3"));
        assert!(output.contains("ERRORS (1):"));
        assert!(output.contains("INFO (1):"));
        assert!(output.contains("💡 Fix: Set 'strict': true in compilerOptions"));
        assert!(output.contains("✓ noEmit: noEmit description"));
        assert!(output.contains("FAILED: Critical errors found"));
        assert!(output.contains("FAILURE: Some configurations"));

        let errors_at = output.find("ERRORS").unwrap();
        let info_at = output.find("INFO (").unwrap();
        assert!(errors_at < info_at);
    }

    #[test]
    fn test_passed_rules_truncation() {
        let mut result = EvaluationResult::new("tsconfig.json");
        for i in 0..8 {
            result.add_passed(passing_rule(&format!("rule{i}")));
        }

        let output = plain().format_result(&result);
        assert!(output.contains("✓ rule4"));
        assert!(!output.contains("✓ rule5"));
        assert!(output.contains("... and 3 more"));
        assert!(output.contains("PASSED: All rules satisfied!"));
    }

    #[test]
    fn test_warning_only_verdict_line() {
        let mut result = EvaluationResult::new("tsconfig.json");
        result.add_violation(Violation::new(
            "convex-required-lib",
            Severity::Warning,
            PathBuf::from("tsconfig.json"),
            "lib missing",
        ));

        let output = plain().format_result(&result);
        assert!(output.contains("PASSED WITH WARNINGS"));
    }

    #[test]
    fn test_json_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::Json).unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(json["passed"], false);
        assert_eq!(json["verdict"], "failed");
        assert_eq!(json["rules_file"], "convex_rules.mdc");
        assert_eq!(json["files"][0]["name"], "Main TypeScript Config");
        assert_eq!(json["files"][0]["violations"].as_array().unwrap().len(), 2);
        assert_eq!(json["files"][0]["violations"][0]["rule_id"], "ts-strict-types");
        assert_eq!(json["files"][0]["passed_rules"], json!(["noEmit"]));
        assert_eq!(json["summary"]["violations_by_severity"]["info"], 1);
        assert_eq!(json["summary"]["execution_time_ms"], 1200);
    }

    #[test]
    fn test_github_format() {
        let output = plain().format_report(&create_test_report(), OutputFormat::GitHub).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("::error file=tsconfig.json,title=ts-strict-types::"));
        assert!(lines[1].starts_with("::notice file=tsconfig.json,title=convex-jsx::"));
    }

    #[test]
    fn test_min_severity_filters_display_only() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            min_severity: Some(Severity::Error),
            ..Default::default()
        });

        let output = formatter.format_report(&create_test_report(), OutputFormat::Json).unwrap();
        let json: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(json["files"][0]["violations"].as_array().unwrap().len(), 1);
        assert_eq!(json["summary"]["violations_by_severity"]["info"], 1);
        assert_eq!(json["verdict"], "failed");
    }

    #[test]
    fn test_write_report_matches_formatted_output() {
        let report = create_test_report();
        let formatter = plain();
        let mut buffer = Vec::new();

        formatter.write_report(&report, OutputFormat::GitHub, &mut buffer).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(written, formatter.format_report(&report, OutputFormat::GitHub).unwrap());
        assert!(written.ends_with("::notice file=tsconfig.json,title=convex-jsx::JSX should be configured for React. Recommendation not followed for value: (not set)\n"));
    }

    #[test]
    fn test_empty_report() {
        let output = plain().format_report(&ProjectReport::new(), OutputFormat::Human).unwrap();
        assert!(output.contains("SUCCESS: All TypeScript configurations meet Convex requirements!"));
    }

    #[test]
    fn test_format_rules() {
        let rules = RuleSet::from_rules(vec![passing_rule("strict")]).unwrap();
        let formatter = plain();

        let human = formatter.format_rules(&rules, OutputFormat::Human).unwrap();
        assert!(human.contains("- strict: strict description (error)"));

        let json: JsonValue =
            serde_json::from_str(&formatter.format_rules(&rules, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["id"], "strict");
        assert_eq!(json[0]["expected_value"], true);

        let details = formatter.format_rule_details(rules.get("strict").unwrap());
        assert!(details.contains("Path: compilerOptions.strict"));
        assert!(details.contains("Check: equals true"));
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("GitHub"), Some(OutputFormat::GitHub));
        assert_eq!(OutputFormat::from_name("sarif"), None);
        assert_eq!(OutputFormat::all_formats().len(), 3);
    }
}

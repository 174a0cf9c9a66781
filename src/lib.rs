//! Convex Guardian - TypeScript configuration checks driven by Convex guideline documents
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure domain logic separated from infrastructure concerns
//! - Pipeline: document parser, rule extractors, config evaluator, reporter
//! - Tool configuration adjusts the extracted rule set before evaluation

pub mod config;
pub mod discovery;
pub mod document;
pub mod domain;
pub mod evaluator;
pub mod extract;
pub mod report;

// Re-export main types for convenient access
pub use domain::rules::{Rule, RuleCheck, RuleKind, RuleSet, Validator};
pub use domain::violations::{
    EvaluationResult, GuardianError, GuardianResult, ProjectReport, ProjectSummary, Severity,
    Verdict, Violation, ViolationCounts,
};

pub use config::{ConfigBuilder, GuardianConfig};

pub use discovery::{find_config_files, find_rules_file, ConfigTarget};

pub use document::{CodeBlock, Document};

pub use evaluator::ConfigEvaluator;

pub use extract::{RuleExtractor, RulesExtractor};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main entry point wiring rules extraction, evaluation and reporting
pub struct ConvexGuardian {
    config: GuardianConfig,
    rules_file: Option<PathBuf>,
    evaluator: ConfigEvaluator,
    report_formatter: ReportFormatter,
}

impl ConvexGuardian {
    /// Build from a parsed document using the default extractors
    pub fn from_document(doc: &Document, config: GuardianConfig) -> GuardianResult<Self> {
        Self::with_extractor(doc, config, &RulesExtractor::with_defaults())
    }

    /// Build from a parsed document using a custom extractor set
    pub fn with_extractor(
        doc: &Document,
        config: GuardianConfig,
        extractor: &RulesExtractor,
    ) -> GuardianResult<Self> {
        let extracted = extractor.extract(doc)?;
        let rules = config.apply_rule_policy(extracted)?;
        tracing::info!("Loaded {} rules", rules.len());

        let report_formatter = ReportFormatter::new(ReportOptions {
            passed_rules_limit: config.report.passed_rules_limit,
            ..Default::default()
        });

        Ok(Self {
            config,
            rules_file: None,
            evaluator: ConfigEvaluator::new(rules),
            report_formatter,
        })
    }

    /// Read and parse a rules document, then build
    pub fn from_rules_file<P: AsRef<Path>>(path: P, config: GuardianConfig) -> GuardianResult<Self> {
        let path = path.as_ref();
        let doc = Document::from_file(path)?;
        let mut guardian = Self::from_document(&doc, config)?;
        guardian.rules_file = Some(path.to_path_buf());
        Ok(guardian)
    }

    /// Find the rules document for a project via the configured search paths, then build
    pub fn locate<P: AsRef<Path>>(project_dir: P, config: GuardianConfig) -> GuardianResult<Self> {
        let project_dir = project_dir.as_ref();
        let search_paths = &config.rules_file.search_paths;

        match find_rules_file(project_dir, search_paths) {
            Some(path) => Self::from_rules_file(path, config),
            None => {
                let searched: Vec<String> = discovery::rules_file_candidates(project_dir, search_paths)
                    .iter()
                    .map(|p| format!("  - {}", p.display()))
                    .collect();
                Err(GuardianError::discovery(format!(
                    "Could not find a rules document. Searched in:\n{}",
                    searched.join("\n")
                )))
            }
        }
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// Rules applied to every target
    pub fn rules(&self) -> &RuleSet {
        self.evaluator.rules()
    }

    /// Rules document the rules came from, if loaded from disk
    pub fn rules_file(&self) -> Option<&Path> {
        self.rules_file.as_deref()
    }

    /// Tool configuration in effect
    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    /// Evaluate a named target
    pub fn evaluate_target(&self, target: &ConfigTarget) -> EvaluationResult {
        tracing::debug!("Evaluating {} ({})", target.name, target.path.display());
        self.evaluator.evaluate(&target.path).with_target_name(&target.name)
    }

    /// Evaluate targets in order and aggregate the results
    pub fn evaluate_targets(&self, targets: &[ConfigTarget]) -> ProjectReport {
        let start = Instant::now();
        let mut report = ProjectReport::new();

        if let Some(path) = &self.rules_file {
            report.set_rules_file(path);
        }
        report.set_rule_count(self.rules().len());

        for target in targets {
            report.add_result(self.evaluate_target(target));
        }

        report.set_execution_time(start.elapsed().as_millis() as u64);
        report
    }

    /// Configuration files of a project, failing when there are none
    pub fn discover_targets<P: AsRef<Path>>(&self, project_dir: P) -> GuardianResult<Vec<ConfigTarget>> {
        let project_dir = project_dir.as_ref();
        let targets = find_config_files(project_dir, &self.config.discovery)?;

        if targets.is_empty() {
            return Err(GuardianError::discovery(format!(
                "No TypeScript configuration files found in {}. Looking for: {}",
                project_dir.display(),
                self.config.discovery.file_pattern
            )));
        }

        Ok(targets)
    }

    /// Discover and evaluate every configuration file of a project
    pub fn evaluate_project<P: AsRef<Path>>(&self, project_dir: P) -> GuardianResult<ProjectReport> {
        let targets = self.discover_targets(project_dir)?;
        Ok(self.evaluate_targets(&targets))
    }

    /// Format a project report for output
    pub fn format_report(&self, report: &ProjectReport, format: OutputFormat) -> GuardianResult<String> {
        self.report_formatter.format_report(report, format)
    }
}

/// Evaluate a project with its own configuration file (or defaults) and discovered rules document
pub fn check_project<P: AsRef<Path>>(project_dir: P) -> GuardianResult<ProjectReport> {
    let project_dir = project_dir.as_ref();
    let config = GuardianConfig::discover(project_dir)?;
    let guardian = ConvexGuardian::locate(project_dir, config)?;
    guardian.evaluate_project(project_dir)
}

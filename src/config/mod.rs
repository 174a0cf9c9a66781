//! Configuration loading and management for Convex Guardian
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - Default search locations and target configs are embedded in the domain, not infrastructure
//! - Rule policy (disable, re-grade, add custom rules) is applied on top of extracted rules

use crate::domain::rules::{Rule, RuleSet};
use crate::domain::violations::{GuardianError, GuardianResult, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// File names looked up in the project directory when no config path is given
pub const CONFIG_FILE_NAMES: &[&str] =
    &["convex_guardian.yaml", "convex_guardian.yml", ".convex_guardian.yaml"];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Main configuration structure for Convex Guardian
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Configuration format version
    pub version: String,
    /// Where to look for the rules document
    pub rules_file: RulesFileConfig,
    /// How target configuration files are found
    pub discovery: DiscoveryConfig,
    /// Adjustments applied to the extracted rule set
    pub rules: RulePolicy,
    /// Report rendering settings
    pub report: ReportConfig,
}

/// Rules document search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesFileConfig {
    /// Ordered candidates; relative paths resolve against the project, `~/` against `$HOME`
    pub search_paths: Vec<String>,
}

/// A well-known configuration file with a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedConfig {
    pub name: String,
    pub path: String,
}

/// Target configuration discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Named configs evaluated first, in this order
    pub standard_configs: Vec<NamedConfig>,
    /// Glob matched against file names during the project walk
    pub file_pattern: String,
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
}

/// Rule set adjustments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePolicy {
    /// Rule ids removed after extraction
    pub disabled: Vec<String>,
    /// Rule id to replacement severity
    pub severity_overrides: BTreeMap<String, Severity>,
    /// Additional rules declared in the configuration
    pub custom: Vec<Rule>,
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Passed rules listed per file before truncating
    pub passed_rules_limit: usize,
}

impl GuardianConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            GuardianError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            GuardianError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> GuardianResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| GuardianError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found in `project_dir`, or the defaults
    pub fn discover<P: AsRef<Path>>(project_dir: P) -> GuardianResult<Self> {
        match Self::find_config_file(project_dir) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load_from_file(path)
            }
            None => Ok(Self::with_defaults()),
        }
    }

    /// Path of the project's config file, if one exists
    pub fn find_config_file<P: AsRef<Path>>(project_dir: P) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| project_dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Get default configuration
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            rules_file: RulesFileConfig::default(),
            discovery: DiscoveryConfig::default(),
            rules: RulePolicy::default(),
            report: ReportConfig::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> GuardianResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(GuardianError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        glob::Pattern::new(&self.discovery.file_pattern).map_err(|e| {
            GuardianError::config(format!(
                "Invalid file pattern '{}': {}",
                self.discovery.file_pattern, e
            ))
        })?;

        let mut seen = HashSet::new();
        for rule in &self.rules.custom {
            rule.validate()
                .map_err(|e| GuardianError::config(format!("Invalid custom rule: {e}")))?;

            if !seen.insert(rule.id.as_str()) {
                return Err(GuardianError::config(format!(
                    "Duplicate custom rule ID '{}'",
                    rule.id
                )));
            }
        }

        Ok(())
    }

    /// Apply the rule policy: drop disabled rules, re-grade severities, append custom rules
    pub fn apply_rule_policy(&self, mut rules: RuleSet) -> GuardianResult<RuleSet> {
        let policy = &self.rules;

        rules.retain(|rule| !policy.disabled.contains(&rule.id));

        for rule in &policy.custom {
            rules.push(rule.clone())?;
        }

        for (id, severity) in &policy.severity_overrides {
            match rules.get_mut(id) {
                Some(rule) => rule.severity = *severity,
                None => tracing::warn!("Severity override for unknown rule '{}'", id),
            }
        }

        Ok(rules)
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> GuardianResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GuardianError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Default for RulesFileConfig {
    fn default() -> Self {
        Self {
            search_paths: [
                "convex_rules.mdc",
                "docs/convex_rules.mdc",
                ".convex/rules.mdc",
                ".cursor/rules/convex_rules.mdc",
                "~/projects/convex-rules/convex_rules.mdc",
                "~/.convex/convex_rules.mdc",
                "/etc/convex/convex_rules.mdc",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let named = |name: &str, path: &str| NamedConfig {
            name: name.to_string(),
            path: path.to_string(),
        };

        Self {
            standard_configs: vec![
                named("Main TypeScript Config", "tsconfig.json"),
                named("App TypeScript Config", "tsconfig.app.json"),
                named("Convex TypeScript Config", "convex/tsconfig.json"),
                named("Node TypeScript Config", "tsconfig.node.json"),
                named("Build TypeScript Config", "tsconfig.build.json"),
            ],
            file_pattern: "tsconfig*.json".to_string(),
            exclude_dirs: [".git", "node_modules", "dist", "build", ".next"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { passed_rules_limit: 5 }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: GuardianConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: GuardianConfig::default() }
    }

    /// Add a directory name skipped during discovery
    pub fn exclude_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.discovery.exclude_dirs.push(dir.into());
        self
    }

    /// Disable a rule by id
    pub fn disable_rule(mut self, id: impl Into<String>) -> Self {
        self.config.rules.disabled.push(id.into());
        self
    }

    /// Override the severity of a rule
    pub fn override_severity(mut self, id: impl Into<String>, severity: Severity) -> Self {
        self.config.rules.severity_overrides.insert(id.into(), severity);
        self
    }

    /// Add a custom rule
    pub fn add_custom_rule(mut self, rule: Rule) -> Self {
        self.config.rules.custom.push(rule);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> GuardianResult<GuardianConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Locating the rules document and the configuration files to evaluate
//!
//! Architectural Principle: Service Layer - Discovery turns a project directory into concrete inputs
//! - Rules document candidates are checked in order, first hit wins
//! - Well-known configs keep their display names and come first
//! - A sorted directory walk adds the rest, pruning excluded directories

use crate::config::DiscoveryConfig;
use crate::domain::violations::{GuardianError, GuardianResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A configuration file selected for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTarget {
    /// Display name, e.g. "Main TypeScript Config"
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
}

impl ConfigTarget {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }

    /// Target for an explicitly given file, named after its path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self { name: format!("TypeScript Config ({})", path.display()), path }
    }
}

/// Resolve a search location against the project directory.
///
/// `~/` expands to `$HOME`; returns `None` when `$HOME` is unset.
pub fn resolve_search_path(project_dir: &Path, candidate: &str) -> Option<PathBuf> {
    if let Some(rest) = candidate.strip_prefix("~/") {
        let home = std::env::var_os("HOME")?;
        return Some(PathBuf::from(home).join(rest));
    }

    let path = Path::new(candidate);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(project_dir.join(path))
    }
}

/// Every location that is searched for the rules document, in order
pub fn rules_file_candidates(project_dir: &Path, search_paths: &[String]) -> Vec<PathBuf> {
    search_paths
        .iter()
        .filter_map(|candidate| resolve_search_path(project_dir, candidate))
        .collect()
}

/// First existing rules document among the search paths
pub fn find_rules_file(project_dir: &Path, search_paths: &[String]) -> Option<PathBuf> {
    rules_file_candidates(project_dir, search_paths).into_iter().find(|path| {
        let exists = path.is_file();
        tracing::debug!("Rules document candidate {}: {}", path.display(), exists);
        exists
    })
}

/// Standard named configs that exist, then any other matching file under the project
pub fn find_config_files(
    project_dir: &Path,
    discovery: &DiscoveryConfig,
) -> GuardianResult<Vec<ConfigTarget>> {
    if !project_dir.is_dir() {
        return Err(GuardianError::discovery(format!(
            "Project directory not found: {}",
            project_dir.display()
        )));
    }

    let pattern = glob::Pattern::new(&discovery.file_pattern).map_err(|e| {
        GuardianError::discovery(format!("Invalid pattern '{}': {e}", discovery.file_pattern))
    })?;

    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for standard in &discovery.standard_configs {
        let path = project_dir.join(&standard.path);
        if path.is_file() && seen.insert(path.clone()) {
            targets.push(ConfigTarget::new(&standard.name, path));
        }
    }

    let walker = WalkDir::new(project_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !discovery
                    .exclude_dirs
                    .iter()
                    .any(|dir| entry.file_name().to_str() == Some(dir.as_str()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable path during discovery: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry.file_name().to_str().is_some_and(|name| pattern.matches(name));
        if !matches || !seen.insert(entry.path().to_path_buf()) {
            continue;
        }

        let relative = entry.path().strip_prefix(project_dir).unwrap_or(entry.path());
        targets.push(ConfigTarget::new(
            format!("TypeScript Config ({})", relative.display()),
            entry.path(),
        ));
    }

    tracing::debug!("Discovered {} configuration files", targets.len());
    Ok(targets)
}

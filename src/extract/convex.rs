//! Compiler settings the Convex platform needs regardless of document content

use crate::document::Document;
use crate::domain::rules::{Rule, RuleCheck, RuleKind, Validator, COMPILER_OPTIONS};
use crate::domain::violations::Severity;
use crate::extract::RuleExtractor;
use serde_json::{json, Value as JsonValue};

/// Emits the fixed Convex platform rule list
#[derive(Debug, Default, Clone, Copy)]
pub struct ConvexPlatformRequirements;

impl ConvexPlatformRequirements {
    /// Compiler options whose values are mandated by the Convex bundler
    pub fn required_options() -> Vec<(&'static str, JsonValue)> {
        vec![
            ("target", json!("ESNext")),
            ("module", json!("ESNext")),
            ("forceConsistentCasingInFileNames", json!(true)),
            ("isolatedModules", json!(true)),
            ("noEmit", json!(true)),
        ]
    }
}

fn one_of(values: &[&str]) -> Validator {
    Validator::OneOf {
        values: values.iter().map(|v| json!(v)).collect(),
    }
}

impl RuleExtractor for ConvexPlatformRequirements {
    fn name(&self) -> &'static str {
        "convex-platform"
    }

    fn extract(&self, _doc: &Document) -> Vec<Rule> {
        let mut rules: Vec<Rule> = Self::required_options()
            .into_iter()
            .map(|(key, value)| {
                Rule::new(
                    format!("convex-required-{key}"),
                    format!("Convex requires {key} to be {}", display_plain(&value)),
                    RuleKind::Required,
                    Severity::Error,
                    [COMPILER_OPTIONS, key],
                    RuleCheck::ExpectedValue(value.clone()),
                )
                .with_fix(format!("Set '{key}': {value} in compilerOptions"))
            })
            .collect();

        rules.push(
            Rule::new(
                "convex-required-lib",
                "Convex requires ES2021 or DOM in lib array",
                RuleKind::Required,
                Severity::Warning,
                [COMPILER_OPTIONS, "lib"],
                RuleCheck::Validator(Validator::ListMatchesAny {
                    substrings: ["ES2021", "ES2020", "ESNext", "DOM"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                }),
            )
            .with_fix("Include 'ES2021' and 'DOM' in lib array"),
        );

        rules.push(
            Rule::new(
                "convex-module-resolution",
                "Module resolution should be compatible with Convex bundler",
                RuleKind::Recommended,
                Severity::Warning,
                [COMPILER_OPTIONS, "moduleResolution"],
                RuleCheck::Validator(one_of(&["Bundler", "bundler", "Node", "node"])),
            )
            .with_fix("Set 'moduleResolution': 'Bundler' for Convex compatibility"),
        );

        rules.push(
            Rule::new(
                "convex-jsx",
                "JSX should be configured for React",
                RuleKind::Recommended,
                Severity::Info,
                [COMPILER_OPTIONS, "jsx"],
                RuleCheck::Validator(one_of(&["react-jsx", "react", "preserve"])),
            )
            .with_fix("Set 'jsx': 'react-jsx' for React 17+ support"),
        );

        rules.push(
            Rule::new(
                "convex-exclude-generated",
                "Convex generated files should be excluded",
                RuleKind::Recommended,
                Severity::Info,
                ["exclude"],
                RuleCheck::Validator(Validator::ListMatchesAny {
                    substrings: vec!["_generated".to_string()],
                }),
            )
            .with_fix("Add './_generated' or 'convex/_generated' to exclude array"),
        );

        rules
    }
}

fn display_plain(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_rules_ignore_document_content() {
        let empty = ConvexPlatformRequirements.extract(&Document::default());
        let full = ConvexPlatformRequirements.extract(&Document::parse("# Anything\ntext\n"));

        assert_eq!(empty, full);
        assert_eq!(empty.len(), 9);
    }

    #[test]
    fn test_required_option_rules() {
        let rules = ConvexPlatformRequirements.extract(&Document::default());

        let no_emit = rules.iter().find(|r| r.id == "convex-required-noEmit").unwrap();
        assert_eq!(no_emit.description, "Convex requires noEmit to be true");
        assert_eq!(no_emit.fix_suggestion.as_deref(), Some("Set 'noEmit': true in compilerOptions"));
        assert_eq!(no_emit.path, vec!["compilerOptions", "noEmit"]);

        let target = rules.iter().find(|r| r.id == "convex-required-target").unwrap();
        assert_eq!(target.description, "Convex requires target to be ESNext");
        assert_eq!(
            target.fix_suggestion.as_deref(),
            Some("Set 'target': \"ESNext\" in compilerOptions")
        );
        assert!(rules.iter().take(5).all(|r| r.severity == Severity::Error));
    }

    #[test]
    fn test_lib_rule_is_a_warning() {
        let rules = ConvexPlatformRequirements.extract(&Document::default());
        let lib = rules.iter().find(|r| r.id == "convex-required-lib").unwrap();

        assert_eq!(lib.kind, RuleKind::Required);
        assert_eq!(lib.severity, Severity::Warning);
        match &lib.check {
            RuleCheck::Validator(v) => {
                assert!(v.accepts(Some(&json!(["ESNext"]))));
                assert!(!v.accepts(Some(&json!(["ES5"]))));
            }
            other => panic!("unexpected check {other:?}"),
        }
    }
}

//! Rule extraction from parsed rules documents
//!
//! CDD Principle: Domain Services - Extractors turn guideline text into declarative rules
//! - Each extractor is an independent strategy behind the RuleExtractor trait
//! - The composite runs strategies in a fixed order and concatenates their output
//! - Rule id uniqueness is enforced once, on the combined set

pub mod convex;
pub mod example_configs;
pub mod typescript;

use crate::document::Document;
use crate::domain::rules::{Rule, RuleSet};
use crate::domain::violations::GuardianResult;

pub use convex::ConvexPlatformRequirements;
pub use example_configs::ExampleConfigurations;
pub use typescript::TypescriptGuidelines;

/// Strategy that derives rules from a document
pub trait RuleExtractor {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Rules this strategy finds in the document, in a stable order
    fn extract(&self, doc: &Document) -> Vec<Rule>;
}

/// Runs every registered extractor in order
pub struct RulesExtractor {
    extractors: Vec<Box<dyn RuleExtractor>>,
}

impl RulesExtractor {
    /// Create a composite from a custom list of strategies
    pub fn new(extractors: Vec<Box<dyn RuleExtractor>>) -> Self {
        Self { extractors }
    }

    /// TypeScript guidelines, then Convex platform requirements, then example configurations
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(TypescriptGuidelines),
            Box::new(ConvexPlatformRequirements),
            Box::new(ExampleConfigurations),
        ])
    }

    /// Names of the registered strategies in run order
    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Extract the combined rule set. Fails on duplicate rule ids.
    pub fn extract(&self, doc: &Document) -> GuardianResult<RuleSet> {
        let mut rules = Vec::new();

        for extractor in &self.extractors {
            let found = extractor.extract(doc);
            tracing::debug!("Extractor '{}' produced {} rules", extractor.name(), found.len());
            rules.extend(found);
        }

        RuleSet::from_rules(rules)
    }
}

impl Default for RulesExtractor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::{RuleCheck, RuleKind};
    use crate::domain::violations::{GuardianError, Severity};
    use serde_json::json;

    const GUIDELINES: &str = r#"---
description: Guidelines and best practices for building a Convex project
globs: **/*.ts,**/*.tsx
---
# Convex guidelines
## Typescript guidelines
- Be strict with types, particularly around id's of documents.
- Always add `@types/node` to your `package.json` when using any Node.js built-in modules.

## Examples
```json tsconfig.json
{
  "compilerOptions": {
    "skipLibCheck": true,
    "allowSyntheticDefaultImports": true
  }
}
```
"#;

    struct Fixed(&'static str);

    impl RuleExtractor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _doc: &Document) -> Vec<Rule> {
            vec![Rule::new(
                self.0,
                "fixed rule",
                RuleKind::Required,
                Severity::Error,
                ["compilerOptions", "strict"],
                RuleCheck::ExpectedValue(json!(true)),
            )]
        }
    }

    #[test]
    fn test_default_extraction_order() {
        let doc = Document::parse(GUIDELINES);
        let rules = RulesExtractor::with_defaults().extract(&doc).unwrap();
        let ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "ts-strict-types",
                "ts-node-types",
                "convex-required-target",
                "convex-required-module",
                "convex-required-forceConsistentCasingInFileNames",
                "convex-required-isolatedModules",
                "convex-required-noEmit",
                "convex-required-lib",
                "convex-module-resolution",
                "convex-jsx",
                "convex-exclude-generated",
                "example-skip-lib-check",
                "example-synthetic-imports",
            ]
        );
    }

    #[test]
    fn test_empty_document_still_yields_platform_rules() {
        let rules = RulesExtractor::with_defaults().extract(&Document::parse("")).unwrap();

        assert_eq!(rules.len(), 9);
        assert!(rules.iter().all(|r| r.id.starts_with("convex-")));
    }

    #[test]
    fn test_custom_extractors_and_duplicates() {
        let extractor = RulesExtractor::new(vec![Box::new(Fixed("a")), Box::new(Fixed("b"))]);
        assert_eq!(extractor.extractor_names(), vec!["fixed", "fixed"]);
        assert_eq!(extractor.extract(&Document::default()).unwrap().len(), 2);

        let clashing = RulesExtractor::new(vec![Box::new(Fixed("a")), Box::new(Fixed("a"))]);
        assert!(matches!(
            clashing.extract(&Document::default()),
            Err(GuardianError::Rule { .. })
        ));
    }
}

//! Rules inferred from example tsconfig.json code blocks

use crate::document::Document;
use crate::domain::rules::{Rule, RuleCheck, RuleKind, COMPILER_OPTIONS};
use crate::domain::violations::Severity;
use crate::extract::RuleExtractor;
use serde_json::json;

const CONFIG_MARKER: &str = "tsconfig.json";

/// Literal setting found in an example, and the rule it implies
struct ExampleSetting {
    literal: &'static str,
    id: &'static str,
    option: &'static str,
    description: &'static str,
    fix: &'static str,
}

const SETTINGS: &[ExampleSetting] = &[
    ExampleSetting {
        literal: "\"skipLibCheck\": true",
        id: "example-skip-lib-check",
        option: "skipLibCheck",
        description: "Skip library type checking for faster builds",
        fix: "Set 'skipLibCheck': true for faster builds",
    },
    ExampleSetting {
        literal: "\"allowSyntheticDefaultImports\": true",
        id: "example-synthetic-imports",
        option: "allowSyntheticDefaultImports",
        description: "Allow synthetic default imports",
        fix: "Set 'allowSyntheticDefaultImports': true",
    },
];

/// Emits recommendations for settings used by the document's example configs
#[derive(Debug, Default, Clone, Copy)]
pub struct ExampleConfigurations;

impl RuleExtractor for ExampleConfigurations {
    fn name(&self) -> &'static str {
        "example-configurations"
    }

    fn extract(&self, doc: &Document) -> Vec<Rule> {
        let examples: Vec<_> = doc
            .code_blocks
            .iter()
            .filter(|block| block.mentions(CONFIG_MARKER))
            .collect();

        SETTINGS
            .iter()
            .filter(|setting| examples.iter().any(|block| block.code.contains(setting.literal)))
            .map(|setting| {
                Rule::new(
                    setting.id,
                    setting.description,
                    RuleKind::Recommended,
                    Severity::Info,
                    [COMPILER_OPTIONS, setting.option],
                    RuleCheck::ExpectedValue(json!(true)),
                )
                .with_fix(setting.fix)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_in_tagged_block() {
        let doc = Document::parse(
            "```json tsconfig.json\n{ \"skipLibCheck\": true, \"allowSyntheticDefaultImports\": true }\n```\n",
        );
        let ids: Vec<_> = ExampleConfigurations.extract(&doc).into_iter().map(|r| r.id).collect();

        assert_eq!(ids, vec!["example-skip-lib-check", "example-synthetic-imports"]);
    }

    #[test]
    fn test_block_must_mention_tsconfig() {
        let doc = Document::parse("```json\n{ \"skipLibCheck\": true }\n```\n");
        assert!(ExampleConfigurations.extract(&doc).is_empty());

        let doc = Document::parse("```json\n// tsconfig.json\n{ \"skipLibCheck\": true }\n```\n");
        assert_eq!(ExampleConfigurations.extract(&doc).len(), 1);
    }

    #[test]
    fn test_repeated_examples_emit_each_rule_once() {
        let block = "```json tsconfig.json\n{ \"skipLibCheck\": true }\n```\n";
        let doc = Document::parse(&format!("{block}\n{block}"));

        let rules = ExampleConfigurations.extract(&doc);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].severity, Severity::Info);
    }

    #[test]
    fn test_false_setting_is_not_a_recommendation() {
        let doc = Document::parse("```json tsconfig.json\n{ \"skipLibCheck\": false }\n```\n");
        assert!(ExampleConfigurations.extract(&doc).is_empty());
    }
}

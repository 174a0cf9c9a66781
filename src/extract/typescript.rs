//! Rules derived from the "Typescript guidelines" section

use crate::document::Document;
use crate::domain::rules::{Rule, RuleCheck, RuleKind, Validator, COMPILER_OPTIONS};
use crate::domain::violations::Severity;
use crate::extract::RuleExtractor;
use serde_json::json;

/// Section title the guidelines live under
pub const SECTION_TITLE: &str = "Typescript guidelines";

const STRICT_MARKER: &str = "Be strict with types";
const NODE_TYPES_MARKER: &str = "@types/node";

/// Emits strictness and Node typings rules when the guidelines mention them
#[derive(Debug, Default, Clone, Copy)]
pub struct TypescriptGuidelines;

impl RuleExtractor for TypescriptGuidelines {
    fn name(&self) -> &'static str {
        "typescript-guidelines"
    }

    fn extract(&self, doc: &Document) -> Vec<Rule> {
        let Some(content) = doc.section_ignore_case(SECTION_TITLE) else {
            return Vec::new();
        };

        let mut rules = Vec::new();

        if content.contains(STRICT_MARKER) {
            rules.push(
                Rule::new(
                    "ts-strict-types",
                    "TypeScript strict mode should be enabled",
                    RuleKind::Required,
                    Severity::Error,
                    [COMPILER_OPTIONS, "strict"],
                    RuleCheck::ExpectedValue(json!(true)),
                )
                .with_fix("Set 'strict': true in compilerOptions"),
            );
        }

        if content.contains(NODE_TYPES_MARKER) {
            rules.push(
                Rule::new(
                    "ts-node-types",
                    "Add @types/node when using Node.js modules",
                    RuleKind::Recommended,
                    Severity::Info,
                    [COMPILER_OPTIONS, "types"],
                    RuleCheck::Validator(Validator::ContainsIfList {
                        item: NODE_TYPES_MARKER.to_string(),
                    }),
                )
                .with_fix("Add '@types/node' to types array or install it"),
            );
        }

        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_marker_only() {
        let doc = Document::parse("## Typescript guidelines\n- Be strict with types.\n");
        let rules = TypescriptGuidelines.extract(&doc);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "ts-strict-types");
        assert_eq!(rules[0].check, RuleCheck::ExpectedValue(json!(true)));
    }

    #[test]
    fn test_section_title_is_case_insensitive() {
        let doc = Document::parse("## TypeScript Guidelines\nBe strict with types and add @types/node\n");
        let ids: Vec<_> = TypescriptGuidelines.extract(&doc).into_iter().map(|r| r.id).collect();

        assert_eq!(ids, vec!["ts-strict-types", "ts-node-types"]);
    }

    #[test]
    fn test_markers_outside_section_are_ignored() {
        let doc = Document::parse("## Other\nBe strict with types. @types/node\n");
        assert!(TypescriptGuidelines.extract(&doc).is_empty());
    }
}

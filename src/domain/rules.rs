//! Declarative rules about values inside nested configuration documents
//!
//! Architecture: Value Objects - A rule is pure data describing one expectation
//! - `RuleCheck` makes "exactly one of expected / forbidden / validator" a type-level fact
//! - `Validator` is a closed set of predicates so rules stay serializable and comparable
//! - `RuleSet` owns the uniqueness invariant on rule ids

use crate::domain::violations::{GuardianError, GuardianResult, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Root key of the TypeScript compiler options map
pub const COMPILER_OPTIONS: &str = "compilerOptions";

/// How a rule's outcome should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// The value must satisfy the check
    Required,
    /// The value must not equal the forbidden value
    Forbidden,
    /// The value should satisfy the check
    Recommended,
}

impl RuleKind {
    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Forbidden => "forbidden",
            Self::Recommended => "recommended",
        }
    }
}

/// Predicates applied to a resolved configuration value
///
/// The resolved value is `None` when the rule's path is absent; every
/// variant decides for itself how absence is treated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Passes when the value is not a list, or when the list contains `item`
    ContainsIfList { item: String },
    /// Value must be a list with an element whose text contains one of `substrings`
    ListMatchesAny { substrings: Vec<String> },
    /// Value must equal one of `values`
    OneOf { values: Vec<JsonValue> },
}

impl Validator {
    /// Whether `value` satisfies this validator
    pub fn accepts(&self, value: Option<&JsonValue>) -> bool {
        match self {
            Self::ContainsIfList { item } => match value {
                Some(JsonValue::Array(items)) => {
                    items.iter().any(|v| v.as_str() == Some(item.as_str()))
                }
                _ => true,
            },
            Self::ListMatchesAny { substrings } => match value {
                Some(JsonValue::Array(items)) => items.iter().any(|element| {
                    let text = element_text(element);
                    substrings.iter().any(|s| text.contains(s.as_str()))
                }),
                _ => false,
            },
            Self::OneOf { values } => value.is_some_and(|v| values.contains(v)),
        }
    }

    /// Short human-readable description of the predicate
    pub fn describe(&self) -> String {
        match self {
            Self::ContainsIfList { item } => format!("list (if present) contains \"{item}\""),
            Self::ListMatchesAny { substrings } => {
                format!("list with an entry mentioning one of: {}", substrings.join(", "))
            }
            Self::OneOf { values } => format!(
                "one of: {}",
                values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

fn element_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// What a rule checks at its path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCheck {
    /// Value must strictly equal this value
    ExpectedValue(JsonValue),
    /// Value must not equal this value
    ForbiddenValue(JsonValue),
    /// Value must satisfy this predicate
    Validator(Validator),
}

impl RuleCheck {
    /// Short human-readable description of the check
    pub fn describe(&self) -> String {
        match self {
            Self::ExpectedValue(v) => format!("equals {v}"),
            Self::ForbiddenValue(v) => format!("is not {v}"),
            Self::Validator(validator) => validator.describe(),
        }
    }
}

/// A declarative expectation about a value at a configuration path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier for this rule
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Rule kind
    pub kind: RuleKind,
    /// Severity of a violation of this rule
    pub severity: Severity,
    /// Keys locating the value inside the configuration
    pub path: Vec<String>,
    /// What is checked at `path`
    #[serde(flatten)]
    pub check: RuleCheck,
    /// How to fix a violation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

impl Rule {
    /// Create a new rule
    pub fn new<I, S>(
        id: impl Into<String>,
        description: impl Into<String>,
        kind: RuleKind,
        severity: Severity,
        path: I,
        check: RuleCheck,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            description: description.into(),
            kind,
            severity,
            path: path.into_iter().map(Into::into).collect(),
            check,
            fix_suggestion: None,
        }
    }

    /// Attach a fix suggestion
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix_suggestion = Some(fix.into());
        self
    }

    /// Dotted form of the path, e.g. `compilerOptions.strict`
    pub fn path_display(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }

    /// Whether the rule's path starts at the compiler options root
    pub fn targets_compiler_options(&self) -> bool {
        self.path.first().map(String::as_str) == Some(COMPILER_OPTIONS)
    }

    /// Check that the rule is internally consistent
    pub fn validate(&self) -> GuardianResult<()> {
        if self.id.trim().is_empty() {
            return Err(GuardianError::rule("Rule id must not be empty"));
        }

        if self.path.is_empty() {
            return Err(GuardianError::rule(format!(
                "Rule '{}' must have a non-empty path",
                self.id
            )));
        }

        let consistent = match (self.kind, &self.check) {
            (RuleKind::Forbidden, RuleCheck::ForbiddenValue(_)) => true,
            (RuleKind::Forbidden, _) => false,
            (_, RuleCheck::ForbiddenValue(_)) => false,
            _ => true,
        };
        if !consistent {
            return Err(GuardianError::rule(format!(
                "Rule '{}' of kind {} cannot use check '{}'",
                self.id,
                self.kind.as_str(),
                self.check.describe()
            )));
        }

        Ok(())
    }
}

/// An ordered list of rules with unique ids
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicate ids
    pub fn from_rules(rules: Vec<Rule>) -> GuardianResult<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(GuardianError::rule(format!("Duplicate rule ID '{}'", rule.id)));
            }
        }
        Ok(Self { rules })
    }

    /// Append a rule, rejecting a duplicate id
    pub fn push(&mut self, rule: Rule) -> GuardianResult<()> {
        if self.get(&rule.id).is_some() {
            return Err(GuardianError::rule(format!("Duplicate rule ID '{}'", rule.id)));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Mutable lookup by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.id == id)
    }

    /// Keep only rules matching the predicate
    pub fn retain(&mut self, keep: impl FnMut(&Rule) -> bool) {
        self.rules.retain(keep);
    }

    /// Iterate rules in order
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn rule(id: &str) -> Rule {
        Rule::new(
            id,
            "test rule",
            RuleKind::Required,
            Severity::Error,
            ["compilerOptions", "strict"],
            RuleCheck::ExpectedValue(json!(true)),
        )
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(json!("types")), true)]
    #[case(Some(json!(["@types/node", "vite/client"])), true)]
    #[case(Some(json!(["vite/client"])), false)]
    fn test_contains_if_list(#[case] value: Option<JsonValue>, #[case] expected: bool) {
        let validator = Validator::ContainsIfList { item: "@types/node".to_string() };
        assert_eq!(validator.accepts(value.as_ref()), expected);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(json!("ES2021")), false)]
    #[case(Some(json!([])), false)]
    #[case(Some(json!(["ES2021", "DOM"])), true)]
    #[case(Some(json!(["dom.iterable"])), false)]
    #[case(Some(json!(["DOM.Iterable"])), true)]
    fn test_list_matches_any(#[case] value: Option<JsonValue>, #[case] expected: bool) {
        let validator = Validator::ListMatchesAny {
            substrings: vec!["ES2021".to_string(), "DOM".to_string()],
        };
        assert_eq!(validator.accepts(value.as_ref()), expected);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(json!("Bundler")), true)]
    #[case(Some(json!("classic")), false)]
    fn test_one_of(#[case] value: Option<JsonValue>, #[case] expected: bool) {
        let validator = Validator::OneOf { values: vec![json!("Bundler"), json!("node")] };
        assert_eq!(validator.accepts(value.as_ref()), expected);
    }

    #[test]
    fn test_rule_set_rejects_duplicate_ids() {
        let result = RuleSet::from_rules(vec![rule("a"), rule("b"), rule("a")]);
        assert!(matches!(result, Err(GuardianError::Rule { .. })));

        let mut set = RuleSet::from_rules(vec![rule("a")]).unwrap();
        assert!(set.push(rule("a")).is_err());
        assert!(set.push(rule("b")).is_ok());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rule_validate_kind_and_check() {
        assert!(rule("ok").validate().is_ok());

        let mut forbidden_with_expected = rule("bad");
        forbidden_with_expected.kind = RuleKind::Forbidden;
        assert!(forbidden_with_expected.validate().is_err());

        let mut required_with_forbidden = rule("bad2");
        required_with_forbidden.check = RuleCheck::ForbiddenValue(json!(false));
        assert!(required_with_forbidden.validate().is_err());

        let mut no_path = rule("bad3");
        no_path.path.clear();
        assert!(no_path.validate().is_err());
    }

    #[test]
    fn test_rule_yaml_shape() {
        let yaml = r#"
id: no-allow-js
description: JavaScript sources should not be compiled
kind: forbidden
severity: warning
path: [compilerOptions, allowJs]
forbidden_value: true
fix_suggestion: Remove allowJs
"#;
        let parsed: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.kind, RuleKind::Forbidden);
        assert_eq!(parsed.check, RuleCheck::ForbiddenValue(json!(true)));
        assert!(parsed.targets_compiler_options());
        assert!(parsed.validate().is_ok());

        let yaml = r#"
id: jsx-mode
description: JSX mode
kind: recommended
severity: info
path: [compilerOptions, jsx]
validator:
  kind: one_of
  values: [react-jsx, preserve]
"#;
        let parsed: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            parsed.check,
            RuleCheck::Validator(Validator::OneOf { values: vec![json!("react-jsx"), json!("preserve")] })
        );
    }
}

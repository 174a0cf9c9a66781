//! JSON-with-comments cleanup for tsconfig-style files
//!
//! Strings and comments are recognised in one left-to-right scan, so a `/*`
//! inside a line comment (or a `//` inside a block comment) is just comment
//! text. String literals are swapped for unique placeholders before any
//! rewriting so that `//`, `/*` or `,}` inside a string survive untouched.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

/// Upper bound on trailing-comma passes; nested closers need more than one
const TRAILING_COMMA_PASSES: usize = 3;

lazy_static! {
    /// String literal, block comment or line comment; whichever starts first wins
    static ref TOKEN: Regex =
        Regex::new(r#""(?:[^"\\]|\\.)*"|/\*[\s\S]*?\*/|//[^\n\r]*"#)
            .expect("token pattern is valid");
    static ref PLACEHOLDER: Regex =
        Regex::new(r"__STRING_[0-9a-f]{32}__").expect("placeholder pattern is valid");
    static ref TRAILING_COMMA: Regex =
        Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid");
}

/// Remove block and line comments, leaving string literals intact
pub fn strip_comments(text: &str) -> String {
    let (protected, originals) = protect(text, true);
    restore(&protected, &originals)
}

/// Remove commas directly before a closing brace or bracket
pub fn strip_trailing_commas(text: &str) -> String {
    let (protected, originals) = protect(text, false);
    restore(&remove_trailing_commas(&protected), &originals)
}

/// Strip comments and trailing commas in one protected pass
pub fn clean(text: &str) -> String {
    let (protected, originals) = protect(text, true);
    restore(&remove_trailing_commas(&protected), &originals)
}

/// Parse JSON-with-comments text into a JSON value
pub fn parse(text: &str) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_str(&clean(text))
}

/// Swap string literals for placeholders in a single scan, dropping comments when asked
fn protect(text: &str, drop_comments: bool) -> (String, HashMap<String, String>) {
    let mut originals: HashMap<String, String> = HashMap::new();

    let protected = TOKEN.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        if token.starts_with('"') {
            let placeholder = format!("__STRING_{}__", Uuid::new_v4().simple());
            originals.insert(placeholder.clone(), token.to_string());
            placeholder
        } else if drop_comments {
            String::new()
        } else {
            token.to_string()
        }
    });

    (protected.into_owned(), originals)
}

fn restore(text: &str, originals: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            originals.get(&caps[0]).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn remove_trailing_commas(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..TRAILING_COMMA_PASSES {
        let next = TRAILING_COMMA.replace_all(&current, "$1").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"a":1,}"#, r#"{"a":1}"#)]
    #[case(r#"{"a":[1,2,],}"#, r#"{"a":[1,2]}"#)]
    #[case("{\"a\": {\"b\": [1,\n  ],\n},\n}", "{\"a\": {\"b\": [1\n  ]\n}\n}")]
    #[case(r#"{"a":",}"}"#, r#"{"a":",}"}"#)]
    fn test_strip_trailing_commas(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_trailing_commas(input), expected);
    }

    #[test]
    fn test_strip_comments_removes_both_styles() {
        let input = "{\n  // line comment\n  \"a\": 1, /* block\n comment */ \"b\": 2\n}";
        let cleaned = strip_comments(input);

        assert!(!cleaned.contains("line comment"));
        assert!(!cleaned.contains("block"));
        let value: JsonValue = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_strip_comments_preserves_comment_markers_in_strings() {
        let input = r#"{"url": "https://example.com//x", "glob": "src/**/*.ts", "c": "/* keep */"} // tail"#;
        let cleaned = strip_comments(input);

        let value: JsonValue = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["url"], "https://example.com//x");
        assert_eq!(value["glob"], "src/**/*.ts");
        assert_eq!(value["c"], "/* keep */");
    }

    #[test]
    fn test_strip_comments_is_idempotent_on_clean_json() {
        let input = r#"{"compilerOptions": {"strict": true, "paths": {"@/*": ["./src/*"]}}}"#;

        assert_eq!(strip_comments(input), input);
        assert_eq!(strip_comments(&strip_comments(input)), input);
    }

    #[test]
    fn test_block_opener_inside_line_comment_keeps_later_keys() {
        let input = "{\n // aliases: @/* maps to src/*\n \"compilerOptions\": { \"strict\": true },\n /* trailing note */\n \"exclude\": [\"x\"]\n}";
        let value = parse(input).unwrap();

        assert_eq!(value["compilerOptions"]["strict"], true);
        assert_eq!(value["exclude"], json!(["x"]));
        assert!(!strip_comments(input).contains("trailing note"));
    }

    #[test]
    fn test_line_comment_inside_block_comment_is_removed_with_it() {
        let input = "{ /* see // docs */ \"a\": 1 }";
        assert_eq!(parse(input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_escaped_quotes_stay_inside_strings() {
        let input = r#"{"a": "say \"//hi\"", "b": 1,}"#;
        let value = parse(input).unwrap();

        assert_eq!(value["a"], "say \"//hi\"");
        assert_eq!(value["b"], 1);
    }

    #[test]
    fn test_parse_tsconfig_with_comments_and_trailing_commas() {
        let input = r#"{
  /* Visit https://aka.ms/tsconfig to read more */
  "compilerOptions": {
    "target": "ESNext", // required by Convex
    "lib": ["ES2021", "DOM",],
  },
  "exclude": ["./_generated"],
}"#;
        let value = parse(input).unwrap();

        assert_eq!(value["compilerOptions"]["target"], "ESNext");
        assert_eq!(value["compilerOptions"]["lib"], json!(["ES2021", "DOM"]));
        assert_eq!(value["exclude"], json!(["./_generated"]));
    }

    #[test]
    fn test_parse_reports_malformed_input() {
        assert!(parse("{\"a\": }").is_err());
    }
}

//! Parser for MDC rule documents (markdown with a YAML front matter block)
//!
//! Architecture: Anti-Corruption Layer - Raw guideline text is translated into a structured Document
//! - Front matter is parsed as YAML, with unquoted glob/list values quoted first
//! - Malformed front matter degrades to raw `key: value` strings instead of failing
//! - Sections and fenced code blocks are captured verbatim for the rule extractors

use crate::domain::violations::{GuardianError, GuardianResult};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Section key for text that precedes the first heading
pub const ROOT_SECTION: &str = "root";

lazy_static! {
    static ref FRONT_MATTER: Regex =
        Regex::new(r"(?s)\A---[ \t]*\n(?:(.*?)\n)?---[ \t]*(?:\n|\z)")
            .expect("front matter pattern is valid");
    static ref FRONT_MATTER_ENTRY: Regex =
        Regex::new(r"(?m)^([ \t]*[A-Za-z_][\w.-]*:[ \t]+)(.+?)[ \t]*$")
            .expect("front matter entry pattern is valid");
    static ref HEADING: Regex =
        Regex::new(r"(?m)^#+[ \t]+(.+?)[ \t]*$").expect("heading pattern is valid");
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)```([^`\n]*)\n(.*?)```").expect("code fence pattern is valid");
}

/// Characters that make an unquoted YAML scalar ambiguous
const YAML_SPECIAL_CHARS: &[char] = &['*', ',', '[', ']', '{', '}', '&', '!', '|', '>', '%', '@', '`', '#'];

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string after the opening fence, if any
    pub language: Option<String>,
    /// Body between the fences
    pub code: String,
}

impl CodeBlock {
    /// Whether the info string or the body mentions `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.language.as_deref().is_some_and(|l| l.contains(needle)) || self.code.contains(needle)
    }
}

/// A parsed rules document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Front matter entries
    pub front_matter: BTreeMap<String, YamlValue>,
    /// Section bodies keyed by heading title
    pub sections: BTreeMap<String, String>,
    /// Fenced code blocks in document order
    pub code_blocks: Vec<CodeBlock>,
}

impl Document {
    /// Parse document text. Never fails; malformed front matter falls back to raw strings.
    pub fn parse(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let mut doc = Document::default();

        let content = match FRONT_MATTER.captures(&normalized) {
            Some(caps) => {
                let block = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                doc.front_matter = parse_front_matter(block);
                let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                &normalized[end..]
            }
            None => normalized.as_str(),
        };

        doc.sections = split_sections(content);
        doc.code_blocks = extract_code_blocks(content);

        tracing::debug!(
            "Parsed document: {} front matter keys, {} sections, {} code blocks",
            doc.front_matter.len(),
            doc.sections.len(),
            doc.code_blocks.len()
        );

        doc
    }

    /// Read and parse a document from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> GuardianResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GuardianError::document(path.display().to_string(), format!("Failed to read: {e}"))
        })?;
        Ok(Self::parse(&text))
    }

    /// Body of a section by exact title
    pub fn section(&self, title: &str) -> Option<&str> {
        self.sections.get(title).map(String::as_str)
    }

    /// Body of a section by title, falling back to a case-insensitive match
    pub fn section_ignore_case(&self, title: &str) -> Option<&str> {
        self.section(title).or_else(|| {
            self.sections
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(title))
                .map(|(_, body)| body.as_str())
        })
    }

    /// Front matter value rendered as a string, if it is a scalar
    pub fn front_matter_str(&self, key: &str) -> Option<String> {
        match self.front_matter.get(key)? {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Bool(b) => Some(b.to_string()),
            YamlValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Quote values that YAML would otherwise misread (globs, comma lists, flow syntax)
fn quote_special_values(block: &str) -> String {
    FRONT_MATTER_ENTRY
        .replace_all(block, |caps: &Captures| {
            let prefix = &caps[1];
            let value = &caps[2];
            if needs_quoting(value) {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                format!("{prefix}\"{escaped}\"")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn needs_quoting(value: &str) -> bool {
    if value.starts_with('"') || value.starts_with('\'') {
        return false;
    }
    value.contains(YAML_SPECIAL_CHARS) || value.contains(": ")
}

fn parse_front_matter(block: &str) -> BTreeMap<String, YamlValue> {
    let quoted = quote_special_values(block);

    match serde_yaml::from_str::<YamlValue>(&quoted) {
        Ok(YamlValue::Mapping(mapping)) => mapping
            .into_iter()
            .filter_map(|(key, value)| yaml_key(&key).map(|k| (k, value)))
            .collect(),
        Ok(YamlValue::Null) => BTreeMap::new(),
        Ok(other) => {
            tracing::warn!(
                "Front matter is not a mapping ({:?}), falling back to raw entries",
                other
            );
            parse_front_matter_raw(block)
        }
        Err(e) => {
            tracing::warn!("Front matter is not valid YAML ({}), falling back to raw entries", e);
            parse_front_matter_raw(block)
        }
    }
}

fn parse_front_matter_raw(block: &str) -> BTreeMap<String, YamlValue> {
    block
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(key, value)| {
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            Some((key.to_string(), YamlValue::String(value.to_string())))
        })
        .collect()
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn split_sections(content: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let headings: Vec<_> = HEADING.captures_iter(content).collect();

    let root_end = headings
        .first()
        .and_then(|caps| caps.get(0))
        .map(|m| m.start())
        .unwrap_or(content.len());
    if root_end > 0 {
        sections.insert(ROOT_SECTION.to_string(), content[..root_end].to_string());
    }

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        sections.insert(title.as_str().to_string(), content[whole.end()..body_end].to_string());
    }

    sections
}

fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    CODE_FENCE
        .captures_iter(content)
        .map(|caps| {
            let language = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            let code = caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string();
            CodeBlock { language, code }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"---
description: Guidelines and best practices for building Convex projects
globs: **/*.ts,**/*.tsx,**/*.js,**/*.jsx
alwaysApply: false
---

Intro text.

# Convex guidelines
## Typescript guidelines
- Be strict with types, particularly around id's of documents.
- Always add `@types/node` to your `package.json` when using any Node.js built-in modules.

# Examples
```typescript
export const x = 1;
```

```json
{
  "compilerOptions": { "skipLibCheck": true }
}
```
"#;

    #[test]
    fn test_front_matter_with_globs() {
        let doc = Document::parse(SAMPLE);

        assert_eq!(
            doc.front_matter_str("globs").as_deref(),
            Some("**/*.ts,**/*.tsx,**/*.js,**/*.jsx")
        );
        assert_eq!(doc.front_matter.get("alwaysApply"), Some(&YamlValue::Bool(false)));
        assert_eq!(
            doc.front_matter_str("description").as_deref(),
            Some("Guidelines and best practices for building Convex projects")
        );
    }

    #[test]
    fn test_malformed_front_matter_falls_back_to_raw_strings() {
        let doc = Document::parse("---\nname: first\n  nested: \"oops\"\n---\nbody\n");

        assert_eq!(doc.front_matter_str("name").as_deref(), Some("first"));
        assert_eq!(doc.front_matter_str("nested").as_deref(), Some("oops"));
    }

    #[test]
    fn test_sections_split_on_any_heading_level() {
        let doc = Document::parse(SAMPLE);

        assert!(doc.section(ROOT_SECTION).unwrap().contains("Intro text."));
        assert!(doc.section("Convex guidelines").unwrap().trim().is_empty());
        let ts = doc.section("Typescript guidelines").unwrap();
        assert!(ts.contains("Be strict with types"));
        assert!(!ts.contains("export const"));
        assert!(doc.section_ignore_case("TYPESCRIPT GUIDELINES").is_some());
    }

    #[test]
    fn test_repeated_heading_last_wins() {
        let doc = Document::parse("# Notes\nfirst\n# Other\nx\n# Notes\nsecond\n");

        assert_eq!(doc.section("Notes"), Some("\nsecond\n"));
        assert!(doc.section(ROOT_SECTION).is_none());
    }

    #[test]
    fn test_code_blocks_exclude_fences() {
        let doc = Document::parse(SAMPLE);

        assert_eq!(doc.code_blocks.len(), 2);
        assert_eq!(doc.code_blocks[0].language.as_deref(), Some("typescript"));
        assert_eq!(doc.code_blocks[0].code, "export const x = 1;\n");
        assert_eq!(doc.code_blocks[1].language.as_deref(), Some("json"));
        assert!(doc.code_blocks.iter().all(|b| !b.code.contains("```")));
    }

    #[test]
    fn test_code_block_without_language() {
        let doc = Document::parse("text\n```\nplain\n```\n```ts\nlet a = 1;\n```\n");

        assert_eq!(doc.code_blocks.len(), 2);
        assert_eq!(doc.code_blocks[0].language, None);
        assert_eq!(doc.code_blocks[0].code, "plain\n");
    }

    #[test]
    fn test_document_without_front_matter() {
        let doc = Document::parse("# Title\nbody\n");

        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.section("Title"), Some("\nbody\n"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = Document::parse("---\r\nglobs: *.ts\r\n---\r\n# Title\r\nbody\r\n");

        assert_eq!(doc.front_matter_str("globs").as_deref(), Some("*.ts"));
        assert!(doc.section("Title").is_some());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.mdc");
        fs::write(&path, SAMPLE).unwrap();

        let doc = Document::from_file(&path).unwrap();
        assert_eq!(doc.code_blocks.len(), 2);

        let missing = Document::from_file(temp_dir.path().join("missing.mdc"));
        assert!(matches!(missing, Err(GuardianError::Document { .. })));
    }
}
